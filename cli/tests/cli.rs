use clap::Parser;
use docrank_cli::{run, Cli};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn build_docs(dir: &Path) {
    fs::write(dir.join("doc1.txt"), "Machine learning is artificial intelligence").unwrap();
    fs::write(dir.join("doc2.txt"), "Deep learning uses neural networks").unwrap();
    fs::write(dir.join("doc3.txt"), "Classification is a supervised task").unwrap();
    fs::create_dir_all(dir.join("more")).unwrap();
    fs::write(dir.join("more").join("doc4.txt"), "Reinforcement learning learns from reward signals").unwrap();
}

fn run_args(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("docrank").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    run(cli, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn search_reports_ranked_results() {
    let dir = tempdir().unwrap();
    build_docs(dir.path());
    let docs = dir.path().to_string_lossy().to_string();

    let out = run_args(&["search", "--docs", &docs, "--method", "bm25", "--k", "5", "learning"]).unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["ranking"], "probabilistic");
    assert_eq!(json["documents"], 3);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.get("occurrence_count").is_none()));
}

#[test]
fn recursive_search_sees_subfolders() {
    let dir = tempdir().unwrap();
    build_docs(dir.path());
    let docs = dir.path().to_string_lossy().to_string();

    let out = run_args(&["search", "--docs", &docs, "--recursive", "learning"]).unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["documents"], 4);
    assert_eq!(json["results"].as_array().unwrap().len(), 3);
}

#[test]
fn quoted_search_is_phrase() {
    let dir = tempdir().unwrap();
    build_docs(dir.path());
    let docs = dir.path().to_string_lossy().to_string();

    let out = run_args(&["search", "--docs", &docs, "\"neural networks\""]).unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["ranking"], "phrase");
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "doc2.txt");
    assert_eq!(results[0]["occurrence_count"], 1);
    assert!(results[0]["snippet"].as_str().unwrap().contains("<mark>neural networks</mark>"));
}

#[test]
fn unknown_method_fails() {
    let dir = tempdir().unwrap();
    build_docs(dir.path());
    let docs = dir.path().to_string_lossy().to_string();
    let err = run_args(&["search", "--docs", &docs, "--method", "cosine", "learning"]).unwrap_err();
    assert!(err.to_string().contains("cosine"));
}

#[test]
fn keywords_and_bounds() {
    let dir = tempdir().unwrap();
    build_docs(dir.path());
    let docs = dir.path().to_string_lossy().to_string();

    let out = run_args(&["keywords", "--docs", &docs, "--doc", "2", "--n", "3"]).unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 3);

    assert!(run_args(&["keywords", "--docs", &docs, "--doc", "9"]).is_err());
}

#[test]
fn list_and_show() {
    let dir = tempdir().unwrap();
    build_docs(dir.path());
    let docs = dir.path().to_string_lossy().to_string();

    let out = run_args(&["list", "--docs", &docs]).unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    let names: Vec<&str> = json.as_array().unwrap().iter().map(|d| d["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["doc1.txt", "doc2.txt", "doc3.txt"]);

    let out = run_args(&["show", "--docs", &docs, "--doc", "1"]).unwrap();
    assert_eq!(out.trim(), "Deep learning uses neural networks");
}

#[test]
fn config_file_and_overrides() {
    let dir = tempdir().unwrap();
    build_docs(dir.path());
    let docs = dir.path().to_string_lossy().to_string();
    let config = dir.path().join("engine.json");
    fs::write(&config, r#"{"highlight_open": "**", "highlight_close": "**"}"#).unwrap();
    let config = config.to_string_lossy().to_string();

    let out = run_args(&["search", "--docs", &docs, "--config", &config, "--window", "20", "supervised"]).unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    let snippet = json["results"][0]["snippet"].as_str().unwrap();
    assert!(snippet.contains("**supervised**"), "{snippet}");
    assert!(snippet.starts_with("..."));
}

#[test]
fn missing_folder_fails() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("absent").to_string_lossy().to_string();
    assert!(run_args(&["list", "--docs", &docs]).is_err());
}

#[test]
fn out_of_range_bm25_override_fails() {
    let dir = tempdir().unwrap();
    build_docs(dir.path());
    let docs = dir.path().to_string_lossy().to_string();
    let err = run_args(&["search", "--docs", &docs, "--method", "bm25", "--b", "2", "learning"]).unwrap_err();
    assert!(err.to_string().contains("b = 2"), "{err}");
    let err = run_args(&["search", "--docs", &docs, "--k1=-0.5", "learning"]).unwrap_err();
    assert!(err.to_string().contains("k1"), "{err}");
}
