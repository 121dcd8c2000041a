//! End-to-end subcommand behaviour against snapshot files on disk.

use pmo_cli::{commands, BatchArgs, EngineArgs, OutputFormat, RunArgs, SnapshotArgs};
use pmo_test_utils::{cyclic_portfolio, reference_date, sample_portfolio};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_snapshot(dir: &TempDir, snapshot: &pmo_model::PortfolioSnapshot) -> PathBuf {
    let path = dir.path().join("portfolio.json");
    std::fs::write(&path, serde_json::to_string(snapshot).unwrap()).unwrap();
    path
}

fn engine_args() -> EngineArgs {
    EngineArgs {
        config: None,
        reference_date: Some(reference_date()),
    }
}

fn run_args(snapshot: &Path, format: OutputFormat, text: &str) -> RunArgs {
    RunArgs {
        snapshot: SnapshotArgs {
            snapshot: snapshot.to_path_buf(),
        },
        engine: engine_args(),
        format,
        scenario: text.split_whitespace().map(ToString::to_string).collect(),
    }
}

/// JSON output carries the cascade in breadth-first order
#[test]
fn run_prints_result_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(&dir, &sample_portfolio());

    let output =
        commands::run(&run_args(&path, OutputFormat::Json, "delay Beta by 2 weeks")).unwrap();
    let json: Value = serde_json::from_str(&output).unwrap();

    let dependents = json["dependents"].as_array().unwrap();
    let names: Vec<&str> = dependents
        .iter()
        .map(|d| d["project"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "gamma"]);
    assert_eq!(dependents[0]["impact"]["kind"], "cascading_delay");
    assert_eq!(dependents[0]["impact"]["days"], 14);
    assert_eq!(dependents[1]["depth"], 2);
}

/// Text output is the sectioned briefing
#[test]
fn run_prints_briefing_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(&dir, &sample_portfolio());

    let output = commands::run(&run_args(&path, OutputFormat::Text, "remove Beta")).unwrap();
    assert!(output.contains("Cascade:"));
    assert!(output.contains("Alpha [broken_dependency]"));
    assert!(output.contains("Gamma [broken_dependency]"));
}

/// A rejected scenario fails the command with the library message
#[test]
fn run_reports_unknown_project() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(&dir, &sample_portfolio());

    let err = commands::run(&run_args(&path, OutputFormat::Json, "remove Zeta")).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("unknown project 'Zeta'"));
}

/// Batch output keeps input order and records rejections inline
#[test]
fn batch_mixes_results_and_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(&dir, &sample_portfolio());
    let scenarios = dir.path().join("scenarios.txt");
    std::fs::write(
        &scenarios,
        "# quarterly review\ndelay Beta by 2 weeks\npromote Alpha\n\nremove Zeta\n",
    )
    .unwrap();

    let output = commands::batch(&BatchArgs {
        snapshot: SnapshotArgs { snapshot: path },
        engine: engine_args(),
        scenarios,
    })
    .unwrap();
    let json: Value = serde_json::from_str(&output).unwrap();
    let entries = json.as_array().unwrap();

    let statuses: Vec<&str> = entries
        .iter()
        .map(|e| e["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["ok", "error", "error"]);
    assert_eq!(entries[0]["scenario"], "delay Beta by 2 weeks");
    assert_eq!(entries[1]["user_error"], true);
    assert!(entries[2]["message"]
        .as_str()
        .unwrap()
        .contains("unknown project"));
}

/// Graph output lists edges and surfaces cycles
#[test]
fn graph_reports_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(&dir, &cyclic_portfolio());

    let output = commands::graph(&SnapshotArgs { snapshot: path }).unwrap();
    let json: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(json["edges"].as_array().unwrap().len(), 3);
    assert_eq!(json["cycles"].as_array().unwrap().len(), 1);
}

/// Duplicate project names are rejected at load time
#[test]
fn duplicate_projects_fail_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dupes.json");
    std::fs::write(
        &path,
        r#"{ "projects": [ { "name": "Alpha" }, { "name": " alpha " } ] }"#,
    )
    .unwrap();

    let err = commands::load_snapshot(&path).unwrap_err();
    assert!(format!("{err:#}").contains("duplicate project name"));
}
