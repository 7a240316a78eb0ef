//! End-to-end tests: discovery → evaluation → run → persistence → report.

use std::fs;
use std::path::Path;

use serde_json::json;
use wpt_harness::cli::ExitCode;
use wpt_harness::cli::commands;
use wpt_harness::host::{DeclarativeHost, ScriptHost};
use wpt_harness::runner::SilentReporter;
use wpt_harness::{
    FsResultStore, HarnessConfig, ResultStore, TestFunction, TestOutcome, TestRegistry, Thrown, Value, run,
};
use wpt_core::AssertionFailure;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(future)
}

fn write_spec(root: &Path, spec: &str, file: &str, tests: serde_json::Value) {
    let dir = root.join(spec);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), json!({ "tests": tests }).to_string()).unwrap();
}

fn config(root: &Path) -> HarnessConfig {
    HarnessConfig::new()
        .with_spec_dir(root.join("spec"))
        .with_result_dir(root.join("result"))
        .with_catalog_path(root.join("testers.json"))
        .with_report_path(root.join("index.html"))
        .with_ignore_path(root.join("ignore.json"))
}

#[test]
fn test_run_classifies_pass_failure_and_error() {
    let mut registry = TestRegistry::new();
    {
        let mut registrar = registry.setup("");
        registrar.test(TestFunction::sync("A", "A", || Ok(())), None).unwrap();
        registrar
            .test(TestFunction::sync("B", "B", || Err(AssertionFailure::new("x").into())), None)
            .unwrap();
        registrar
            .test(
                TestFunction::sync("C", "C", || Err(Thrown::Value(Value::error("Error", "y")))),
                None,
            )
            .unwrap();
    }
    let (cases, _) = registry.into_parts();
    let result = block_on(run(cases, &mut SilentReporter));

    assert_eq!(result.passed(), 1);
    assert_eq!(result.failed(), 2);
    let outcomes: Vec<_> = result.outcomes().map(|(n, o)| (n.to_string(), o.clone())).collect();
    assert_eq!(
        outcomes,
        vec![
            ("A".to_string(), TestOutcome::Passed),
            ("B".to_string(), TestOutcome::Failed("x".into())),
            ("C".to_string(), TestOutcome::Errored("y".into())),
        ]
    );
}

#[test]
fn test_async_bodies_complete_before_next_test() {
    let mut registry = TestRegistry::new();
    let source = json!({"tests": [
        {"name": "slow", "kind": "promise_test", "steps": [
            {"assert": "assert_true", "args": [true]},
            {"assert": "assert_true", "args": [true]},
            {"assert": "assert_true", "args": [false]}
        ]},
        {"name": "next", "steps": []}
    ]})
    .to_string();
    DeclarativeHost::new().evaluate(&source, &mut registry.setup("")).unwrap();
    let (cases, _) = registry.into_parts();
    let result = block_on(run(cases, &mut SilentReporter));
    let order: Vec<_> = result.outcomes().map(|(n, _)| n.to_string()).collect();
    assert_eq!(order, vec!["slow", "next"]);
    assert_eq!(
        result.get(&"slow".into()),
        Some(&TestOutcome::Failed("expected true got false".into()))
    );
}

#[test]
fn test_suite_run_persists_and_builds_report() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_spec(
        &root.join("spec"),
        "url",
        "basic.any.json",
        json!([
            {"name": "parses", "steps": [{"assert": "assert_equals", "args": ["a", "a"]}]},
            {"name": "rejects", "steps": [{"throw": {"name": "TypeError", "message": "bad <url>"}}]}
        ]),
    );
    write_spec(
        &root.join("spec"),
        "streams",
        "x.any.json",
        json!([{"name": "ignored", "steps": []}]),
    );
    fs::write(root.join("ignore.json"), r#"["streams"]"#).unwrap();

    let exit = commands::run_suite(&config(root), Some("1.2.0")).unwrap();
    assert_eq!(exit, ExitCode::FAILURE);

    let store = FsResultStore::new(root.join("result"), root.join("testers.json"));
    let snapshots = store.load_snapshots().unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].version, "1.2.0");
    assert_eq!(snapshots[0].result.passed(), 1);
    assert_eq!(snapshots[0].result.failed(), 1);

    let catalog = store.load_catalog().unwrap();
    let names: Vec<_> = catalog.iter().map(|(n, _)| n.to_string()).collect();
    assert_eq!(names, vec!["url›basic.any.json›parses", "url›basic.any.json›rejects"]);

    assert_eq!(commands::build(&config(root)).unwrap(), ExitCode::SUCCESS);
    let html = fs::read_to_string(root.join("index.html")).unwrap();
    assert!(html.contains(r#"<th class="version">1.2.0<sub>50%</sub></th>"#));
    assert!(html.contains(r#"<div class="Error" title="bad &lt;url&gt;">Error</div>"#));
    assert!(html.contains(r#"id="url-basic-any-json-parses""#));
    assert!(!html.contains("ignored"));
}

#[test]
fn test_no_save_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_spec(&root.join("spec"), "url", "a.any.json", json!([{"name": "t", "steps": []}]));

    let exit = commands::run_suite(&config(root).with_persist(false), None).unwrap();
    assert_eq!(exit, ExitCode::SUCCESS);
    assert!(!root.join("result").exists());
    assert!(!root.join("testers.json").exists());
}

#[test]
fn test_broken_file_fails_run_but_others_still_run() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_spec(&root.join("spec"), "a", "ok.any.json", json!([{"name": "t", "steps": []}]));
    fs::create_dir_all(root.join("spec/b")).unwrap();
    fs::write(root.join("spec/b/broken.any.json"), "{ nope").unwrap();

    let exit = commands::run_suite(&config(root), Some("0.1.0")).unwrap();
    assert_eq!(exit, ExitCode::FAILURE);
    let snapshots = FsResultStore::new(root.join("result"), root.join("testers.json"))
        .load_snapshots()
        .unwrap();
    assert!(snapshots[0].result.is_success());
    assert_eq!(snapshots[0].result.total(), 1);
}

#[test]
fn test_single_file_never_persists() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("one.any.json");
    fs::write(
        &file,
        json!({"tests": [{"name": "t", "steps": [{"assert": "assert_unreached"}]}]}).to_string(),
    )
    .unwrap();
    let exit = commands::test_file(&file).unwrap();
    assert_eq!(exit, ExitCode::FAILURE);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_build_fails_fast_on_malformed_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("result")).unwrap();
    fs::write(root.join("result/1.0.0.json"), "{}").unwrap();
    fs::write(root.join("testers.json"), "{}").unwrap();
    assert!(commands::build(&config(root)).is_err());
    assert!(!root.join("index.html").exists());
}

#[test]
fn test_file_with_repeated_name_contributes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_spec(&root.join("spec"), "a", "ok.any.json", json!([{"name": "t", "steps": []}]));
    write_spec(
        &root.join("spec"),
        "b",
        "dup.any.json",
        json!([{"name": "x", "steps": []}, {"name": "y", "steps": []}, {"name": "x", "steps": []}]),
    );

    let exit = commands::run_suite(&config(root), Some("0.2.0")).unwrap();
    assert_eq!(exit, ExitCode::FAILURE);

    let store = FsResultStore::new(root.join("result"), root.join("testers.json"));
    let snapshots = store.load_snapshots().unwrap();
    let ran: Vec<_> = snapshots[0].result.outcomes().map(|(n, _)| n.to_string()).collect();
    assert_eq!(ran, vec!["a›ok.any.json›t"]);
    let catalog: Vec<_> = store.load_catalog().unwrap().iter().map(|(n, _)| n.to_string()).collect();
    assert_eq!(catalog, vec!["a›ok.any.json›t"]);
}
