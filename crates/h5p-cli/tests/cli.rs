//! End-to-end tests for the `h5p` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Test context holding an unpacked Geography Quiz package
struct TestContext {
    temp_dir: TempDir,
    package_dir: PathBuf,
}

impl TestContext {
    fn new(pass_percentage: i64) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let package_dir = temp_dir.path().join("quiz");

        write_json(
            &package_dir.join("h5p.json"),
            &json!({
                "title": "Geography Quiz",
                "language": "en",
                "mainLibrary": "H5P.QuestionSet",
                "embedTypes": ["iframe"],
                "preloadedDependencies": [
                    {"machineName": "H5P.QuestionSet", "majorVersion": 1, "minorVersion": 20},
                    {"machineName": "H5P.MultiChoice", "majorVersion": 1, "minorVersion": 16}
                ]
            }),
        );
        write_json(&package_dir.join("content/content.json"), &content(pass_percentage));
        fs::create_dir_all(package_dir.join("content/images")).unwrap();
        fs::write(package_dir.join("content/images/europe.png"), [0x89, b'P', b'N', b'G']).unwrap();

        write_json(
            &package_dir.join("H5P.QuestionSet-1.20/library.json"),
            &json!({
                "title": "Question Set",
                "machineName": "H5P.QuestionSet",
                "majorVersion": 1, "minorVersion": 20, "patchVersion": 2,
                "runnable": 1,
                "preloadedJs": [{"path": "js/questionset.js"}]
            }),
        );
        write_json(
            &package_dir.join("H5P.QuestionSet-1.20/semantics.json"),
            &json!([{
                "name": "questions", "type": "list", "entity": "question",
                "field": {"name": "question", "type": "library", "options": ["H5P.MultiChoice 1.16"]}
            }]),
        );
        fs::create_dir_all(package_dir.join("H5P.QuestionSet-1.20/js")).unwrap();
        fs::write(package_dir.join("H5P.QuestionSet-1.20/js/questionset.js"), "// js").unwrap();

        write_json(
            &package_dir.join("H5P.MultiChoice-1.16/library.json"),
            &json!({
                "title": "Multiple Choice",
                "machineName": "H5P.MultiChoice",
                "majorVersion": 1, "minorVersion": 16, "patchVersion": 3,
                "runnable": 1
            }),
        );

        Self {
            temp_dir,
            package_dir,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_h5p"))
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("NO_COLOR", "1")
            .env_remove("H5P_CONFIG")
            .env_remove("H5P_LIBRARY_PREFIXES")
            .env_remove("H5P_STRICT")
            .output()
            .expect("failed to execute h5p")
    }

    fn pack(&self) -> PathBuf {
        let out = self.path("quiz.h5p");
        let output = self.run(&["pack", arg(&self.package_dir), arg(&out)]);
        assert!(output.status.success(), "pack failed: {}", stderr(&output));
        out
    }
}

fn content(pass_percentage: i64) -> Value {
    json!({
        "title": "Geography Quiz",
        "passPercentage": pass_percentage,
        "questions": [{
            "library": "H5P.MultiChoice 1.16",
            "params": {
                "question": "Capital of France?",
                "answers": [
                    {"text": "Paris", "correct": true},
                    {"text": "London", "correct": false}
                ]
            }
        }]
    })
}

fn write_json(path: &Path, value: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help() {
    let ctx = TestContext::new(60);
    let output = ctx.run(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["inspect", "validate", "questions", "extract", "pack"] {
        assert!(text.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_pack_then_inspect() {
    let ctx = TestContext::new(60);
    let archive = ctx.pack();
    assert!(archive.exists());

    let output = ctx.run(&["inspect", arg(&archive)]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Geography Quiz"));
    assert!(text.contains("H5P.QuestionSet-1.20"));
    assert!(text.contains("H5P.MultiChoice-1.16"));
    assert!(text.contains("1.16.3"));
}

#[test]
fn test_validate_archive_and_directory() {
    let ctx = TestContext::new(60);
    let archive = ctx.pack();

    for target in [&archive, &ctx.package_dir] {
        let output = ctx.run(&["validate", arg(target)]);
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("is valid"));
    }
}

#[test]
fn test_validate_reports_pass_percentage() {
    let ctx = TestContext::new(150);

    let output = ctx.run(&["validate", "--json", arg(&ctx.package_dir)]);
    assert!(!output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let violations = report["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["field"], "content.passPercentage");
    assert_eq!(violations[0]["value"], 150);
}

#[test]
fn test_pack_refuses_invalid_package_without_force() {
    let ctx = TestContext::new(150);
    let out = ctx.path("bad.h5p");

    let output = ctx.run(&["pack", arg(&ctx.package_dir), arg(&out)]);
    assert!(!output.status.success());
    assert!(!out.exists());

    let output = ctx.run(&["pack", "--force", arg(&ctx.package_dir), arg(&out)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(out.exists());
}

#[test]
fn test_questions_summary() {
    let ctx = TestContext::new(60);
    let file = ctx.package_dir.join("content/content.json");

    let output = ctx.run(&["questions", arg(&file)]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Geography Quiz"));
    assert!(text.contains("60%"));
    assert!(text.contains("Capital of France?"));
    assert!(text.contains("2 (1 correct)"));
}

#[test]
fn test_questions_rejects_out_of_range_pass() {
    let ctx = TestContext::new(60);
    let file = ctx.path("content.json");
    write_json(&file, &content(150));

    let output = ctx.run(&["questions", arg(&file)]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("passPercentage"));
}

#[test]
fn test_extract() {
    let ctx = TestContext::new(60);
    let archive = ctx.pack();
    let dest = ctx.path("unpacked");

    let output = ctx.run(&["extract", arg(&archive), arg(&dest)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(dest.join("h5p.json").exists());
    assert!(dest.join("content/images/europe.png").exists());
    assert!(dest.join("H5P.QuestionSet-1.20/js/questionset.js").exists());
}

#[test]
fn test_strict_config_rejects_stray_files() {
    let ctx = TestContext::new(60);
    fs::write(ctx.package_dir.join("README.md"), "notes").unwrap();

    let output = ctx.run(&["validate", arg(&ctx.package_dir)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("README.md"));

    let config = ctx.path("h5p.toml");
    fs::write(&config, "strict = true\n").unwrap();
    let output = ctx.run(&["--config", arg(&config), "validate", arg(&ctx.package_dir)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("README.md"));
}

#[test]
fn test_missing_file() {
    let ctx = TestContext::new(60);
    let output = ctx.run(&["inspect", "does-not-exist.h5p"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("does-not-exist.h5p"));
}
