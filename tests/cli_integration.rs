//! Integration tests for the command-line interface

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const PROGRAM: &str = "\
public class Main {
    public static void main(String[] args) {
        int count = 3;
        for (int i = 0; i < count; i++) {
        }
        System.out.println(count);
    }
}
";

fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Main.java");
    fs::write(&file, PROGRAM).unwrap();
    (dir, file)
}

fn run(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_blockwright"))
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_lists_commands() {
    let (dir, _) = setup();
    let output = run(&["--help"], dir.path());
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["blocks", "apply", "line", "check"] {
        assert!(text.contains(command), "missing {command} in {text}");
    }
}

#[test]
fn blocks_prints_tree_and_omissions() {
    let (dir, file) = setup();
    let output = run(&["blocks", file.to_str().unwrap()], dir.path());
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("complete"));
    assert!(text.contains("class@"));
    assert!(text.contains("print@"));
    assert!(text.contains("Omitted:"));
    assert!(text.contains("line 4: for_statement"));
}

#[test]
fn blocks_json_is_machine_readable() {
    let (dir, file) = setup();
    let output = run(&["blocks", "--json", file.to_str().unwrap()], dir.path());
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"]["status"], "complete");
    assert_eq!(report["root"]["kind"], "class");
    assert_eq!(report["root"]["name"], "Main");
    assert_eq!(report["omitted"][0]["kind"], "for_statement");
}

fn body_id(dir: &Path, file: &Path) -> String {
    let output = run(&["blocks", "--json", file.to_str().unwrap()], dir);
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    report["root"]["children"][0]["children"][0]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[test]
fn apply_writes_the_file() {
    let (dir, file) = setup();
    let body = body_id(dir.path(), &file);
    let intent = format!(r#"{{"op": "insert-statement", "target": "{body}", "index": 1, "template": "print"}}"#);

    let output = run(
        &["apply", file.to_str().unwrap(), "--intent", &intent],
        dir.path(),
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("1 applied"));

    let written = fs::read_to_string(&file).unwrap();
    assert!(written.contains("        }\n        System.out.println(\"\");\n        System.out.println(count);"));
}

#[test]
fn dry_run_with_diff_leaves_the_file() {
    let (dir, file) = setup();
    let body = body_id(dir.path(), &file);
    let intents = dir.path().join("intents.json");
    fs::write(
        &intents,
        format!(r#"[{{"op": "insert-statement", "target": "{body}", "index": 0, "template": "break"}}]"#),
    )
    .unwrap();
    let intent_arg = format!("@{}", intents.display());

    let output = run(
        &[
            "apply",
            file.to_str().unwrap(),
            "--intent",
            &intent_arg,
            "--dry-run",
            "--diff",
        ],
        dir.path(),
    );
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("DRY RUN"));
    assert!(text.contains("+        break;"));
    assert_eq!(fs::read_to_string(&file).unwrap(), PROGRAM);
}

#[test]
fn failed_intent_exits_nonzero() {
    let (dir, file) = setup();
    let intent = r#"{"op": "delete-statement", "target": "var@9"}"#;

    let output = run(
        &["apply", file.to_str().unwrap(), "--intent", intent],
        dir.path(),
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no block var@9"));
    assert_eq!(fs::read_to_string(&file).unwrap(), PROGRAM);
}

#[test]
fn line_resolves_to_a_block() {
    let (dir, file) = setup();
    let output = run(&["line", file.to_str().unwrap(), "6"], dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("print"));

    let output = run(&["line", file.to_str().unwrap(), "1"], dir.path());
    assert!(!output.status.success());
}

#[test]
fn check_walks_java_files() {
    let (dir, _) = setup();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/Broken.java"), "class Broken { void f() { int x = ; } }\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "not java").unwrap();

    let output = run(&["check", "."], dir.path());
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Main.java"));
    assert!(text.contains("Broken.java"));
    assert!(!text.contains("notes.txt"));
    assert!(text.contains("1 complete"));
    assert!(text.contains("1 partial"));
}

#[test]
fn local_config_is_discovered() {
    let (dir, file) = setup();
    fs::write(
        dir.path().join(".blockwright.toml"),
        "[entry]\nclass = \"Missing\"\n",
    )
    .unwrap();

    let output = run(&["blocks", file.to_str().unwrap()], dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("entry class Missing not found"));
}
