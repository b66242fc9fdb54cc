//! Config loading and its effect on sessions

use blockwright::config::{
    candidate_paths, discover, load_from_path, load_from_str, ConfigError, ValidationIssue,
    LOCAL_CONFIG_FILE,
};
use blockwright::{BlockKind, BuildStatus, EditCommand, EditorConfig, Session, StatementTemplate};
use std::fs;
use tempfile::TempDir;

#[test]
fn empty_config_is_default() {
    assert_eq!(load_from_str("").unwrap(), EditorConfig::default());
}

#[test]
fn partial_tables_keep_other_defaults() {
    let config = load_from_str(
        r#"
[entry]
class = "Game"

[rewrite]
indent = "\t"
"#,
    )
    .unwrap();

    assert_eq!(config.entry.class.as_deref(), Some("Game"));
    assert_eq!(config.entry.method, "main");
    assert_eq!(config.rewrite.indent, "\t");
    assert!(config.rewrite.validate);
    assert_eq!(config.history.limit, 50);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = load_from_str("[entry]\nklass = \"Main\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml { path: None, .. }));
}

#[test]
fn validation_reports_every_issue() {
    let err = load_from_str(
        r#"
[sugar]
print_calls = ["println"]
sleep_call = "Thread.sleep"

[history]
limit = 0
"#,
    )
    .unwrap_err();

    let ConfigError::Validation { source, .. } = err else {
        panic!("expected a validation error");
    };
    assert_eq!(
        source.issues,
        vec![
            ValidationIssue::InvalidCallPath {
                field: "sugar.print_calls",
                value: "println".to_string(),
            },
            ValidationIssue::ZeroHistory,
        ]
    );
}

#[test]
fn path_is_attached_to_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[rewrite]\nindent = \"x\"\n").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("bad.toml"), "{err}");
}

#[test]
fn discover_prefers_local_file() {
    let dir = TempDir::new().unwrap();
    assert_eq!(candidate_paths(dir.path())[0], dir.path().join(LOCAL_CONFIG_FILE));

    fs::write(
        dir.path().join(LOCAL_CONFIG_FILE),
        "[entry]\nmethod = \"run\"\n",
    )
    .unwrap();
    assert_eq!(discover(dir.path()).unwrap().entry.method, "run");
}

#[test]
fn entry_settings_choose_the_root() {
    let source = "class Helper {\n}\n\nclass Game {\n    void run() {\n    }\n}\n";
    let config = load_from_str("[entry]\nclass = \"Game\"\nmethod = \"run\"\n").unwrap();
    let session = Session::open(source, &config).unwrap();

    let root = session.blocks().root.as_ref().unwrap();
    assert_eq!(
        root.kind,
        BlockKind::Class {
            name: "Game".to_string()
        }
    );
    assert!(matches!(
        root.children[0].kind,
        BlockKind::Method { entry: true, .. }
    ));

    let missing = load_from_str("[entry]\nclass = \"Nope\"\n").unwrap();
    let session = Session::open(source, &missing).unwrap();
    assert_eq!(
        session.status(),
        &BuildStatus::EntryClassMissing {
            class: "Nope".to_string()
        }
    );
    assert!(session.blocks().is_empty());
}

#[test]
fn custom_sugar_and_indent_reach_the_session() {
    let config = load_from_str(
        r#"
[sugar]
print_calls = ["Console.log"]

[rewrite]
indent = "  "
"#,
    )
    .unwrap();
    let source = "public class Main {\n  public static void main(String[] args) {\n    Console.log(\"hi\");\n  }\n}\n";
    let mut session = Session::open(source, &config).unwrap();

    let body = session
        .blocks()
        .blocks()
        .find(|block| matches!(block.kind, BlockKind::Body))
        .unwrap();
    assert!(matches!(body.children[0].kind, BlockKind::Print { .. }));
    let body = body.id.clone();

    session.apply_edit(EditCommand::InsertStatement {
        target: body,
        index: 1,
        template: StatementTemplate::Print,
    });
    assert!(session.text().contains("    Console.log(\"hi\");\n    Console.log(\"\");\n"));
}
