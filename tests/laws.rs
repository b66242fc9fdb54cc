//! Behavioral laws of the edit core
//!
//! Each test drives the public session API the way an editor would: open
//! text, find a block, send an intent, inspect the text and rebuilt tree.

use blockwright::blocks::{Block, LiteralValue, NumberKind};
use blockwright::rewrite::{default_value, EnumCatalog};
use blockwright::{
    BlockKind, EditCommand, EditorConfig, ExpressionTemplate, LiteralInput, RewriteEngine,
    Session, SyntaxTree, TypeShape,
};
use proptest::prelude::*;

fn wrap(body: &str) -> String {
    format!("public class Main {{\n    public static void main(String[] args) {{\n{body}\n    }}\n}}\n")
}

fn open(source: &str) -> Session {
    Session::open(source, &EditorConfig::default()).unwrap()
}

fn main_body(session: &Session) -> &Block {
    session
        .blocks()
        .blocks()
        .find(|block| matches!(block.kind, BlockKind::Method { entry: true, .. }))
        .and_then(|method| method.children.first())
        .unwrap()
}

#[test]
fn zero_commands_are_byte_identical() {
    let sources = [
        wrap("        int x = 1;   // spaced  \n\n\n        x++;"),
        wrap("        /* block */ String s = \"a\\tb\";\n\tif (s.isEmpty()) {}"),
        "package demo;\n\nimport java.util.*;\n\npublic class Main {\n}\n".to_string(),
        wrap("        int broken = ;"),
    ];
    let engine = RewriteEngine::default();

    for source in sources {
        let tree = SyntaxTree::parse(source.as_str()).unwrap();
        let session = open(&source);
        assert_eq!(engine.apply_batch(&tree, &[]).text(), source);
        assert_eq!(session.text(), source);
    }
}

fn statements(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("        int v{i} = {i};")).collect()
}

proptest! {
    #[test]
    fn deleting_one_statement_leaves_the_others(n in 1usize..8, pick in 0usize..8) {
        let index = pick % n;
        let lines = statements(n);
        let source = wrap(&lines.join("\n"));
        let mut session = open(&source);

        let target = main_body(&session).children[index].id.clone();
        let update = session.apply_edit(EditCommand::DeleteStatement { target });
        prop_assert!(update.failure.is_none());

        let mut expected_lines = lines.clone();
        expected_lines.remove(index);
        let expected = if expected_lines.is_empty() {
            // The body keeps its now-empty line between the braces.
            wrap("").replacen("{\n\n    }", "{\n    }", 1)
        } else {
            wrap(&expected_lines.join("\n"))
        };
        prop_assert_eq!(session.text(), expected.as_str());
    }
}

#[test]
fn defaults_are_deterministic() {
    let enums = EnumCatalog::default();
    for type_name in ["int", "double", "String", "boolean[]", "ArrayList<Integer>", "Widget"] {
        let shape = TypeShape::parse(type_name);
        assert_eq!(default_value(&shape, &enums), default_value(&shape, &enums));
    }

    let source = wrap("        double d;\n        double e;");
    let mut outputs = Vec::new();
    for index in 0..2 {
        let mut session = open(&source);
        let target = main_body(&session).children[index].id.clone();
        session.apply_edit(EditCommand::SetInitializer {
            target,
            template: ExpressionTemplate::Default,
        });
        outputs.push(session.text().to_string());
    }
    assert!(outputs[0].contains("double d = 0.0;"));
    assert!(outputs[1].contains("double e = 0.0;"));
}

#[test]
fn compatible_type_change_keeps_the_value() {
    let mut session = open(&wrap("        int x = 10;"));
    let target = main_body(&session).children[0].id.clone();

    let update = session.apply_edit(EditCommand::ChangeDeclaredType {
        target,
        type_name: "ArrayList<Integer>".to_string(),
    });

    assert!(update.failure.is_none(), "{:?}", update.failure);
    assert!(session
        .text()
        .contains("ArrayList<Integer> x = new ArrayList<>(List.of(10));"));
    assert!(session.text().starts_with("import java.util.ArrayList;\nimport java.util.List;\n"));
}

#[test]
fn incompatible_type_change_uses_the_default() {
    let mut session = open(&wrap("        int x = 10;"));
    let target = main_body(&session).children[0].id.clone();

    session.apply_edit(EditCommand::ChangeDeclaredType {
        target,
        type_name: "String".to_string(),
    });

    assert!(session.text().contains("        String x = \"\";\n"));
    assert!(!session.text().contains("10"));
}

#[test]
fn replacing_a_condition_round_trips_through_the_tree() {
    let mut session = open(&wrap("        if (true) { }"));
    let condition = main_body(&session).children[0].children[0].id.clone();

    let update = session.apply_edit(EditCommand::ReplaceLiteral {
        target: condition,
        value: LiteralInput::Boolean(false),
    });

    assert!(update.changed());
    assert_eq!(session.text(), wrap("        if (false) { }"));
    let if_block = &main_body(&session).children[0];
    assert_eq!(if_block.kind, BlockKind::If);
    assert_eq!(
        if_block.children[0].kind,
        BlockKind::Literal {
            value: LiteralValue::Boolean(false)
        }
    );
}

#[test]
fn sleeping_try_is_one_wait_block() {
    let session = open(&wrap(
        "        try {\n            Thread.sleep(1000);\n        } catch (InterruptedException e) {\n        }",
    ));
    let body = main_body(&session);

    assert_eq!(body.children.len(), 1);
    let wait = &body.children[0];
    assert_eq!(wait.kind, BlockKind::Wait);
    assert_eq!(
        wait.children[0].kind,
        BlockKind::Literal {
            value: LiteralValue::Number {
                text: "1000".to_string(),
                kind: NumberKind::Int,
            }
        }
    );
    assert!(session.blocks().omitted.is_empty());
}

#[test]
fn unsupported_statements_are_omitted_quietly() {
    let session = open(&wrap(
        "        int a = 0;\n        for (int i = 0; i < 3; i++) {\n            a += i;\n        }\n        a = 1;",
    ));
    let body = main_body(&session);

    assert_eq!(body.children.len(), 2);
    assert_eq!(session.blocks().omitted.len(), 1);
    assert_eq!(session.blocks().omitted[0].kind, "for_statement");
    assert!(session.status().has_root());
}
