//! End-to-end session workflow
//!
//! Exercises the loop an editor runs:
//! 1. Open text and show blocks
//! 2. Send intents addressed by block id
//! 3. Observe published updates
//! 4. Undo, redo, breakpoints and diagnostics against the rebuilt tree

use blockwright::blocks::{Block, Diagnostic, Severity};
use blockwright::session::UpdateOrigin;
use blockwright::{
    BlockKind, BuildStatus, CodeUpdated, EditCommand, EditorConfig, ExpressionTemplate,
    RewriteFailure, Session, StatementTemplate,
};
use std::cell::RefCell;
use std::rc::Rc;

const PROGRAM: &str = "\
public class Main {
    public static void main(String[] args) {
        int total = 0;
        // keep this comment
        while (total < 10) {
            total = total + 1;
        }
        System.out.println(total);
    }
}
";

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

fn record(session: &mut Session) -> Rc<RefCell<Vec<CodeUpdated>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    session.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    seen
}

#[test]
fn blocks_mirror_the_program() {
    let session = open(PROGRAM);
    assert_eq!(session.status(), &BuildStatus::Complete);

    let kinds: Vec<&str> = main_body(&session)
        .children
        .iter()
        .map(|block| block.kind.slug())
        .collect();
    assert_eq!(kinds, ["var", "comment", "while", "print"]);
    assert!(session.blocks().omitted.is_empty());
}

#[test]
fn edits_publish_and_undo() {
    let mut session = open(PROGRAM);
    let seen = record(&mut session);

    let body = main_body(&session).id.clone();
    let update = session.apply_edit(EditCommand::InsertStatement {
        target: body,
        index: 0,
        template: StatementTemplate::ReadInt,
    });
    assert!(update.changed());
    assert_eq!(update.origin, UpdateOrigin::Edit("insert-statement"));

    // Ids are only valid for the tree they came from; look the body up again.
    let body = main_body(&session).id.clone();
    session.apply_edit(EditCommand::InsertStatement {
        target: body,
        index: 0,
        template: StatementTemplate::ReadLine,
    });

    let text = session.text().to_string();
    assert_eq!(text.matches("import java.util.Scanner;").count(), 1);
    assert!(text.contains("        String input = scanner.nextLine();\n        int number = scanner.nextInt();\n        int total = 0;"));
    assert!(text.contains("        // keep this comment\n"));

    let reads: Vec<&Block> = main_body(&session)
        .children
        .iter()
        .filter(|block| matches!(block.kind, BlockKind::ReadInput { .. }))
        .collect();
    assert_eq!(reads.len(), 2);

    session.undo().unwrap();
    session.undo().unwrap();
    assert_eq!(session.text(), PROGRAM);
    assert!(session.undo().is_none());

    let redone = session.redo().unwrap();
    assert_eq!(redone.origin, UpdateOrigin::Redo);
    assert!(session.text().contains("int number = scanner.nextInt();"));
    assert!(!session.text().contains("nextLine"));

    let origins: Vec<UpdateOrigin> = seen.borrow().iter().map(|event| event.origin).collect();
    assert_eq!(
        origins,
        [
            UpdateOrigin::Edit("insert-statement"),
            UpdateOrigin::Edit("insert-statement"),
            UpdateOrigin::Undo,
            UpdateOrigin::Undo,
            UpdateOrigin::Redo,
        ]
    );
}

#[test]
fn failed_edits_keep_the_text() {
    let mut session = open(PROGRAM);
    let seen = record(&mut session);
    let print = main_body(&session).children[3].id.clone();

    let update = session.apply_edit(EditCommand::ReplaceExpression {
        target: print.clone(),
        template: ExpressionTemplate::Raw {
            code: "1 +".to_string(),
        },
    });
    assert!(!update.changed());
    assert!(update.failure.is_some());
    assert_eq!(session.text(), PROGRAM);

    let body = main_body(&session).id.clone();
    let update = session.apply_edit(EditCommand::InsertCode {
        target: body,
        index: 9,
        code: "total++;".to_string(),
    });
    assert_eq!(
        update.failure,
        Some(RewriteFailure::IndexOutOfRange { index: 9, len: 4 })
    );

    assert_eq!(seen.borrow().len(), 2);
    assert!(!session.history().can_undo());
}

#[test]
fn unsubscribed_listeners_stop_hearing() {
    let mut session = open(PROGRAM);
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    let id = session.subscribe(move |_| *sink.borrow_mut() += 1);

    session.replace_text(PROGRAM.replace("10", "20"));
    assert!(session.unsubscribe(id));
    assert!(!session.unsubscribe(id));
    session.replace_text(PROGRAM);

    assert_eq!(*count.borrow(), 1);
}

#[test]
fn breakpoints_outlive_edits() {
    let mut session = open(PROGRAM);
    let index = session.capture_breakpoints();

    let on_assignment = index.resolve_line(6).unwrap();
    assert_eq!(on_assignment.kind, "assign");
    let loop_id = main_body(&session).children[2].id.clone();
    assert_eq!(index.resolve_line(5).unwrap().id, loop_id);

    let body = main_body(&session).id.clone();
    session.apply_edit(EditCommand::InsertStatement {
        target: body,
        index: 0,
        template: StatementTemplate::Break,
    });

    // The captured index still describes the text it was taken from.
    assert_eq!(index.resolve_line(6).unwrap().kind, "assign");
    assert_ne!(session.capture_breakpoints().generation(), index.generation());
    assert_eq!(session.capture_breakpoints().resolve_line(7).unwrap().kind, "assign");
}

#[test]
fn diagnostics_attach_to_blocks() {
    let source = format!("import java.util.List;\n\n{PROGRAM}");
    let session = open(&source);
    let print = &main_body(&session).children[3];
    let offset = source.find("total);").unwrap();

    let annotations = session.annotate([
        Diagnostic {
            range: offset..offset + 5,
            severity: Severity::Warning,
            message: "unused".to_string(),
        },
        Diagnostic {
            range: 0..6,
            severity: Severity::Error,
            message: "outside".to_string(),
        },
    ]);

    let attached: Vec<&str> = annotations
        .by_block
        .values()
        .flatten()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(attached, ["unused"]);
    assert!(annotations
        .by_block
        .keys()
        .any(|id| print.iter().any(|block| &block.id == id)));
    assert_eq!(annotations.unattached.len(), 1);
}

#[test]
fn broken_text_still_opens() {
    let source = PROGRAM.replace("int total = 0;", "int total = ;");
    let session = open(&source);
    assert!(matches!(session.status(), BuildStatus::Partial { .. }));
    assert!(session.blocks().root.is_some());
    assert_eq!(session.text(), source);
}

#[test]
fn deeply_nested_source_opens_and_edits() {
    let depth = 3000;
    let value = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let source = PROGRAM.replace("int total = 0;", &format!("int total = {value};"));
    let mut session = open(&source);

    assert_eq!(session.status(), &BuildStatus::Complete);
    assert_eq!(session.blocks().omitted.len(), 1);

    let body = main_body(&session).id.clone();
    let update = session.apply_edit(EditCommand::InsertStatement {
        target: body,
        index: 0,
        template: StatementTemplate::Break,
    });
    assert!(update.changed());
    assert!(session.text().contains("        break;\n        int total = ("));
}

#[test]
fn invalid_sugar_config_is_an_error() {
    let mut config = EditorConfig::default();
    config.sugar.sleep_call = "a(); Thread.sleep".to_string();
    assert!(Session::open(PROGRAM, &config).is_err());
}
