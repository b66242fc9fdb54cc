//! The editing session.
//!
//! A [`Session`] owns the current text together with its parse and block
//! tree. Every accepted change replaces all three: the text is re-parsed and
//! the block tree rebuilt from scratch, at a cost linear in the document.
//! Nothing from the previous generation is patched or reused, so a caller
//! must not hold block ids or node references across an edit.
//!
//! Sessions are single-writer. Methods take `&mut self`, which serializes
//! edits; a UI that edits from several places queues its intents.

pub mod events;
pub mod history;

pub use events::{CodeUpdated, Listener, ListenerId, UpdateOrigin};
pub use history::History;

use crate::blocks::{
    annotate, Annotations, BlockBuilder, BlockId, BlockKind, BlockTree, BreakpointIndex,
    BuildStatus, Diagnostic,
};
use crate::config::EditorConfig;
use crate::rewrite::changes::statement_items;
use crate::rewrite::{EditCommand, RewriteEngine, RewriteFailure, RewriteOutcome};
use crate::syntax::{JavaKind, NodeId, NodeRef, SyntaxError, SyntaxTree};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to parse document: {0}")]
    Parse(#[from] SyntaxError),

    #[error("invalid editor configuration:\n{0}")]
    Config(#[from] crate::config::ValidationError),
}

pub struct Session {
    builder: BlockBuilder,
    engine: RewriteEngine,
    tree: SyntaxTree,
    blocks: BlockTree,
    history: History,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("generation", &self.tree.generation())
            .field("status", &self.blocks.status)
            .field("blocks", &self.blocks.map.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Session {
    pub fn open(text: impl Into<String>, config: &EditorConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let builder = BlockBuilder::new(config);
        let tree = SyntaxTree::parse(text)?;
        let blocks = builder.build(&tree);
        tracing::info!(
            bytes = tree.source().len(),
            blocks = blocks.map.len(),
            status = ?blocks.status,
            "session opened"
        );

        Ok(Self {
            builder,
            engine: RewriteEngine::new(config),
            tree,
            blocks,
            history: History::new(config.history.limit),
            listeners: Vec::new(),
            next_listener: 0,
        })
    }

    pub fn text(&self) -> &str {
        self.tree.source()
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn blocks(&self) -> &BlockTree {
        &self.blocks
    }

    pub fn status(&self) -> &BuildStatus {
        &self.blocks.status
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&CodeUpdated) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Apply one structural edit addressed by block ids.
    ///
    /// Statement indices in the intent count blocks, not syntax items; they
    /// are translated before the rewrite so omitted statements do not shift
    /// the insertion point.
    pub fn apply_edit(&mut self, intent: EditCommand<BlockId>) -> CodeUpdated {
        let origin = UpdateOrigin::Edit(intent.name());
        let outcome = self
            .translate(intent)
            .map(|command| self.engine.apply(&self.tree, &command));

        match outcome {
            Ok(RewriteOutcome::Rewritten { text }) => self.commit(text, origin, true),
            Ok(RewriteOutcome::Unchanged { reason, .. }) | Err(reason) => {
                self.reject(origin, reason)
            }
        }
    }

    /// Replace the whole text, e.g. after typing in a text view.
    pub fn replace_text(&mut self, text: impl Into<String>) -> CodeUpdated {
        self.commit(text.into(), UpdateOrigin::External, true)
    }

    pub fn undo(&mut self) -> Option<CodeUpdated> {
        let previous = self.history.undo(self.tree.source())?;
        Some(self.commit(previous, UpdateOrigin::Undo, false))
    }

    pub fn redo(&mut self) -> Option<CodeUpdated> {
        let next = self.history.redo(self.tree.source())?;
        Some(self.commit(next, UpdateOrigin::Redo, false))
    }

    /// Line ownership for the text as it is now. Capture this when the
    /// program is compiled, and keep it for the run.
    pub fn capture_breakpoints(&self) -> BreakpointIndex {
        BreakpointIndex::capture(&self.tree, &self.blocks)
    }

    pub fn annotate(&self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Annotations {
        annotate(&self.tree, &self.blocks, diagnostics)
    }

    fn commit(&mut self, text: String, origin: UpdateOrigin, record: bool) -> CodeUpdated {
        if text == self.tree.source() {
            return self.publish(CodeUpdated {
                previous_text: text.clone(),
                new_text: text,
                origin,
                failure: None,
            });
        }

        let tree = match SyntaxTree::parse(text) {
            Ok(tree) => tree,
            Err(error) => return self.reject(origin, RewriteFailure::Parser(error.to_string())),
        };
        let blocks = self.builder.build(&tree);
        let previous = std::mem::replace(&mut self.tree, tree);
        self.blocks = blocks;
        if record {
            self.history.record(previous.source());
        }

        tracing::info!(
            ?origin,
            generation = self.tree.generation(),
            blocks = self.blocks.map.len(),
            status = ?self.blocks.status,
            "document updated"
        );

        self.publish(CodeUpdated {
            previous_text: previous.source().to_string(),
            new_text: self.tree.source().to_string(),
            origin,
            failure: None,
        })
    }

    fn reject(&mut self, origin: UpdateOrigin, reason: RewriteFailure) -> CodeUpdated {
        tracing::warn!(?origin, %reason, "edit had no effect");
        let text = self.tree.source().to_string();
        self.publish(CodeUpdated {
            previous_text: text.clone(),
            new_text: text,
            origin,
            failure: Some(reason),
        })
    }

    fn publish(&mut self, event: CodeUpdated) -> CodeUpdated {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        event
    }

    // Intent translation

    fn translate(&self, intent: EditCommand<BlockId>) -> Result<EditCommand<NodeRef>, RewriteFailure> {
        let intent = match intent {
            EditCommand::InsertStatement {
                target,
                index,
                template,
            } => EditCommand::InsertStatement {
                index: self.syntax_index(&target, index)?,
                target,
                template,
            },
            EditCommand::InsertCode {
                target,
                index,
                code,
            } => EditCommand::InsertCode {
                index: self.syntax_index(&target, index)?,
                target,
                code,
            },
            EditCommand::MoveStatement {
                target,
                destination,
                index,
            } => EditCommand::MoveStatement {
                index: self.syntax_index(&destination, index)?,
                target,
                destination,
            },
            other => other,
        };

        intent.try_map_targets(|id| {
            self.blocks
                .map
                .node_for_block(&id)
                .map(|node| self.tree.node_ref(node))
                .ok_or_else(|| RewriteFailure::UnknownBlock {
                    id: id.to_string(),
                })
        })
    }

    /// Translate an index among a block's statement children into an index
    /// among the syntax items of the list they live in.
    fn syntax_index(&self, id: &BlockId, index: usize) -> Result<usize, RewriteFailure> {
        let block = self.blocks.find(id).ok_or_else(|| RewriteFailure::UnknownBlock {
            id: id.to_string(),
        })?;
        let list = match block.kind {
            BlockKind::Method { .. }
            | BlockKind::While
            | BlockKind::DoWhile
            | BlockKind::ForEach { .. }
            | BlockKind::SwitchCase { .. } => block
                .children
                .iter()
                .find(|child| matches!(child.kind, BlockKind::Body))
                .unwrap_or(block),
            _ => block,
        };
        let items: Vec<&crate::blocks::Block> = list
            .children
            .iter()
            .filter(|child| child.kind.is_statement() || is_member(&child.kind))
            .collect();

        match items.get(index) {
            Some(child) => {
                let node = child.node;
                let position = self
                    .tree
                    .parent(node)
                    .map(|container| statement_items(&self.tree, container))
                    .and_then(|siblings| siblings.iter().position(|item| *item == node));
                position.ok_or_else(|| {
                    RewriteFailure::Precondition(format!("{id} has no statement list"))
                })
            }
            None if index == items.len() => Ok(self
                .statement_list(list.node)
                .map(|container| statement_items(&self.tree, container).len())
                .unwrap_or(index)),
            None => Err(RewriteFailure::IndexOutOfRange {
                index,
                len: items.len(),
            }),
        }
    }

    fn statement_list(&self, node: NodeId) -> Option<NodeId> {
        match self.tree.kind(node) {
            JavaKind::Block
            | JavaKind::SwitchBlockStatementGroup
            | JavaKind::SwitchBlock
            | JavaKind::ClassBody
            | JavaKind::Program => Some(node),
            _ => self.tree.child_by_field(node, "body"),
        }
    }
}

/// Non-statement blocks that still occupy a slot in a statement list.
fn is_member(kind: &BlockKind) -> bool {
    matches!(
        kind,
        BlockKind::Method { .. } | BlockKind::Comment { .. } | BlockKind::Body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::StatementTemplate;
    use std::cell::RefCell;
    use std::rc::Rc;

    const SOURCE: &str = "public class Main {\n    public static void main(String[] args) {\n        int x = 1;\n        for (int i = 0; i < 3; i++) {\n        }\n        x++;\n    }\n}\n";

    fn body_id(session: &Session) -> BlockId {
        session
            .blocks()
            .blocks()
            .find(|block| matches!(block.kind, BlockKind::Body))
            .map(|block| block.id.clone())
            .unwrap()
    }

    #[test]
    fn edits_rebuild_and_publish() {
        let mut session = Session::open(SOURCE, &EditorConfig::default()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let generation = session.tree().generation();
        let event = session.apply_edit(EditCommand::InsertStatement {
            target: body_id(&session),
            index: 1,
            template: StatementTemplate::Break,
        });

        assert!(event.changed());
        assert!(event.failure.is_none());
        assert_ne!(session.tree().generation(), generation);
        assert_eq!(seen.borrow().len(), 1);
        // Block index 1 is `x++`; the omitted for loop stays before it.
        assert!(session
            .text()
            .contains("        for (int i = 0; i < 3; i++) {\n        }\n        break;\n        x++;"));
    }

    #[test]
    fn invalid_config_is_rejected_on_open() {
        let mut config = EditorConfig::default();
        config.sugar.sleep_call = "a(); Thread.sleep".to_string();
        match Session::open(SOURCE, &config) {
            Err(SessionError::Config(error)) => {
                assert!(error.to_string().contains("sugar.sleep_call"));
            }
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_block_is_a_no_op() {
        let mut session = Session::open(SOURCE, &EditorConfig::default()).unwrap();
        let event = session.apply_edit(EditCommand::DeleteStatement {
            target: BlockId::from("var@9.9.9"),
        });
        assert!(!event.changed());
        assert!(matches!(event.failure, Some(RewriteFailure::UnknownBlock { .. })));
        assert_eq!(session.text(), SOURCE);
        assert!(!session.history().can_undo());
    }

    #[test]
    fn undo_and_redo_restore_text() {
        let mut session = Session::open(SOURCE, &EditorConfig::default()).unwrap();
        session.replace_text("class A {}\n");
        assert_eq!(session.text(), "class A {}\n");

        let undone = session.undo().unwrap();
        assert_eq!(undone.origin, UpdateOrigin::Undo);
        assert_eq!(session.text(), SOURCE);

        session.redo().unwrap();
        assert_eq!(session.text(), "class A {}\n");
        assert!(session.redo().is_none());
    }
}
