//! Blockwright: block-structured editing of Java source text
//!
//! A program is shown as a tree of semantic blocks, while the source text
//! stays the single source of truth. Every structural edit is a byte-span
//! rewrite of that text; bytes outside the edited spans, including comments
//! and formatting, are never touched.
//!
//! # Architecture
//!
//! - [`syntax`] parses Java with tree-sitter into an owned arena of nodes
//!   addressed by [`syntax::NodeId`] and structural paths.
//! - [`blocks`] lifts the arena into a [`blocks::BlockTree`] and keeps the
//!   two-way [`blocks::NodeBlockMap`]. Constructs with no block are recorded
//!   as omitted, never dropped from the text.
//! - [`rewrite`] plans each [`rewrite::EditCommand`] into span edits and
//!   compiles them with [`Edit::apply_all`].
//! - [`session`] ties these together. Each accepted edit re-parses the text
//!   and rebuilds the block tree from scratch; ids from an older generation
//!   are rejected rather than patched.
//!
//! # Example
//!
//! ```no_run
//! use blockwright::{EditCommand, EditorConfig, Session, StatementTemplate};
//!
//! let source = "public class Main {\n    public static void main(String[] args) {\n    }\n}\n";
//! let mut session = Session::open(source, &EditorConfig::default()).unwrap();
//! let body = session
//!     .blocks()
//!     .blocks()
//!     .find(|block| block.kind.slug() == "body")
//!     .map(|block| block.id.clone())
//!     .unwrap();
//!
//! let update = session.apply_edit(EditCommand::InsertStatement {
//!     target: body,
//!     index: 0,
//!     template: StatementTemplate::Print,
//! });
//! assert!(update.changed());
//! ```

pub mod blocks;
pub mod cache;
pub mod config;
pub mod document;
pub mod edit;
pub mod pool;
pub mod rewrite;
pub mod session;
pub mod sugar;
pub mod syntax;
pub mod validate;

// Re-exports
pub use blocks::{
    Block, BlockBuilder, BlockId, BlockKind, BlockTree, BreakpointIndex, BuildStatus, Diagnostic,
    NodeBlockMap, Severity,
};
pub use config::{discover, load_from_path, load_from_str, ConfigError, EditorConfig};
pub use document::{Document, DocumentError};
pub use edit::{Edit, EditError, EditVerification};
pub use rewrite::{
    EditCommand, ExpressionTemplate, LiteralInput, MoveDirection, RewriteEngine, RewriteFailure,
    RewriteOutcome, StatementTemplate, TypeShape,
};
pub use session::{CodeUpdated, Session, SessionError, UpdateOrigin};
pub use syntax::{JavaKind, NodeId, NodePath, NodeRef, StructuralLocator, SyntaxError, SyntaxTree};
pub use validate::{ParseValidator, SnippetKind, ValidationError};
