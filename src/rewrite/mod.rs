//! Structural rewrites over Java source.
//!
//! Commands are planned into span edits against the current
//! [`crate::syntax::SyntaxTree`] and compiled in one pass, so every byte
//! outside the edited spans is copied through unchanged. Synthesized values
//! follow the declared type at the edit site; see [`types`] for defaults and
//! leaf-preserving type changes.

pub mod changes;
pub mod command;
mod control;
mod declarations;
pub mod engine;
mod expressions;
pub mod infer;
pub mod outcome;
mod planner;
mod statements;
pub mod templates;
pub mod types;

pub use changes::ChangeSet;
pub use command::{EditCommand, ExpressionTemplate, LiteralInput, MoveDirection, StatementTemplate};
pub use engine::RewriteEngine;
pub use outcome::{RewriteFailure, RewriteOutcome};
pub use planner::EngineSettings;
pub use types::{default_value, wrap_leaves, EnumCatalog, TypeShape};
