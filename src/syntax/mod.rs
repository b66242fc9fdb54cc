//! Tree-sitter integration for structural Java queries.
//!
//! The parse is lowered into an index-addressed arena ([`SyntaxTree`]) so
//! that blocks and edit commands can refer to nodes by [`NodeId`] without
//! borrowing the tree-sitter tree.

pub mod errors;
pub mod kind;
pub mod locator;
pub mod parser;
pub mod query;
pub mod tree;

pub use errors::SyntaxError;
pub use kind::JavaKind;
pub use locator::{LocatorResult, StructuralLocator, StructuralTarget};
pub use parser::{JavaParser, ParseIssue, ParsedSource};
pub use query::{QueryEngine, QueryMatch};
pub use tree::{NodeId, NodePath, NodeRef, SyntaxNode, SyntaxTree};
