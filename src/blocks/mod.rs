//! Semantic blocks lifted from the syntax arena.
//!
//! A [`BlockTree`] is rebuilt from scratch after every accepted edit. Block
//! ids and node ids are only meaningful for the generation they were built
//! from; the [`NodeBlockMap`] translates between the two.

pub mod block;
pub mod builder;
pub mod diagnostics;
pub mod lines;
pub mod map;

pub use block::{Block, BlockId, BlockKind, LiteralValue, NumberKind, OperatorClass, Parameter};
pub use builder::{BlockBuilder, BlockTree, BuildStatus, OmittedNode};
pub use diagnostics::{annotate, Annotations, Diagnostic, Severity};
pub use lines::{BlockRef, BreakpointIndex};
pub use map::{BlockEntry, NodeBlockMap};
