//! ast-grep integration for recognizing multi-node "sugar" shapes.
//!
//! Patterns use ast-grep's metavariable syntax ($NAME, $$$ARGS) and are
//! compiled once per thread through [`crate::cache`].

pub mod errors;
pub mod matcher;
pub mod rules;

pub use errors::SugarError;
pub use matcher::{CallMatcher, CallSite};
pub use rules::{InputAccessor, SugarIndex, SugarKind, SugarRule, SugarRules};
