//! Parse checks guarding rewrites.
//!
//! A rewrite may not add parse errors: the edited text is re-parsed and
//! compared with the original. User-supplied code is parsed inside a wrapper
//! class before it is spliced anywhere.

use crate::pool;
use crate::syntax::{JavaParser, ParseIssue, ParsedSource, SyntaxError};
use std::ops::Range;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("rewrite introduces {count} parse error(s)")]
    ParseErrorIntroduced {
        count: usize,
        errors: Vec<ErrorLocation>,
    },

    #[error("not a valid Java {kind} ({count} parse error(s))")]
    InvalidSnippet { kind: SnippetKind, count: usize },

    #[error("parser error: {0}")]
    Syntax(#[from] SyntaxError),
}

/// A parse error in edited text, with a short excerpt around it.
#[derive(Debug, Clone)]
pub struct ErrorLocation {
    pub span: Range<usize>,
    /// One-based.
    pub line: usize,
    pub column: usize,
    pub context: String,
}

/// What a snippet must parse as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetKind {
    Statements,
    Expression,
    Type,
}

impl std::fmt::Display for SnippetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnippetKind::Statements => write!(f, "statement list"),
            SnippetKind::Expression => write!(f, "expression"),
            SnippetKind::Type => write!(f, "type"),
        }
    }
}

impl SnippetKind {
    fn wrap(self, code: &str) -> String {
        match self {
            SnippetKind::Statements => format!("class Snippet {{ void snippet() {{\n{code}\n}} }}"),
            SnippetKind::Expression => {
                format!("class Snippet {{ void snippet() {{ Object value = ({code}); }} }}")
            }
            SnippetKind::Type => format!("class Snippet {{ {code} value; }}"),
        }
    }
}

/// Validator with a parser of its own, for callers off the pooled path.
pub struct ParseValidator {
    parser: JavaParser,
}

impl ParseValidator {
    pub fn new() -> Result<Self, SyntaxError> {
        Ok(Self {
            parser: JavaParser::new()?,
        })
    }

    /// Reject any parse error at all.
    pub fn validate(&mut self, source: &str) -> Result<(), ValidationError> {
        let parsed = self.parser.parse_with_source(source)?;
        let errors = locate(&parsed, parsed.issues());
        if errors.is_empty() {
            return Ok(());
        }
        Err(ValidationError::ParseErrorIntroduced {
            count: errors.len(),
            errors,
        })
    }

    pub fn validate_edit(&mut self, original: &str, edited: &str) -> Result<(), ValidationError> {
        let before = self.parser.parse_with_source(original)?;
        let after = self.parser.parse_with_source(edited)?;
        compare(&before, &after)
    }
}

/// Validation on the thread's pooled parser.
pub mod pooled {
    use super::*;

    pub fn validate_edit(original: &str, edited: &str) -> Result<(), ValidationError> {
        pool::with_parser(|parser| {
            let before = parser.parse_with_source(original)?;
            let after = parser.parse_with_source(edited)?;
            compare(&before, &after)
        })?
    }

    /// Check that `code` parses as the requested kind of snippet.
    pub fn validate_snippet(code: &str, kind: SnippetKind) -> Result<(), ValidationError> {
        let wrapped = kind.wrap(code);
        pool::with_parser(|parser| {
            let parsed = parser.parse_with_source(&wrapped)?;
            match parsed.issues().len() {
                0 => Ok(()),
                count => Err(ValidationError::InvalidSnippet { kind, count }),
            }
        })?
    }
}

/// Offsets move after an edit, so only a growing error count rejects; the
/// report lists issues whose span did not exist before.
fn compare(before: &ParsedSource<'_>, after: &ParsedSource<'_>) -> Result<(), ValidationError> {
    let existing = before.issues();
    let current = after.issues();
    if current.len() <= existing.len() {
        return Ok(());
    }

    let introduced: Vec<ParseIssue> = current
        .into_iter()
        .filter(|issue| !existing.iter().any(|old| old.span == issue.span))
        .collect();
    let errors = locate(after, introduced);
    Err(ValidationError::ParseErrorIntroduced {
        count: errors.len(),
        errors,
    })
}

fn locate(parsed: &ParsedSource<'_>, issues: Vec<ParseIssue>) -> Vec<ErrorLocation> {
    let source = parsed.source;
    issues
        .into_iter()
        .map(|issue| {
            let start = floor_boundary(source, issue.span.start.saturating_sub(20));
            let end = floor_boundary(source, (issue.span.end + 20).min(source.len()));
            ErrorLocation {
                line: issue.row + 1,
                column: issue.column + 1,
                context: source[start..end].replace('\n', "\\n"),
                span: issue.span,
            }
        })
        .collect()
}

fn floor_boundary(text: &str, mut offset: usize) -> usize {
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_source_passes() {
        let mut validator = ParseValidator::new().unwrap();
        assert!(validator.validate("class A { void f() {} }").is_ok());
        assert!(validator.validate("class A { void f( {} }").is_err());
    }

    #[test]
    fn broken_edit_is_reported() {
        let original = "class A { void f() { int x = 1; } }";
        let edited = "class A { void f() { int x = ; } }";
        match pooled::validate_edit(original, edited) {
            Err(ValidationError::ParseErrorIntroduced { count, errors }) => {
                assert!(count >= 1);
                assert_eq!(errors[0].line, 1);
                assert!(errors[0].context.contains("int x"));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn pre_existing_errors_are_tolerated() {
        let original = "class A { void f() { int x = ; } }";
        let edited = "class A { void f() { int x = ; } void g() { int y = 2; } }";
        let mut validator = ParseValidator::new().unwrap();
        assert!(validator.validate_edit(original, edited).is_ok());
    }

    #[test]
    fn snippets_are_checked_in_context() {
        assert!(pooled::validate_snippet("int a = 1;\na++;", SnippetKind::Statements).is_ok());
        assert!(pooled::validate_snippet("int a = ;", SnippetKind::Statements).is_err());
        assert!(pooled::validate_snippet("x + 1", SnippetKind::Expression).is_ok());
        assert!(pooled::validate_snippet("ArrayList<Integer>", SnippetKind::Type).is_ok());
    }
}
