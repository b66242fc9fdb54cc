//! Thread-local parser pooling.
//!
//! Every edit re-parses the whole document, so each thread keeps one Java
//! parser alive and reuses it for every subsequent parse and validation.

use crate::syntax::{JavaParser, SyntaxError};
use std::cell::RefCell;

thread_local! {
    static JAVA_PARSER: RefCell<Option<JavaParser>> = const { RefCell::new(None) };
}

/// Execute function with pooled parser instance.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use blockwright::pool::with_parser;
///
/// let tree = with_parser(|parser| parser.parse("class A {}"))??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, SyntaxError>
where
    F: FnOnce(&mut JavaParser) -> R,
{
    JAVA_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(JavaParser::new()?);
        }
        match slot.as_mut() {
            Some(parser) => Ok(f(parser)),
            None => Err(SyntaxError::LanguageSet),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pooled_parser_is_reused() {
        let first = with_parser(|parser| parser.parse("class A {}").is_ok()).unwrap();
        let second = with_parser(|parser| parser.parse("class B {}").is_ok()).unwrap();
        assert!(first && second);
    }
}
