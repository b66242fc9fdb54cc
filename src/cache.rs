//! Per-thread cache of compiled Java patterns.
//!
//! Sugar rules are matched on every rebuild, so each pattern string is
//! compiled once per thread. Patterns that fail to compile are cached as
//! failures too. The cache holds at most 256 patterns and is emptied when
//! full.

use ast_grep_core::Pattern;
use ast_grep_language::SupportLang;
use std::cell::RefCell;
use std::collections::HashMap;

const CAPACITY: usize = 256;

thread_local! {
    static PATTERNS: RefCell<HashMap<String, Option<Pattern>>> = RefCell::new(HashMap::new());
}

/// Compiled form of `source`, or `None` when ast-grep cannot use it as a
/// single-node Java pattern.
pub fn java_pattern(source: &str) -> Option<Pattern> {
    PATTERNS.with(|patterns| {
        let mut patterns = patterns.borrow_mut();
        if let Some(found) = patterns.get(source) {
            return found.clone();
        }
        if patterns.len() >= CAPACITY {
            tracing::trace!(capacity = CAPACITY, "pattern cache full, clearing");
            patterns.clear();
        }
        let compiled = match Pattern::try_new(source, SupportLang::Java) {
            Ok(pattern) => Some(pattern),
            Err(error) => {
                tracing::debug!(pattern = source, %error, "pattern does not compile");
                None
            }
        };
        patterns.insert(source.to_string(), compiled.clone());
        compiled
    })
}

pub fn clear() {
    PATTERNS.with(|patterns| patterns.borrow_mut().clear());
}

pub fn len() -> usize {
    PATTERNS.with(|patterns| patterns.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_patterns_hit_the_cache() {
        clear();
        java_pattern("Thread.sleep($MS)");
        java_pattern("Thread.sleep($MS)");
        assert_eq!(len(), 1);

        java_pattern("System.out.println($$$ARGS)");
        assert_eq!(len(), 2);
    }

    #[test]
    fn failed_compiles_are_cached_without_panicking() {
        clear();
        assert!(java_pattern("a(); Thread.sleep($MS)").is_none());
        assert!(java_pattern("a(); Thread.sleep($MS)").is_none());
        assert_eq!(len(), 1);
        assert!(java_pattern("Thread.sleep($MS)").is_some());
    }
}
