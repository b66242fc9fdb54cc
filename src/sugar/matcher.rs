use crate::cache;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_core::{AstGrep, NodeMatch};
use ast_grep_language::SupportLang;
use std::collections::HashMap;
use std::ops::Range;

/// A call expression matched by a sugar pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Span of the call expression, never of its enclosing statement.
    pub span: Range<usize>,
    /// Single-node metavariables: name -> text.
    pub captures: HashMap<String, String>,
}

/// Runs ast-grep call patterns over one Java source buffer.
///
/// Patterns use ast-grep metavariables:
///
/// ```text
/// System.out.println($$$ARGS)     // any number of arguments
/// scanner.nextInt()               // fixed receiver and accessor
/// Thread.sleep($MS)               // exactly one argument, captured as MS
/// ```
pub struct CallMatcher {
    sg: AstGrep<StrDoc<SupportLang>>,
}

impl CallMatcher {
    pub fn new(source: &str) -> Self {
        Self {
            sg: AstGrep::new(source, SupportLang::Java),
        }
    }

    /// Every call matching `pattern`, in source order. Empty or unparsable
    /// patterns match nothing; callers check patterns up front with
    /// [`is_valid_pattern`].
    pub fn calls(&self, pattern: &str) -> Vec<CallSite> {
        if pattern.trim().is_empty() {
            return Vec::new();
        }
        match cache::java_pattern(pattern) {
            Some(compiled) => self.sg.root().find_all(&compiled).map(call_site).collect(),
            None => Vec::new(),
        }
    }
}

/// True when `pattern` parses into a single Java node ast-grep can match.
pub fn is_valid_pattern(pattern: &str) -> bool {
    if pattern.trim().is_empty() {
        return false;
    }
    let parsed = AstGrep::new(pattern, SupportLang::Java);
    let clean = !parsed.root().dfs().any(|node| node.kind() == "ERROR");
    clean && cache::java_pattern(pattern).is_some()
}

fn call_site(found: NodeMatch<StrDoc<SupportLang>>) -> CallSite {
    let node = found.get_node();
    // A call pattern may compile to a whole expression statement.
    let span = if node.kind() == "expression_statement" {
        node.child(0).map(|inner| inner.range()).unwrap_or(node.range())
    } else {
        node.range()
    };
    let captures: HashMap<String, String> = found.get_env().clone().into();
    CallSite { span, captures }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
class Demo {
    public static void main(String[] args) {
        System.out.println("a");
        System.out.println();
        int n = scanner.nextInt();
        other.nextInt();
        Thread.sleep(1000);
    }
}
"#;

    #[test]
    fn variadic_arguments() {
        let matcher = CallMatcher::new(SOURCE);
        let calls = matcher.calls("System.out.println($$$ARGS)");

        assert_eq!(calls.len(), 2);
        assert_eq!(&SOURCE[calls[0].span.clone()], "System.out.println(\"a\")");
        assert_eq!(&SOURCE[calls[1].span.clone()], "System.out.println()");
    }

    #[test]
    fn receiver_is_part_of_the_shape() {
        let matcher = CallMatcher::new(SOURCE);
        let calls = matcher.calls("scanner.nextInt()");
        assert_eq!(calls.len(), 1);
        assert_eq!(&SOURCE[calls[0].span.clone()], "scanner.nextInt()");
    }

    #[test]
    fn single_argument_is_captured() {
        let matcher = CallMatcher::new(SOURCE);
        let calls = matcher.calls("Thread.sleep($MS)");
        assert_eq!(calls[0].captures.get("MS").map(String::as_str), Some("1000"));
        assert!(matcher.calls("Thread.sleep($A, $B)").is_empty());
    }

    #[test]
    fn multi_statement_patterns_match_nothing() {
        let matcher = CallMatcher::new(SOURCE);
        assert!(matcher.calls("a(); Thread.sleep($MS)").is_empty());
    }

    #[test]
    fn pattern_validity() {
        assert!(is_valid_pattern("Console.log($$$ARGS)"));
        assert!(!is_valid_pattern("  "));
        assert!(!is_valid_pattern("Console.log(("));
        assert!(!is_valid_pattern("a(); Thread.sleep($MS)"));
        assert!(CallMatcher::new(SOURCE).calls("").is_empty());
    }
}
