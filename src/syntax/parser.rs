use crate::syntax::errors::SyntaxError;
use ast_grep_language::{LanguageExt, SupportLang};
use std::ops::Range;
use tree_sitter::{Node, Parser, Tree};

/// Java parser. The grammar is the one bundled with ast-grep-language, so
/// node kinds agree with sugar patterns.
pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    pub fn new() -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        parser
            .set_language(&SupportLang::Java.get_ts_language())
            .map_err(|_| SyntaxError::LanguageSet)?;
        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &str) -> Result<Tree, SyntaxError> {
        self.parser
            .parse(source, None)
            .ok_or(SyntaxError::ParseFailed)
    }

    pub fn parse_with_source<'a>(&mut self, source: &'a str) -> Result<ParsedSource<'a>, SyntaxError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }
}

/// Source text paired with its raw tree, for checks that never need the
/// arena.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

/// An ERROR or MISSING node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub span: Range<usize>,
    /// Zero-based row and column of the first byte.
    pub row: usize,
    pub column: usize,
    pub missing: bool,
}

impl ParsedSource<'_> {
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Every ERROR and MISSING node, outermost first. Subtrees without
    /// errors are skipped.
    pub fn issues(&self) -> Vec<ParseIssue> {
        let mut issues = Vec::new();
        let mut stack = vec![self.tree.root_node()];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                issues.push(issue(node));
            }
            if !node.has_error() {
                continue;
            }
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        issues
    }
}

fn issue(node: Node<'_>) -> ParseIssue {
    let start = node.start_position();
    ParseIssue {
        span: node.byte_range(),
        row: start.row,
        column: start.column,
        missing: node.is_missing(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_source_has_no_issues() {
        let mut parser = JavaParser::new().unwrap();
        let parsed = parser
            .parse_with_source("class A { void f() { int x = 1; } }")
            .unwrap();
        assert!(!parsed.has_errors());
        assert!(parsed.issues().is_empty());
        assert_eq!(parsed.tree.root_node().kind(), "program");
    }

    #[test]
    fn issues_carry_positions() {
        let mut parser = JavaParser::new().unwrap();
        let source = "class A {\n  void f() { int x = ; }\n}";
        let parsed = parser.parse_with_source(source).unwrap();

        let issues = parsed.issues();
        assert!(!issues.is_empty());
        assert_eq!(issues[0].row, 1);
    }
}
