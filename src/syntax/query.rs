use crate::syntax::errors::SyntaxError;
use crate::syntax::tree::{NodeId, SyntaxTree};
use ast_grep_language::{LanguageExt, SupportLang};
use std::collections::HashMap;
use std::ops::Range;
use tree_sitter::{Query, QueryCursor, StreamingIterator};

/// One query match, with captures resolved to arena nodes.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    /// Smallest span covering every capture.
    pub span: Range<usize>,
    pub captures: HashMap<String, NodeId>,
}

impl QueryMatch {
    pub fn capture(&self, name: &str) -> Result<NodeId, SyntaxError> {
        self.captures
            .get(name)
            .copied()
            .ok_or_else(|| SyntaxError::CaptureNotFound {
                name: name.to_string(),
            })
    }
}

/// A compiled S-expression query over the Java grammar.
///
/// ```text
/// (method_declaration
///   name: (identifier) @name
///   body: (block) @body)
/// ```
pub struct QueryEngine {
    query: Query,
}

impl QueryEngine {
    pub fn new(source: &str) -> Result<Self, SyntaxError> {
        let query = Query::new(&SupportLang::Java.get_ts_language(), source).map_err(|e| {
            SyntaxError::InvalidQuery {
                message: e.to_string(),
            }
        })?;
        Ok(Self { query })
    }

    /// Every match, in the order tree-sitter reports them.
    pub fn find_all(&self, tree: &SyntaxTree) -> Vec<QueryMatch> {
        let names = self.query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(
            &self.query,
            tree.ts_tree().root_node(),
            tree.source().as_bytes(),
        );

        let mut results = Vec::new();
        while let Some(found) = matches.next() {
            let mut span: Option<Range<usize>> = None;
            let mut captures = HashMap::new();
            for capture in found.captures {
                let Some(id) = tree.lookup_ts(capture.node.id()) else {
                    continue;
                };
                let range = capture.node.byte_range();
                span = Some(match span {
                    Some(span) => span.start.min(range.start)..span.end.max(range.end),
                    None => range,
                });
                captures.insert(names[capture.index as usize].to_string(), id);
            }
            if let Some(span) = span {
                results.push(QueryMatch { span, captures });
            }
        }
        results
    }
}

/// Common tree-sitter queries for Java constructs.
pub mod queries {
    /// Top-level class declarations.
    pub fn top_level_classes() -> String {
        r#"(program (class_declaration name: (identifier) @name) @class)"#.to_string()
    }

    /// Top-level enum declarations.
    pub fn top_level_enums() -> String {
        r#"(program (enum_declaration name: (identifier) @name) @enum)"#.to_string()
    }

    pub fn class_by_name(name: &str) -> String {
        format!(
            r#"(class_declaration
                name: (identifier) @name
                (#eq? @name "{name}")
            ) @class"#
        )
    }

    pub fn method_by_name(name: &str) -> String {
        format!(
            r#"(method_declaration
                name: (identifier) @name
                (#eq? @name "{name}")
            ) @method"#
        )
    }

    /// Every enum declaration, at any depth.
    pub fn all_enums() -> String {
        r#"(enum_declaration name: (identifier) @name body: (enum_body) @body) @enum"#
            .to_string()
    }

    pub fn enum_by_name(name: &str) -> String {
        format!(
            r#"(enum_declaration
                name: (identifier) @name
                body: (enum_body) @body
                (#eq? @name "{name}")
            ) @enum"#
        )
    }

    pub fn imports() -> String {
        r#"(import_declaration) @import"#.to_string()
    }

    pub fn package() -> String {
        r#"(package_declaration) @package"#.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::kind::JavaKind;

    const SOURCE: &str = r#"
import java.util.List;

public class Demo {
    enum Color { RED, GREEN }

    public static void main(String[] args) {
        System.out.println("hi");
    }

    void helper() {}
}
"#;

    #[test]
    fn find_method_by_name() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let engine = QueryEngine::new(&queries::method_by_name("main")).unwrap();
        let matches = engine.find_all(&tree);
        assert_eq!(matches.len(), 1);
        let found = &matches[0];

        let method = found.capture("method").unwrap();
        assert_eq!(tree.kind(method), JavaKind::MethodDeclaration);
        assert_eq!(tree.text(found.capture("name").unwrap()), "main");
    }

    #[test]
    fn find_all_enums() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let engine = QueryEngine::new(&queries::all_enums()).unwrap();
        let matches = engine.find_all(&tree);

        assert_eq!(matches.len(), 1);
        assert_eq!(tree.text(matches[0].capture("name").unwrap()), "Color");
    }

    #[test]
    fn missing_method_is_no_match() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let engine = QueryEngine::new(&queries::method_by_name("absent")).unwrap();
        assert!(engine.find_all(&tree).is_empty());
    }

    #[test]
    fn invalid_query_is_reported() {
        assert!(matches!(
            QueryEngine::new("(not_a_real_kind) @x"),
            Err(SyntaxError::InvalidQuery { .. })
        ));
    }
}
