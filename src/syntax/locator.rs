use crate::syntax::errors::SyntaxError;
use crate::syntax::kind::JavaKind;
use crate::syntax::query::{queries, QueryEngine, QueryMatch};
use crate::syntax::tree::{NodeId, SyntaxTree};

/// High-level structural target for locating Java declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralTarget {
    /// A class by name, at any depth
    Class { name: String },

    /// The first class declared at the top of the file
    FirstClass,

    /// The first enum declared at the top of the file
    FirstEnum,

    /// A method by name, optionally restricted to one class
    Method {
        class: Option<NodeId>,
        name: String,
    },

    /// An enum by name, at any depth
    Enum { name: String },

    /// Every enum declaration in the file
    AllEnums,

    /// Every import declaration
    Imports,

    /// The package declaration
    Package,

    /// Custom tree-sitter query
    Custom { query: String },
}

impl StructuralTarget {
    pub fn to_query(&self) -> String {
        match self {
            StructuralTarget::Class { name } => queries::class_by_name(name),
            StructuralTarget::FirstClass => queries::top_level_classes(),
            StructuralTarget::FirstEnum => queries::top_level_enums(),
            StructuralTarget::Method { name, .. } => queries::method_by_name(name),
            StructuralTarget::Enum { name } => queries::enum_by_name(name),
            StructuralTarget::AllEnums => queries::all_enums(),
            StructuralTarget::Imports => queries::imports(),
            StructuralTarget::Package => queries::package(),
            StructuralTarget::Custom { query } => query.clone(),
        }
    }

    /// Name of the capture that denotes the whole construct.
    fn primary_capture(&self) -> &'static str {
        match self {
            StructuralTarget::Class { .. } | StructuralTarget::FirstClass => "class",
            StructuralTarget::FirstEnum
            | StructuralTarget::Enum { .. }
            | StructuralTarget::AllEnums => "enum",
            StructuralTarget::Method { .. } => "method",
            StructuralTarget::Imports => "import",
            StructuralTarget::Package => "package",
            StructuralTarget::Custom { .. } => "target",
        }
    }
}

/// A located construct together with its query captures.
#[derive(Debug, Clone)]
pub struct LocatorResult {
    pub node: NodeId,
    pub matched: QueryMatch,
}

/// Declaration locator over a [`SyntaxTree`].
pub struct StructuralLocator<'t> {
    tree: &'t SyntaxTree,
}

impl<'t> StructuralLocator<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self { tree }
    }

    pub fn locate_all(&self, target: &StructuralTarget) -> Result<Vec<LocatorResult>, SyntaxError> {
        let engine = QueryEngine::new(&target.to_query())?;
        let capture = target.primary_capture();

        let mut results = Vec::new();
        for matched in engine.find_all(self.tree) {
            let node = matched.capture(capture)?;
            if let StructuralTarget::Method {
                class: Some(class), ..
            } = target
            {
                if self.tree.enclosing(node, JavaKind::ClassDeclaration) != Some(*class) {
                    continue;
                }
            }
            results.push(LocatorResult { node, matched });
        }
        results.sort_by_key(|result| self.tree.span(result.node).start);
        Ok(results)
    }

    /// First match in document order.
    pub fn locate_first(&self, target: &StructuralTarget) -> Result<Option<LocatorResult>, SyntaxError> {
        Ok(self.locate_all(target)?.into_iter().next())
    }

    /// Exactly one match, or an error naming the count.
    pub fn locate(&self, target: &StructuralTarget) -> Result<LocatorResult, SyntaxError> {
        let mut results = self.locate_all(target)?;
        match results.len() {
            0 => Err(SyntaxError::NoMatch),
            1 => Ok(results.remove(0)),
            n => Err(SyntaxError::AmbiguousMatch { count: n }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"package demo;

import java.util.*;

public class Outer {
    enum Mode { FAST, SLOW }

    public static void main(String[] args) {}

    static class Inner {
        void main(int x) {}
    }
}
"#;

    #[test]
    fn locate_first_class() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let locator = StructuralLocator::new(&tree);
        let class = locator.locate(&StructuralTarget::FirstClass).unwrap();
        let name = class.matched.capture("name").unwrap();
        assert_eq!(tree.text(name), "Outer");
    }

    #[test]
    fn method_lookup_scoped_to_class() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let locator = StructuralLocator::new(&tree);
        let outer = locator.locate(&StructuralTarget::FirstClass).unwrap().node;

        let all = locator
            .locate_all(&StructuralTarget::Method {
                class: None,
                name: "main".into(),
            })
            .unwrap();
        assert_eq!(all.len(), 2);

        let scoped = locator
            .locate(&StructuralTarget::Method {
                class: Some(outer),
                name: "main".into(),
            })
            .unwrap();
        assert!(tree.text(scoped.node).contains("String[] args"));
    }

    #[test]
    fn locate_imports_and_package() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let locator = StructuralLocator::new(&tree);
        let imports = locator.locate_all(&StructuralTarget::Imports).unwrap();
        assert_eq!(imports.len(), 1);
        assert_eq!(tree.text(imports[0].node), "import java.util.*;");
        assert!(locator.locate(&StructuralTarget::Package).is_ok());
    }
}
