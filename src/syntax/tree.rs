//! Arena lowering of a tree-sitter parse.
//!
//! Every node of the concrete syntax tree is copied into a flat `Vec` and
//! addressed by [`NodeId`]. Ids are only meaningful for the tree that
//! produced them: each tree gets a fresh generation, and a [`NodeRef`]
//! captured from an older tree no longer resolves. Structural identity
//! across parses is expressed by [`NodePath`] instead.

use crate::pool;
use crate::syntax::errors::SyntaxError;
use crate::syntax::kind::JavaKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use tree_sitter::{Tree, TreeCursor};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Index of a node inside one [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node id bound to the generation of the tree it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub generation: u64,
    pub id: NodeId,
}

/// Child indices from the root down to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodePath(pub Vec<u32>);

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "root");
        }
        for (idx, step) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "root" || s.is_empty() {
            return Ok(NodePath::default());
        }
        s.split('.')
            .map(str::parse)
            .collect::<Result<Vec<u32>, _>>()
            .map(NodePath)
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: JavaKind,
    /// Kind string reported by the grammar, kept for diagnostics.
    pub raw_kind: &'static str,
    /// Field name this node occupies in its parent, if any.
    pub field: Option<&'static str>,
    pub named: bool,
    pub is_error: bool,
    pub is_missing: bool,
    pub span: Range<usize>,
    /// Zero-based rows of the first and last byte.
    pub start_row: usize,
    pub end_row: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub index_in_parent: u32,
}

/// Immutable parse of one source buffer.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    tree: Tree,
    nodes: Vec<SyntaxNode>,
    by_ts_id: HashMap<usize, NodeId>,
    line_starts: Vec<usize>,
    generation: u64,
}

impl SyntaxTree {
    /// Parse `source` with the thread's pooled Java parser.
    pub fn parse(source: impl Into<String>) -> Result<Self, SyntaxError> {
        let source = source.into();
        let tree = pool::with_parser(|parser| parser.parse(&source))??;
        Self::from_tree(source, tree)
    }

    /// Lower an existing tree-sitter tree into an arena.
    pub fn from_tree(source: String, tree: Tree) -> Result<Self, SyntaxError> {
        let mut nodes = Vec::new();
        let mut by_ts_id = HashMap::new();
        {
            let mut cursor = tree.walk();
            lower(&mut cursor, &mut nodes, &mut by_ts_id)?;
        }

        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();

        Ok(Self {
            source,
            tree,
            nodes,
            by_ts_id,
            line_starts,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ts_tree(&self) -> &Tree {
        &self.tree
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Panics on ids from a different tree; use [`SyntaxTree::get`] for untrusted ids.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> JavaKind {
        self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> Range<usize> {
        self.node(id).span.clone()
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.source[self.node(id).span.clone()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn named_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.node(*child).named)
    }

    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.node(*child).field == Some(field))
    }

    pub fn children_by_field<'a>(
        &'a self,
        id: NodeId,
        field: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.node(*child).field == Some(field))
    }

    pub fn first_child_of_kind(&self, id: NodeId, kind: JavaKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.node(*child).kind == kind)
    }

    /// First direct child token with the given text (e.g. `{`, `else`).
    pub fn token(&self, id: NodeId, text: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| !self.node(*child).named && self.text(*child) == text)
    }

    pub fn last_token(&self, id: NodeId, text: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .rev()
            .copied()
            .find(|child| !self.node(*child).named && self.text(*child) == text)
    }

    /// Pre-order walk of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Nearest ancestor (excluding `id`) of the given kind.
    pub fn enclosing(&self, id: NodeId, kind: JavaKind) -> Option<NodeId> {
        self.ancestors(id).find(|ancestor| self.kind(*ancestor) == kind)
    }

    pub fn path(&self, id: NodeId) -> NodePath {
        let mut steps = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            steps.push(self.node(current).index_in_parent);
            current = parent;
        }
        steps.reverse();
        NodePath(steps)
    }

    pub fn resolve_path(&self, path: &NodePath) -> Option<NodeId> {
        let mut current = self.root();
        for step in &path.0 {
            current = *self.children(current).get(*step as usize)?;
        }
        Some(current)
    }

    pub fn node_ref(&self, id: NodeId) -> NodeRef {
        NodeRef {
            generation: self.generation,
            id,
        }
    }

    /// Resolve a reference, rejecting ids from another generation.
    pub fn resolve(&self, node: NodeRef) -> Option<NodeId> {
        (node.generation == self.generation && node.id.index() < self.nodes.len())
            .then_some(node.id)
    }

    pub(crate) fn lookup_ts(&self, ts_id: usize) -> Option<NodeId> {
        self.by_ts_id.get(&ts_id).copied()
    }

    /// Deepest node whose span contains `offset`.
    pub fn deepest_at(&self, offset: usize) -> NodeId {
        let mut current = self.root();
        loop {
            let next = self.children(current).iter().copied().find(|child| {
                let span = &self.node(*child).span;
                span.start <= offset && offset < span.end
            });
            match next {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// One-based line number of a byte offset.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Byte offset of the first byte of a one-based line.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|idx| self.line_starts.get(idx).copied())
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    pub fn error_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.is_error || node.is_missing)
            .count()
    }
}

pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Pre-order copy of the cursor's tree into `nodes`. The walk keeps its own
/// ancestor stack, so nesting depth is bounded by the heap only.
fn lower(
    cursor: &mut TreeCursor<'_>,
    nodes: &mut Vec<SyntaxNode>,
    by_ts_id: &mut HashMap<usize, NodeId>,
) -> Result<(), SyntaxError> {
    let mut ancestors: Vec<NodeId> = Vec::new();
    loop {
        let node = cursor.node();
        let raw_id = u32::try_from(nodes.len()).map_err(|_| SyntaxError::TooManyNodes {
            count: nodes.len(),
        })?;
        let id = NodeId(raw_id);
        let parent = ancestors.last().copied();
        let index_in_parent = match parent {
            Some(parent) => nodes[parent.index()].children.len() as u32,
            None => 0,
        };

        nodes.push(SyntaxNode {
            kind: if node.is_error() {
                JavaKind::Error
            } else {
                JavaKind::from_ts(node.kind())
            },
            raw_kind: node.kind(),
            field: cursor.field_name(),
            named: node.is_named(),
            is_error: node.is_error(),
            is_missing: node.is_missing(),
            span: node.byte_range(),
            start_row: node.start_position().row,
            end_row: node.end_position().row,
            parent,
            children: Vec::new(),
            index_in_parent,
        });
        if let Some(parent) = parent {
            nodes[parent.index()].children.push(id);
        }
        by_ts_id.insert(node.id(), id);

        if cursor.goto_first_child() {
            ancestors.push(id);
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return Ok(());
            }
            ancestors.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "class Demo {\n    void run() {\n        int x = 10;\n    }\n}\n";

    #[test]
    fn arena_mirrors_source_spans() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        assert_eq!(tree.kind(tree.root()), JavaKind::Program);
        assert_eq!(tree.text(tree.root()), SOURCE);

        let decl = tree
            .descendants(tree.root())
            .find(|id| tree.kind(*id) == JavaKind::LocalVariableDeclaration)
            .unwrap();
        assert_eq!(tree.text(decl), "int x = 10;");
        assert_eq!(tree.line_of(tree.span(decl).start), 3);
    }

    #[test]
    fn fields_are_recorded() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let declarator = tree
            .descendants(tree.root())
            .find(|id| tree.kind(*id) == JavaKind::VariableDeclarator)
            .unwrap();
        let value = tree.child_by_field(declarator, "value").unwrap();
        assert_eq!(tree.text(value), "10");
        let name = tree.child_by_field(declarator, "name").unwrap();
        assert_eq!(tree.text(name), "x");
    }

    #[test]
    fn paths_round_trip() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        for id in tree.descendants(tree.root()) {
            let path = tree.path(id);
            assert_eq!(tree.resolve_path(&path), Some(id));
            let reparsed: NodePath = path.to_string().parse().unwrap();
            assert_eq!(reparsed, path);
        }
    }

    #[test]
    fn stale_refs_do_not_resolve() {
        let first = SyntaxTree::parse(SOURCE).unwrap();
        let second = SyntaxTree::parse(SOURCE).unwrap();
        let node = first.node_ref(NodeId(3));

        assert_eq!(first.resolve(node), Some(NodeId(3)));
        assert_eq!(second.resolve(node), None);
    }

    #[test]
    fn deepest_node_at_offset() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let offset = SOURCE.find("10").unwrap();
        let id = tree.deepest_at(offset);
        assert_eq!(tree.kind(id), JavaKind::IntegerLiteral);
    }

    #[test]
    fn deep_nesting_lowers_without_recursion() {
        let depth = 3000;
        let source = format!(
            "class Deep {{ int x = {}1{}; }}",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let tree = SyntaxTree::parse(source.as_str()).unwrap();

        let literal = tree
            .descendants(tree.root())
            .find(|id| tree.kind(*id) == JavaKind::IntegerLiteral)
            .unwrap();
        assert_eq!(tree.text(literal), "1");
        assert!(tree.ancestors(literal).count() > depth);
        assert_eq!(tree.resolve_path(&tree.path(literal)), Some(literal));
    }

    #[test]
    fn line_lookup() {
        let tree = SyntaxTree::parse("a\nbc\n").unwrap();
        assert_eq!(tree.line_of(0), 1);
        assert_eq!(tree.line_of(2), 2);
        assert_eq!(tree.line_of(3), 2);
        assert_eq!(tree.line_start(2), Some(2));
    }
}
