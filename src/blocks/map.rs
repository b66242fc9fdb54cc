use crate::blocks::block::BlockId;
use crate::syntax::{NodeId, SyntaxTree};
use std::collections::HashMap;

/// What the map knows about one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntry {
    /// The node the block was built from.
    pub node: NodeId,
    /// Wrapper and token nodes consumed while recognizing the block.
    pub contributing: Vec<NodeId>,
    pub parent: Option<BlockId>,
}

/// Bidirectional index between arena nodes and blocks of one build pass.
///
/// A node maps to the most specific block that covers it: registrations
/// happen parent-first, so a deeper block overwrites its ancestors.
#[derive(Debug, Clone, Default)]
pub struct NodeBlockMap {
    owners: HashMap<NodeId, BlockId>,
    entries: HashMap<BlockId, BlockEntry>,
}

impl NodeBlockMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_block(&mut self, id: &BlockId, node: NodeId, parent: Option<&BlockId>) {
        self.owners.insert(node, id.clone());
        self.entries.insert(
            id.clone(),
            BlockEntry {
                node,
                contributing: Vec::new(),
                parent: parent.cloned(),
            },
        );
    }

    pub(crate) fn add_contributing(&mut self, id: &BlockId, node: NodeId) {
        self.owners.insert(node, id.clone());
        if let Some(entry) = self.entries.get_mut(id) {
            if entry.node != node && !entry.contributing.contains(&node) {
                entry.contributing.push(node);
            }
        }
    }

    pub fn block_for_node(&self, node: NodeId) -> Option<&BlockId> {
        self.owners.get(&node)
    }

    pub fn node_for_block(&self, id: &BlockId) -> Option<NodeId> {
        self.entries.get(id).map(|entry| entry.node)
    }

    pub fn entry(&self, id: &BlockId) -> Option<&BlockEntry> {
        self.entries.get(id)
    }

    pub fn parent_of(&self, id: &BlockId) -> Option<&BlockId> {
        self.entries.get(id)?.parent.as_ref()
    }

    /// Block owning `node` or its nearest mapped ancestor.
    pub fn owner_of(&self, tree: &SyntaxTree, node: NodeId) -> Option<&BlockId> {
        std::iter::once(node)
            .chain(tree.ancestors(node))
            .find_map(|candidate| self.owners.get(&candidate))
    }

    /// Most specific block covering a byte offset.
    pub fn block_at_offset(&self, tree: &SyntaxTree, offset: usize) -> Option<&BlockId> {
        self.owner_of(tree, tree.deepest_at(offset))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn block_ids(&self) -> impl Iterator<Item = &BlockId> {
        self.entries.keys()
    }
}
