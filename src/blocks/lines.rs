use crate::blocks::block::{Block, BlockId, BlockKind};
use crate::blocks::builder::BlockTree;
use crate::syntax::SyntaxTree;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

/// A statement-level block as seen by a debugger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockRef {
    pub id: BlockId,
    pub kind: &'static str,
    pub span: Range<usize>,
    /// One-based lines of the first and last byte.
    pub start_line: usize,
    pub end_line: usize,
}

/// Snapshot of line ownership for one build pass.
///
/// The index owns its data, so a debugger may hold it while the session
/// moves on to later generations.
#[derive(Debug, Clone, Default)]
pub struct BreakpointIndex {
    generation: u64,
    entries: Vec<BlockRef>,
    by_id: HashMap<BlockId, usize>,
    /// Lines of the statements directly inside each body block.
    body_lines: HashMap<BlockId, Vec<usize>>,
}

impl BreakpointIndex {
    pub fn capture(tree: &SyntaxTree, blocks: &BlockTree) -> Self {
        let mut index = Self {
            generation: blocks.generation,
            ..Self::default()
        };

        for block in blocks.blocks() {
            if matches!(block.kind, BlockKind::Body) {
                index.body_lines.insert(block.id.clone(), statement_lines(tree, block));
            }
            if !block.kind.is_statement() {
                continue;
            }
            let span = tree.span(block.node);
            index.by_id.insert(block.id.clone(), index.entries.len());
            index.entries.push(BlockRef {
                id: block.id.clone(),
                kind: block.kind.slug(),
                start_line: tree.line_of(span.start),
                end_line: tree.line_of(span.end.saturating_sub(1).max(span.start)),
                span,
            });
        }

        index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most specific statement block for a one-based line.
    ///
    /// Blocks starting on the line are preferred; otherwise the narrowest
    /// block spanning it is returned.
    pub fn resolve_line(&self, line: usize) -> Option<&BlockRef> {
        fn narrowest<'a>(candidates: Vec<&'a BlockRef>) -> Option<&'a BlockRef> {
            candidates
                .into_iter()
                .min_by_key(|entry| entry.span.end - entry.span.start)
        }

        let starting: Vec<&BlockRef> = self
            .entries
            .iter()
            .filter(|entry| entry.start_line == line)
            .collect();
        if !starting.is_empty() {
            return narrowest(starting);
        }

        narrowest(
            self.entries
                .iter()
                .filter(|entry| entry.start_line <= line && line <= entry.end_line)
                .collect(),
        )
    }

    /// Lines a breakpoint on `id` should be set on.
    pub fn breakpoint_lines_for(&self, id: &BlockId) -> Vec<usize> {
        if let Some(lines) = self.body_lines.get(id) {
            return lines.clone();
        }
        self.by_id
            .get(id)
            .map(|idx| vec![self.entries[*idx].start_line])
            .unwrap_or_default()
    }

    pub fn get(&self, id: &BlockId) -> Option<&BlockRef> {
        self.by_id.get(id).map(|idx| &self.entries[*idx])
    }
}

fn statement_lines(tree: &SyntaxTree, body: &Block) -> Vec<usize> {
    let mut lines: Vec<usize> = body
        .children
        .iter()
        .filter(|child| child.kind.is_statement())
        .map(|child| tree.line_of(tree.span(child.node).start))
        .collect();
    lines.dedup();
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockBuilder;

    const SOURCE: &str = "public class Main {
    public static void main(String[] args) {
        int x = 1;
        if (x > 0) {
            x = 2;
        }
        System.out.println(x);
    }
}
";

    fn index() -> (BlockTree, BreakpointIndex) {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let blocks = BlockBuilder::default().build(&tree);
        let index = BreakpointIndex::capture(&tree, &blocks);
        (blocks, index)
    }

    #[test]
    fn resolves_statement_lines() {
        let (_, index) = index();
        assert_eq!(index.resolve_line(3).unwrap().kind, "var");
        assert_eq!(index.resolve_line(4).unwrap().kind, "if");
        assert_eq!(index.resolve_line(5).unwrap().kind, "assign");
        assert_eq!(index.resolve_line(7).unwrap().kind, "print");
    }

    #[test]
    fn closing_brace_falls_back_to_enclosing_block() {
        let (_, index) = index();
        assert_eq!(index.resolve_line(6).unwrap().kind, "if");
        assert!(index.resolve_line(1).is_none());
    }

    #[test]
    fn breakpoint_lines() {
        let (blocks, index) = index();
        let body = blocks
            .blocks()
            .find(|b| b.kind == BlockKind::Body)
            .unwrap();
        assert_eq!(index.breakpoint_lines_for(&body.id), vec![3, 4, 7]);

        let print = index.resolve_line(7).unwrap().id.clone();
        assert_eq!(index.breakpoint_lines_for(&print), vec![7]);
        assert!(index
            .breakpoint_lines_for(&BlockId::from("nope@1"))
            .is_empty());
    }
}
