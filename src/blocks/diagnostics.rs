use crate::blocks::block::BlockId;
use crate::blocks::builder::BlockTree;
use crate::blocks::lines::BreakpointIndex;
use crate::syntax::SyntaxTree;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

/// A compiler or linter finding over a byte range of the current text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range<usize>,
    pub severity: Severity,
    pub message: String,
}

/// Diagnostics grouped by the block they belong to.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Annotations {
    pub by_block: BTreeMap<BlockId, Vec<Diagnostic>>,
    /// Findings no block covers (imports, omitted constructs).
    pub unattached: Vec<Diagnostic>,
}

impl Annotations {
    pub fn for_block(&self, id: &BlockId) -> &[Diagnostic] {
        self.by_block.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Worst severity attached to a block.
    pub fn severity(&self, id: &BlockId) -> Option<Severity> {
        self.for_block(id).iter().map(|d| d.severity).min()
    }
}

/// Attach each diagnostic to the most specific block at its start offset,
/// falling back to the statement owning its line.
pub fn annotate(
    tree: &SyntaxTree,
    blocks: &BlockTree,
    diagnostics: impl IntoIterator<Item = Diagnostic>,
) -> Annotations {
    let lines = BreakpointIndex::capture(tree, blocks);
    let mut annotations = Annotations::default();

    for diagnostic in diagnostics {
        let start = diagnostic.range.start.min(tree.source().len());
        let owner = blocks
            .map
            .block_at_offset(tree, start)
            .cloned()
            .or_else(|| {
                lines
                    .resolve_line(tree.line_of(start))
                    .map(|found| found.id.clone())
            });

        match owner {
            Some(id) => annotations.by_block.entry(id).or_default().push(diagnostic),
            None => annotations.unattached.push(diagnostic),
        }
    }

    annotations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockBuilder, BlockKind};

    #[test]
    fn attaches_to_most_specific_block() {
        let source = "import java.util.List;\nclass Main {\n    static void main(String[] a) {\n        int x = y;\n    }\n}\n";
        let tree = SyntaxTree::parse(source).unwrap();
        let blocks = BlockBuilder::default().build(&tree);

        let at = source.find("y;").unwrap();
        let diagnostics = vec![
            Diagnostic {
                range: at..at + 1,
                severity: Severity::Error,
                message: "cannot find symbol y".to_string(),
            },
            Diagnostic {
                range: 0..6,
                severity: Severity::Warning,
                message: "unused import".to_string(),
            },
        ];

        let annotations = annotate(&tree, &blocks, diagnostics);
        assert_eq!(annotations.unattached.len(), 1);

        let (id, found) = annotations.by_block.iter().next().unwrap();
        assert_eq!(found.len(), 1);
        let block = blocks.find(id).unwrap();
        assert_eq!(
            block.kind,
            BlockKind::Identifier {
                name: "y".to_string()
            }
        );
        assert_eq!(annotations.severity(id), Some(Severity::Error));
    }
}
