//! Change lists over a syntax tree.
//!
//! A [`ChangeSet`] collects span edits against one tree and compiles them
//! into new text in a single pass. Every primitive edits the smallest span
//! it can; bytes outside those spans are copied through untouched.

use crate::edit::Edit;
use crate::rewrite::outcome::RewriteFailure;
use crate::syntax::{JavaKind, NodeId, StructuralLocator, StructuralTarget, SyntaxTree};
use std::collections::BTreeSet;
use std::ops::Range;

pub struct ChangeSet<'t> {
    tree: &'t SyntaxTree,
    indent_unit: String,
    edits: Vec<Edit>,
    imports: BTreeSet<String>,
}

impl<'t> ChangeSet<'t> {
    pub fn new(tree: &'t SyntaxTree, indent_unit: impl Into<String>) -> Self {
        Self {
            tree,
            indent_unit: indent_unit.into(),
            edits: Vec::new(),
            imports: BTreeSet::new(),
        }
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.imports.is_empty()
    }

    pub fn replace_span(&mut self, span: Range<usize>, text: impl Into<String>) {
        let before = &self.tree.source()[span.clone()];
        self.edits.push(Edit::new(span.start, span.end, text, before));
    }

    pub fn replace(&mut self, node: NodeId, text: impl Into<String>) {
        self.replace_span(self.tree.span(node), text);
    }

    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.edits.push(Edit::insert(offset, text));
    }

    pub fn remove_span(&mut self, span: Range<usize>) {
        self.replace_span(span, "");
    }

    pub fn require_import(&mut self, path: &str) {
        self.imports.insert(path.to_string());
    }

    /// Leading whitespace of the line holding `offset`.
    pub fn line_indent(&self, offset: usize) -> &'t str {
        let source = self.tree.source();
        let start = line_start(source, offset);
        let rest = &source[start..];
        let width = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        &rest[..width]
    }

    /// True when only whitespace precedes `offset` on its line.
    fn starts_line(&self, offset: usize) -> bool {
        let source = self.tree.source();
        source[line_start(source, offset)..offset]
            .chars()
            .all(|c| c == ' ' || c == '\t')
    }

    /// Remove one item from a statement or member list, taking its whole
    /// line when it sits alone on it.
    pub fn remove_statement(&mut self, node: NodeId) {
        let source = self.tree.source();
        let span = self.tree.span(node);
        let line_end = line_end(source, span.end);
        let trailing_blank = source[span.end..line_end]
            .chars()
            .all(char::is_whitespace);

        if self.starts_line(span.start) && trailing_blank {
            let end = (line_end + 1).min(source.len());
            self.remove_span(line_start(source, span.start)..end);
        } else {
            let rest = &source[span.end..];
            let gap = rest.len() - rest.trim_start_matches([' ', '\t']).len();
            self.remove_span(span.start..span.end + gap);
        }
    }

    /// Insert a statement or member before item `index` of `container`.
    ///
    /// `text` may span several lines; lines after the first are indented
    /// relative to the insertion point.
    pub fn insert_statement(
        &mut self,
        container: NodeId,
        index: usize,
        text: &str,
    ) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let items = statement_items(tree, container);
        if index > items.len() {
            return Err(RewriteFailure::IndexOutOfRange {
                index,
                len: items.len(),
            });
        }

        let indent = match items.get(index.min(items.len().saturating_sub(1))) {
            Some(item) if self.starts_line(tree.span(*item).start) => {
                self.line_indent(tree.span(*item).start).to_string()
            }
            _ => format!(
                "{}{}",
                self.line_indent(tree.span(container).start),
                self.indent_unit
            ),
        };
        let text = reindent(text, &indent);

        if let Some(item) = items.get(index) {
            let start = tree.span(*item).start;
            if self.starts_line(start) {
                let line = line_start(tree.source(), start);
                self.insert(line, format!("{indent}{text}\n"));
            } else {
                self.insert(start, format!("{text} "));
            }
            return Ok(());
        }

        if let Some(last) = items.last() {
            self.insert(tree.span(*last).end, format!("\n{indent}{text}"));
            return Ok(());
        }

        match tree.kind(container) {
            JavaKind::SwitchBlockStatementGroup => {
                let anchor = tree.children(container).last().copied().unwrap_or(container);
                self.insert(tree.span(anchor).end, format!("\n{indent}{text}"));
            }
            JavaKind::Program => {
                let end = tree.source().len();
                self.insert(end, format!("{text}\n"));
            }
            _ => {
                let (open, close) = braces(tree, container)
                    .ok_or_else(|| RewriteFailure::Precondition("container has no braces".into()))?;
                let outer = self.line_indent(tree.span(container).start);
                self.replace_span(
                    tree.span(open).end..tree.span(close).start,
                    format!("\n{indent}{text}\n{outer}"),
                );
            }
        }
        Ok(())
    }

    /// Insert an element into a delimited list (arguments, initializer,
    /// parameters, enum constants). `None` appends.
    pub fn insert_list_item(
        &mut self,
        list: NodeId,
        index: Option<usize>,
        text: &str,
    ) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let items = list_items(tree, list);
        let index = index.unwrap_or(items.len());
        if index > items.len() {
            return Err(RewriteFailure::IndexOutOfRange {
                index,
                len: items.len(),
            });
        }

        if let Some(item) = items.get(index) {
            self.insert(tree.span(*item).start, format!("{text}, "));
        } else if let Some(last) = items.last() {
            self.insert(tree.span(*last).end, format!(", {text}"));
        } else {
            let (open, close) = list_delimiters(tree, list).ok_or_else(|| {
                RewriteFailure::Precondition("list has no delimiters".into())
            })?;
            let interior = tree.span(open).end..tree.span(close).start;
            let padded = !interior.is_empty()
                && tree.source()[interior.clone()].chars().all(char::is_whitespace);
            let text = if padded {
                format!(" {text} ")
            } else {
                text.to_string()
            };
            self.replace_span(interior, text);
        }
        Ok(())
    }

    pub fn remove_list_item(&mut self, list: NodeId, index: usize) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let items = list_items(tree, list);
        let Some(item) = items.get(index) else {
            return Err(RewriteFailure::IndexOutOfRange {
                index,
                len: items.len(),
            });
        };

        let span = tree.span(*item);
        let removed = match (index.checked_sub(1).map(|i| items[i]), items.get(index + 1)) {
            (_, Some(next)) => span.start..tree.span(*next).start,
            (Some(previous), None) => tree.span(previous).end..span.end,
            (None, None) => span,
        };
        self.remove_span(removed);
        Ok(())
    }

    /// Apply every collected edit plus missing imports to the source.
    pub fn compile(mut self) -> Result<String, RewriteFailure> {
        self.plan_imports();
        Ok(Edit::apply_all(self.tree.source(), &self.edits)?)
    }

    fn plan_imports(&mut self) {
        if self.imports.is_empty() {
            return;
        }
        let tree = self.tree;
        let locator = StructuralLocator::new(tree);
        let existing: Vec<NodeId> = locator
            .locate_all(&StructuralTarget::Imports)
            .map(|found| found.into_iter().map(|r| r.node).collect())
            .unwrap_or_default();
        let declared: Vec<&str> = existing
            .iter()
            .map(|node| import_path(tree.text(*node)))
            .collect();

        let missing: Vec<String> = self
            .imports
            .iter()
            .filter(|path| !is_imported(path, &declared))
            .map(|path| format!("import {path};"))
            .collect();
        if missing.is_empty() {
            return;
        }
        let block = missing.join("\n");
        tracing::debug!(imports = ?missing, "adding imports");

        if let Some(last) = existing.last() {
            self.insert(tree.span(*last).end, format!("\n{block}"));
            return;
        }
        let package = locator
            .locate_first(&StructuralTarget::Package)
            .ok()
            .flatten();
        match package {
            Some(package) => self.insert(tree.span(package.node).end, format!("\n\n{block}")),
            None => self.insert(0, format!("{block}\n\n")),
        }
    }
}

/// `java.util.List` from `import java.util.List;`.
fn import_path(text: &str) -> &str {
    text.trim()
        .trim_start_matches("import")
        .trim_end_matches(';')
        .trim()
}

fn is_imported(path: &str, declared: &[&str]) -> bool {
    let package = path.rsplit_once('.').map(|(package, _)| package);
    declared.iter().any(|existing| {
        *existing == path
            || existing
                .strip_suffix(".*")
                .is_some_and(|wildcard| Some(wildcard) == package)
    }) || package == Some("java.lang")
}

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |idx| idx + 1)
}

fn line_end(source: &str, offset: usize) -> usize {
    source[offset..]
        .find('\n')
        .map_or(source.len(), |idx| offset + idx)
}

fn reindent(text: &str, indent: &str) -> String {
    let mut lines = text.lines();
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        if !line.trim().is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
    }
    out
}

fn braces(tree: &SyntaxTree, node: NodeId) -> Option<(NodeId, NodeId)> {
    Some((tree.token(node, "{")?, tree.last_token(node, "}")?))
}

/// Items of a statement or member list.
pub fn statement_items(tree: &SyntaxTree, container: NodeId) -> Vec<NodeId> {
    let is_item = |kind: JavaKind| match tree.kind(container) {
        JavaKind::SwitchBlockStatementGroup => kind != JavaKind::SwitchLabel,
        JavaKind::SwitchBlock => kind == JavaKind::SwitchBlockStatementGroup || kind.is_comment(),
        _ => true,
    };
    tree.named_children(container)
        .filter(|child| is_item(tree.kind(*child)))
        .collect()
}

/// Elements of a delimited list.
pub fn list_items(tree: &SyntaxTree, list: NodeId) -> Vec<NodeId> {
    tree.named_children(list)
        .filter(|child| {
            let kind = tree.kind(*child);
            match tree.kind(list) {
                JavaKind::EnumBody => kind == JavaKind::EnumConstant,
                JavaKind::FormalParameters => {
                    kind == JavaKind::FormalParameter
                        || tree.node(*child).raw_kind == "spread_parameter"
                }
                _ => !kind.is_comment(),
            }
        })
        .collect()
}

fn list_delimiters(tree: &SyntaxTree, list: NodeId) -> Option<(NodeId, NodeId)> {
    match tree.kind(list) {
        JavaKind::ArrayInitializer => braces(tree, list),
        JavaKind::EnumBody => {
            let open = tree.token(list, "{")?;
            let close = tree
                .first_child_of_kind(list, JavaKind::EnumBodyDeclarations)
                .or_else(|| tree.last_token(list, "}"))?;
            Some((open, close))
        }
        _ => Some((tree.token(list, "(")?, tree.last_token(list, ")")?)),
    }
}
