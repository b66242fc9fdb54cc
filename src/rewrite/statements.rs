//! Statement-level handlers: insert, delete, move, comments.

use crate::rewrite::changes::{list_items, statement_items};
use crate::rewrite::command::StatementTemplate;
use crate::rewrite::outcome::RewriteFailure;
use crate::rewrite::planner::Planner;
use crate::rewrite::templates::{self, invalid};
use crate::syntax::{JavaKind, NodeId};
use crate::validate::{pooled, SnippetKind};

impl Planner<'_> {
    /// Statement list a target stands for: bodies directly, declarations
    /// and loops through their body.
    pub(crate) fn statement_container(&self, target: NodeId) -> Result<NodeId, RewriteFailure> {
        let tree = self.tree;
        match tree.kind(target) {
            JavaKind::Block
            | JavaKind::SwitchBlockStatementGroup
            | JavaKind::SwitchBlock
            | JavaKind::ClassBody
            | JavaKind::Program => Ok(target),
            JavaKind::MethodDeclaration
            | JavaKind::ConstructorDeclaration
            | JavaKind::ClassDeclaration
            | JavaKind::WhileStatement
            | JavaKind::DoStatement
            | JavaKind::EnhancedForStatement
            | JavaKind::TryStatement => {
                let body = self.field(target, "body")?;
                match tree.kind(body) {
                    JavaKind::Block | JavaKind::ClassBody => Ok(body),
                    _ => Err(self.unsupported(target)),
                }
            }
            _ => Err(self.unsupported(target)),
        }
    }

    fn is_statement_list(&self, node: NodeId) -> bool {
        matches!(
            self.tree.kind(node),
            JavaKind::Block
                | JavaKind::SwitchBlockStatementGroup
                | JavaKind::SwitchBlock
                | JavaKind::ClassBody
                | JavaKind::Program
        )
    }

    pub(crate) fn insert_statement(
        &mut self,
        target: NodeId,
        index: usize,
        template: StatementTemplate,
    ) -> Result<(), RewriteFailure> {
        let container = self.statement_container(target)?;
        let rendered = templates::statement(template, &self.template_context(container));
        for import in &rendered.imports {
            self.changes.require_import(import);
        }
        self.changes.insert_statement(container, index, &rendered.text)
    }

    pub(crate) fn insert_code(
        &mut self,
        target: NodeId,
        index: usize,
        code: &str,
    ) -> Result<(), RewriteFailure> {
        let container = self.statement_container(target)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(invalid(code, "empty snippet"));
        }
        if matches!(
            self.tree.kind(container),
            JavaKind::Block | JavaKind::SwitchBlockStatementGroup
        ) {
            pooled::validate_snippet(code, SnippetKind::Statements)
                .map_err(|error| invalid(code, &error.to_string()))?;
        }
        self.changes.insert_statement(container, index, code)
    }

    pub(crate) fn delete_statement(&mut self, target: NodeId) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let parent = tree.parent(target).ok_or_else(|| self.unsupported(target))?;

        if self.is_else_if(target) {
            return self.unwrap_else_if(parent, target);
        }
        if self.is_statement_list(parent) {
            self.changes.remove_statement(target);
            return Ok(());
        }
        Err(self.unsupported(target))
    }

    fn is_else_if(&self, node: NodeId) -> bool {
        let tree = self.tree;
        tree.kind(node) == JavaKind::IfStatement
            && tree.node(node).field == Some("alternative")
            && tree
                .parent(node)
                .is_some_and(|parent| tree.kind(parent) == JavaKind::IfStatement)
    }

    /// Drop one link of an else-if chain, keeping whatever follows it.
    fn unwrap_else_if(&mut self, outer: NodeId, inner: NodeId) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        match tree.child_by_field(inner, "alternative") {
            Some(rest) => {
                let text = tree.text(rest).to_string();
                self.changes.replace(inner, text);
            }
            None => {
                let consequence = self.field(outer, "consequence")?;
                self.changes
                    .remove_span(tree.span(consequence).end..tree.span(inner).end);
            }
        }
        Ok(())
    }

    /// Move a statement before item `index` of the destination body;
    /// `index` counts the destination's items before the move.
    pub(crate) fn move_statement(
        &mut self,
        target: NodeId,
        destination: NodeId,
        index: usize,
    ) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let parent = tree.parent(target).ok_or_else(|| self.unsupported(target))?;
        if !self.is_statement_list(parent) {
            return Err(self.unsupported(target));
        }
        let container = self.statement_container(destination)?;
        if container == target || tree.ancestors(container).any(|a| a == target) {
            return Err(RewriteFailure::Precondition(
                "cannot move a statement into itself".to_string(),
            ));
        }

        if container == parent {
            let position = statement_items(tree, parent)
                .iter()
                .position(|item| *item == target);
            if position.is_some_and(|p| index == p || index == p + 1) {
                return Err(RewriteFailure::Precondition(
                    "statement is already at that position".to_string(),
                ));
            }
        }

        let original_indent = self.changes.line_indent(tree.span(target).start);
        let text = dedent(tree.text(target), original_indent);
        self.changes.remove_statement(target);
        self.changes.insert_statement(container, index, &text)
    }

    /// Remove whatever list the target sits in: statement lists, argument
    /// and parameter lists, initializers, enum constants, else-if links.
    pub(crate) fn delete_node(&mut self, target: NodeId) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let parent = tree.parent(target).ok_or_else(|| self.unsupported(target))?;

        if self.is_else_if(target) {
            return self.unwrap_else_if(parent, target);
        }
        if self.is_statement_list(parent) {
            self.changes.remove_statement(target);
            return Ok(());
        }
        match tree.kind(parent) {
            JavaKind::ArgumentList
            | JavaKind::ArrayInitializer
            | JavaKind::FormalParameters
            | JavaKind::EnumBody => {
                let index = list_items(tree, parent)
                    .iter()
                    .position(|item| *item == target)
                    .ok_or_else(|| self.unsupported(target))?;
                self.changes.remove_list_item(parent, index)
            }
            _ => Err(self.unsupported(target)),
        }
    }

    pub(crate) fn update_comment(&mut self, target: NodeId, text: &str) -> Result<(), RewriteFailure> {
        let node = self.expect(target, &[JavaKind::LineComment, JavaKind::BlockComment])?;
        let text = text.trim();
        let block = text.contains('\n') || self.tree.kind(node) == JavaKind::BlockComment;

        let comment = if block {
            if text.contains("*/") {
                return Err(invalid(text, "comment text cannot contain */"));
            }
            format!("/* {text} */")
        } else {
            format!("// {text}")
        };
        self.changes.replace(node, comment);
        Ok(())
    }
}

/// Strip the indentation a statement had at its old position from every
/// line after the first.
fn dedent(text: &str, indent: &str) -> String {
    let mut lines = text.lines();
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        out.push_str(line.strip_prefix(indent).unwrap_or_else(|| line.trim_start()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedent_keeps_relative_indent() {
        let text = "if (a) {\n            b();\n        }";
        assert_eq!(dedent(text, "        "), "if (a) {\n    b();\n}");
    }
}
