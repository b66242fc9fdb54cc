//! Control-flow handlers: else branches and switch cases.

use crate::rewrite::command::MoveDirection;
use crate::rewrite::outcome::RewriteFailure;
use crate::rewrite::planner::Planner;
use crate::syntax::{JavaKind, NodeId};

impl Planner<'_> {
    pub(crate) fn add_else(&mut self, target: NodeId) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let statement = self.expect(target, &[JavaKind::IfStatement])?;
        if tree.child_by_field(statement, "alternative").is_some() {
            return Err(RewriteFailure::Precondition(
                "if statement already has an else".to_string(),
            ));
        }
        let consequence = self.field(statement, "consequence")?;
        let indent = self.changes.line_indent(tree.span(statement).start);
        self.changes
            .insert(tree.span(consequence).end, format!(" else {{\n{indent}}}"));
        Ok(())
    }

    /// Remove the else branch, including any else-if chain hanging off it.
    pub(crate) fn remove_else(&mut self, target: NodeId) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let statement = self.expect(target, &[JavaKind::IfStatement])?;
        let alternative = tree.child_by_field(statement, "alternative").ok_or_else(|| {
            RewriteFailure::Precondition("if statement has no else".to_string())
        })?;
        let consequence = self.field(statement, "consequence")?;
        self.changes
            .remove_span(tree.span(consequence).end..tree.span(alternative).end);
        Ok(())
    }

    /// Turn the trailing plain `else` of a chain into `else if (true)`.
    pub(crate) fn convert_else_to_else_if(&mut self, target: NodeId) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let mut current = self.expect(target, &[JavaKind::IfStatement])?;
        loop {
            let alternative = tree.child_by_field(current, "alternative").ok_or_else(|| {
                RewriteFailure::Precondition("if statement has no else".to_string())
            })?;
            if tree.kind(alternative) == JavaKind::IfStatement {
                current = alternative;
                continue;
            }
            self.changes.insert(tree.span(alternative).start, "if (true) ");
            return Ok(());
        }
    }

    fn switch_block(&self, target: NodeId) -> Result<NodeId, RewriteFailure> {
        let tree = self.tree;
        let switch = match tree.kind(target) {
            JavaKind::SwitchExpression => target,
            JavaKind::SwitchBlockStatementGroup => tree
                .parent(target)
                .and_then(|block| tree.parent(block))
                .ok_or_else(|| self.unsupported(target))?,
            _ => return Err(self.unsupported(target)),
        };
        let block = self.field(switch, "body")?;
        if tree
            .named_children(block)
            .any(|child| tree.kind(child) == JavaKind::SwitchRule)
        {
            return Err(RewriteFailure::Precondition(
                "arrow-style switch cases are not supported".to_string(),
            ));
        }
        Ok(block)
    }

    fn case_groups(&self, block: NodeId) -> Vec<NodeId> {
        let tree = self.tree;
        tree.named_children(block)
            .filter(|child| tree.kind(*child) == JavaKind::SwitchBlockStatementGroup)
            .collect()
    }

    /// Append `case N:` with a `break`, where N counts the labels already
    /// present.
    pub(crate) fn add_switch_case(&mut self, target: NodeId) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let block = self.switch_block(target)?;
        let labels = self
            .case_groups(block)
            .into_iter()
            .flat_map(|group| tree.named_children(group))
            .filter(|child| tree.kind(*child) == JavaKind::SwitchLabel)
            .count();
        let u = &self.settings.indent;
        let text = format!("case {labels}:\n{u}break;");
        let end = self.tree.named_children(block).count();
        self.changes.insert_statement(block, end, &text)
    }

    /// Swap a case group with its neighbour.
    pub(crate) fn move_switch_case(
        &mut self,
        target: NodeId,
        direction: MoveDirection,
    ) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let group = self.expect(target, &[JavaKind::SwitchBlockStatementGroup])?;
        let groups = self.case_groups(self.switch_block(group)?);
        let position = groups
            .iter()
            .position(|candidate| *candidate == group)
            .ok_or_else(|| self.unsupported(group))?;
        let neighbour = match direction {
            MoveDirection::Up => position.checked_sub(1),
            MoveDirection::Down => Some(position + 1).filter(|next| *next < groups.len()),
        }
        .map(|index| groups[index])
        .ok_or_else(|| {
            RewriteFailure::Precondition("case is already at the edge of the switch".to_string())
        })?;

        self.changes.replace(group, tree.text(neighbour));
        self.changes.replace(neighbour, tree.text(group));
        Ok(())
    }
}
