//! Expression-level handlers: replacement, literals, operators, lists and
//! call arguments.

use crate::blocks::OperatorClass;
use crate::rewrite::changes::list_items;
use crate::rewrite::command::{ExpressionTemplate, LiteralInput};
use crate::rewrite::infer;
use crate::rewrite::outcome::RewriteFailure;
use crate::rewrite::planner::Planner;
use crate::rewrite::templates::{self, invalid};
use crate::rewrite::types::TypeShape;
use crate::syntax::{JavaKind, NodeId};

const ASSIGNMENT_OPERATORS: [&str; 6] = ["=", "+=", "-=", "*=", "/=", "%="];

/// Where the elements of a list expression live.
enum ListSite {
    /// Comma-separated elements directly under this node.
    Items(NodeId),
    /// `new ArrayList<>()`: the empty argument list of the constructor.
    EmptyList(NodeId),
}

fn is_expression(kind: JavaKind) -> bool {
    kind.is_literal()
        || matches!(
            kind,
            JavaKind::Identifier
                | JavaKind::This
                | JavaKind::FieldAccess
                | JavaKind::MethodInvocation
                | JavaKind::BinaryExpression
                | JavaKind::UnaryExpression
                | JavaKind::UpdateExpression
                | JavaKind::ParenthesizedExpression
                | JavaKind::ArrayCreationExpression
                | JavaKind::ArrayInitializer
                | JavaKind::ObjectCreationExpression
                | JavaKind::ArrayAccess
                | JavaKind::CastExpression
                | JavaKind::TernaryExpression
        )
}

impl Planner<'_> {
    pub(crate) fn replace_expression(
        &mut self,
        target: NodeId,
        template: &ExpressionTemplate,
    ) -> Result<(), RewriteFailure> {
        if !is_expression(self.tree.kind(target)) {
            return Err(self.unsupported(target));
        }
        let expected = infer::expected_type(self.tree, target);
        let text = self.render_expression(template, expected.as_ref())?;
        self.changes.replace(target, text);
        Ok(())
    }

    pub(crate) fn replace_literal(
        &mut self,
        target: NodeId,
        value: &LiteralInput,
    ) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let negative_number = tree.kind(target) == JavaKind::UnaryExpression
            && tree
                .child_by_field(target, "operand")
                .is_some_and(|operand| tree.kind(operand).is_literal());
        if !tree.kind(target).is_literal() && !negative_number {
            return Err(self.unsupported(target));
        }
        let text = templates::literal(value)?;
        self.changes.replace(target, text);
        Ok(())
    }

    pub(crate) fn rename_identifier(&mut self, target: NodeId, name: &str) -> Result<(), RewriteFailure> {
        let node = self.expect(target, &[JavaKind::Identifier])?;
        let name = templates::identifier(name)?;
        self.changes.replace(node, name);
        Ok(())
    }

    pub(crate) fn change_operator(&mut self, target: NodeId, operator: &str) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let node = match tree.kind(target) {
            JavaKind::ExpressionStatement => tree
                .named_children(target)
                .next()
                .ok_or_else(|| self.unsupported(target))?,
            _ => target,
        };

        let (token, valid) = match tree.kind(node) {
            JavaKind::BinaryExpression => (
                self.field(node, "operator")?,
                OperatorClass::of(operator).is_some(),
            ),
            JavaKind::AssignmentExpression => (
                self.field(node, "operator")?,
                ASSIGNMENT_OPERATORS.contains(&operator),
            ),
            JavaKind::UpdateExpression => {
                let token = tree
                    .children(node)
                    .iter()
                    .copied()
                    .find(|child| !tree.node(*child).named)
                    .ok_or_else(|| self.unsupported(node))?;
                (token, matches!(operator, "++" | "--"))
            }
            _ => return Err(self.unsupported(target)),
        };

        if !valid {
            return Err(invalid(
                operator,
                &format!("not an operator for {}", tree.node(node).raw_kind),
            ));
        }
        if tree.text(token) != operator {
            self.changes.replace(token, operator);
        }
        Ok(())
    }

    pub(crate) fn set_initializer(
        &mut self,
        target: NodeId,
        template: &ExpressionTemplate,
    ) -> Result<(), RewriteFailure> {
        let declaration = self.expect(
            target,
            &[JavaKind::LocalVariableDeclaration, JavaKind::FieldDeclaration],
        )?;
        let declarator = self.field(declaration, "declarator")?;
        let expected = infer::declared_shape(self.tree, declaration);
        let text = self.render_expression(template, expected.as_ref())?;

        match self.tree.child_by_field(declarator, "value") {
            Some(value) => self.changes.replace(value, text),
            None => {
                let end = self.tree.span(declarator).end;
                self.changes.insert(end, format!(" = {text}"));
            }
        }
        Ok(())
    }

    fn list_site(&self, target: NodeId) -> Result<ListSite, RewriteFailure> {
        let tree = self.tree;
        match tree.kind(target) {
            JavaKind::ArrayInitializer => Ok(ListSite::Items(target)),
            JavaKind::ArrayCreationExpression => tree
                .child_by_field(target, "value")
                .map(ListSite::Items)
                .ok_or_else(|| self.unsupported(target)),
            JavaKind::MethodInvocation if infer::is_list_factory(tree, target) => {
                self.field(target, "arguments").map(ListSite::Items)
            }
            JavaKind::ObjectCreationExpression if infer::is_list_creation(tree, target) => {
                let arguments = self.field(target, "arguments")?;
                match list_items(tree, arguments).as_slice() {
                    [] => Ok(ListSite::EmptyList(arguments)),
                    [inner] if infer::is_list_factory(tree, *inner) => {
                        self.field(*inner, "arguments").map(ListSite::Items)
                    }
                    _ => Err(self.unsupported(target)),
                }
            }
            _ => Err(self.unsupported(target)),
        }
    }

    pub(crate) fn add_list_element(
        &mut self,
        target: NodeId,
        index: Option<usize>,
        template: Option<&ExpressionTemplate>,
    ) -> Result<(), RewriteFailure> {
        let site = self.list_site(target)?;
        let element = infer::container_type(self.tree, target)
            .and_then(|shape| shape.element().cloned());
        let template = template.unwrap_or(&ExpressionTemplate::Default);
        let text = self.render_expression(template, element.as_ref())?;

        match site {
            ListSite::Items(list) => self.changes.insert_list_item(list, index, &text),
            ListSite::EmptyList(arguments) => {
                if let Some(index @ 1..) = index {
                    return Err(RewriteFailure::IndexOutOfRange { index, len: 0 });
                }
                self.changes.require_import("java.util.List");
                self.changes
                    .insert_list_item(arguments, None, &format!("List.of({text})"))
            }
        }
    }

    pub(crate) fn remove_list_element(&mut self, target: NodeId, index: usize) -> Result<(), RewriteFailure> {
        match self.list_site(target)? {
            ListSite::Items(list) => self.changes.remove_list_item(list, index),
            ListSite::EmptyList(_) => Err(RewriteFailure::IndexOutOfRange { index, len: 0 }),
        }
    }

    /// The invocation behind a call or print block.
    fn invocation(&self, target: NodeId) -> Result<NodeId, RewriteFailure> {
        let tree = self.tree;
        let call = match tree.kind(target) {
            JavaKind::ExpressionStatement => tree.named_children(target).next(),
            JavaKind::MethodInvocation => Some(target),
            _ => None,
        };
        call.filter(|call| tree.kind(*call) == JavaKind::MethodInvocation)
            .ok_or_else(|| self.unsupported(target))
    }

    pub(crate) fn add_argument(
        &mut self,
        target: NodeId,
        template: &ExpressionTemplate,
    ) -> Result<(), RewriteFailure> {
        let call = self.invocation(target)?;
        let arguments = self.field(call, "arguments")?;
        let text = self.render_expression(template, None)?;
        self.changes.insert_list_item(arguments, None, &text)
    }

    pub(crate) fn remove_argument(&mut self, target: NodeId, index: usize) -> Result<(), RewriteFailure> {
        let call = self.invocation(target)?;
        let arguments = self.field(call, "arguments")?;
        self.changes.remove_list_item(arguments, index)
    }

    /// Point a call at another method: scope, name, and an argument list
    /// trimmed or padded to the new parameter count.
    pub(crate) fn update_call(
        &mut self,
        target: NodeId,
        scope: Option<&str>,
        name: &str,
        parameter_types: &[String],
    ) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let call = self.invocation(target)?;
        let name_node = self.field(call, "name")?;
        let arguments = self.field(call, "arguments")?;
        let name = templates::identifier(name)?;
        let scope = scope
            .map(str::trim)
            .filter(|scope| !scope.is_empty() && *scope != "Local");
        if let Some(scope) = scope {
            for part in scope.split('.') {
                templates::identifier(part)?;
            }
        }

        match (tree.child_by_field(call, "object"), scope) {
            (Some(object), Some(scope)) if tree.text(object) != scope => {
                self.changes.replace(object, scope);
            }
            (Some(object), None) => {
                self.changes
                    .remove_span(tree.span(object).start..tree.span(name_node).start);
            }
            (None, Some(scope)) => {
                self.changes.insert(tree.span(name_node).start, format!("{scope}."));
            }
            _ => {}
        }

        if tree.text(name_node) != name {
            self.changes.replace(name_node, name);
        }

        let existing = list_items(tree, arguments);
        if existing.len() == parameter_types.len() {
            return Ok(());
        }
        if let Some(last) = existing.last().filter(|_| parameter_types.len() < existing.len()) {
            let start = match parameter_types.len() {
                0 => tree.span(existing[0]).start,
                keep => tree.span(existing[keep - 1]).end,
            };
            self.changes.remove_span(start..tree.span(*last).end);
            return Ok(());
        }
        let padding: Vec<String> = parameter_types[existing.len()..]
            .iter()
            .map(|ty| self.default_for(&TypeShape::parse(ty)))
            .collect();
        self.changes
            .insert_list_item(arguments, None, &padding.join(", "))
    }
}
