//! Declaration handlers: renames, types, enums, methods, parameters and
//! return values.

use crate::rewrite::changes::list_items;
use crate::rewrite::command::ExpressionTemplate;
use crate::rewrite::infer;
use crate::rewrite::outcome::RewriteFailure;
use crate::rewrite::planner::Planner;
use crate::rewrite::templates::{self, invalid};
use crate::rewrite::types::{wrap_leaves, TypeShape};
use crate::syntax::{JavaKind, NodeId};

const DEFAULT_ENUM_CONSTANTS: [&str; 2] = ["OPTION_A", "OPTION_B"];

impl Planner<'_> {
    /// Name node a declaration introduces.
    fn declared_name(&self, declaration: NodeId) -> Result<NodeId, RewriteFailure> {
        match self.tree.kind(declaration) {
            JavaKind::LocalVariableDeclaration | JavaKind::FieldDeclaration => {
                let declarator = self.field(declaration, "declarator")?;
                self.field(declarator, "name")
            }
            JavaKind::MethodDeclaration
            | JavaKind::ClassDeclaration
            | JavaKind::EnumDeclaration
            | JavaKind::EnumConstant
            | JavaKind::FormalParameter
            | JavaKind::EnhancedForStatement => self.field(declaration, "name"),
            _ => Err(self.unsupported(declaration)),
        }
    }

    /// Rename a declaration. Locals, parameters and loop variables also
    /// rename their uses inside the scope they are visible in.
    pub(crate) fn rename_declaration(&mut self, target: NodeId, name: &str) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let name = templates::identifier(name)?;
        let name_node = self.declared_name(target)?;
        let old = tree.text(name_node);
        if old == name {
            return Ok(());
        }

        let scope = match tree.kind(target) {
            JavaKind::LocalVariableDeclaration => tree.parent(target),
            JavaKind::FormalParameter => infer::enclosing_callable(tree, target),
            JavaKind::EnhancedForStatement => Some(target),
            _ => None,
        };

        self.changes.replace(name_node, name);
        if let Some(scope) = scope {
            let after = tree.span(name_node).end;
            let uses: Vec<NodeId> = tree
                .descendants(scope)
                .filter(|node| {
                    *node != name_node
                        && tree.kind(*node) == JavaKind::Identifier
                        && tree.text(*node) == old
                        && tree.span(*node).start >= after
                        && self.is_variable_use(*node)
                })
                .collect();
            tracing::debug!(from = old, to = name, uses = uses.len(), "renaming declaration");
            for node in uses {
                self.changes.replace(node, name);
            }
        }
        Ok(())
    }

    /// Identifier in value position, not a member or method name.
    fn is_variable_use(&self, node: NodeId) -> bool {
        let tree = self.tree;
        let field = tree.node(node).field;
        let Some(parent) = tree.parent(node) else {
            return false;
        };
        !matches!(
            (tree.kind(parent), field),
            (JavaKind::FieldAccess, Some("field"))
                | (JavaKind::MethodInvocation, Some("name"))
                | (JavaKind::MethodDeclaration, Some("name"))
                | (JavaKind::VariableDeclarator, Some("name"))
                | (JavaKind::FormalParameter, Some("name"))
                | (JavaKind::EnumConstant, Some("name"))
                | (JavaKind::LabeledStatement, _)
                | (JavaKind::BreakStatement, _)
                | (JavaKind::ContinueStatement, _)
        )
    }

    /// Change a declared type, carrying the initializer's leaf values over
    /// when the leaf types agree and falling back to the new default
    /// otherwise.
    pub(crate) fn change_declared_type(
        &mut self,
        target: NodeId,
        type_name: &str,
    ) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let declaration = self.expect(
            target,
            &[
                JavaKind::LocalVariableDeclaration,
                JavaKind::FieldDeclaration,
                JavaKind::FormalParameter,
                JavaKind::EnhancedForStatement,
            ],
        )?;
        let type_name = templates::type_name(type_name)?;
        let type_node = self.field(declaration, "type")?;
        let old = TypeShape::parse(tree.text(type_node));
        let new = TypeShape::parse(type_name);

        if tree.text(type_node) != type_name {
            self.changes.replace(type_node, type_name);
        }

        let value = tree
            .child_by_field(declaration, "declarator")
            .and_then(|declarator| tree.child_by_field(declarator, "value"));
        let Some(value) = value else {
            return Ok(());
        };

        let leaves = infer::collect_leaves(tree, value);
        let preserved = !leaves.is_empty() && old.normalized_leaf() == new.normalized_leaf();
        let initializer = if preserved {
            self.require_imports(&new);
            wrap_leaves(&new, &leaves, self.enums())
        } else {
            self.default_for(&new)
        };
        tracing::debug!(from = %old, to = %new, preserved, "changing declared type");

        if tree.text(value) != initializer {
            self.changes.replace(value, initializer);
        }
        Ok(())
    }

    pub(crate) fn add_enum(
        &mut self,
        target: NodeId,
        name: &str,
        constants: &[String],
    ) -> Result<(), RewriteFailure> {
        let container = self.statement_container(target)?;
        let name = templates::identifier(name)?;
        let constants: Vec<&str> = if constants.is_empty() {
            DEFAULT_ENUM_CONSTANTS.to_vec()
        } else {
            constants
                .iter()
                .map(|constant| templates::identifier(constant))
                .collect::<Result<_, _>>()?
        };
        let text = format!("enum {name} {{ {} }}", constants.join(", "));
        self.changes.insert_statement(container, 0, &text)
    }

    fn enum_body(&self, target: NodeId) -> Result<NodeId, RewriteFailure> {
        match self.tree.kind(target) {
            JavaKind::EnumBody => Ok(target),
            JavaKind::EnumDeclaration => self.field(target, "body"),
            _ => Err(self.unsupported(target)),
        }
    }

    pub(crate) fn add_enum_constant(&mut self, target: NodeId, name: &str) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let body = self.enum_body(target)?;
        let name = templates::identifier(name)?;
        let taken = list_items(tree, body).iter().any(|constant| {
            tree.child_by_field(*constant, "name")
                .is_some_and(|existing| tree.text(existing) == name)
        });
        if taken {
            return Err(invalid(name, "constant already declared"));
        }
        self.changes.insert_list_item(body, None, name)
    }

    pub(crate) fn remove_enum_constant(&mut self, target: NodeId, index: usize) -> Result<(), RewriteFailure> {
        let body = self.enum_body(target)?;
        self.changes.remove_list_item(body, index)
    }

    /// Renames the constant's declaration only.
    pub(crate) fn rename_enum_constant(
        &mut self,
        target: NodeId,
        index: usize,
        name: &str,
    ) -> Result<(), RewriteFailure> {
        let body = self.enum_body(target)?;
        let constants = list_items(self.tree, body);
        let constant = constants
            .get(index)
            .copied()
            .ok_or(RewriteFailure::IndexOutOfRange {
                index,
                len: constants.len(),
            })?;
        let name_node = self.field(constant, "name")?;
        let name = templates::identifier(name)?;
        self.changes.replace(name_node, name);
        Ok(())
    }

    pub(crate) fn add_method(
        &mut self,
        target: NodeId,
        name: &str,
        return_type: &str,
        index: Option<usize>,
    ) -> Result<(), RewriteFailure> {
        let body = match self.tree.kind(target) {
            JavaKind::ClassDeclaration => self.field(target, "body")?,
            JavaKind::ClassBody => target,
            _ => return Err(self.unsupported(target)),
        };
        let name = templates::identifier(name)?;
        let return_type = templates::type_name(return_type)?;
        let shape = TypeShape::parse(return_type);

        let text = if return_type == "void" {
            format!("public static void {name}() {{\n}}")
        } else {
            let value = self.default_for(&shape);
            let u = &self.settings.indent;
            format!("public static {return_type} {name}() {{\n{u}return {value};\n}}")
        };
        let index = index.unwrap_or_else(|| self.tree.named_children(body).count());
        self.changes.insert_statement(body, index, &text)
    }

    fn parameters(&self, target: NodeId) -> Result<NodeId, RewriteFailure> {
        let method = self.expect(
            target,
            &[JavaKind::MethodDeclaration, JavaKind::ConstructorDeclaration],
        )?;
        self.field(method, "parameters")
    }

    pub(crate) fn add_parameter(
        &mut self,
        target: NodeId,
        type_name: &str,
        name: &str,
    ) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let parameters = self.parameters(target)?;
        let type_name = templates::type_name(type_name)?;
        let name = templates::identifier(name)?;
        let taken = list_items(tree, parameters).iter().any(|param| {
            tree.child_by_field(*param, "name")
                .is_some_and(|existing| tree.text(existing) == name)
        });
        if taken {
            return Err(invalid(name, "parameter already declared"));
        }
        self.require_imports(&TypeShape::parse(type_name));
        self.changes
            .insert_list_item(parameters, None, &format!("{type_name} {name}"))
    }

    pub(crate) fn remove_parameter(&mut self, target: NodeId, index: usize) -> Result<(), RewriteFailure> {
        let parameters = self.parameters(target)?;
        self.changes.remove_list_item(parameters, index)
    }

    pub(crate) fn rename_parameter(
        &mut self,
        target: NodeId,
        index: usize,
        name: &str,
    ) -> Result<(), RewriteFailure> {
        let parameters = self.parameters(target)?;
        let items = list_items(self.tree, parameters);
        let parameter = items
            .get(index)
            .copied()
            .ok_or(RewriteFailure::IndexOutOfRange {
                index,
                len: items.len(),
            })?;
        self.rename_declaration(parameter, name)
    }

    /// Replace the return type only; return statements are left alone.
    pub(crate) fn set_return_type(&mut self, target: NodeId, type_name: &str) -> Result<(), RewriteFailure> {
        let method = self.expect(target, &[JavaKind::MethodDeclaration])?;
        let type_node = self.field(method, "type")?;
        let type_name = templates::type_name(type_name)?;
        if self.tree.text(type_node) != type_name {
            self.changes.replace(type_node, type_name);
        }
        Ok(())
    }

    pub(crate) fn set_return_value(
        &mut self,
        target: NodeId,
        template: Option<&ExpressionTemplate>,
    ) -> Result<(), RewriteFailure> {
        let tree = self.tree;
        let statement = self.expect(target, &[JavaKind::ReturnStatement])?;
        let keyword = tree
            .token(statement, "return")
            .ok_or_else(|| self.unsupported(statement))?;
        let value = tree
            .named_children(statement)
            .find(|child| !tree.kind(*child).is_comment());

        match (template, value) {
            (Some(template), value) => {
                let expected = infer::enclosing_callable(tree, statement)
                    .and_then(|method| infer::declared_shape(tree, method))
                    .filter(|shape| shape.leaf() != "void");
                let text = self.render_expression(template, expected.as_ref())?;
                match value {
                    Some(value) => self.changes.replace(value, text),
                    None => self.changes.insert(tree.span(keyword).end, format!(" {text}")),
                }
            }
            (None, Some(value)) => {
                self.changes
                    .remove_span(tree.span(keyword).end..tree.span(value).end);
            }
            (None, None) => {
                return Err(RewriteFailure::Precondition(
                    "return statement has no value".to_string(),
                ))
            }
        }
        Ok(())
    }
}
