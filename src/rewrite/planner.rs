//! Command dispatch.
//!
//! A [`Planner`] turns resolved commands into span edits on one
//! [`ChangeSet`]. Handlers live in the sibling modules grouped by what they
//! touch; this file holds the dispatch and the lookups they share.

use crate::rewrite::changes::ChangeSet;
use crate::rewrite::command::{EditCommand, ExpressionTemplate};
use crate::rewrite::infer;
use crate::rewrite::outcome::RewriteFailure;
use crate::rewrite::templates::{self, TemplateContext};
use crate::rewrite::types::{EnumCatalog, TypeShape};
use crate::syntax::{JavaKind, NodeId, StructuralLocator, StructuralTarget, SyntaxTree};
use std::cell::OnceCell;

/// Rewrite settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub indent: String,
    pub validate: bool,
    pub print_call: String,
    pub input_receiver: String,
    pub sleep_call: String,
}

pub(crate) struct Planner<'t> {
    pub(crate) tree: &'t SyntaxTree,
    pub(crate) changes: ChangeSet<'t>,
    pub(crate) settings: &'t EngineSettings,
    command: &'static str,
    enums: OnceCell<EnumCatalog>,
}

impl<'t> Planner<'t> {
    pub(crate) fn new(tree: &'t SyntaxTree, settings: &'t EngineSettings) -> Self {
        Self {
            tree,
            changes: ChangeSet::new(tree, settings.indent.clone()),
            settings,
            command: "",
            enums: OnceCell::new(),
        }
    }

    pub(crate) fn finish(self) -> Result<String, RewriteFailure> {
        self.changes.compile()
    }

    pub(crate) fn plan(&mut self, command: &EditCommand<NodeId>) -> Result<(), RewriteFailure> {
        self.command = command.name();
        tracing::debug!(command = self.command, "planning rewrite");

        match command {
            EditCommand::InsertStatement {
                target,
                index,
                template,
            } => self.insert_statement(*target, *index, *template),
            EditCommand::InsertCode {
                target,
                index,
                code,
            } => self.insert_code(*target, *index, code),
            EditCommand::DeleteStatement { target } => self.delete_statement(*target),
            EditCommand::MoveStatement {
                target,
                destination,
                index,
            } => self.move_statement(*target, *destination, *index),
            EditCommand::DeleteNode { target } => self.delete_node(*target),
            EditCommand::ReplaceExpression { target, template } => {
                self.replace_expression(*target, template)
            }
            EditCommand::ReplaceLiteral { target, value } => self.replace_literal(*target, value),
            EditCommand::RenameIdentifier { target, name } => self.rename_identifier(*target, name),
            EditCommand::RenameDeclaration { target, name } => {
                self.rename_declaration(*target, name)
            }
            EditCommand::ChangeOperator { target, operator } => {
                self.change_operator(*target, operator)
            }
            EditCommand::ChangeDeclaredType { target, type_name } => {
                self.change_declared_type(*target, type_name)
            }
            EditCommand::SetInitializer { target, template } => {
                self.set_initializer(*target, template)
            }
            EditCommand::AddListElement {
                target,
                index,
                template,
            } => self.add_list_element(*target, *index, template.as_ref()),
            EditCommand::RemoveListElement { target, index } => {
                self.remove_list_element(*target, *index)
            }
            EditCommand::AddArgument { target, template } => self.add_argument(*target, template),
            EditCommand::RemoveArgument { target, index } => self.remove_argument(*target, *index),
            EditCommand::UpdateCall {
                target,
                scope,
                name,
                parameter_types,
            } => self.update_call(*target, scope.as_deref(), name, parameter_types),
            EditCommand::AddEnum {
                target,
                name,
                constants,
            } => self.add_enum(*target, name, constants),
            EditCommand::AddEnumConstant { target, name } => self.add_enum_constant(*target, name),
            EditCommand::RemoveEnumConstant { target, index } => {
                self.remove_enum_constant(*target, *index)
            }
            EditCommand::RenameEnumConstant {
                target,
                index,
                name,
            } => self.rename_enum_constant(*target, *index, name),
            EditCommand::AddMethod {
                target,
                name,
                return_type,
                index,
            } => self.add_method(*target, name, return_type, *index),
            EditCommand::AddParameter {
                target,
                type_name,
                name,
            } => self.add_parameter(*target, type_name, name),
            EditCommand::RemoveParameter { target, index } => {
                self.remove_parameter(*target, *index)
            }
            EditCommand::RenameParameter {
                target,
                index,
                name,
            } => self.rename_parameter(*target, *index, name),
            EditCommand::SetReturnType { target, type_name } => {
                self.set_return_type(*target, type_name)
            }
            EditCommand::SetReturnValue { target, template } => {
                self.set_return_value(*target, template.as_ref())
            }
            EditCommand::AddElse { target } => self.add_else(*target),
            EditCommand::RemoveElse { target } => self.remove_else(*target),
            EditCommand::ConvertElseToElseIf { target } => self.convert_else_to_else_if(*target),
            EditCommand::AddSwitchCase { target } => self.add_switch_case(*target),
            EditCommand::MoveSwitchCase { target, direction } => {
                self.move_switch_case(*target, *direction)
            }
            EditCommand::UpdateComment { target, text } => self.update_comment(*target, text),
        }
    }

    // Shared lookups

    pub(crate) fn unsupported(&self, node: NodeId) -> RewriteFailure {
        RewriteFailure::UnsupportedTarget {
            command: self.command,
            kind: self.tree.node(node).raw_kind,
        }
    }

    /// `node` itself when it has one of `kinds`.
    pub(crate) fn expect(&self, node: NodeId, kinds: &[JavaKind]) -> Result<NodeId, RewriteFailure> {
        if kinds.contains(&self.tree.kind(node)) {
            Ok(node)
        } else {
            Err(self.unsupported(node))
        }
    }

    pub(crate) fn field(&self, node: NodeId, name: &str) -> Result<NodeId, RewriteFailure> {
        self.tree.child_by_field(node, name).ok_or_else(|| {
            RewriteFailure::Precondition(format!(
                "{} has no {name}",
                self.tree.node(node).raw_kind
            ))
        })
    }

    /// First constant of every enum in the file, collected on first use.
    pub(crate) fn enums(&self) -> &EnumCatalog {
        self.enums.get_or_init(|| {
            let tree = self.tree;
            let mut catalog = EnumCatalog::default();
            let found = StructuralLocator::new(tree)
                .locate_all(&StructuralTarget::AllEnums)
                .unwrap_or_else(|error| {
                    tracing::warn!(%error, "enum lookup failed");
                    Vec::new()
                });
            for result in found {
                let (Ok(name), Ok(body)) =
                    (result.matched.capture("name"), result.matched.capture("body"))
                else {
                    continue;
                };
                let first = tree
                    .named_children(body)
                    .find(|child| tree.kind(*child) == JavaKind::EnumConstant)
                    .and_then(|constant| tree.child_by_field(constant, "name"));
                if let Some(first) = first {
                    catalog.insert(tree.text(name), tree.text(first));
                }
            }
            catalog
        })
    }

    pub(crate) fn template_context(&self, at: NodeId) -> TemplateContext<'_> {
        let tree = self.tree;
        let return_type = infer::enclosing_callable(tree, at)
            .filter(|callable| tree.kind(*callable) == JavaKind::MethodDeclaration)
            .and_then(|method| infer::declared_shape(tree, method))
            .filter(|shape| shape.leaf() != "void");

        TemplateContext {
            indent: &self.settings.indent,
            print_call: &self.settings.print_call,
            input_receiver: &self.settings.input_receiver,
            sleep_call: &self.settings.sleep_call,
            return_type,
            enums: self.enums(),
        }
    }

    /// Render an expression and register its imports.
    pub(crate) fn render_expression(
        &mut self,
        template: &ExpressionTemplate,
        expected: Option<&TypeShape>,
    ) -> Result<String, RewriteFailure> {
        let rendered = templates::expression(template, expected, self.enums())?;
        for import in rendered.imports {
            self.changes.require_import(import);
        }
        Ok(rendered.text)
    }

    /// Default for `shape`, registering its imports.
    pub(crate) fn default_for(&mut self, shape: &TypeShape) -> String {
        self.render_expression(&ExpressionTemplate::Default, Some(shape))
            .unwrap_or_else(|_| "null".to_string())
    }

    pub(crate) fn require_imports(&mut self, shape: &TypeShape) {
        for import in shape.required_imports() {
            self.changes.require_import(import);
        }
    }
}
