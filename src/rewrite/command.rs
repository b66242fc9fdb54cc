use serde::{Deserialize, Serialize};

/// Statement shapes offered by the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatementTemplate {
    Print,
    DeclareInt,
    DeclareDouble,
    DeclareBoolean,
    DeclareString,
    DeclareArray,
    If,
    While,
    For,
    DoWhile,
    FunctionCall,
    Break,
    Continue,
    Return,
    Comment,
    DeclareEnum,
    Assignment,
    ReadLine,
    ReadInt,
    ReadDouble,
    Switch,
    Wait,
}

/// Expression shapes offered by the palette. Rendering depends on the type
/// expected at the target position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExpressionTemplate {
    Text,
    Number,
    True,
    False,
    Variable {
        #[serde(default)]
        name: Option<String>,
    },
    FunctionCall {
        #[serde(default)]
        name: Option<String>,
    },
    List,
    EnumConstant,
    Binary {
        operator: String,
    },
    /// Canonical default for the expected type.
    Default,
    /// Caller-supplied expression, checked before splicing.
    Raw {
        code: String,
    },
}

/// A literal typed in by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LiteralInput {
    Text(String),
    Char(String),
    Number(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

/// One structural change.
///
/// `T` is the target reference: a block id at the UI boundary, a
/// generation-checked node reference inside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum EditCommand<T> {
    /// Insert a templated statement into a body before item `index`.
    InsertStatement {
        target: T,
        index: usize,
        template: StatementTemplate,
    },
    InsertCode {
        target: T,
        index: usize,
        code: String,
    },
    DeleteStatement {
        target: T,
    },
    MoveStatement {
        target: T,
        destination: T,
        index: usize,
    },
    /// Remove a statement, member, list element or enum constant.
    DeleteNode {
        target: T,
    },
    ReplaceExpression {
        target: T,
        template: ExpressionTemplate,
    },
    ReplaceLiteral {
        target: T,
        value: LiteralInput,
    },
    RenameIdentifier {
        target: T,
        name: String,
    },
    /// Rename a declaration; local variables and parameters also rename
    /// their uses in the enclosing method.
    RenameDeclaration {
        target: T,
        name: String,
    },
    ChangeOperator {
        target: T,
        operator: String,
    },
    ChangeDeclaredType {
        target: T,
        type_name: String,
    },
    SetInitializer {
        target: T,
        template: ExpressionTemplate,
    },
    AddListElement {
        target: T,
        #[serde(default)]
        index: Option<usize>,
        #[serde(default)]
        template: Option<ExpressionTemplate>,
    },
    RemoveListElement {
        target: T,
        index: usize,
    },
    AddArgument {
        target: T,
        template: ExpressionTemplate,
    },
    RemoveArgument {
        target: T,
        index: usize,
    },
    /// Retarget a call; arguments are trimmed or padded with defaults to
    /// match `parameter_types`.
    UpdateCall {
        target: T,
        #[serde(default)]
        scope: Option<String>,
        name: String,
        parameter_types: Vec<String>,
    },
    AddEnum {
        target: T,
        name: String,
        #[serde(default)]
        constants: Vec<String>,
    },
    AddEnumConstant {
        target: T,
        name: String,
    },
    RemoveEnumConstant {
        target: T,
        index: usize,
    },
    RenameEnumConstant {
        target: T,
        index: usize,
        name: String,
    },
    AddMethod {
        target: T,
        name: String,
        return_type: String,
        #[serde(default)]
        index: Option<usize>,
    },
    AddParameter {
        target: T,
        type_name: String,
        name: String,
    },
    RemoveParameter {
        target: T,
        index: usize,
    },
    RenameParameter {
        target: T,
        index: usize,
        name: String,
    },
    SetReturnType {
        target: T,
        type_name: String,
    },
    /// Set or clear the value of a `return` statement.
    SetReturnValue {
        target: T,
        #[serde(default)]
        template: Option<ExpressionTemplate>,
    },
    AddElse {
        target: T,
    },
    RemoveElse {
        target: T,
    },
    ConvertElseToElseIf {
        target: T,
    },
    AddSwitchCase {
        target: T,
    },
    MoveSwitchCase {
        target: T,
        direction: MoveDirection,
    },
    UpdateComment {
        target: T,
        text: String,
    },
}

impl<T> EditCommand<T> {
    pub fn name(&self) -> &'static str {
        match self {
            EditCommand::InsertStatement { .. } => "insert-statement",
            EditCommand::InsertCode { .. } => "insert-code",
            EditCommand::DeleteStatement { .. } => "delete-statement",
            EditCommand::MoveStatement { .. } => "move-statement",
            EditCommand::DeleteNode { .. } => "delete-node",
            EditCommand::ReplaceExpression { .. } => "replace-expression",
            EditCommand::ReplaceLiteral { .. } => "replace-literal",
            EditCommand::RenameIdentifier { .. } => "rename-identifier",
            EditCommand::RenameDeclaration { .. } => "rename-declaration",
            EditCommand::ChangeOperator { .. } => "change-operator",
            EditCommand::ChangeDeclaredType { .. } => "change-declared-type",
            EditCommand::SetInitializer { .. } => "set-initializer",
            EditCommand::AddListElement { .. } => "add-list-element",
            EditCommand::RemoveListElement { .. } => "remove-list-element",
            EditCommand::AddArgument { .. } => "add-argument",
            EditCommand::RemoveArgument { .. } => "remove-argument",
            EditCommand::UpdateCall { .. } => "update-call",
            EditCommand::AddEnum { .. } => "add-enum",
            EditCommand::AddEnumConstant { .. } => "add-enum-constant",
            EditCommand::RemoveEnumConstant { .. } => "remove-enum-constant",
            EditCommand::RenameEnumConstant { .. } => "rename-enum-constant",
            EditCommand::AddMethod { .. } => "add-method",
            EditCommand::AddParameter { .. } => "add-parameter",
            EditCommand::RemoveParameter { .. } => "remove-parameter",
            EditCommand::RenameParameter { .. } => "rename-parameter",
            EditCommand::SetReturnType { .. } => "set-return-type",
            EditCommand::SetReturnValue { .. } => "set-return-value",
            EditCommand::AddElse { .. } => "add-else",
            EditCommand::RemoveElse { .. } => "remove-else",
            EditCommand::ConvertElseToElseIf { .. } => "convert-else-to-else-if",
            EditCommand::AddSwitchCase { .. } => "add-switch-case",
            EditCommand::MoveSwitchCase { .. } => "move-switch-case",
            EditCommand::UpdateComment { .. } => "update-comment",
        }
    }

    /// The primary target.
    pub fn target(&self) -> &T {
        match self {
            EditCommand::InsertStatement { target, .. }
            | EditCommand::InsertCode { target, .. }
            | EditCommand::DeleteStatement { target }
            | EditCommand::MoveStatement { target, .. }
            | EditCommand::DeleteNode { target }
            | EditCommand::ReplaceExpression { target, .. }
            | EditCommand::ReplaceLiteral { target, .. }
            | EditCommand::RenameIdentifier { target, .. }
            | EditCommand::RenameDeclaration { target, .. }
            | EditCommand::ChangeOperator { target, .. }
            | EditCommand::ChangeDeclaredType { target, .. }
            | EditCommand::SetInitializer { target, .. }
            | EditCommand::AddListElement { target, .. }
            | EditCommand::RemoveListElement { target, .. }
            | EditCommand::AddArgument { target, .. }
            | EditCommand::RemoveArgument { target, .. }
            | EditCommand::UpdateCall { target, .. }
            | EditCommand::AddEnum { target, .. }
            | EditCommand::AddEnumConstant { target, .. }
            | EditCommand::RemoveEnumConstant { target, .. }
            | EditCommand::RenameEnumConstant { target, .. }
            | EditCommand::AddMethod { target, .. }
            | EditCommand::AddParameter { target, .. }
            | EditCommand::RemoveParameter { target, .. }
            | EditCommand::RenameParameter { target, .. }
            | EditCommand::SetReturnType { target, .. }
            | EditCommand::SetReturnValue { target, .. }
            | EditCommand::AddElse { target }
            | EditCommand::RemoveElse { target }
            | EditCommand::ConvertElseToElseIf { target }
            | EditCommand::AddSwitchCase { target }
            | EditCommand::MoveSwitchCase { target, .. }
            | EditCommand::UpdateComment { target, .. } => target,
        }
    }

    /// Translate every target reference, failing on the first that does
    /// not resolve.
    pub fn try_map_targets<U, E>(
        self,
        mut map: impl FnMut(T) -> Result<U, E>,
    ) -> Result<EditCommand<U>, E> {
        Ok(match self {
            EditCommand::InsertStatement {
                target,
                index,
                template,
            } => EditCommand::InsertStatement {
                target: map(target)?,
                index,
                template,
            },
            EditCommand::InsertCode {
                target,
                index,
                code,
            } => EditCommand::InsertCode {
                target: map(target)?,
                index,
                code,
            },
            EditCommand::DeleteStatement { target } => EditCommand::DeleteStatement {
                target: map(target)?,
            },
            EditCommand::MoveStatement {
                target,
                destination,
                index,
            } => EditCommand::MoveStatement {
                target: map(target)?,
                destination: map(destination)?,
                index,
            },
            EditCommand::DeleteNode { target } => EditCommand::DeleteNode {
                target: map(target)?,
            },
            EditCommand::ReplaceExpression { target, template } => {
                EditCommand::ReplaceExpression {
                    target: map(target)?,
                    template,
                }
            }
            EditCommand::ReplaceLiteral { target, value } => EditCommand::ReplaceLiteral {
                target: map(target)?,
                value,
            },
            EditCommand::RenameIdentifier { target, name } => EditCommand::RenameIdentifier {
                target: map(target)?,
                name,
            },
            EditCommand::RenameDeclaration { target, name } => EditCommand::RenameDeclaration {
                target: map(target)?,
                name,
            },
            EditCommand::ChangeOperator { target, operator } => EditCommand::ChangeOperator {
                target: map(target)?,
                operator,
            },
            EditCommand::ChangeDeclaredType { target, type_name } => {
                EditCommand::ChangeDeclaredType {
                    target: map(target)?,
                    type_name,
                }
            }
            EditCommand::SetInitializer { target, template } => EditCommand::SetInitializer {
                target: map(target)?,
                template,
            },
            EditCommand::AddListElement {
                target,
                index,
                template,
            } => EditCommand::AddListElement {
                target: map(target)?,
                index,
                template,
            },
            EditCommand::RemoveListElement { target, index } => EditCommand::RemoveListElement {
                target: map(target)?,
                index,
            },
            EditCommand::AddArgument { target, template } => EditCommand::AddArgument {
                target: map(target)?,
                template,
            },
            EditCommand::RemoveArgument { target, index } => EditCommand::RemoveArgument {
                target: map(target)?,
                index,
            },
            EditCommand::UpdateCall {
                target,
                scope,
                name,
                parameter_types,
            } => EditCommand::UpdateCall {
                target: map(target)?,
                scope,
                name,
                parameter_types,
            },
            EditCommand::AddEnum {
                target,
                name,
                constants,
            } => EditCommand::AddEnum {
                target: map(target)?,
                name,
                constants,
            },
            EditCommand::AddEnumConstant { target, name } => EditCommand::AddEnumConstant {
                target: map(target)?,
                name,
            },
            EditCommand::RemoveEnumConstant { target, index } => {
                EditCommand::RemoveEnumConstant {
                    target: map(target)?,
                    index,
                }
            }
            EditCommand::RenameEnumConstant {
                target,
                index,
                name,
            } => EditCommand::RenameEnumConstant {
                target: map(target)?,
                index,
                name,
            },
            EditCommand::AddMethod {
                target,
                name,
                return_type,
                index,
            } => EditCommand::AddMethod {
                target: map(target)?,
                name,
                return_type,
                index,
            },
            EditCommand::AddParameter {
                target,
                type_name,
                name,
            } => EditCommand::AddParameter {
                target: map(target)?,
                type_name,
                name,
            },
            EditCommand::RemoveParameter { target, index } => EditCommand::RemoveParameter {
                target: map(target)?,
                index,
            },
            EditCommand::RenameParameter {
                target,
                index,
                name,
            } => EditCommand::RenameParameter {
                target: map(target)?,
                index,
                name,
            },
            EditCommand::SetReturnType { target, type_name } => EditCommand::SetReturnType {
                target: map(target)?,
                type_name,
            },
            EditCommand::SetReturnValue { target, template } => EditCommand::SetReturnValue {
                target: map(target)?,
                template,
            },
            EditCommand::AddElse { target } => EditCommand::AddElse {
                target: map(target)?,
            },
            EditCommand::RemoveElse { target } => EditCommand::RemoveElse {
                target: map(target)?,
            },
            EditCommand::ConvertElseToElseIf { target } => EditCommand::ConvertElseToElseIf {
                target: map(target)?,
            },
            EditCommand::AddSwitchCase { target } => EditCommand::AddSwitchCase {
                target: map(target)?,
            },
            EditCommand::MoveSwitchCase { target, direction } => EditCommand::MoveSwitchCase {
                target: map(target)?,
                direction,
            },
            EditCommand::UpdateComment { target, text } => EditCommand::UpdateComment {
                target: map(target)?,
                text,
            },
        })
    }
}
