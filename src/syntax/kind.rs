//! Closed classification of the Java grammar's node kinds.
//!
//! Tree-sitter reports kinds as strings. Everything the block builder and
//! the rewrite engine react to gets its own variant; the rest collapse into
//! [`JavaKind::Other`] and are matched explicitly as a fidelity gap.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JavaKind {
    Program,
    PackageDeclaration,
    ImportDeclaration,
    ClassDeclaration,
    ClassBody,
    EnumDeclaration,
    EnumBody,
    EnumConstant,
    EnumBodyDeclarations,
    FieldDeclaration,
    MethodDeclaration,
    ConstructorDeclaration,
    FormalParameters,
    FormalParameter,
    VariableDeclarator,
    Modifiers,

    Block,
    LocalVariableDeclaration,
    ExpressionStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    EnhancedForStatement,
    SwitchExpression,
    SwitchBlock,
    SwitchBlockStatementGroup,
    SwitchRule,
    SwitchLabel,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
    TryStatement,
    CatchClause,
    FinallyClause,
    LabeledStatement,
    ThrowStatement,
    EmptyStatement,

    LineComment,
    BlockComment,

    MethodInvocation,
    ArgumentList,
    FieldAccess,
    BinaryExpression,
    UnaryExpression,
    UpdateExpression,
    AssignmentExpression,
    ParenthesizedExpression,
    ArrayCreationExpression,
    ArrayInitializer,
    ObjectCreationExpression,
    ArrayAccess,
    CastExpression,
    TernaryExpression,
    Identifier,
    This,

    StringLiteral,
    CharacterLiteral,
    IntegerLiteral,
    FloatLiteral,
    True,
    False,
    NullLiteral,

    TypeIdentifier,
    ScopedTypeIdentifier,
    GenericType,
    ArrayType,
    IntegralType,
    FloatingPointType,
    BooleanType,
    VoidType,
    Dimensions,

    Error,
    Other,
}

impl JavaKind {
    pub fn from_ts(kind: &str) -> Self {
        match kind {
            "program" => Self::Program,
            "package_declaration" => Self::PackageDeclaration,
            "import_declaration" => Self::ImportDeclaration,
            "class_declaration" => Self::ClassDeclaration,
            "class_body" => Self::ClassBody,
            "enum_declaration" => Self::EnumDeclaration,
            "enum_body" => Self::EnumBody,
            "enum_constant" => Self::EnumConstant,
            "enum_body_declarations" => Self::EnumBodyDeclarations,
            "field_declaration" => Self::FieldDeclaration,
            "method_declaration" => Self::MethodDeclaration,
            "constructor_declaration" => Self::ConstructorDeclaration,
            "formal_parameters" => Self::FormalParameters,
            "formal_parameter" => Self::FormalParameter,
            "variable_declarator" => Self::VariableDeclarator,
            "modifiers" => Self::Modifiers,
            "block" => Self::Block,
            "local_variable_declaration" => Self::LocalVariableDeclaration,
            "expression_statement" => Self::ExpressionStatement,
            "if_statement" => Self::IfStatement,
            "while_statement" => Self::WhileStatement,
            "do_statement" => Self::DoStatement,
            "for_statement" => Self::ForStatement,
            "enhanced_for_statement" => Self::EnhancedForStatement,
            "switch_expression" | "switch_statement" => Self::SwitchExpression,
            "switch_block" => Self::SwitchBlock,
            "switch_block_statement_group" => Self::SwitchBlockStatementGroup,
            "switch_rule" => Self::SwitchRule,
            "switch_label" => Self::SwitchLabel,
            "break_statement" => Self::BreakStatement,
            "continue_statement" => Self::ContinueStatement,
            "return_statement" => Self::ReturnStatement,
            "try_statement" => Self::TryStatement,
            "catch_clause" => Self::CatchClause,
            "finally_clause" => Self::FinallyClause,
            "labeled_statement" => Self::LabeledStatement,
            "throw_statement" => Self::ThrowStatement,
            ";" => Self::EmptyStatement,
            "line_comment" => Self::LineComment,
            "block_comment" => Self::BlockComment,
            "method_invocation" => Self::MethodInvocation,
            "argument_list" => Self::ArgumentList,
            "field_access" => Self::FieldAccess,
            "binary_expression" => Self::BinaryExpression,
            "unary_expression" => Self::UnaryExpression,
            "update_expression" => Self::UpdateExpression,
            "assignment_expression" => Self::AssignmentExpression,
            "parenthesized_expression" => Self::ParenthesizedExpression,
            "array_creation_expression" => Self::ArrayCreationExpression,
            "array_initializer" => Self::ArrayInitializer,
            "object_creation_expression" => Self::ObjectCreationExpression,
            "array_access" => Self::ArrayAccess,
            "cast_expression" => Self::CastExpression,
            "ternary_expression" => Self::TernaryExpression,
            "identifier" => Self::Identifier,
            "this" => Self::This,
            "string_literal" => Self::StringLiteral,
            "character_literal" => Self::CharacterLiteral,
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal" => Self::IntegerLiteral,
            "decimal_floating_point_literal" | "hex_floating_point_literal" => Self::FloatLiteral,
            "true" => Self::True,
            "false" => Self::False,
            "null_literal" => Self::NullLiteral,
            "type_identifier" => Self::TypeIdentifier,
            "scoped_type_identifier" => Self::ScopedTypeIdentifier,
            "generic_type" => Self::GenericType,
            "array_type" => Self::ArrayType,
            "integral_type" => Self::IntegralType,
            "floating_point_type" => Self::FloatingPointType,
            "boolean_type" => Self::BooleanType,
            "void_type" => Self::VoidType,
            "dimensions" => Self::Dimensions,
            "ERROR" => Self::Error,
            _ => Self::Other,
        }
    }

    pub fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::StringLiteral
                | Self::CharacterLiteral
                | Self::IntegerLiteral
                | Self::FloatLiteral
                | Self::True
                | Self::False
                | Self::NullLiteral
        )
    }

    /// Kinds that denote a type in declaration position.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Self::TypeIdentifier
                | Self::ScopedTypeIdentifier
                | Self::GenericType
                | Self::ArrayType
                | Self::IntegralType
                | Self::FloatingPointType
                | Self::BooleanType
                | Self::VoidType
        )
    }

    /// Kinds that may appear as an item of a statement list.
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::LocalVariableDeclaration
                | Self::ExpressionStatement
                | Self::IfStatement
                | Self::WhileStatement
                | Self::DoStatement
                | Self::ForStatement
                | Self::EnhancedForStatement
                | Self::SwitchExpression
                | Self::BreakStatement
                | Self::ContinueStatement
                | Self::ReturnStatement
                | Self::TryStatement
                | Self::LabeledStatement
                | Self::ThrowStatement
                | Self::EnumDeclaration
                | Self::ClassDeclaration
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_literal_variants_collapse() {
        assert_eq!(JavaKind::from_ts("decimal_integer_literal"), JavaKind::IntegerLiteral);
        assert_eq!(JavaKind::from_ts("hex_integer_literal"), JavaKind::IntegerLiteral);
    }

    #[test]
    fn unknown_kind_is_other() {
        assert_eq!(JavaKind::from_ts("lambda_expression"), JavaKind::Other);
        assert!(!JavaKind::Other.is_statement());
    }
}
