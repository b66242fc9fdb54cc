use crate::sugar::InputAccessor;
use crate::syntax::{NodeId, NodePath};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a block within one build pass: `<kind>@<node path>`.
///
/// Ids are derived from structural paths, so an unchanged region usually
/// keeps its ids across rebuilds, but nothing guarantees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(slug: &str, path: &NodePath) -> Self {
        Self(format!("{slug}@{path}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The structural path encoded in the id.
    pub fn path(&self) -> Option<NodePath> {
        let (_, path) = self.0.split_once('@')?;
        path.parse().ok()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberKind {
    Int,
    Long,
    Float,
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    /// String contents without the surrounding quotes.
    Text(String),
    Char(String),
    Number { text: String, kind: NumberKind },
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorClass {
    Arithmetic,
    Comparison,
    Logical,
}

impl OperatorClass {
    pub fn of(operator: &str) -> Option<Self> {
        match operator {
            "+" | "-" | "*" | "/" | "%" => Some(Self::Arithmetic),
            "==" | "!=" | "<" | ">" | "<=" | ">=" => Some(Self::Comparison),
            "&&" | "||" => Some(Self::Logical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub type_name: String,
    pub name: String,
}

/// Semantic kind of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKind {
    Class {
        name: String,
    },
    Method {
        name: String,
        return_type: String,
        parameters: Vec<Parameter>,
        entry: bool,
    },
    Field {
        type_name: String,
        name: String,
    },
    DeclareEnum {
        name: String,
        constants: Vec<String>,
    },
    Body,
    Comment {
        text: String,
    },
    VariableDeclaration {
        type_name: String,
        name: String,
    },
    Assignment {
        operator: String,
    },
    Increment {
        operator: String,
        prefix: bool,
    },
    If,
    While,
    DoWhile,
    ForEach {
        type_name: String,
        variable: String,
    },
    Switch,
    SwitchCase {
        default: bool,
    },
    Break,
    Continue,
    Return,
    Print {
        newline: bool,
    },
    ReadInput {
        accessor: InputAccessor,
        type_name: String,
        name: String,
    },
    Wait,
    Literal {
        value: LiteralValue,
    },
    Identifier {
        name: String,
    },
    FieldAccess {
        field: String,
    },
    EnumConstant {
        enum_name: String,
        constant: String,
    },
    Binary {
        operator: String,
        class: OperatorClass,
    },
    Not,
    MethodCall {
        scope: Option<String>,
        name: String,
    },
    List,
}

impl BlockKind {
    pub fn slug(&self) -> &'static str {
        match self {
            BlockKind::Class { .. } => "class",
            BlockKind::Method { .. } => "method",
            BlockKind::Field { .. } => "field",
            BlockKind::DeclareEnum { .. } => "enum",
            BlockKind::Body => "body",
            BlockKind::Comment { .. } => "comment",
            BlockKind::VariableDeclaration { .. } => "var",
            BlockKind::Assignment { .. } => "assign",
            BlockKind::Increment { .. } => "incr",
            BlockKind::If => "if",
            BlockKind::While => "while",
            BlockKind::DoWhile => "do",
            BlockKind::ForEach { .. } => "foreach",
            BlockKind::Switch => "switch",
            BlockKind::SwitchCase { .. } => "case",
            BlockKind::Break => "break",
            BlockKind::Continue => "continue",
            BlockKind::Return => "return",
            BlockKind::Print { .. } => "print",
            BlockKind::ReadInput { .. } => "read",
            BlockKind::Wait => "wait",
            BlockKind::Literal { .. } => "lit",
            BlockKind::Identifier { .. } => "ident",
            BlockKind::FieldAccess { .. } => "field-access",
            BlockKind::EnumConstant { .. } => "enum-const",
            BlockKind::Binary { .. } => "binary",
            BlockKind::Not => "not",
            BlockKind::MethodCall { .. } => "call",
            BlockKind::List => "list",
        }
    }

    /// Blocks a debugger can stop on.
    pub fn is_statement(&self) -> bool {
        match self {
            BlockKind::Field { .. }
            | BlockKind::DeclareEnum { .. }
            | BlockKind::VariableDeclaration { .. }
            | BlockKind::Assignment { .. }
            | BlockKind::Increment { .. }
            | BlockKind::If
            | BlockKind::While
            | BlockKind::DoWhile
            | BlockKind::ForEach { .. }
            | BlockKind::Switch
            | BlockKind::SwitchCase { .. }
            | BlockKind::Break
            | BlockKind::Continue
            | BlockKind::Return
            | BlockKind::Print { .. }
            | BlockKind::ReadInput { .. }
            | BlockKind::Wait => true,
            BlockKind::Class { .. }
            | BlockKind::Method { .. }
            | BlockKind::Body
            | BlockKind::Comment { .. }
            | BlockKind::Literal { .. }
            | BlockKind::Identifier { .. }
            | BlockKind::FieldAccess { .. }
            | BlockKind::EnumConstant { .. }
            | BlockKind::Binary { .. }
            | BlockKind::Not
            | BlockKind::List => false,
            // A call is a statement only when it stands alone; the builder
            // gives statement-level calls the statement node.
            BlockKind::MethodCall { .. } => true,
        }
    }
}

/// A semantic unit mirroring one recognized syntax shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Originating syntax node; valid only for the tree it was built from.
    pub node: NodeId,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl Block {
    /// Pre-order search by id.
    pub fn find(&self, id: &BlockId) -> Option<&Block> {
        self.iter().find(|block| &block.id == id)
    }

    /// Pre-order iteration over this block and its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let block = stack.pop()?;
            stack.extend(block.children.iter().rev());
            Some(block)
        })
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, kind: BlockKind) -> Block {
        Block {
            id: BlockId::from(id),
            kind,
            node: NodeId(0),
            children: Vec::new(),
        }
    }

    #[test]
    fn ids_carry_their_path() {
        let path: NodePath = "0.3.1".parse().unwrap();
        let id = BlockId::new("if", &path);
        assert_eq!(id.as_str(), "if@0.3.1");
        assert_eq!(id.path(), Some(path));
    }

    #[test]
    fn find_walks_the_tree() {
        let mut body = leaf("body@0", BlockKind::Body);
        body.children.push(leaf("break@0.1", BlockKind::Break));
        body.children.push(leaf("continue@0.2", BlockKind::Continue));

        assert_eq!(body.count(), 3);
        let found = body.find(&BlockId::from("continue@0.2")).unwrap();
        assert_eq!(found.kind, BlockKind::Continue);
        assert!(body.find(&BlockId::from("missing@9")).is_none());
    }

    #[test]
    fn operator_classes() {
        assert_eq!(OperatorClass::of("%"), Some(OperatorClass::Arithmetic));
        assert_eq!(OperatorClass::of(">="), Some(OperatorClass::Comparison));
        assert_eq!(OperatorClass::of("||"), Some(OperatorClass::Logical));
        assert_eq!(OperatorClass::of("&"), None);
    }
}
