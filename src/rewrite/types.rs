//! Declared-type shapes and the values that fill them.

use std::collections::HashMap;
use std::fmt;

/// Container structure of a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Scalar(String),
    Array(Box<TypeShape>),
    /// `ArrayList<T>` or `List<T>`.
    List(Box<TypeShape>),
}

const LIST_TYPES: [&str; 2] = ["ArrayList", "List"];

impl TypeShape {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(inner) = text.strip_suffix("[]") {
            return TypeShape::Array(Box::new(Self::parse(inner)));
        }
        for container in LIST_TYPES {
            let inner = text
                .strip_prefix(container)
                .map(str::trim_start)
                .and_then(|rest| rest.strip_prefix('<'))
                .and_then(|rest| rest.strip_suffix('>'));
            if let Some(inner) = inner {
                return TypeShape::List(Box::new(Self::parse(inner)));
            }
        }
        TypeShape::Scalar(text.to_string())
    }

    /// Scalar type at the bottom of the container nesting.
    pub fn leaf(&self) -> &str {
        match self {
            TypeShape::Scalar(name) => name,
            TypeShape::Array(inner) | TypeShape::List(inner) => inner.leaf(),
        }
    }

    /// Leaf type with wrapper classes folded onto their primitives.
    pub fn normalized_leaf(&self) -> &str {
        unboxed(self.leaf())
    }

    /// Type of one element, for containers.
    pub fn element(&self) -> Option<&TypeShape> {
        match self {
            TypeShape::Scalar(_) => None,
            TypeShape::Array(inner) | TypeShape::List(inner) => Some(inner),
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self.normalized_leaf(), "double" | "float")
    }

    pub fn contains_list(&self) -> bool {
        match self {
            TypeShape::Scalar(_) => false,
            TypeShape::List(_) => true,
            TypeShape::Array(inner) => inner.contains_list(),
        }
    }

    /// Imports a value of this shape needs.
    pub fn required_imports(&self) -> Vec<&'static str> {
        if self.contains_list() {
            vec!["java.util.ArrayList", "java.util.List"]
        } else {
            Vec::new()
        }
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Scalar(name) => f.write_str(name),
            TypeShape::Array(inner) => write!(f, "{inner}[]"),
            TypeShape::List(inner) => match inner.as_ref() {
                TypeShape::Scalar(name) => write!(f, "ArrayList<{}>", boxed(name)),
                other => write!(f, "ArrayList<{other}>"),
            },
        }
    }
}

fn unboxed(name: &str) -> &str {
    match name {
        "Integer" => "int",
        "Double" => "double",
        "Float" => "float",
        "Long" => "long",
        "Short" => "short",
        "Byte" => "byte",
        "Boolean" => "boolean",
        "Character" => "char",
        other => other,
    }
}

fn boxed(name: &str) -> &str {
    match name {
        "int" => "Integer",
        "double" => "Double",
        "float" => "Float",
        "long" => "Long",
        "short" => "Short",
        "byte" => "Byte",
        "boolean" => "Boolean",
        "char" => "Character",
        other => other,
    }
}

/// First declared constant of every enum in a file.
#[derive(Debug, Clone, Default)]
pub struct EnumCatalog {
    first_constants: HashMap<String, String>,
    order: Vec<String>,
}

impl EnumCatalog {
    pub fn insert(&mut self, name: impl Into<String>, first: impl Into<String>) {
        let name = name.into();
        if !self.first_constants.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.first_constants.insert(name, first.into());
    }

    /// `Enum.FIRST` for a known enum with at least one constant.
    pub fn first_constant(&self, name: &str) -> Option<String> {
        self.first_constants
            .get(name)
            .map(|constant| format!("{name}.{constant}"))
    }

    /// First constant of the first enum declared in the file.
    pub fn any_constant(&self) -> Option<String> {
        self.order.first().and_then(|name| self.first_constant(name))
    }
}

/// Canonical default for a declared type.
pub fn default_value(shape: &TypeShape, enums: &EnumCatalog) -> String {
    match shape {
        TypeShape::Scalar(name) => scalar_default(name, enums),
        TypeShape::Array(_) => format!("new {shape}{}", array_initializer(shape, enums)),
        TypeShape::List(inner) => {
            format!("new ArrayList<>(List.of({}))", default_value(inner, enums))
        }
    }
}

fn array_initializer(shape: &TypeShape, enums: &EnumCatalog) -> String {
    match shape {
        TypeShape::Array(inner) => format!("{{{}}}", array_initializer(inner, enums)),
        other => default_value(other, enums),
    }
}

fn scalar_default(name: &str, enums: &EnumCatalog) -> String {
    match unboxed(name) {
        "int" | "long" | "short" | "byte" => "0".to_string(),
        "double" => "0.0".to_string(),
        "float" => "0.0f".to_string(),
        "boolean" => "false".to_string(),
        "char" => "'a'".to_string(),
        "String" => "\"\"".to_string(),
        other => enums
            .first_constant(other)
            .unwrap_or_else(|| "null".to_string()),
    }
}

/// Re-wrap leaf expressions into `shape`, keeping their order.
pub fn wrap_leaves(shape: &TypeShape, leaves: &[String], enums: &EnumCatalog) -> String {
    match shape {
        TypeShape::Scalar(_) => leaves
            .first()
            .cloned()
            .unwrap_or_else(|| default_value(shape, enums)),
        TypeShape::Array(_) => format!("new {shape}{}", leaf_initializer(shape, leaves)),
        TypeShape::List(inner) => {
            let elements = match inner.as_ref() {
                TypeShape::Scalar(_) => leaves.join(", "),
                nested => wrap_leaves(nested, leaves, enums),
            };
            format!("new ArrayList<>(List.of({elements}))")
        }
    }
}

fn leaf_initializer(shape: &TypeShape, leaves: &[String]) -> String {
    match shape {
        TypeShape::Array(inner) if matches!(inner.as_ref(), TypeShape::Array(_)) => {
            format!("{{{}}}", leaf_initializer(inner, leaves))
        }
        _ => format!("{{{}}}", leaves.join(", ")),
    }
}
