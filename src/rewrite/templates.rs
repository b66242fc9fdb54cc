//! Source text for palette templates and typed-in literals.

use crate::blocks::OperatorClass;
use crate::rewrite::command::{ExpressionTemplate, LiteralInput, StatementTemplate};
use crate::rewrite::outcome::RewriteFailure;
use crate::rewrite::types::{default_value, EnumCatalog, TypeShape};
use crate::sugar::InputAccessor;
use crate::validate::{pooled, SnippetKind};

/// Rendered code plus the imports it relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub imports: Vec<&'static str>,
}

impl Rendered {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            imports: Vec::new(),
        }
    }

    fn typed(text: String, shape: &TypeShape) -> Self {
        Self {
            text,
            imports: shape.required_imports(),
        }
    }
}

/// Settings and surroundings that statement templates depend on.
pub struct TemplateContext<'a> {
    pub indent: &'a str,
    pub print_call: &'a str,
    pub input_receiver: &'a str,
    pub sleep_call: &'a str,
    /// Return type of the enclosing method, `None` when void or absent.
    pub return_type: Option<TypeShape>,
    pub enums: &'a EnumCatalog,
}

pub fn statement(template: StatementTemplate, ctx: &TemplateContext<'_>) -> Rendered {
    let u = ctx.indent;
    match template {
        StatementTemplate::Print => Rendered::plain(format!("{}(\"\");", ctx.print_call)),
        StatementTemplate::DeclareInt => Rendered::plain("int number = 0;"),
        StatementTemplate::DeclareDouble => Rendered::plain("double decimal = 0.0;"),
        StatementTemplate::DeclareBoolean => Rendered::plain("boolean flag = false;"),
        StatementTemplate::DeclareString => Rendered::plain("String text = \"\";"),
        StatementTemplate::DeclareArray => Rendered::plain("int[] myList = new int[]{0};"),
        StatementTemplate::If => Rendered::plain("if (true) {\n}"),
        StatementTemplate::While => Rendered::plain("while (true) {\n}"),
        StatementTemplate::For => Rendered::plain("for (String item : array) {\n}"),
        StatementTemplate::DoWhile => Rendered::plain("do {\n} while (true);"),
        StatementTemplate::FunctionCall => Rendered::plain("selectMethod();"),
        StatementTemplate::Break => Rendered::plain("break;"),
        StatementTemplate::Continue => Rendered::plain("continue;"),
        StatementTemplate::Return => match &ctx.return_type {
            Some(shape) => {
                Rendered::typed(format!("return {};", default_value(shape, ctx.enums)), shape)
            }
            None => Rendered::plain("return;"),
        },
        StatementTemplate::Comment => Rendered::plain("// Comment"),
        StatementTemplate::DeclareEnum => Rendered::plain("enum MyEnum { OPTION_A, OPTION_B }"),
        StatementTemplate::Assignment => Rendered::plain("variable = 0;"),
        StatementTemplate::ReadLine => read_input(InputAccessor::Line, "input", ctx),
        StatementTemplate::ReadInt => read_input(InputAccessor::Int, "number", ctx),
        StatementTemplate::ReadDouble => read_input(InputAccessor::Double, "decimal", ctx),
        StatementTemplate::Switch => Rendered::plain(format!(
            "switch (variable) {{\n{u}default:\n{u}{u}break;\n}}"
        )),
        StatementTemplate::Wait => Rendered::plain(format!(
            "try {{\n{u}{}(1000);\n}} catch (InterruptedException e) {{\n{u}e.printStackTrace();\n}}",
            ctx.sleep_call
        )),
    }
}

fn read_input(accessor: InputAccessor, name: &str, ctx: &TemplateContext<'_>) -> Rendered {
    Rendered {
        text: format!(
            "{} {name} = {}.{}();",
            accessor.value_type(),
            ctx.input_receiver,
            accessor.method()
        ),
        imports: vec!["java.util.Scanner"],
    }
}

/// Render an expression template for a position expecting `expected`.
pub fn expression(
    template: &ExpressionTemplate,
    expected: Option<&TypeShape>,
    enums: &EnumCatalog,
) -> Result<Rendered, RewriteFailure> {
    let rendered = match template {
        ExpressionTemplate::Text => Rendered::plain("\"text\""),
        ExpressionTemplate::Number => {
            let text = match expected.map(TypeShape::normalized_leaf) {
                Some("float") => "0.0f",
                Some("double") => "0.0",
                _ => "0",
            };
            Rendered::plain(text)
        }
        ExpressionTemplate::True => Rendered::plain("true"),
        ExpressionTemplate::False => Rendered::plain("false"),
        ExpressionTemplate::Variable { name } => {
            Rendered::plain(identifier(name.as_deref().unwrap_or("variable"))?)
        }
        ExpressionTemplate::FunctionCall { name } => {
            let name = identifier(name.as_deref().unwrap_or("selectMethod"))?;
            Rendered::plain(format!("{name}()"))
        }
        ExpressionTemplate::List => {
            let shape = match expected {
                Some(shape @ (TypeShape::Array(_) | TypeShape::List(_))) => shape.clone(),
                _ => TypeShape::List(Box::new(TypeShape::Scalar("int".to_string()))),
            };
            Rendered::typed(default_value(&shape, enums), &shape)
        }
        ExpressionTemplate::EnumConstant => {
            let constant = expected
                .and_then(|shape| enums.first_constant(shape.leaf()))
                .or_else(|| enums.any_constant())
                .ok_or_else(|| RewriteFailure::Precondition("no enum is declared".to_string()))?;
            Rendered::plain(constant)
        }
        ExpressionTemplate::Binary { operator } => {
            let right = match OperatorClass::of(operator) {
                Some(OperatorClass::Logical) => "true",
                Some(OperatorClass::Arithmetic | OperatorClass::Comparison) => "0",
                None => {
                    return Err(RewriteFailure::InvalidValue {
                        value: operator.clone(),
                        reason: "not a binary operator".to_string(),
                    })
                }
            };
            Rendered::plain(format!("variable {operator} {right}"))
        }
        ExpressionTemplate::Default => {
            let shape = expected.ok_or_else(|| {
                RewriteFailure::Precondition("no type is expected at this position".to_string())
            })?;
            Rendered::typed(default_value(shape, enums), shape)
        }
        ExpressionTemplate::Raw { code } => {
            let code = code.trim();
            if code.is_empty() {
                return Err(invalid(code, "empty expression"));
            }
            pooled::validate_snippet(code, SnippetKind::Expression)
                .map_err(|error| invalid(code, &error.to_string()))?;
            Rendered::plain(code)
        }
    };
    Ok(rendered)
}

/// Java source for a typed-in literal.
pub fn literal(value: &LiteralInput) -> Result<String, RewriteFailure> {
    match value {
        LiteralInput::Text(text) => Ok(format!("\"{}\"", escape(text, '"'))),
        LiteralInput::Char(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(format!("'{}'", escape(&c.to_string(), '\''))),
                _ => Err(invalid(text, "expected exactly one character")),
            }
        }
        LiteralInput::Number(text) => number(text),
        LiteralInput::Boolean(value) => Ok(value.to_string()),
        LiteralInput::Null => Ok("null".to_string()),
    }
}

fn number(text: &str) -> Result<String, RewriteFailure> {
    let text = text.trim();
    let digits = text
        .strip_suffix(['L', 'l', 'F', 'f', 'D', 'd'])
        .unwrap_or(text)
        .replace('_', "");
    let valid = digits.parse::<i64>().is_ok()
        || (digits.parse::<f64>().is_ok_and(f64::is_finite)
            && digits.chars().all(|c| c.is_ascii_digit() || ".-+eE".contains(c)));
    if valid {
        Ok(text.to_string())
    } else {
        Err(invalid(text, "not a number"))
    }
}

fn escape(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while",
];

/// Check `name` is a usable Java identifier and hand it back.
pub fn identifier(name: &str) -> Result<&str, RewriteFailure> {
    let mut chars = name.chars();
    let well_formed = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if well_formed && !KEYWORDS.contains(&name) {
        Ok(name)
    } else {
        Err(invalid(name, "not a valid identifier"))
    }
}

/// Check `name` parses as a Java type.
pub fn type_name(name: &str) -> Result<&str, RewriteFailure> {
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid(name, "empty type"));
    }
    pooled::validate_snippet(name, SnippetKind::Type)
        .map(|()| name)
        .map_err(|error| invalid(name, &error.to_string()))
}

pub(crate) fn invalid(value: &str, reason: &str) -> RewriteFailure {
    RewriteFailure::InvalidValue {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
