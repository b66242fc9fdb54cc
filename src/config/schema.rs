use serde::Deserialize;
use std::fmt;

/// Session configuration, usually read from `.blockwright.toml`.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub entry: EntrySettings,
    pub sugar: SugarSettings,
    pub rewrite: RewriteSettings,
    pub history: HistorySettings,
}

/// Which declaration the block tree is rooted at.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EntrySettings {
    /// Class to root the tree at; the first top-level type when unset.
    pub class: Option<String>,
    /// Method flagged as the program entry point.
    pub method: String,
    /// Build an empty tree when the entry method is absent.
    pub require_method: bool,
}

impl Default for EntrySettings {
    fn default() -> Self {
        Self {
            class: None,
            method: "main".to_string(),
            require_method: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SugarSettings {
    /// Qualified calls rendered as Print blocks.
    pub print_calls: Vec<String>,
    /// Variable name whose `nextLine`/`nextInt`/`nextDouble` calls are input reads.
    pub input_receiver: String,
    /// Qualified single-argument call recognized inside Wait blocks.
    pub sleep_call: String,
}

impl Default for SugarSettings {
    fn default() -> Self {
        Self {
            print_calls: vec![
                "System.out.println".to_string(),
                "System.out.print".to_string(),
            ],
            input_receiver: "scanner".to_string(),
            sleep_call: "Thread.sleep".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteSettings {
    /// One level of indentation for synthesized code.
    pub indent: String,
    /// Reject rewrites that introduce parse errors.
    pub validate: bool,
}

impl Default for RewriteSettings {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            validate: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HistorySettings {
    pub limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { limit: 50 }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if let Some(class) = &self.entry.class {
            if !is_identifier(class) {
                issues.push(ValidationIssue::InvalidIdentifier {
                    field: "entry.class",
                    value: class.clone(),
                });
            }
        }
        if !is_identifier(&self.entry.method) {
            issues.push(ValidationIssue::InvalidIdentifier {
                field: "entry.method",
                value: self.entry.method.clone(),
            });
        }

        if self.sugar.print_calls.is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "sugar.print_calls",
            });
        }
        for call in &self.sugar.print_calls {
            if !is_qualified_call(call) {
                issues.push(ValidationIssue::InvalidCallPath {
                    field: "sugar.print_calls",
                    value: call.clone(),
                });
            }
        }
        if !is_identifier(&self.sugar.input_receiver) {
            issues.push(ValidationIssue::InvalidIdentifier {
                field: "sugar.input_receiver",
                value: self.sugar.input_receiver.clone(),
            });
        }
        if !is_qualified_call(&self.sugar.sleep_call) {
            issues.push(ValidationIssue::InvalidCallPath {
                field: "sugar.sleep_call",
                value: self.sugar.sleep_call.clone(),
            });
        }

        if self.rewrite.indent.is_empty()
            || !self.rewrite.indent.chars().all(|c| c == ' ' || c == '\t')
        {
            issues.push(ValidationIssue::InvalidIndent {
                value: self.rewrite.indent.clone(),
            });
        }

        if self.history.limit == 0 {
            issues.push(ValidationIssue::ZeroHistory);
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// `Qualifier.method`, with any number of dotted segments before the method.
fn is_qualified_call(value: &str) -> bool {
    let segments: Vec<&str> = value.split('.').collect();
    segments.len() >= 2 && segments.iter().all(|segment| is_identifier(segment))
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    InvalidIdentifier { field: &'static str, value: String },
    InvalidCallPath { field: &'static str, value: String },
    InvalidIndent { value: String },
    ZeroHistory,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "required field '{field}' is empty")
            }
            ValidationIssue::InvalidIdentifier { field, value } => {
                write!(f, "'{field}' must be a Java identifier, got '{value}'")
            }
            ValidationIssue::InvalidCallPath { field, value } => write!(
                f,
                "'{field}' must look like 'Qualifier.method', got '{value}'"
            ),
            ValidationIssue::InvalidIndent { value } => write!(
                f,
                "'rewrite.indent' must be non-empty spaces or tabs, got {value:?}"
            ),
            ValidationIssue::ZeroHistory => write!(f, "'history.limit' must be at least 1"),
        }
    }
}
