//! Declarative sugar rules.
//!
//! A rule is an ast-grep pattern describing a call shape plus the block it
//! turns into. Rules are tried in order; the first rule whose pattern covers
//! a call node claims it. The block builder consults the resulting
//! [`SugarIndex`] by span while it walks the arena.

use crate::config::SugarSettings;
use crate::sugar::errors::SugarError;
use crate::sugar::matcher::{is_valid_pattern, CallMatcher};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

/// Which scanner accessor a read-input declaration uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAccessor {
    Line,
    Int,
    Double,
}

impl InputAccessor {
    pub const ALL: [InputAccessor; 3] = [InputAccessor::Line, InputAccessor::Int, InputAccessor::Double];

    pub fn method(self) -> &'static str {
        match self {
            InputAccessor::Line => "nextLine",
            InputAccessor::Int => "nextInt",
            InputAccessor::Double => "nextDouble",
        }
    }

    /// Declared type of the variable the accessor feeds.
    pub fn value_type(self) -> &'static str {
        match self {
            InputAccessor::Line => "String",
            InputAccessor::Int => "int",
            InputAccessor::Double => "double",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SugarKind {
    Print { newline: bool },
    ReadInput(InputAccessor),
    Sleep,
}

#[derive(Debug, Clone)]
pub struct SugarRule {
    pub name: String,
    pub pattern: String,
    pub kind: SugarKind,
}

/// Ordered rule table.
#[derive(Debug, Clone)]
pub struct SugarRules {
    rules: Vec<SugarRule>,
}

impl SugarRules {
    pub fn from_settings(settings: &SugarSettings) -> Self {
        let mut rules = Vec::new();

        for call in &settings.print_calls {
            rules.push(SugarRule {
                name: format!("print:{call}"),
                pattern: format!("{call}($$$ARGS)"),
                kind: SugarKind::Print {
                    newline: call.ends_with("println"),
                },
            });
        }

        for accessor in InputAccessor::ALL {
            rules.push(SugarRule {
                name: format!("read:{}", accessor.method()),
                pattern: format!("{}.{}()", settings.input_receiver, accessor.method()),
                kind: SugarKind::ReadInput(accessor),
            });
        }

        rules.push(SugarRule {
            name: format!("sleep:{}", settings.sleep_call),
            pattern: format!("{}($MS)", settings.sleep_call),
            kind: SugarKind::Sleep,
        });

        Self { rules }
    }

    pub fn rules(&self) -> &[SugarRule] {
        &self.rules
    }

    /// Reject rules whose patterns could never match.
    pub fn check(&self) -> Result<(), SugarError> {
        for rule in &self.rules {
            if rule.pattern.trim().is_empty() {
                return Err(SugarError::EmptyPattern {
                    rule: rule.name.clone(),
                });
            }
            if !is_valid_pattern(&rule.pattern) {
                return Err(SugarError::UnparsablePattern {
                    rule: rule.name.clone(),
                    pattern: rule.pattern.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for SugarRules {
    fn default() -> Self {
        Self::from_settings(&SugarSettings::default())
    }
}

/// Call spans claimed by sugar rules for one source buffer.
#[derive(Debug, Clone, Default)]
pub struct SugarIndex {
    calls: HashMap<(usize, usize), SugarKind>,
}

impl SugarIndex {
    pub fn scan(source: &str, rules: &SugarRules) -> Result<Self, SugarError> {
        rules.check()?;
        let matcher = CallMatcher::new(source);
        let mut calls = HashMap::new();

        for rule in rules.rules() {
            for found in matcher.calls(&rule.pattern) {
                calls
                    .entry((found.span.start, found.span.end))
                    .or_insert(rule.kind);
            }
        }

        tracing::trace!(claimed = calls.len(), "sugar scan complete");
        Ok(Self { calls })
    }

    /// Sugar claimed by the call node spanning exactly `span`.
    pub fn call_at(&self, span: &Range<usize>) -> Option<SugarKind> {
        self.calls.get(&(span.start, span.end)).copied()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
