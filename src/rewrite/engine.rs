use crate::config::EditorConfig;
use crate::rewrite::command::EditCommand;
use crate::rewrite::outcome::{RewriteFailure, RewriteOutcome};
use crate::rewrite::planner::{EngineSettings, Planner};
use crate::syntax::{NodeRef, SyntaxTree};
use crate::validate::{pooled, ValidationError};

/// Applies structural commands to source text.
///
/// The engine knows nothing about blocks: targets arrive as node references
/// for the tree being edited. A command that cannot be applied leaves the
/// text untouched and reports why.
#[derive(Debug, Clone)]
pub struct RewriteEngine {
    settings: EngineSettings,
}

impl Default for RewriteEngine {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl RewriteEngine {
    pub fn new(config: &EditorConfig) -> Self {
        let print_call = config
            .sugar
            .print_calls
            .first()
            .cloned()
            .unwrap_or_else(|| "System.out.println".to_string());
        Self {
            settings: EngineSettings {
                indent: config.rewrite.indent.clone(),
                validate: config.rewrite.validate,
                print_call,
                input_receiver: config.sugar.input_receiver.clone(),
                sleep_call: config.sugar.sleep_call.clone(),
            },
        }
    }

    pub fn apply(&self, tree: &SyntaxTree, command: &EditCommand<NodeRef>) -> RewriteOutcome {
        self.apply_batch(tree, std::slice::from_ref(command))
    }

    /// Apply several commands against the same tree as one rewrite. Either
    /// all of them land or the text is returned unchanged.
    pub fn apply_batch(&self, tree: &SyntaxTree, commands: &[EditCommand<NodeRef>]) -> RewriteOutcome {
        match self.rewrite(tree, commands) {
            Ok(text) => RewriteOutcome::Rewritten { text },
            Err(reason) => {
                tracing::warn!(
                    commands = commands.len(),
                    first = commands.first().map(EditCommand::name),
                    %reason,
                    "rewrite left text unchanged"
                );
                RewriteOutcome::Unchanged {
                    text: tree.source().to_string(),
                    reason,
                }
            }
        }
    }

    fn rewrite(
        &self,
        tree: &SyntaxTree,
        commands: &[EditCommand<NodeRef>],
    ) -> Result<String, RewriteFailure> {
        let mut planner = Planner::new(tree, &self.settings);
        for command in commands {
            let command = command
                .clone()
                .try_map_targets(|node| tree.resolve(node).ok_or(RewriteFailure::Stale))?;
            planner.plan(&command)?;
        }
        let text = planner.finish()?;

        if self.settings.validate && text != tree.source() {
            pooled::validate_edit(tree.source(), &text).map_err(|error| match error {
                ValidationError::ParseErrorIntroduced { count, .. } => {
                    RewriteFailure::ParseErrorIntroduced { count }
                }
                other => RewriteFailure::Parser(other.to_string()),
            })?;
        }

        tracing::debug!(
            commands = commands.len(),
            before = tree.source().len(),
            after = text.len(),
            "rewrite compiled"
        );
        Ok(text)
    }
}
