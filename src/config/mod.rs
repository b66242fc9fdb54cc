pub mod loader;
pub mod schema;

pub use loader::{
    candidate_paths, discover, load_from_path, load_from_str, ConfigError, LOCAL_CONFIG_FILE,
};
pub use schema::{
    EditorConfig, EntrySettings, HistorySettings, RewriteSettings, SugarSettings,
    ValidationError, ValidationIssue,
};
