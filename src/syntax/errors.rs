use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("the Java grammar could not be loaded")]
    LanguageSet,

    #[error("parser returned no tree")]
    ParseFailed,

    #[error("source has {count} nodes, more than a tree can address")]
    TooManyNodes { count: usize },

    #[error("invalid tree-sitter query: {message}")]
    InvalidQuery { message: String },

    #[error("expected one declaration, found {count}")]
    AmbiguousMatch { count: usize },

    #[error("no matching declaration")]
    NoMatch,

    #[error("query has no capture named '{name}'")]
    CaptureNotFound { name: String },
}
