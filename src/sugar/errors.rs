use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SugarError {
    #[error("sugar rule {rule} has an empty pattern")]
    EmptyPattern { rule: String },

    #[error("sugar rule {rule}: pattern {pattern:?} does not parse as Java")]
    UnparsablePattern { rule: String, pattern: String },
}
