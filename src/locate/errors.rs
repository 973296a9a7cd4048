use crate::source::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("definition of '{name}' not found{}", did_you_mean(.suggestion))]
    DefinitionNotFound {
        name: String,
        suggestion: Option<String>,
    },

    #[error("index '{token}' is neither an integer nor a resolvable enum constant")]
    UnresolvedIndex { token: String },

    #[error("index '{token}' resolves to negative value {value}")]
    NegativeIndex { token: String, value: i64 },

    #[error("element {path:?} of '{name}' not found in its initializer")]
    ElementNotFound { name: String, path: Vec<usize> },

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Source(#[from] SourceError),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{}'?)", name),
        None => String::new(),
    }
}
