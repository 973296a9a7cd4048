use crate::config::ValueShape;
use crate::edit::EditError;
use crate::formula::FormulaError;
use crate::locate::LocateError;
use crate::source::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("{name}: unknown type '{declared}'")]
    UnknownType { name: String, declared: String },

    #[error("{name}: declared type '{declared}' holds {shape} values, which does not fit prefix '{prefix}'")]
    ShapeMismatch {
        name: String,
        declared: String,
        shape: ValueShape,
        prefix: char,
    },

    #[error("{name}: no value found at the requested element")]
    ValueNotFound { name: String },

    #[error("{name}: definition '{symbol}' can not be handled")]
    UnhandledSymbol { name: String, symbol: String },

    #[error("{name}: enum constant '{symbol}' has no explicit value to replace")]
    ImplicitEnumValue { name: String, symbol: String },

    #[error("{name}: value {value} does not round to an integer")]
    NonFiniteValue { name: String, value: f64 },

    #[error("{name}: function '{formula}' could not be parsed: {source}")]
    FormulaSyntax {
        name: String,
        formula: String,
        source: FormulaError,
    },

    #[error("{name}: failed to apply function '{formula}': {source}")]
    FormulaEval {
        name: String,
        formula: String,
        source: FormulaError,
    },

    #[error("invalid value pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("source unit #{0} does not exist")]
    UnknownUnit(usize),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Source(#[from] SourceError),
}
