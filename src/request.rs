//! Input line formats for the three operating modes.

use crate::cache::get_or_compile;
use std::fmt;
use thiserror::Error;

const SPSA_PATTERN: &str = r"^\s*param: (?P<name>\w*)(?P<indices>[\[\]\w\s]*), best: (?P<new>[\w.+-]*), start: (?P<old>[\w.+-]*)";
const FUNCTION_PATTERN: &str = r"^\s*(?P<name>\S+)\s*;\s*(?P<func>.+?)\s*$";
const ALIGN_PATTERN: &str = r"^\s*(?P<name>\S+)\s*$";

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("invalid {field} value '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid request pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Operating mode; selects the input line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Tuning results: set one element to a tuned value
    Spsa,
    /// Apply a formula to every literal of a definition
    Function,
    /// Align the columns of a definition
    Align,
}

/// `param: <name>[<indices>], best: <new>, start: <old>`
#[derive(Debug, Clone, PartialEq)]
pub struct ValueEdit {
    /// Name including any `m`/`e` prefix
    pub name: String,
    /// Raw bracketed index text, e.g. `[2][KNIGHT]`
    pub indices: String,
    pub new_value: f64,
    pub old_value: f64,
}

impl ValueEdit {
    pub fn full_name(&self) -> String {
        format!("{}{}", self.name, self.indices.trim())
    }
}

/// `<name> ; <formula in x>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEdit {
    pub name: String,
    pub formula: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Value(ValueEdit),
    Function(FunctionEdit),
    Align { name: String },
}

impl Request {
    /// The name the request refers to, for log lines.
    pub fn target(&self) -> String {
        match self {
            Request::Value(edit) => edit.full_name(),
            Request::Function(edit) => edit.name.clone(),
            Request::Align { name } => name.clone(),
        }
    }
}

impl Mode {
    pub fn help_text(self) -> &'static str {
        match self {
            Mode::Spsa => {
                "Paste tuning results, one per line, then an empty line:\n  param: <name>[<indices>], best: <new>, start: <old>"
            }
            Mode::Function => {
                "Enter one function per line, then an empty line:\n  <name> ; <formula in x>   e.g. PawnBonus ; 2*x + 5"
            }
            Mode::Align => "Enter the definitions to align, one name per line, then an empty line:",
        }
    }

    /// Parse one input line. `Ok(None)` when the line does not have this
    /// mode's format.
    pub fn parse_line(self, line: &str) -> Result<Option<Request>, RequestError> {
        match self {
            Mode::Spsa => parse_value_edit(line),
            Mode::Function => {
                let re = get_or_compile(FUNCTION_PATTERN)?;
                Ok(re.captures(line).map(|caps| {
                    Request::Function(FunctionEdit {
                        name: caps["name"].to_string(),
                        formula: caps["func"].to_string(),
                    })
                }))
            }
            Mode::Align => {
                let re = get_or_compile(ALIGN_PATTERN)?;
                Ok(re.captures(line).map(|caps| Request::Align {
                    name: caps["name"].to_string(),
                }))
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Spsa => write!(f, "spsa"),
            Mode::Function => write!(f, "function"),
            Mode::Align => write!(f, "align"),
        }
    }
}

fn parse_value_edit(line: &str) -> Result<Option<Request>, RequestError> {
    let re = get_or_compile(SPSA_PATTERN)?;
    let Some(caps) = re.captures(line) else {
        return Ok(None);
    };
    if caps["name"].is_empty() {
        return Ok(None);
    }

    Ok(Some(Request::Value(ValueEdit {
        name: caps["name"].to_string(),
        indices: caps["indices"].to_string(),
        new_value: parse_number("best", &caps["new"])?,
        old_value: parse_number("start", &caps["old"])?,
    })))
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, RequestError> {
    value
        .parse::<f64>()
        .map_err(|_| RequestError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}
