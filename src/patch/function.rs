//! Function transformer: maps every integer literal of a definition body
//! through a formula in `x`.

use crate::cache::get_or_compile;
use crate::edit::Edit;
use crate::formula::Formula;
use crate::locate::{blank_comments, DefinitionKind};
use crate::patch::errors::PatchError;
use crate::patch::rounding::Rounding;
use crate::patch::write_edits;
use crate::source::Repository;
use std::path::PathBuf;
use tracing::debug;

const LITERAL_PATTERN: &str = r"\b\d+\b";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionOutcome {
    pub file: PathBuf,
    /// Number of literals rewritten
    pub literals: usize,
}

/// Replace each literal `n` in the body of `name` with `rounding(formula(n))`.
///
/// Every replacement is computed before anything is written; an evaluation
/// failure on any literal leaves the definition unchanged.
pub fn apply_function(
    repo: &mut Repository,
    name: &str,
    formula: &Formula,
    rounding: Rounding,
) -> Result<FunctionOutcome, PatchError> {
    let definition = repo.require_def(name, DefinitionKind::Variable)?;
    let file = repo
        .unit(definition.unit)
        .map(|unit| unit.path().to_path_buf())
        .ok_or(PatchError::UnknownUnit(definition.unit))?;
    let Some(body) = definition.body.clone() else {
        return Ok(FunctionOutcome { file, literals: 0 });
    };

    let literal = get_or_compile(LITERAL_PATTERN)?;
    let scan = blank_comments(&definition.text);
    let relative = body.start - definition.start..body.end - definition.start;

    let mut edits = Vec::new();
    for m in literal.find_iter(&scan[relative]) {
        let x = m.as_str().parse::<f64>().map_err(|_| PatchError::ValueNotFound {
            name: name.to_string(),
        })?;
        let y = formula.eval(x).map_err(|source| PatchError::FormulaEval {
            name: name.to_string(),
            formula: formula.source().to_string(),
            source,
        })?;
        let new = rounding
            .to_integer(y)
            .ok_or_else(|| PatchError::NonFiniteValue {
                name: name.to_string(),
                value: y,
            })?;

        let start = body.start + m.start();
        edits.push(Edit::new(
            file.clone(),
            start,
            start + m.len(),
            new.to_string(),
            m.as_str(),
        ));
    }

    let literals = edits.len();
    write_edits(repo, definition.unit, edits)?;
    debug!("{}: applied '{}' to {} literals", name, formula, literals);

    Ok(FunctionOutcome { file, literals })
}
