//! Batch processing of request lines against one repository.

use crate::config::TunerConfig;
use crate::formula::Formula;
use crate::patch::{
    align_definition, apply_function, AlignOutcome, FunctionOutcome, PatchError, Rounding,
    ValuePatch, ValuePatcher,
};
use crate::request::{Mode, Request};
use crate::source::Repository;
use serde::Serialize;
use tracing::{debug, error, warn};

/// Counts reported after a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Requests that modified (or confirmed) their target
    pub applied: usize,
    /// Lines not in the mode's format
    pub invalid: usize,
    /// Requests that failed and were skipped
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Value(ValuePatch),
    Function(FunctionOutcome),
    Align(AlignOutcome),
}

/// Applies requests in input order; later requests see earlier edits.
pub struct Tuner {
    repo: Repository,
    config: TunerConfig,
    rounding: Rounding,
}

impl Tuner {
    pub fn new(repo: Repository, config: TunerConfig, rounding: Rounding) -> Self {
        Self {
            repo,
            config,
            rounding,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn into_repository(self) -> Repository {
        self.repo
    }

    /// Apply one request.
    pub fn apply(&mut self, request: &Request) -> Result<Outcome, PatchError> {
        match request {
            Request::Value(edit) => {
                let patcher =
                    ValuePatcher::new(&self.config.types, self.config.enums.numbering, self.rounding);
                patcher.apply(&mut self.repo, edit).map(Outcome::Value)
            }
            Request::Function(edit) => {
                let formula =
                    Formula::parse(&edit.formula).map_err(|source| PatchError::FormulaSyntax {
                        name: edit.name.clone(),
                        formula: edit.formula.clone(),
                        source,
                    })?;
                apply_function(&mut self.repo, &edit.name, &formula, self.rounding)
                    .map(Outcome::Function)
            }
            Request::Align { name } => align_definition(&mut self.repo, name).map(Outcome::Align),
        }
    }

    /// Parse and apply every line. A failing line is logged and counted;
    /// it never stops the batch.
    pub fn run<I, S>(&mut self, mode: Mode, lines: I) -> BatchSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut summary = BatchSummary::default();

        for line in lines {
            let line = line.as_ref().trim_end();
            if line.is_empty() {
                continue;
            }

            let request = match mode.parse_line(line) {
                Ok(Some(request)) => request,
                Ok(None) => {
                    warn!("skipping invalid {} input line: '{}'", mode, line);
                    summary.invalid += 1;
                    continue;
                }
                Err(e) => {
                    error!("failed to read input line '{}': {}", line, e);
                    summary.failed += 1;
                    continue;
                }
            };

            match self.apply(&request) {
                Ok(outcome) => {
                    debug!("{}: {:?}", request.target(), outcome);
                    summary.applied += 1;
                }
                Err(e) => {
                    error!("failed to process input line '{}': {}", line, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceUnit;

    const EVAL: &str = "\
enum PieceType { NO_PIECE_TYPE, PAWN, KNIGHT, BISHOP };

int Tempo = 28;
int margin[2] = {100, 200};
constexpr Score Mobility[2][4] = {
  { S(0, 0), S(1, 2), S(3, 4), S(5, 6) },
  { S(0, 0), S(7, 8), S(9, 10), S(11, 12) }
};
";

    fn tuner() -> Tuner {
        let repo = Repository::from_units("src", vec![SourceUnit::from_text("eval.cpp", EVAL)]);
        Tuner::new(repo, TunerConfig::default(), Rounding::Round)
    }

    fn text(tuner: &Tuner) -> String {
        tuner.repository().unit(0).unwrap().read().unwrap().into_owned()
    }

    #[test]
    fn spsa_batch_continues_past_failures() {
        let mut tuner = tuner();
        let summary = tuner.run(
            Mode::Spsa,
            [
                "param: margin[1], best: 249.6, start: 200",
                "not a tuning line",
                "param: Missing, best: 1, start: 2",
                "",
                "param: eMobility[1][KNIGHT], best: 22, start: 10",
                "param: Tempo, best: nope, start: 28",
            ],
        );

        assert_eq!(
            summary,
            BatchSummary {
                applied: 2,
                invalid: 1,
                failed: 2,
            }
        );
        let patched = text(&tuner);
        assert!(patched.contains("int margin[2] = {100, 250};"));
        assert!(patched.contains("S(9, 22)"));
        assert!(patched.contains("int Tempo = 28;"));
    }

    #[test]
    fn later_requests_see_earlier_edits() {
        let mut tuner = tuner();
        let summary = tuner.run(
            Mode::Spsa,
            [
                "param: Tempo, best: 1000, start: 28",
                "param: Tempo, best: 5, start: 1000",
            ],
        );
        assert_eq!(summary.applied, 2);
        assert!(text(&tuner).contains("int Tempo =   5;"));
    }

    #[test]
    fn function_mode_rejects_bad_formula() {
        let mut tuner = tuner();
        let summary = tuner.run(Mode::Function, ["margin ; x +", "margin ; x + 1"]);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.applied, 1);
        assert!(text(&tuner).contains("{101, 201}"));
    }

    #[test]
    fn align_mode() {
        let mut tuner = tuner();
        let summary = tuner.run(Mode::Align, ["Mobility"]);
        assert_eq!(summary.applied, 1);
        assert!(text(&tuner).contains("  { S(0, 0), S(1, 2), S(3,  4), S( 5,  6) },"));
    }
}
