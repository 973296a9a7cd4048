//! Tune Patcher: writes tuned numeric constants back into C++ sources
//!
//! Finds a variable, array or enum definition by name, locates one element
//! of its (possibly nested) brace initializer, and replaces the integer
//! literal there while keeping the column width. A definition can also be
//! rewritten through a formula in `x`, or have its table columns aligned.
//!
//! # Architecture
//!
//! All rewrites compile down to a single primitive: [`Edit`], a verified
//! byte-span replacement. Locating the span is the job of [`locate`], which
//! scans a comment-blanked copy of each unit so offsets carry over to the
//! real text. Units live in a [`Repository`] that either buffers changes in
//! memory (diffable, saved at the end) or writes every change through.
//!
//! # Example
//!
//! ```
//! use tune_patcher::{Mode, Repository, Rounding, SourceUnit, Tuner, TunerConfig};
//!
//! let unit = SourceUnit::from_text("search.cpp", "int margin[2] = {100, 200};\n");
//! let repo = Repository::from_units("src", vec![unit]);
//! let mut tuner = Tuner::new(repo, TunerConfig::default(), Rounding::Round);
//!
//! let summary = tuner.run(Mode::Spsa, ["param: margin[1], best: 250, start: 200"]);
//! assert_eq!(summary.applied, 1);
//! ```

pub mod cache;
pub mod config;
pub mod edit;
pub mod formula;
pub mod locate;
pub mod patch;
pub mod request;
pub mod runner;
pub mod source;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, TunerConfig};
pub use edit::{Edit, EditError, EditVerification};
pub use formula::{Formula, FormulaError};
pub use locate::{DefinitionKind, DefinitionMatch, LocateError};
pub use patch::{PatchError, Rounding, ValuePatch};
pub use request::{Mode, Request, RequestError};
pub use runner::{BatchSummary, Outcome, Tuner};
pub use source::{Repository, SourceError, SourceUnit, WriteMode};
