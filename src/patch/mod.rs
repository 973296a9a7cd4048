//! Source rewriting: value patches, function transforms and column
//! alignment.
//!
//! Every rewrite is expressed as verified [`Edit`]s against the owning
//! unit's current content, so a request either lands completely or leaves
//! the unit untouched.

pub mod align;
pub mod errors;
pub mod function;
pub mod rounding;
pub mod value;

pub use align::{align, align_definition, align_until_stable, AlignOutcome, MAX_ALIGN_PASSES};
pub use errors::PatchError;
pub use function::{apply_function, FunctionOutcome};
pub use rounding::Rounding;
pub use value::{value_pattern, Component, ValuePatch, ValuePatcher};

use crate::edit::Edit;
use crate::source::Repository;

/// Apply `edits` to one unit as a single batch and store the result.
pub(crate) fn write_edits(
    repo: &mut Repository,
    unit: usize,
    edits: Vec<Edit>,
) -> Result<(), PatchError> {
    let source = repo.unit_mut(unit).ok_or(PatchError::UnknownUnit(unit))?;
    let content = source.read()?.into_owned();
    let updated = Edit::apply_batch_to(&content, edits)?;
    if updated != content {
        source.write(updated)?;
    }
    Ok(())
}
