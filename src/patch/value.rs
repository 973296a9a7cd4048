//! Value patcher: rewrites the integer literal of one initializer element.

use crate::cache::get_or_compile;
use crate::config::{EnumNumbering, TypeSettings, ValueShape};
use crate::edit::Edit;
use crate::locate::{
    blank_comments, element_span, find_index, parse_indices, DefinitionKind, DefinitionMatch,
    LocateError,
};
use crate::patch::errors::PatchError;
use crate::patch::rounding::Rounding;
use crate::patch::write_edits;
use crate::request::ValueEdit;
use crate::source::Repository;
use std::ops::Range;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Which part of a slot a request targets, taken from the name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// Whole value (`v`)
    Value,
    /// First argument of a paired constructor (`m`)
    Midgame,
    /// Second argument of a paired constructor (`e`)
    Endgame,
}

impl Component {
    pub fn prefix(self) -> char {
        match self {
            Component::Value => 'v',
            Component::Midgame => 'm',
            Component::Endgame => 'e',
        }
    }

    fn group(self) -> &'static str {
        match self {
            Component::Value => "v",
            Component::Midgame => "m",
            Component::Endgame => "e",
        }
    }

    fn is_half(self) -> bool {
        self != Component::Value
    }
}

/// Result of one successful value patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePatch {
    /// File that was rewritten
    pub file: PathBuf,
    /// Value found in the source
    pub old: i64,
    /// Value the request expected to find
    pub expected_old: i64,
    pub new: i64,
    /// Enum constant patched instead of the array slot, if any
    pub via_enum: Option<String>,
    /// The new literal is wider than the one it replaced
    pub widened: bool,
}

/// Byte span of the literal to replace, absolute within its unit.
struct Slot {
    unit: usize,
    start: usize,
    literal: String,
    via_enum: Option<String>,
}

pub struct ValuePatcher<'a> {
    types: &'a TypeSettings,
    numbering: EnumNumbering,
    rounding: Rounding,
}

impl<'a> ValuePatcher<'a> {
    pub fn new(types: &'a TypeSettings, numbering: EnumNumbering, rounding: Rounding) -> Self {
        Self {
            types,
            numbering,
            rounding,
        }
    }

    /// Patch the element named by `edit`. Nothing is written on error.
    pub fn apply(&self, repo: &mut Repository, edit: &ValueEdit) -> Result<ValuePatch, PatchError> {
        let full_name = edit.full_name();
        let (component, definition) = resolve_target(repo, &edit.name)?;
        let path = parse_indices(repo, &edit.indices, self.numbering)?;

        let declared = definition.declared_type.clone().unwrap_or_default();
        let shape = self
            .types
            .shape_of(&declared)
            .ok_or_else(|| PatchError::UnknownType {
                name: full_name.clone(),
                declared: declared.clone(),
            })?;
        if (shape == ValueShape::Paired) != component.is_half() {
            return Err(PatchError::ShapeMismatch {
                name: full_name,
                declared,
                shape,
                prefix: component.prefix(),
            });
        }

        let new = self
            .rounding
            .to_integer(edit.new_value)
            .ok_or_else(|| PatchError::NonFiniteValue {
                name: full_name.clone(),
                value: edit.new_value,
            })?;
        let expected_old = truncate(edit.old_value).ok_or_else(|| PatchError::NonFiniteValue {
            name: full_name.clone(),
            value: edit.old_value,
        })?;

        let offset = find_index(&definition.text, &path).ok_or_else(|| {
            LocateError::ElementNotFound {
                name: full_name.clone(),
                path: path.clone(),
            }
        })?;

        let slot = self.find_slot(repo, &definition, offset, shape, component, &full_name)?;
        let old = slot
            .literal
            .trim()
            .parse::<i64>()
            .map_err(|_| PatchError::ValueNotFound {
                name: full_name.clone(),
            })?;
        if old != expected_old {
            warn!(
                "{}: value in file differs from start value: {} != {}",
                full_name, old, expected_old
            );
        }

        let width = slot.literal.len();
        let new_text = format!("{:>width$}", new, width = width);
        let widened = new_text.len() > width;
        if widened {
            info!("{}: code lines might not be aligned", full_name);
        }

        let file = repo
            .unit(slot.unit)
            .map(|unit| unit.path().to_path_buf())
            .ok_or(PatchError::UnknownUnit(slot.unit))?;
        let splice = Edit::new(
            file.clone(),
            slot.start,
            slot.start + width,
            new_text,
            &slot.literal,
        );
        write_edits(repo, slot.unit, vec![splice])?;
        debug!("{}: {} -> {} in {}", full_name, old, new, file.display());

        Ok(ValuePatch {
            file,
            old,
            expected_old,
            new,
            via_enum: slot.via_enum,
            widened,
        })
    }

    fn find_slot(
        &self,
        repo: &Repository,
        definition: &DefinitionMatch,
        offset: usize,
        shape: ValueShape,
        component: Component,
        full_name: &str,
    ) -> Result<Slot, PatchError> {
        let not_found = || PatchError::ValueNotFound {
            name: full_name.to_string(),
        };

        let re = get_or_compile(&value_pattern(shape, self.types))?;
        let scan = blank_comments(&definition.text);
        let span = element_span(&definition.text, offset);
        let caps = scan
            .get(span.clone())
            .and_then(|element| re.captures(element))
            .ok_or_else(not_found)?;

        if let Some(m) = caps.name(component.group()) {
            let end = span.start + m.end();
            let start = skip_blanked(&definition.text, &scan, span.start + m.start()..end);
            return Ok(Slot {
                unit: definition.unit,
                start: definition.start + start,
                literal: definition.text[start..end].to_string(),
                via_enum: None,
            });
        }

        let symbol = caps.name("enum").ok_or_else(not_found)?.as_str();
        debug!(
            "{}: replacing defining enum '{}' instead of the array entry",
            full_name, symbol
        );
        enum_slot(repo, symbol, full_name)
    }
}

/// Look up `name`, preferring the paired definition a `m`/`e` prefix points at.
fn resolve_target(
    repo: &Repository,
    name: &str,
) -> Result<(Component, DefinitionMatch), PatchError> {
    let half = if let Some(base) = name.strip_prefix('m') {
        Some((Component::Midgame, base))
    } else {
        name.strip_prefix('e').map(|base| (Component::Endgame, base))
    };

    if let Some((component, base)) = half.filter(|(_, base)| !base.is_empty()) {
        if let Some(found) = repo.search_def(base, DefinitionKind::Variable)? {
            return Ok((component, found));
        }
    }

    Ok((
        Component::Value,
        repo.require_def(name, DefinitionKind::Variable)?,
    ))
}

/// The explicit `symbol = n` literal inside the enum block defining `symbol`.
fn enum_slot(repo: &Repository, symbol: &str, full_name: &str) -> Result<Slot, PatchError> {
    let block = repo
        .search_def(symbol, DefinitionKind::Enum)?
        .ok_or_else(|| PatchError::UnhandledSymbol {
            name: full_name.to_string(),
            symbol: symbol.to_string(),
        })?;

    let re = get_or_compile(&format!(r"\b{}\s*=\s*(?P<v>-?\d+)", regex::escape(symbol)))?;
    let scan = blank_comments(&block.text);
    let m = re
        .captures(&scan)
        .and_then(|caps| caps.name("v"))
        .ok_or_else(|| PatchError::ImplicitEnumValue {
            name: full_name.to_string(),
            symbol: symbol.to_string(),
        })?;

    Ok(Slot {
        unit: block.unit,
        start: block.start + m.start(),
        literal: block.text[m.range()].to_string(),
        via_enum: Some(symbol.to_string()),
    })
}

/// Pattern matching the value slot within one element.
///
/// The literal groups include leading blanks so the replacement can keep
/// the column width.
pub fn value_pattern(shape: ValueShape, types: &TypeSettings) -> String {
    match shape {
        ValueShape::Paired => format!(
            r"\b(?:{})\((?P<m>\s*-?\d+)\s*,(?P<e>\s*-?\d+)\s*\)",
            alternation(&types.paired_constructors)
        ),
        ValueShape::Wrapped => format!(
            r"\b(?:{})\((?P<v>\s*-?\d+)\s*\)|(?P<enum>\w+)",
            alternation(&types.wrapped_constructors)
        ),
        ValueShape::Plain => r"(?P<v>[ \t]*-?\d+)|(?P<enum>\w+)".to_string(),
    }
}

/// Start of `range` past any blanked comment text it covers.
fn skip_blanked(original: &str, scan: &str, range: Range<usize>) -> usize {
    let (original, scan) = (original.as_bytes(), scan.as_bytes());
    range
        .clone()
        .rev()
        .find(|&i| original[i] != scan[i])
        .map_or(range.start, |i| i + 1)
}

fn alternation(names: &[String]) -> String {
    names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|")
}

fn truncate(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    let in_range = truncated >= i64::MIN as f64 && truncated < i64::MAX as f64;
    (truncated.is_finite() && in_range).then_some(truncated as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceUnit;

    fn repo(files: &[(&str, &str)]) -> Repository {
        let units = files
            .iter()
            .map(|(name, text)| SourceUnit::from_text(*name, *text))
            .collect();
        Repository::from_units("src", units)
    }

    fn edit(name: &str, indices: &str, new_value: f64, old_value: f64) -> ValueEdit {
        ValueEdit {
            name: name.to_string(),
            indices: indices.to_string(),
            new_value,
            old_value,
        }
    }

    fn apply(repo: &mut Repository, request: &ValueEdit) -> Result<ValuePatch, PatchError> {
        let types = TypeSettings::default();
        ValuePatcher::new(&types, EnumNumbering::Ordinal, Rounding::Round).apply(repo, request)
    }

    fn text(repo: &Repository, unit: usize) -> String {
        repo.unit(unit).unwrap().read().unwrap().into_owned()
    }

    #[test]
    fn patches_plain_array_element() {
        let mut repo = repo(&[("search.cpp", "int margin[2] = {100, 200};\n")]);
        let patch = apply(&mut repo, &edit("margin", "[1]", 250.0, 200.0)).unwrap();

        assert_eq!(text(&repo, 0), "int margin[2] = {100, 250};\n");
        assert_eq!(patch.old, 200);
        assert_eq!(patch.new, 250);
        assert!(!patch.widened);
        assert_eq!(patch.via_enum, None);
    }

    #[test]
    fn patches_only_the_midgame_half() {
        let mut repo = repo(&[(
            "eval.cpp",
            "const Score Bonus = S(10, 20);\n",
        )]);
        apply(&mut repo, &edit("mBonus", "", 15.0, 10.0)).unwrap();
        assert_eq!(text(&repo, 0), "const Score Bonus = S(15, 20);\n");

        apply(&mut repo, &edit("eBonus", "", 25.0, 20.0)).unwrap();
        assert_eq!(text(&repo, 0), "const Score Bonus = S(15, 25);\n");
    }

    #[test]
    fn paired_element_inside_nested_array() {
        let source = "constexpr Score Mobility[2][3] = {\n  { S(-1, -2), S( 3,  4), S(5, 6) },\n  { S( 7,  8), S(9, 10), S(11, 12) }\n};\n";
        let mut repo = repo(&[("eval.cpp", source)]);
        apply(&mut repo, &edit("eMobility", "[1][1]", 42.0, 10.0)).unwrap();

        assert!(text(&repo, 0).contains("S(9, 42)"));
        assert!(text(&repo, 0).contains("S( 3,  4)"));
    }

    #[test]
    fn falls_back_to_the_enum_constant() {
        let mut repo = repo(&[
            ("types.h", "enum Bonus { NONE, SYM = 7, OTHER };\n"),
            ("eval.cpp", "int table[2] = { 3, SYM };\n"),
        ]);
        let patch = apply(&mut repo, &edit("table", "[1]", 9.0, 7.0)).unwrap();

        assert_eq!(text(&repo, 0), "enum Bonus { NONE, SYM = 9, OTHER };\n");
        assert_eq!(text(&repo, 1), "int table[2] = { 3, SYM };\n");
        assert_eq!(patch.via_enum.as_deref(), Some("SYM"));
    }

    #[test]
    fn wrapped_slot_falls_back_to_the_enum_constant() {
        let mut repo = repo(&[
            ("types.h", "enum Margins { LOW = 40, HIGH = 80 };\n"),
            ("eval.cpp", "const Value Futility[2] = { V(1), HIGH };\n"),
        ]);
        let patch = apply(&mut repo, &edit("Futility", "[1]", 85.0, 80.0)).unwrap();

        assert_eq!(text(&repo, 0), "enum Margins { LOW = 40, HIGH = 85 };\n");
        assert_eq!(text(&repo, 1), "const Value Futility[2] = { V(1), HIGH };\n");
        assert_eq!(patch.via_enum.as_deref(), Some("HIGH"));
    }

    #[test]
    fn symbol_in_paired_row_is_not_found() {
        let source = "constexpr Score T[2][2] = {{ S(1, 2), SCORE_ZERO },{ S(5, 6), S(7, 8) }};\n";
        let mut repo = repo(&[("eval.cpp", source)]);
        let err = apply(&mut repo, &edit("eT", "[0][1]", 99.0, 0.0)).unwrap_err();

        assert!(matches!(err, PatchError::ValueNotFound { .. }));
        assert_eq!(text(&repo, 0), source);
    }

    #[test]
    fn symbol_in_paired_array_is_not_found() {
        let source = "constexpr Score Bonus[3] = { SCORE_ZERO, S(1, 2), S(3, 4) };\n";
        let mut repo = repo(&[("eval.cpp", source)]);
        let err = apply(&mut repo, &edit("mBonus", "[0]", 9.0, 0.0)).unwrap_err();

        assert!(matches!(err, PatchError::ValueNotFound { .. }));
        assert!(!repo.unit(0).unwrap().is_modified());

        apply(&mut repo, &edit("mBonus", "[1]", 9.0, 1.0)).unwrap();
        assert!(text(&repo, 0).contains("{ SCORE_ZERO, S(9, 2), S(3, 4) }"));
    }

    #[test]
    fn implicit_enum_constant_is_not_patched() {
        let mut repo = repo(&[
            ("types.h", "enum Bonus { NONE, SYM, OTHER };\n"),
            ("eval.cpp", "int table[2] = { 3, SYM };\n"),
        ]);
        let err = apply(&mut repo, &edit("table", "[1]", 9.0, 1.0)).unwrap_err();
        assert!(matches!(err, PatchError::ImplicitEnumValue { .. }));
        assert!(!repo.unit(0).unwrap().is_modified());
    }

    #[test]
    fn keeps_width_of_padded_literal() {
        let source = "int Table[3] = {   5,  10, 100 };\n";
        let mut repo = repo(&[("a.cpp", source)]);
        apply(&mut repo, &edit("Table", "[1]", 7.4, 10.0)).unwrap();

        let patched = text(&repo, 0);
        assert_eq!(patched, "int Table[3] = {   5,   7, 100 };\n");
        assert_eq!(patched.len(), source.len());
    }

    #[test]
    fn reports_widening() {
        let mut repo = repo(&[("a.cpp", "int Table[2] = {5, 9};\n")]);
        let patch = apply(&mut repo, &edit("Table", "[0]", 1234.0, 5.0)).unwrap();
        assert!(patch.widened);
        assert_eq!(text(&repo, 0), "int Table[2] = {1234, 9};\n");
    }

    #[test]
    fn patches_scalar_and_wrapped_values() {
        let mut repo = repo(&[(
            "a.cpp",
            "int Threshold = 28;\nconst Value Margin = V(120);\n",
        )]);
        apply(&mut repo, &edit("Threshold", "", 31.0, 28.0)).unwrap();
        apply(&mut repo, &edit("Margin", "", 95.0, 120.0)).unwrap();

        assert_eq!(
            text(&repo, 0),
            "int Threshold = 31;\nconst Value Margin = V( 95);\n"
        );
    }

    #[test]
    fn old_value_mismatch_still_applies() {
        let mut repo = repo(&[("a.cpp", "int margin[2] = {100, 200};\n")]);
        let patch = apply(&mut repo, &edit("margin", "[0]", 90.0, 101.9)).unwrap();
        assert_eq!(patch.expected_old, 101);
        assert_eq!(patch.old, 100);
        assert_eq!(text(&repo, 0), "int margin[2] = { 90, 200};\n");
    }

    #[test]
    fn prefix_must_match_declared_type() {
        let mut repo = repo(&[("a.cpp", "const Score Bonus = S(10, 20);\n")]);
        let err = apply(&mut repo, &edit("Bonus", "", 15.0, 10.0)).unwrap_err();
        assert!(matches!(
            err,
            PatchError::ShapeMismatch {
                shape: ValueShape::Paired,
                prefix: 'v',
                ..
            }
        ));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut repo = repo(&[("a.cpp", "double Ratio = 3;\n")]);
        let err = apply(&mut repo, &edit("Ratio", "", 4.0, 3.0)).unwrap_err();
        assert!(matches!(err, PatchError::UnknownType { .. }));
    }

    #[test]
    fn out_of_range_element_is_not_found() {
        let mut repo = repo(&[("a.cpp", "int grid[2][2] = { {1, 2}, {3, 4} };\n")]);
        let err = apply(&mut repo, &edit("grid", "[0][2]", 9.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            PatchError::Locate(LocateError::ElementNotFound { .. })
        ));
        assert!(!repo.unit(0).unwrap().is_modified());
    }

    #[test]
    fn missing_definition_suggests_a_name() {
        let mut repo = repo(&[("a.cpp", "int RazorMargin = 600;\n")]);
        let err = apply(&mut repo, &edit("RazorMargn", "", 500.0, 600.0)).unwrap_err();
        assert!(err.to_string().contains("did you mean 'RazorMargin'"));
    }

    #[test]
    fn comment_digits_are_skipped() {
        let source = "int Table[2] = { /* 7 */ 1, 2 };\n";
        let mut repo = repo(&[("a.cpp", source)]);
        apply(&mut repo, &edit("Table", "[0]", 3.0, 1.0)).unwrap();
        assert_eq!(text(&repo, 0), "int Table[2] = { /* 7 */ 3, 2 };\n");
    }

    #[test]
    fn non_finite_new_value_fails() {
        let mut repo = repo(&[("a.cpp", "int Threshold = 28;\n")]);
        let err = apply(&mut repo, &edit("Threshold", "", f64::NAN, 28.0)).unwrap_err();
        assert!(matches!(err, PatchError::NonFiniteValue { .. }));
    }
}
