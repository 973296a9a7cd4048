//! Column aligner for table-like initializers.
//!
//! Two adjacent lines are aligned when they have the same bracket
//! fingerprint (the sequence of `{ } ( ) ,` they contain, ignoring a
//! trailing comma). Spaces are inserted so that every fingerprint
//! character lands in the same column on both lines. Only spaces are ever
//! inserted, so repeated passes reach a fixed point.

use crate::edit::Edit;
use crate::locate::DefinitionKind;
use crate::patch::errors::PatchError;
use crate::patch::write_edits;
use crate::source::Repository;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Upper bound on passes in [`align_until_stable`].
pub const MAX_ALIGN_PASSES: usize = 64;

const STRUCTURAL: [char; 5] = ['{', '}', '(', ')', ','];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignOutcome {
    pub file: PathBuf,
    pub changed: bool,
}

/// One alignment pass over every pair of adjacent lines, top to bottom.
pub fn align(text: &str) -> String {
    let mut lines: Vec<Vec<char>> = text
        .split('\n')
        .map(|line| line.chars().collect())
        .collect();
    let fingerprints: Vec<Vec<char>> = lines.iter().map(|line| fingerprint(line)).collect();

    for i in 0..lines.len().saturating_sub(1) {
        let (upper, lower) = (&fingerprints[i], &fingerprints[i + 1]);
        if !is_candidate(&lines[i], &lines[i + 1], upper, lower) {
            continue;
        }

        let shared = common_prefix(upper, lower);
        let mut from = 0;
        for &ch in &upper[..shared] {
            let p0 = find_from(&lines[i], ch, from);
            let p1 = find_from(&lines[i + 1], ch, from);
            let (Some(p0), Some(p1)) = (p0, p1) else {
                break;
            };
            if p0 < p1 {
                insert_spaces(&mut lines[i], from, p1 - p0);
            } else if p0 > p1 {
                insert_spaces(&mut lines[i + 1], from, p0 - p1);
            }
            from = p0.max(p1) + 1;
        }
    }

    lines
        .iter()
        .map(|line| line.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Repeat [`align`] until the text stops changing.
pub fn align_until_stable(text: &str) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_ALIGN_PASSES {
        let next = align(&current);
        if next == current {
            return current;
        }
        current = next;
    }
    warn!("alignment did not settle after {} passes", MAX_ALIGN_PASSES);
    current
}

/// Align the whole definition of `name` in place.
pub fn align_definition(repo: &mut Repository, name: &str) -> Result<AlignOutcome, PatchError> {
    let definition = repo.require_def(name, DefinitionKind::Variable)?;
    let file = repo
        .unit(definition.unit)
        .map(|unit| unit.path().to_path_buf())
        .ok_or(PatchError::UnknownUnit(definition.unit))?;

    let aligned = align_until_stable(&definition.text);
    let changed = aligned != definition.text;
    if changed {
        let edit = Edit::new(
            file.clone(),
            definition.start,
            definition.end,
            aligned,
            &definition.text,
        );
        write_edits(repo, definition.unit, vec![edit])?;
    }
    debug!("{}: aligned (changed: {})", name, changed);

    Ok(AlignOutcome { file, changed })
}

fn fingerprint(line: &[char]) -> Vec<char> {
    line.iter().copied().filter(|c| STRUCTURAL.contains(c)).collect()
}

fn is_candidate(upper: &[char], lower: &[char], fp_upper: &[char], fp_lower: &[char]) -> bool {
    let Some(&first) = fp_upper.first() else {
        return false;
    };
    if trim_trailing_commas(fp_upper) != trim_trailing_commas(fp_lower) {
        return false;
    }
    // Rows opening with a brace must share their indentation up to it
    if first != '{' {
        return true;
    }
    upper
        .iter()
        .position(|&c| c == first)
        .is_some_and(|at| common_prefix(upper, lower) >= at)
}

fn trim_trailing_commas(fp: &[char]) -> &[char] {
    let end = fp.iter().rposition(|&c| c != ',').map_or(0, |i| i + 1);
    &fp[..end]
}

fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn find_from(line: &[char], ch: char, from: usize) -> Option<usize> {
    line.get(from..)?.iter().position(|&c| c == ch).map(|i| from + i)
}

fn insert_spaces(line: &mut Vec<char>, at: usize, count: usize) {
    line.splice(at..at, std::iter::repeat(' ').take(count));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceUnit;

    #[test]
    fn aligns_two_rows() {
        assert_eq!(align("{1, 22},\n{333, 4},"), "{  1, 22},\n{333,  4},");
    }

    #[test]
    fn aligns_nested_table_rows() {
        let table = "int T[3][2] = {\n  { 1, 22 },\n  { 333, 4 },\n  { 5, 6 }\n};";
        assert_eq!(
            align_until_stable(table),
            "int T[3][2] = {\n  {   1, 22 },\n  { 333,  4 },\n  {   5,  6 }\n};"
        );
    }

    #[test]
    fn aligns_paired_constructors() {
        let table = "constexpr Score Bonus[4] = {\n  S(1, 2), S(10, 20),\n  S(100, 200), S(3, 4)\n};";
        assert_eq!(
            align_until_stable(table),
            "constexpr Score Bonus[4] = {\n  S(  1,   2), S(10, 20),\n  S(100, 200), S( 3,  4)\n};"
        );
    }

    #[test]
    fn brace_rows_need_shared_indentation() {
        let text = "int A[2] = { 1, 2 };\nint B[2] = { 10, 20 };";
        assert_eq!(align(text), text);

        assert_eq!(align("  {1, 2},\n    {3, 4}"), "    {1, 2},\n    {3, 4}");
    }

    #[test]
    fn different_shapes_are_left_alone() {
        let text = "{ 1, 2 },\n{ 3 }";
        assert_eq!(align(text), text);
        assert_eq!(align(""), "");
        assert_eq!(align("no brackets\nhere either"), "no brackets\nhere either");
    }

    #[test]
    fn stable_output_is_a_fixed_point() {
        let once = align_until_stable("{1, 22},\n{333, 4},\n{5, 66666},");
        assert_eq!(align(&once), once);
    }

    #[test]
    fn aligns_definition_in_repository() {
        let source = "// header\nint T[2][2] = {\n  { 1, 22 },\n  { 333, 4 }\n};\nint U = 1;\n";
        let mut repo = Repository::from_units("src", vec![SourceUnit::from_text("a.cpp", source)]);

        let outcome = align_definition(&mut repo, "T").unwrap();
        assert!(outcome.changed);
        assert_eq!(
            repo.unit(0).unwrap().read().unwrap(),
            "// header\nint T[2][2] = {\n  {   1, 22 },\n  { 333,  4 }\n};\nint U = 1;\n"
        );

        let again = align_definition(&mut repo, "T").unwrap();
        assert!(!again.changed);
    }
}
