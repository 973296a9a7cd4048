//! Definition index: finds the text of a variable or enum definition across
//! the repository.
//!
//! Matches are recomputed on every lookup. Earlier edits shift offsets, so a
//! [`DefinitionMatch`] is only valid until the owning unit is written again.

use crate::cache::get_or_compile;
use crate::locate::errors::LocateError;
use crate::locate::lexical::blank_comments;
use crate::source::Repository;
use std::collections::BTreeSet;
use std::ops::Range;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    /// `<qualifiers> <type> name[dims] = <body>;`
    Variable,
    /// `enum ... { ..., name [= n], ... };` containing the name as an entry
    Enum,
}

/// A located definition inside one source unit's current content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionMatch {
    /// Index of the owning unit in the repository
    pub unit: usize,
    /// Byte offset of the match start in the unit's content
    pub start: usize,
    /// Byte offset one past the match end
    pub end: usize,
    /// The matched text
    pub text: String,
    /// Type token preceding the name (variables only)
    pub declared_type: Option<String>,
    /// Absolute byte range of the initializer between `=` and `;` (variables only)
    pub body: Option<Range<usize>>,
}

impl DefinitionMatch {
    pub fn body_text(&self) -> Option<&str> {
        let body = self.body.as_ref()?;
        self.text.get(body.start - self.start..body.end - self.start)
    }
}

/// Pattern for `<qualifiers> <type> name[dims] = <body>;`.
pub fn variable_pattern(name: &str) -> String {
    format!(
        r"(?m)^[ \t]*(?:[\w \t]*[ \t])?(?P<type>\w+)\s+{}(?:(?:\[|\s)?(?:\[[^=;\\{{}}\[\]]*\])*[ \t]*)?=(?P<def>(?:[^=;][^;]*)?);",
        regex::escape(name)
    )
}

/// Pattern for an enum block listing `name` as one of its entries.
pub fn enum_pattern(name: &str) -> String {
    format!(
        r"(?m)^[ \t]*enum\b[\w\s:]*\{{(?:[^{{}}]*?[\s,])?{}[\s,=}}][^;]*;",
        regex::escape(name)
    )
}

const DEFINED_NAMES_PATTERN: &str = r"(?m)^[ \t]*(?:[\w \t]*[ \t])?\w+\s+(?P<name>\w+)(?:(?:\[|\s)?(?:\[[^=;\\{}\[\]]*\])*[ \t]*)?=[^=]";

impl Repository {
    /// Find the first definition of `name` in collection order.
    pub fn search_def(
        &self,
        name: &str,
        kind: DefinitionKind,
    ) -> Result<Option<DefinitionMatch>, LocateError> {
        let pattern = match kind {
            DefinitionKind::Variable => variable_pattern(name),
            DefinitionKind::Enum => enum_pattern(name),
        };
        let re = get_or_compile(&pattern)?;

        for (index, unit) in self.units().iter().enumerate() {
            let content = unit.read()?;
            let scan = blank_comments(&content);
            let Some(caps) = re.captures(&scan) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };

            return Ok(Some(DefinitionMatch {
                unit: index,
                start: whole.start(),
                end: whole.end(),
                text: content[whole.range()].to_string(),
                declared_type: caps.name("type").map(|m| m.as_str().to_string()),
                body: caps.name("def").map(|m| m.range()),
            }));
        }

        Ok(None)
    }

    /// Like [`Repository::search_def`], but a missing definition is an error
    /// carrying the closest defined variable name, if any.
    pub fn require_def(
        &self,
        name: &str,
        kind: DefinitionKind,
    ) -> Result<DefinitionMatch, LocateError> {
        if let Some(found) = self.search_def(name, kind)? {
            return Ok(found);
        }

        let suggestion = match kind {
            DefinitionKind::Variable => closest_name(name, &self.defined_names()?),
            DefinitionKind::Enum => None,
        };
        Err(LocateError::DefinitionNotFound {
            name: name.to_string(),
            suggestion,
        })
    }

    /// Every variable name with an initializer, across all units.
    pub fn defined_names(&self) -> Result<BTreeSet<String>, LocateError> {
        let re = get_or_compile(DEFINED_NAMES_PATTERN)?;
        let mut names = BTreeSet::new();
        for unit in self.units() {
            let scan = blank_comments(&unit.read()?);
            names.extend(
                re.captures_iter(&scan)
                    .filter_map(|caps| caps.name("name"))
                    .map(|m| m.as_str().to_string()),
            );
        }
        Ok(names)
    }
}

fn closest_name(name: &str, candidates: &BTreeSet<String>) -> Option<String> {
    candidates
        .iter()
        .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.clone())
}
