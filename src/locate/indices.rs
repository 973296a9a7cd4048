//! Index resolver: turns `[2][KNIGHT]` into `[2, 2]`.

use crate::cache::get_or_compile;
use crate::config::EnumNumbering;
use crate::locate::definition::DefinitionKind;
use crate::locate::errors::LocateError;
use crate::locate::lexical::blank_comments;
use crate::source::Repository;

/// Split bracketed index text into its raw tokens.
///
/// Stops at the first position where no well-formed, non-empty `[...]` pair
/// remains.
pub fn index_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let (Some(open), Some(close)) = (rest.find('['), rest.find(']')) {
        if open + 1 >= close {
            break;
        }
        tokens.push(rest[open + 1..close].trim());
        rest = &rest[close + 1..];
    }

    tokens
}

/// Resolve every index token to an integer, looking up enum constants in
/// the repository.
pub fn parse_indices(
    repo: &Repository,
    text: &str,
    numbering: EnumNumbering,
) -> Result<Vec<usize>, LocateError> {
    index_tokens(text)
        .into_iter()
        .map(|token| resolve_token(repo, token, numbering))
        .collect()
}

fn resolve_token(
    repo: &Repository,
    token: &str,
    numbering: EnumNumbering,
) -> Result<usize, LocateError> {
    let value = match token.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            let unresolved = || LocateError::UnresolvedIndex {
                token: token.to_string(),
            };
            let block = repo
                .search_def(token, DefinitionKind::Enum)?
                .ok_or_else(unresolved)?;
            enum_value(&block.text, token, numbering)?.ok_or_else(unresolved)?
        }
    };

    usize::try_from(value).map_err(|_| LocateError::NegativeIndex {
        token: token.to_string(),
        value,
    })
}

/// Value of `entry` inside an enum block.
///
/// Returns `None` when the entry is absent or its value depends on an
/// expression that is not a plain integer.
pub fn enum_value(
    block: &str,
    entry: &str,
    numbering: EnumNumbering,
) -> Result<Option<i64>, LocateError> {
    let block = blank_comments(block);
    let Some(open) = block.find('{') else {
        return Ok(None);
    };
    let close = block.rfind('}').filter(|&c| c > open).unwrap_or(block.len());
    let body = &block[open + 1..close];

    match numbering {
        EnumNumbering::Ordinal => ordinal_value(body, entry),
        EnumNumbering::AutoIncrement => Ok(auto_increment_value(body, entry)),
    }
}

fn ordinal_value(body: &str, entry: &str) -> Result<Option<i64>, LocateError> {
    let name = regex::escape(entry);

    let explicit = get_or_compile(&format!(r"\b{}\s*=\s*(?P<v>-?\d+)", name))?;
    if let Some(value) = explicit
        .captures(body)
        .and_then(|caps| caps.name("v"))
        .and_then(|m| m.as_str().parse::<i64>().ok())
    {
        return Ok(Some(value));
    }

    let position = get_or_compile(&format!(r"\b{}\b", name))?;
    Ok(position.find(body).map(|m| {
        let commas = body[..m.start()].matches(',').count();
        i64::try_from(commas).unwrap_or(i64::MAX)
    }))
}

fn auto_increment_value(body: &str, entry: &str) -> Option<i64> {
    let mut next = Some(0i64);

    for item in body.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }

        let (name, value) = match item.split_once('=') {
            Some((name, expr)) => (name.trim(), expr.trim().parse::<i64>().ok()),
            None => (item, next),
        };
        if name == entry {
            return value;
        }
        next = value.and_then(|v| v.checked_add(1));
    }

    None
}
