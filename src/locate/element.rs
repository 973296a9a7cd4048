//! Structural locator: finds where one element of a (possibly nested)
//! brace initializer starts.
//!
//! The scanner tracks brace depth from the start of the definition and
//! paren depth from the start of each step. A comma only separates elements
//! of dimension `d` when brace depth is `d + 1` and no paren is open, so
//! commas of nested sub-arrays and of call arguments such as `S(1, 2)` are
//! skipped.

use crate::locate::lexical::blank_comments;
use std::ops::Range;

/// Offset within `definition` of the separator preceding the element at
/// `path`, or just past the opening brace when the element is the first one
/// of its (sub-)array.
///
/// For a scalar definition without braces and an empty path, the offset
/// just past `=` is returned. `None` when the path leaves the initializer.
pub fn find_index(definition: &str, path: &[usize]) -> Option<usize> {
    let scan = blank_comments(definition);
    let bytes = scan.as_bytes();

    let assign = scan.find('=')?;
    let Some(open) = scan[assign..].find('{').map(|rel| assign + rel) else {
        return path.is_empty().then_some(assign + 1);
    };

    let mut pos = open + 1;
    for (dim, &count) in path.iter().enumerate() {
        if dim > 0 {
            pos = enter_sub_array(bytes, pos)?;
        }
        for _ in 0..count {
            pos = next_separator(bytes, pos, dim + 1)?;
        }
    }
    Some(pos)
}

/// Byte range of the element whose locator offset is `offset`.
///
/// The range starts at `offset` and ends before the next separator at the
/// same brace depth, before the `}` closing the enclosing initializer, or
/// before the `;` ending a scalar definition.
pub fn element_span(definition: &str, offset: usize) -> Range<usize> {
    let scan = blank_comments(definition);
    let bytes = scan.as_bytes();
    let from = offset.min(bytes.len());
    let body = if bytes.get(from) == Some(&b',') {
        from + 1
    } else {
        from
    };

    let mut depth = 0isize;
    let mut parens = 0isize;
    for (idx, &b) in bytes.iter().enumerate().skip(body) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth < 0 {
                    return from..idx;
                }
            }
            b'(' => parens += 1,
            b')' => parens -= 1,
            b',' | b';' if depth == 0 && parens <= 0 => return from..idx,
            _ => {}
        }
    }

    from..bytes.len()
}

/// Offset just past the `{` opening the element that starts at `from`.
/// `None` when the element is not a sub-array.
fn enter_sub_array(bytes: &[u8], from: usize) -> Option<usize> {
    let mut rest = bytes.iter().enumerate().skip(from);
    if bytes.get(from) == Some(&b',') {
        rest.next();
    }
    rest.find(|(_, b)| !b.is_ascii_whitespace())
        .and_then(|(idx, &b)| (b == b'{').then_some(idx + 1))
}

/// First comma after `from` that separates elements at brace depth `level`.
fn next_separator(bytes: &[u8], from: usize, level: usize) -> Option<usize> {
    let level = isize::try_from(level).ok()?;
    let mut depth = brace_depth(&bytes[..from.min(bytes.len())]);
    let mut entered = depth >= level;
    let mut parens = 0isize;

    for (idx, &b) in bytes.iter().enumerate().skip(from) {
        match b {
            b'{' => {
                depth += 1;
                entered |= depth >= level;
            }
            b'}' => {
                depth -= 1;
                // Left the sub-array being counted: index out of range
                if (entered && depth < level) || depth < level - 1 {
                    return None;
                }
            }
            b'(' => parens += 1,
            b')' => parens -= 1,
            b',' if idx > from && depth == level && parens <= 0 => return Some(idx),
            _ => {}
        }
    }

    None
}

fn brace_depth(bytes: &[u8]) -> isize {
    bytes.iter().fold(0, |depth, &b| match b {
        b'{' => depth + 1,
        b'}' => depth - 1,
        _ => depth,
    })
}
