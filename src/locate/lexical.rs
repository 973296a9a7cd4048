//! Comment and preprocessor blanking.
//!
//! Structural scans count commas, braces and digits. None of those may come
//! from a comment, so scans run over a copy of the text where comments and
//! preprocessor lines are replaced by spaces. Byte offsets are preserved:
//! an offset found in the blanked copy is valid in the original text.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Directive,
    Quoted(char),
}

/// Replace comments and preprocessor lines with spaces, keeping newlines and
/// byte offsets intact. String and character literals are left untouched.
pub fn blank_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut line_start = true;
    let mut prev = '\0';
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => {
                let next = chars.peek().copied();
                if c == '/' && next == Some('/') {
                    state = State::LineComment;
                    push_blank(&mut out, c);
                } else if c == '/' && next == Some('*') {
                    chars.next();
                    state = State::BlockComment;
                    out.push_str("  ");
                } else if c == '#' && line_start {
                    state = State::Directive;
                    push_blank(&mut out, c);
                } else {
                    // `1'000` is a digit separator, not a character literal
                    if c == '"' || (c == '\'' && !prev.is_ascii_alphanumeric()) {
                        state = State::Quoted(c);
                    }
                    out.push(c);
                }
                if c == '\n' {
                    line_start = true;
                } else if !c.is_whitespace() {
                    line_start = false;
                }
                prev = c;
            }
            State::LineComment | State::Directive => {
                if c == '\n' {
                    state = State::Code;
                    line_start = true;
                    prev = c;
                }
                push_blank(&mut out, c);
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                    out.push_str("  ");
                } else {
                    push_blank(&mut out, c);
                }
            }
            State::Quoted(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == quote || c == '\n' {
                    state = State::Code;
                    line_start = c == '\n';
                    prev = c;
                }
            }
        }
    }

    out
}

fn push_blank(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        out.extend(std::iter::repeat(' ').take(c.len_utf8()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blanks_line_comment() {
        let text = "{ 1, 2, // a, b\n  3 }";
        let blanked = blank_comments(text);
        assert_eq!(blanked, "{ 1, 2,        \n  3 }");
        assert_eq!(blanked.len(), text.len());
    }

    #[test]
    fn blanks_block_comment_across_lines() {
        let text = "{ 1, /* 2,\n 3, */ 4 }";
        assert_eq!(blank_comments(text), "{ 1,      \n       4 }");
    }

    #[test]
    fn blanks_preprocessor_lines_only_at_line_start() {
        let text = "{\n#ifdef X\n 1,\n#endif\n 2 }";
        assert_eq!(blank_comments(text), "{\n        \n 1,\n      \n 2 }");
    }

    #[test]
    fn keeps_string_literals() {
        let text = r#"{ "a//b", '/' } // tail"#;
        assert_eq!(blank_comments(text), r#"{ "a//b", '/' }        "#);
    }

    #[test]
    fn digit_separator_is_not_a_quote() {
        let text = "{ 1'000, 2 } // x";
        assert_eq!(blank_comments(text), "{ 1'000, 2 }     ");
    }

    #[test]
    fn preserves_multibyte_offsets() {
        let text = "a // é\nb";
        let blanked = blank_comments(text);
        assert_eq!(blanked.len(), text.len());
        assert!(blanked.ends_with("\nb"));
    }
}
