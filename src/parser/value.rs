//! Reading and writing the value half of an assignment.
//!
//! Value syntax depends on what precedes it (quoting, escapes, values that
//! continue over several physical lines), so it is read by a dedicated routine
//! right after the parser has consumed `KEY=`.

use std::borrow::Cow;

/// Outcome of reading one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRead {
    pub value: String,
    /// Trailing `#...` comment, kept with its `#`.
    pub inline_comment: Option<String>,
    pub quoted: bool,
    /// Additional physical lines consumed past the current one.
    pub lines_consumed: usize,
}

fn is_horizontal_ws(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

/// Read a value starting at `first` (the text after `=`). `rest` holds the
/// physical lines that follow; quoted values may continue into them.
pub fn read_value<'a>(first: &'a str, rest: &[&'a str]) -> ValueRead {
    let text = first.trim_start_matches(is_horizontal_ws);
    match text.chars().next() {
        Some(q @ ('"' | '\'')) => read_quoted(&text[1..], q, rest),
        _ => read_unquoted(text),
    }
}

fn read_unquoted(text: &str) -> ValueRead {
    let (body, inline_comment) = match text.find('#') {
        Some(i) => (
            &text[..i],
            Some(text[i..].trim_end_matches(is_horizontal_ws).to_string()),
        ),
        None => (text, None),
    };
    ValueRead {
        value: body.trim_end_matches(is_horizontal_ws).to_string(),
        inline_comment,
        quoted: false,
        lines_consumed: 0,
    }
}

fn read_quoted<'a>(mut line: &'a str, quote: char, rest: &[&'a str]) -> ValueRead {
    let mut value = String::new();
    let mut consumed = 0;

    loop {
        let mut chars = line.char_indices();
        while let Some((i, ch)) = chars.next() {
            if ch == '\\' && quote == '"' {
                if let Some((_, next)) = chars.next() {
                    value.push(decode_escape(next));
                    continue;
                }
                // Backslash at end of line is literal.
                value.push(ch);
                continue;
            }
            if ch == quote {
                return ValueRead {
                    value,
                    inline_comment: trailing_comment(&line[i + ch.len_utf8()..]),
                    quoted: true,
                    lines_consumed: consumed,
                };
            }
            value.push(ch);
        }

        match rest.get(consumed) {
            Some(next) => {
                consumed += 1;
                value.push('\n');
                line = next;
            }
            None => break,
        }
    }

    // Unterminated: the value runs to end of input.
    ValueRead {
        value,
        inline_comment: None,
        quoted: true,
        lines_consumed: consumed,
    }
}

fn decode_escape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

fn trailing_comment(tail: &str) -> Option<String> {
    let tail = tail.trim_start_matches(is_horizontal_ws);
    tail.starts_with('#')
        .then(|| tail.trim_end_matches(is_horizontal_ws).to_string())
}

/// Whether a bare (unquoted) rendering of `value` would read back differently.
pub fn needs_quoting(value: &str) -> bool {
    value.starts_with(['"', '\'', ' ', '\t'])
        || value.ends_with([' ', '\t'])
        || value.contains(['\n', '\r', '#'])
}

/// Render a value for output. Quoted values always come out double-quoted.
pub fn render_value(value: &str, quoted: bool) -> Cow<'_, str> {
    if !quoted && !needs_quoting(value) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    Cow::Owned(out)
}
