//! Shell-like splitting of a single line into an argument vector.

use crate::error::{Error, Result};

/// Same set as C `isspace` in the "C" locale.
pub(crate) fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Parse an argv-style string into a vector of arguments.
///
/// Whitespace separates arguments. Single and double quotes group text and
/// are removed; within quotes a backslash only escapes the active quote
/// character and is otherwise kept as written. Outside quotes a backslash
/// escapes the next character, whitespace included.
///
/// Ending inside a quote or on an unescaped backslash is `BadQuote`.
pub fn parse_argv_string(s: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            } else if c == '\\' {
                let next = chars.next().ok_or(Error::BadQuote)?;
                if next != q {
                    current.push('\\');
                }
                current.push(next);
            } else {
                current.push(c);
            }
        } else if is_space(c) {
            if !current.is_empty() {
                args.push(finish(&mut current));
            }
        } else {
            match c {
                '"' | '\'' => quote = Some(c),
                '\\' => current.push(chars.next().ok_or(Error::BadQuote)?),
                _ => current.push(c),
            }
        }
    }

    if quote.is_some() {
        return Err(Error::BadQuote);
    }
    if !current.is_empty() {
        args.push(finish(&mut current));
    }

    args.shrink_to_fit();
    Ok(args)
}

fn finish(current: &mut String) -> String {
    let mut token = std::mem::take(current);
    token.shrink_to_fit();
    token
}
