//! Quote-aware command-line tokenization.

use system_shell_contract::{ParsedCommand, ShellError};

/// Splits `line` into words, honoring single/double quotes and backslash escapes.
///
/// # Errors
///
/// Returns a usage error for an unterminated quote or a trailing escape.
pub fn tokenize_line(line: &str) -> Result<Vec<String>, ShellError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();
    let mut quote = None::<char>;

    while let Some(ch) = chars.next() {
        match quote {
            Some(active) if ch == active => quote = None,
            Some('"') if ch == '\\' => {
                let Some(next) = chars.next() else {
                    return Err(ShellError::usage("dangling escape sequence"));
                };
                current.push(next);
            }
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch.is_whitespace() => {
                if in_word {
                    tokens.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None if ch == '\\' => {
                let Some(next) = chars.next() else {
                    return Err(ShellError::usage("dangling escape sequence"));
                };
                current.push(next);
                in_word = true;
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(ShellError::usage("unterminated quoted string"));
    }

    if in_word {
        tokens.push(current);
    }

    Ok(tokens)
}

/// Parses a raw line into a lower-cased verb and its positional arguments.
///
/// # Errors
///
/// Propagates [`tokenize_line`] failures.
pub fn parse_command(line: &str) -> Result<ParsedCommand, ShellError> {
    let mut tokens = tokenize_line(line)?.into_iter();
    let cmd = tokens
        .next()
        .map(|verb| verb.to_lowercase())
        .unwrap_or_default();
    Ok(ParsedCommand {
        cmd,
        args: tokens.collect(),
    })
}
