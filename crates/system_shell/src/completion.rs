//! Tab completion for verbs and file arguments.

use platform_host::VirtualFsService;
use system_shell_contract::Completion;

use crate::builtins::SHELL_VERBS;

const FILE_VERBS: &[&str] = &["cd", "cat", "rm", "edit"];

/// Completes the verb or the file argument at the end of `line`.
///
/// A unique match replaces the line. Several matches extend the line to their longest common
/// prefix when that adds characters, and are otherwise returned for listing.
pub async fn complete<F: VirtualFsService + ?Sized>(line: &str, cwd: &str, fs: &F) -> Completion {
    let trimmed = line.trim_start();
    let Some((verb, rest)) = trimmed.split_once(char::is_whitespace) else {
        let prefix = trimmed.to_lowercase();
        let matches = SHELL_VERBS
            .iter()
            .filter(|verb| verb.starts_with(&prefix))
            .map(|verb| verb.to_string())
            .collect::<Vec<_>>();
        return resolve(&prefix, matches, |verb| format!("{verb} "), |lcp| lcp.to_string());
    };

    let verb = verb.to_lowercase();
    if !FILE_VERBS.contains(&verb.as_str()) {
        return Completion::None;
    }
    let prefix = rest.trim_start().trim_start_matches(['"', '\'']);
    let entries = match fs.list(cwd).await {
        Ok(entries) => entries,
        Err(_) => return Completion::None,
    };
    let mut matches = entries
        .into_iter()
        .filter(|entry| verb != "cd" || entry.is_directory)
        .map(|entry| entry.name)
        .filter(|name| name.starts_with(prefix))
        .collect::<Vec<_>>();
    matches.sort();
    resolve(
        prefix,
        matches,
        |name| format!("{verb} {}", quote_if_needed(name)),
        |lcp| format!("{verb} {lcp}"),
    )
}

fn resolve(
    prefix: &str,
    matches: Vec<String>,
    complete_line: impl Fn(&str) -> String,
    partial_line: impl Fn(&str) -> String,
) -> Completion {
    match matches.as_slice() {
        [] => Completion::None,
        [only] => Completion::Replace(complete_line(only)),
        _ => {
            let common = longest_common_prefix(&matches);
            if common.len() > prefix.len() {
                Completion::Replace(partial_line(&common))
            } else {
                Completion::Candidates(matches)
            }
        }
    }
}

fn quote_if_needed(name: &str) -> String {
    if name.chars().any(char::is_whitespace) {
        format!("\"{name}\"")
    } else {
        name.to_string()
    }
}

fn longest_common_prefix(values: &[String]) -> String {
    let Some(first) = values.first() else {
        return String::new();
    };
    let mut end = first.len();
    for value in &values[1..] {
        end = first
            .char_indices()
            .zip(value.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((index, ch), _)| index + ch.len_utf8())
            .min(end);
    }
    first[..end].to_string()
}
