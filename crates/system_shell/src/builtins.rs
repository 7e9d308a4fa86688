//! Built-in verbs and the `execute` entry point.

use chrono::{DateTime, Local};
use desktop_app_contract::AppId;
use platform_host::{
    join_virtual_path, parent_virtual_path, unix_time_ms_now, FsEntry, VirtualFsService,
    DOCUMENTS_DIR, ROOT_DIR,
};
use serde_json::json;
use system_shell_contract::{CommandOutcome, ParsedCommand, ShellEffect, ShellError};

use crate::{history::CommandHistory, parser::parse_command};

/// Verbs understood by [`execute`], in help order.
pub const SHELL_VERBS: &[&str] = &[
    "help", "clear", "pwd", "ls", "cd", "cat", "touch", "rm", "edit", "history", "ai", "chat",
    "ryo", "echo", "whoami", "date",
];

/// Delay before a `clear` empties the log, leaving room for the exit animation.
pub const CLEAR_DELAY_MS: u32 = 300;

/// Static `help` output.
pub const HELP_TEXT: &str = "\
navigation & files
  pwd                 print the current directory
  ls                  list the current directory
  cd <dir>            change directory (`cd` alone returns to /, `cd ..` goes up)
  cat <file>          print a file
  touch <file>        create an empty file
  rm <name>           move a file or folder to the trash
  edit <file>         open a file in TextEdit

terminal
  clear               clear the screen
  history             show previously run commands
  echo <text>         print text
  whoami              print the current user
  date                print the current date and time
  help                show this help

assistant
  ryo <prompt>        chat with ryo (aliases: ai, chat)
                      type `exit` to leave chat mode, `clear` to start over";

const SESSION_USER: &str = "you";

/// Parses and runs one command line.
///
/// Never fails: parse errors, usage errors and collaborator failures all become error outcomes.
pub async fn execute<F: VirtualFsService + ?Sized>(
    line: &str,
    cwd: &str,
    fs: &F,
    history: &CommandHistory,
) -> CommandOutcome {
    let parsed = match parse_command(line) {
        Ok(parsed) => parsed,
        Err(err) => return err.into(),
    };
    if parsed.is_empty() {
        return CommandOutcome::default();
    }
    dispatch(&parsed, cwd, fs, history)
        .await
        .unwrap_or_else(CommandOutcome::from)
}

async fn dispatch<F: VirtualFsService + ?Sized>(
    parsed: &ParsedCommand,
    cwd: &str,
    fs: &F,
    history: &CommandHistory,
) -> Result<CommandOutcome, ShellError> {
    let args = parsed.args.as_slice();
    match parsed.cmd.as_str() {
        "help" => Ok(CommandOutcome::ok(HELP_TEXT)),
        "clear" => Ok(CommandOutcome::default().with_effect(ShellEffect::ClearLog {
            delay_ms: CLEAR_DELAY_MS,
        })),
        "pwd" => Ok(CommandOutcome::ok(cwd)),
        "ls" => list(cwd, fs).await,
        "cd" => change_dir(args.first().map(String::as_str), cwd, fs).await,
        "cat" => cat(required_arg("cat", args)?, cwd, fs).await,
        "touch" => touch(required_arg("touch", args)?, cwd, fs).await,
        "rm" => remove(required_arg("rm", args)?, cwd, fs).await,
        "edit" => edit(required_arg("edit", args)?, cwd, fs).await,
        "history" => Ok(show_history(history)),
        "ai" | "chat" | "ryo" => Ok(enter_chat(args)),
        "echo" => Ok(CommandOutcome::ok(args.join(" "))),
        "whoami" => Ok(CommandOutcome::ok(SESSION_USER)),
        "date" => Ok(CommandOutcome::ok(format_date(unix_time_ms_now()))),
        other => Err(ShellError::not_found(format!("command not found: {other}"))),
    }
}

fn required_arg<'a>(verb: &str, args: &'a [String]) -> Result<&'a str, ShellError> {
    match args.first() {
        Some(arg) if !arg.is_empty() => Ok(arg),
        _ => Err(ShellError::usage(format!("usage: {verb} <name>"))),
    }
}

async fn stat<F: VirtualFsService + ?Sized>(
    fs: &F,
    path: &str,
) -> Result<Option<FsEntry>, ShellError> {
    fs.stat(path).await.map_err(ShellError::unavailable)
}

async fn list<F: VirtualFsService + ?Sized>(
    cwd: &str,
    fs: &F,
) -> Result<CommandOutcome, ShellError> {
    let entries = fs.list(cwd).await.map_err(ShellError::unavailable)?;
    if entries.is_empty() {
        return Ok(CommandOutcome::ok("no files found"));
    }
    let names = entries
        .iter()
        .map(|entry| {
            if entry.is_directory {
                format!("{}/", entry.name)
            } else {
                entry.name.clone()
            }
        })
        .collect::<Vec<_>>();
    Ok(CommandOutcome::ok(names.join("\n")))
}

async fn change_dir<F: VirtualFsService + ?Sized>(
    arg: Option<&str>,
    cwd: &str,
    fs: &F,
) -> Result<CommandOutcome, ShellError> {
    let target = match arg {
        None | Some("") | Some("/") => ROOT_DIR.to_string(),
        Some("..") => parent_virtual_path(cwd),
        Some(path) => join_virtual_path(cwd, path),
    };
    let display = arg.unwrap_or(ROOT_DIR);
    match stat(fs, &target).await? {
        Some(entry) if entry.is_directory => {}
        Some(_) => {
            return Err(ShellError::conflict(format!(
                "cd: {display}: not a directory"
            )))
        }
        None => {
            return Err(ShellError::not_found(format!(
                "cd: {display}: no such directory"
            )))
        }
    }
    fs.navigate(&target)
        .await
        .map_err(ShellError::unavailable)?;
    Ok(CommandOutcome::default().with_cwd(target))
}

async fn cat<F: VirtualFsService + ?Sized>(
    name: &str,
    cwd: &str,
    fs: &F,
) -> Result<CommandOutcome, ShellError> {
    let file = existing_file("cat", name, cwd, fs).await?;
    let content = file.content.unwrap_or_default();
    if content.is_empty() {
        return Ok(CommandOutcome::ok("(empty file)"));
    }
    Ok(CommandOutcome::ok(content))
}

async fn touch<F: VirtualFsService + ?Sized>(
    name: &str,
    cwd: &str,
    fs: &F,
) -> Result<CommandOutcome, ShellError> {
    let path = join_virtual_path(cwd, name);
    if stat(fs, &path).await?.is_some() {
        return Err(ShellError::conflict(format!(
            "touch: {name}: already exists"
        )));
    }
    fs.save(FsEntry::file(&path, ""))
        .await
        .map_err(ShellError::unavailable)?;
    Ok(CommandOutcome::ok(format!("created {name}")))
}

async fn remove<F: VirtualFsService + ?Sized>(
    name: &str,
    cwd: &str,
    fs: &F,
) -> Result<CommandOutcome, ShellError> {
    let path = join_virtual_path(cwd, name);
    if stat(fs, &path).await?.is_none() {
        return Err(ShellError::not_found(format!(
            "rm: {name}: no such file or directory"
        )));
    }
    fs.move_to_trash(&path)
        .await
        .map_err(ShellError::unavailable)?;
    Ok(CommandOutcome::ok(format!("moved {name} to trash")))
}

async fn edit<F: VirtualFsService + ?Sized>(
    name: &str,
    cwd: &str,
    fs: &F,
) -> Result<CommandOutcome, ShellError> {
    let file = existing_file("edit", name, cwd, fs).await?;
    let content = file.content.unwrap_or_default();
    let path = if parent_virtual_path(&file.path) == DOCUMENTS_DIR {
        file.path
    } else {
        let copy = join_virtual_path(DOCUMENTS_DIR, &file.name);
        fs.save(FsEntry::file(&copy, content.clone()))
            .await
            .map_err(ShellError::unavailable)?;
        copy
    };
    Ok(
        CommandOutcome::ok(format!("opening {} in TextEdit", file.name)).with_effect(
            ShellEffect::LaunchApp {
                app_id: AppId::TextEdit,
                initial_data: Some(json!({ "path": path, "content": content })),
            },
        ),
    )
}

async fn existing_file<F: VirtualFsService + ?Sized>(
    verb: &str,
    name: &str,
    cwd: &str,
    fs: &F,
) -> Result<FsEntry, ShellError> {
    match stat(fs, &join_virtual_path(cwd, name)).await? {
        Some(entry) if entry.is_directory => Err(ShellError::conflict(format!(
            "{verb}: {name}: is a directory"
        ))),
        Some(entry) => Ok(entry),
        None => Err(ShellError::not_found(format!(
            "{verb}: {name}: no such file"
        ))),
    }
}

fn show_history(history: &CommandHistory) -> CommandOutcome {
    if history.is_empty() {
        return CommandOutcome::ok("no command history");
    }
    let lines = history
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "{:>4}  {}  {}",
                index + 1,
                format_timestamp(entry.timestamp),
                entry.command
            )
        })
        .collect::<Vec<_>>();
    CommandOutcome::ok(lines.join("\n"))
}

fn enter_chat(args: &[String]) -> CommandOutcome {
    let prompt = args.join(" ");
    let initial_prompt = (!prompt.trim().is_empty()).then(|| prompt.trim().to_string());
    CommandOutcome::ok("ask ryo anything. type 'exit' to return to terminal.")
        .with_effect(ShellEffect::EnterChat { initial_prompt })
}

fn format_timestamp(timestamp_ms: u64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms as i64)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Local wall-clock time, `date(1)` style.
fn format_date(timestamp_ms: u64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms as i64)
        .map(|time| {
            time.with_timezone(&Local)
                .format("%a %b %e %H:%M:%S %Z %Y")
                .to_string()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::executor::block_on;
    use platform_host::{MemoryVirtualFs, VirtualFsFuture, TRASH_DIR};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mode::TerminalMode;

    /// Wraps the memory fs and counts writes.
    struct SpyFs {
        inner: MemoryVirtualFs,
        saves: Cell<usize>,
        trash_calls: Cell<usize>,
    }

    impl SpyFs {
        fn new(inner: MemoryVirtualFs) -> Self {
            Self {
                inner,
                saves: Cell::new(0),
                trash_calls: Cell::new(0),
            }
        }
    }

    impl VirtualFsService for SpyFs {
        fn list<'a>(&'a self, path: &'a str) -> VirtualFsFuture<'a, Result<Vec<FsEntry>, String>> {
            self.inner.list(path)
        }

        fn navigate<'a>(
            &'a self,
            path: &'a str,
        ) -> VirtualFsFuture<'a, Result<Vec<FsEntry>, String>> {
            self.inner.navigate(path)
        }

        fn stat<'a>(
            &'a self,
            path: &'a str,
        ) -> VirtualFsFuture<'a, Result<Option<FsEntry>, String>> {
            self.inner.stat(path)
        }

        fn save<'a>(&'a self, entry: FsEntry) -> VirtualFsFuture<'a, Result<(), String>> {
            self.saves.set(self.saves.get() + 1);
            self.inner.save(entry)
        }

        fn move_to_trash<'a>(&'a self, path: &'a str) -> VirtualFsFuture<'a, Result<(), String>> {
            self.trash_calls.set(self.trash_calls.get() + 1);
            self.inner.move_to_trash(path)
        }
    }

    fn run(line: &str, cwd: &str, fs: &impl VirtualFsService) -> CommandOutcome {
        block_on(execute(line, cwd, fs, &CommandHistory::default()))
    }

    #[test]
    fn blank_line_is_a_silent_no_op() {
        assert_eq!(run("   ", "/", &MemoryVirtualFs::new()), CommandOutcome::default());
    }

    #[test]
    fn unknown_verb_names_the_verb() {
        let outcome = run("frobnicate now", "/", &MemoryVirtualFs::new());
        assert!(outcome.is_error);
        assert_eq!(outcome.output, "command not found: frobnicate");
    }

    #[test]
    fn pwd_and_echo_print_without_effects() {
        let fs = MemoryVirtualFs::new();
        assert_eq!(run("pwd", "/Documents", &fs).output, "/Documents");
        assert_eq!(run("echo hello   \"big world\"", "/", &fs).output, "hello big world");
        assert_eq!(run("whoami", "/", &fs).output, "you");
        assert!(!run("date", "/", &fs).output.is_empty());
    }

    #[test]
    fn date_uses_the_local_time_zone() {
        let timestamp_ms: u64 = 1_700_000_000_000;
        let local = DateTime::from_timestamp_millis(timestamp_ms as i64)
            .expect("timestamp")
            .with_timezone(&Local);
        let rendered = format_date(timestamp_ms);
        assert!(rendered.contains(&local.format("%H:%M:%S").to_string()));
        assert!(rendered.ends_with(&local.format("%Z %Y").to_string()));
    }

    #[test]
    fn clear_requests_a_delayed_log_clear() {
        let outcome = run("clear", "/", &MemoryVirtualFs::new());
        assert_eq!(
            outcome.effects,
            vec![ShellEffect::ClearLog {
                delay_ms: CLEAR_DELAY_MS
            }]
        );
        assert!(!outcome.is_error);
    }

    #[test]
    fn ls_marks_directories_and_reports_empty_dirs() {
        let fs = MemoryVirtualFs::new().with_file("/Documents/a.txt", "hi");
        assert_eq!(run("ls", "/Documents", &fs).output, "a.txt");
        let root = run("ls", "/", &fs).output;
        assert!(root.lines().any(|line| line == "Documents/"));

        let empty = run("ls", "/Music", &fs);
        assert_eq!(empty.output, "no files found");
        assert!(!empty.is_error);
    }

    #[test]
    fn cd_resolves_parent_root_and_relative_targets() {
        let fs = MemoryVirtualFs::new().with_directory("/Documents/Sub");
        assert_eq!(
            run("cd ..", "/Documents/Sub", &fs).cwd.as_deref(),
            Some("/Documents")
        );
        assert_eq!(run("cd ..", "/", &fs).cwd.as_deref(), Some("/"));
        assert_eq!(run("cd", "/Documents/Sub", &fs).cwd.as_deref(), Some("/"));
        assert_eq!(
            run("cd Documents/Sub", "/", &fs).cwd.as_deref(),
            Some("/Documents/Sub")
        );
        assert_eq!(fs.current_dir(), "/Documents/Sub");
    }

    #[test]
    fn cd_rejects_missing_targets_and_files() {
        let fs = MemoryVirtualFs::new().with_file("/Documents/a.txt", "");
        let missing = run("cd Nowhere", "/", &fs);
        assert!(missing.is_error);
        assert_eq!(missing.cwd, None);
        assert!(missing.output.contains("no such directory"));

        let file = run("cd a.txt", "/Documents", &fs);
        assert!(file.is_error);
        assert!(file.output.contains("not a directory"));
    }

    #[test]
    fn cat_prints_content_or_placeholder() {
        let fs = MemoryVirtualFs::new()
            .with_file("/Documents/a.txt", "hello")
            .with_file("/Documents/empty.txt", "");
        assert_eq!(run("cat a.txt", "/Documents", &fs).output, "hello");
        assert_eq!(run("cat empty.txt", "/Documents", &fs).output, "(empty file)");

        let dir = run("cat Documents", "/", &fs);
        assert!(dir.is_error);
        assert!(dir.output.contains("is a directory"));
        assert!(run("cat", "/", &fs).output.starts_with("usage: cat"));
    }

    #[test]
    fn touch_twice_reports_conflict_without_writing() {
        let fs = SpyFs::new(MemoryVirtualFs::new());
        let first = run("touch a.txt", "/Documents", &fs);
        assert!(!first.is_error);
        let entries_after_first = fs.inner.entry_count();

        let second = run("touch a.txt", "/Documents", &fs);
        assert!(second.is_error);
        assert!(second.output.contains("already exists"));
        assert_eq!(fs.saves.get(), 1);
        assert_eq!(fs.inner.entry_count(), entries_after_first);
    }

    #[test]
    fn rm_missing_entry_never_reaches_the_trash() {
        let fs = SpyFs::new(MemoryVirtualFs::new());
        let outcome = run("rm missingfile", "/", &fs);
        assert!(outcome.is_error);
        assert_eq!(fs.trash_calls.get(), 0);
    }

    #[test]
    fn rm_moves_existing_entry_to_trash() {
        let fs = SpyFs::new(MemoryVirtualFs::new().with_file("/Documents/old.txt", "x"));
        let outcome = run("rm old.txt", "/Documents", &fs);
        assert_eq!(outcome.output, "moved old.txt to trash");
        assert_eq!(fs.trash_calls.get(), 1);
        assert_eq!(fs.inner.trashed()[0].path, "/Documents/old.txt");
        assert!(block_on(fs.inner.stat(&format!("{TRASH_DIR}/old.txt")))
            .expect("stat")
            .is_some());
    }

    #[test]
    fn edit_copies_into_documents_and_launches_textedit() {
        let fs = MemoryVirtualFs::new()
            .with_directory("/Images")
            .with_file("/Images/My File.txt", "draft");
        let outcome = run("edit \"My File.txt\"", "/Images", &fs);

        assert!(!outcome.is_error);
        assert_eq!(
            outcome.effects,
            vec![ShellEffect::LaunchApp {
                app_id: AppId::TextEdit,
                initial_data: Some(json!({
                    "path": "/Documents/My File.txt",
                    "content": "draft"
                })),
            }]
        );
        let copy = block_on(fs.stat("/Documents/My File.txt"))
            .expect("stat")
            .expect("copied");
        assert_eq!(copy.content.as_deref(), Some("draft"));
    }

    #[test]
    fn edit_inside_documents_does_not_copy() {
        let fs = SpyFs::new(MemoryVirtualFs::new().with_file("/Documents/a.txt", "x"));
        let outcome = run("edit a.txt", "/Documents", &fs);
        assert_eq!(outcome.effects.len(), 1);
        assert_eq!(fs.saves.get(), 0);
        assert!(run("edit Documents", "/", &fs).is_error);
        assert!(run("edit nope.txt", "/", &fs).is_error);
    }

    #[test]
    fn chat_verbs_forward_inline_prompt() {
        let fs = MemoryVirtualFs::new();
        assert_eq!(
            run("ryo open   paint", "/", &fs).effects,
            vec![ShellEffect::EnterChat {
                initial_prompt: Some("open paint".to_string())
            }]
        );
        for verb in ["ai", "chat", "RYO"] {
            assert_eq!(
                run(verb, "/", &fs).effects,
                vec![ShellEffect::EnterChat {
                    initial_prompt: None
                }]
            );
        }
    }

    #[test]
    fn history_lists_numbered_entries_with_timestamps() {
        let fs = MemoryVirtualFs::new();
        assert_eq!(run("history", "/", &fs).output, "no command history");

        let mut history = CommandHistory::default();
        history.record("ls", TerminalMode::Command, 0);
        history.record("hi", TerminalMode::Chat, 60_000);
        let outcome = block_on(execute("history", "/", &fs, &history));
        assert_eq!(
            outcome.output,
            "   1  1970-01-01 00:00:00  ls\n   2  1970-01-01 00:01:00  ryo hi"
        );
    }

    #[test]
    fn parse_failures_become_usage_errors() {
        let outcome = run("cat \"open", "/", &MemoryVirtualFs::new());
        assert!(outcome.is_error);
        assert!(outcome.output.contains("unterminated"));
    }
}
