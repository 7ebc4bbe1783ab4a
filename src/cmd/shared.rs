/*!
shared.rs - helpers used by every subcommand.

  - split_line: raw input line -> argument tokens
  - resolve_manifest_path: -c/--commands > HYPER_COMMANDS
  - load_dispatcher: manifest file -> Dispatcher + reply sink
  - output_error / print_json: uniform error and JSON output
*/

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use hyper_command::command::Dispatcher;
use hyper_command::log_debug;
use hyper_command::manifest::{self, ConverterRegistry, Manifest, ReplySink};

use super::format::{Role, StyleOptions, box_header, color, emoji};

pub const COMMANDS_ENV: &str = "HYPER_COMMANDS";

/* ---- Input ---- */

/// Split a line the way a shell would. A line that is empty or ends with
/// unescaped whitespace gets a trailing empty token, so completion targets
/// the position after the last word.
pub fn split_line(line: &str) -> Result<Vec<String>> {
    let mut tokens =
        shell_words::split(line).with_context(|| format!("cannot tokenize line: {line:?}"))?;
    let trimmed = line.trim_end();
    // An odd run of trailing backslashes escapes the first trailing space.
    let backslashes = trimmed.chars().rev().take_while(|c| *c == '\\').count();
    let open_position = trimmed.len() < line.len() && backslashes % 2 == 0;
    if tokens.is_empty() || open_position {
        tokens.push(String::new());
    }
    Ok(tokens)
}

/* ---- Manifest ---- */

pub fn resolve_manifest_path(flag: Option<&str>) -> Result<PathBuf> {
    let from_env = || {
        std::env::var(COMMANDS_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
    };
    match flag.map(str::to_string).or_else(from_env) {
        Some(p) => Ok(PathBuf::from(p.trim())),
        None => anyhow::bail!("no command manifest specified (use --commands or {COMMANDS_ENV})"),
    }
}

/// Load + compile the manifest. Executors render their reply into the
/// returned sink.
pub fn load_dispatcher(path: &std::path::Path) -> Result<(Dispatcher, ReplySink)> {
    let manifest = Manifest::load(path)
        .with_context(|| format!("failed to load command manifest: {}", path.display()))?;
    let sink: ReplySink = Arc::new(Mutex::new(Vec::new()));
    let registry = ConverterRegistry::standard();
    let tree = manifest::compile(&manifest, &registry, |_, sub| {
        manifest::reply_executor(sub, Arc::clone(&sink))
    })
    .with_context(|| format!("invalid command manifest: {}", path.display()))?;
    log_debug!(
        "[manifest] {} -> {} node(s)",
        path.display(),
        tree.len()
    );
    Ok((Dispatcher::new(Arc::new(tree)), sink))
}

pub fn drain_replies(sink: &ReplySink) -> Vec<String> {
    match sink.lock() {
        Ok(mut replies) => std::mem::take(&mut *replies),
        Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    }
}

/* ---- Output ---- */

pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

/// Print `msg` (boxed, or as a JSON error object) and fail with it.
pub fn output_error(json: bool, title: &str, msg: &str) -> Result<()> {
    if json {
        print_json(&serde_json::json!({"status": "error", "error": msg}));
    } else {
        let style = StyleOptions::detect();
        let header = box_header(
            format!("{} {title}", emoji("error", &style)),
            Some(color(Role::Error, msg, &style)),
            &style,
        );
        println!("{header}");
    }
    anyhow::bail!(msg.to_string())
}

/* ---- Tests ---- */
#[cfg(test)]
mod tests {
    use super::*;

    fn toks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_plain_words() {
        assert_eq!(split_line("hello world").unwrap(), toks(&["hello", "world"]));
    }

    #[test]
    fn trailing_space_opens_next_position() {
        assert_eq!(split_line("hello ").unwrap(), toks(&["hello", ""]));
        assert_eq!(split_line("").unwrap(), toks(&[""]));
        assert_eq!(split_line("   ").unwrap(), toks(&[""]));
    }

    #[test]
    fn quotes_and_escapes() {
        assert_eq!(
            split_line("say 'hi there'").unwrap(),
            toks(&["say", "hi there"])
        );
        assert_eq!(split_line("say hi\\ ").unwrap(), toks(&["say", "hi "]));
    }

    #[test]
    fn escaped_backslash_keeps_trailing_position() {
        assert_eq!(
            split_line("say a\\\\ ").unwrap(),
            toks(&["say", "a\\", ""])
        );
        assert_eq!(
            split_line("say a\\\\\\ ").unwrap(),
            toks(&["say", "a\\ "])
        );
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(split_line("say 'oops").is_err());
    }

    #[test]
    fn flag_wins_over_env() {
        let p = resolve_manifest_path(Some("cmds.yaml")).unwrap();
        assert_eq!(p, PathBuf::from("cmds.yaml"));
    }

    #[test]
    fn load_dispatcher_from_file() {
        let path = std::env::temp_dir().join("hyper_command_cli_test.yaml");
        std::fs::write(
            &path,
            "commands:\n  - name: greet\n    subcommands:\n      - expression: \"hi ${who}\"\n        params: { who: string }\n        reply: \"hi ${who}\"\n",
        )
        .unwrap();
        let (dispatcher, sink) = load_dispatcher(&path).unwrap();
        let outcome = dispatcher.execute(&split_line("greet hi bob").unwrap());
        assert!(outcome.is_success());
        assert_eq!(drain_replies(&sink), toks(&["hi bob"]));
        assert!(drain_replies(&sink).is_empty());
    }
}
