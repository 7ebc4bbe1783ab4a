/*!
`exec.rs` - run the command a line resolves to.

  hyper-command -c cmds.yaml exec "MyCommand say hello"
  hyper-command -c cmds.yaml exec "MyCommand sum 1 2" --json

JSON Success Output:
{
  "status": "ok",
  "outcome": "executed",
  "tokens": ["MyCommand", "say", "hello"],
  "elapsed_ms": 0,
  "replies": ["hello"]
}

Any other outcome (not_found, incomplete, no_executor, intercepted, failed)
is reported as an error and the process exits non-zero:
{
  "status": "error",
  "error": "intercepted: ..."
}
*/

use anyhow::Result;
use clap::Args;
use std::path::Path;
use std::time::Instant;

use hyper_command::command::Outcome;
use hyper_command::log_debug;

use super::format::{Role, StyleOptions, box_header, color, emoji};
use super::shared::{drain_replies, load_dispatcher, output_error, print_json, split_line};

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Input line to execute
    #[arg(value_name = "LINE", default_value = "")]
    pub line: String,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_exec(args: ExecArgs, manifest: &Path) -> Result<()> {
    let tokens = match split_line(&args.line) {
        Ok(t) => t,
        Err(e) => return output_error(args.json, "Exec Error", &e.to_string()),
    };
    let (dispatcher, sink) = match load_dispatcher(manifest) {
        Ok(d) => d,
        Err(e) => return output_error(args.json, "Exec Error", &format!("{e:#}")),
    };

    let started = Instant::now();
    let outcome = dispatcher.execute(&tokens);
    let elapsed_ms = started.elapsed().as_millis();
    let replies = drain_replies(&sink);
    log_debug!("[exec] {:?} -> {outcome} ({elapsed_ms} ms)", tokens);

    if !outcome.is_success() {
        return output_error(args.json, "Exec Error", &describe_failure(outcome, &args.line));
    }

    if args.json {
        print_json(&serde_json::json!({
            "status": "ok",
            "outcome": outcome.as_str(),
            "tokens": tokens,
            "elapsed_ms": elapsed_ms,
            "replies": replies,
        }));
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        box_header(
            format!("{} Executed", emoji("success", &style)),
            Some(format!("{} • {elapsed_ms}ms", args.line.trim())),
            &style,
        )
    );
    for reply in replies {
        println!("{}", color(Role::Success, reply, &style));
    }
    Ok(())
}

fn describe_failure(outcome: Outcome, line: &str) -> String {
    let why = match outcome {
        Outcome::NotFound => "no command matches",
        Outcome::Incomplete => "command is incomplete",
        Outcome::NoExecutor => "command has no executor",
        Outcome::Intercepted => "execution was blocked",
        Outcome::Executed(false) => "command reported failure",
        Outcome::Executed(true) => "ok",
    };
    format!("{}: {why}: {:?}", outcome.as_str(), line)
}
