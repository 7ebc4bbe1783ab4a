/*!
`complete.rs` - suggestions for the last token of a line.

  hyper-command -c cmds.yaml complete "MyCommand say "
  hyper-command -c cmds.yaml complete "MyCommand s" --json

JSON output:
{
  "status": "ok",
  "tokens": ["MyCommand", "s"],
  "suggestions": ["say", "sum"]      (null when the line reaches no node)
}
*/

use anyhow::Result;
use clap::Args;
use std::path::Path;

use super::format::{Role, StyleOptions, color, emoji};
use super::shared::{load_dispatcher, output_error, print_json, split_line};

#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// Input line; a trailing space completes the next word
    #[arg(value_name = "LINE", default_value = "")]
    pub line: String,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_complete(args: CompleteArgs, manifest: &Path) -> Result<()> {
    let tokens = match split_line(&args.line) {
        Ok(t) => t,
        Err(e) => return output_error(args.json, "Complete Error", &e.to_string()),
    };
    let (dispatcher, _) = match load_dispatcher(manifest) {
        Ok(d) => d,
        Err(e) => return output_error(args.json, "Complete Error", &format!("{e:#}")),
    };

    let suggestions = dispatcher.complete(&tokens);

    if args.json {
        print_json(&serde_json::json!({
            "status": "ok",
            "tokens": tokens,
            "suggestions": suggestions,
        }));
        return Ok(());
    }

    let style = StyleOptions::detect();
    match suggestions {
        Some(list) if !list.is_empty() => {
            for s in list {
                println!("{s}");
            }
        }
        Some(_) => println!(
            "{} {}",
            emoji("info", &style),
            color(Role::Dim, "no suggestions", &style)
        ),
        None => println!(
            "{} {}",
            emoji("info", &style),
            color(Role::Dim, "nothing to complete at this position", &style)
        ),
    }
    Ok(())
}
