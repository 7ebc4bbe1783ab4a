/*!
`tree.rs` - print the compiled command tree (pre-order).

JSON output: array of
  { "id": 3, "path": ["MyCommand", "say", "${message}"], "depth": 2,
    "hooks": ["accept", "examples", "complete", "intercept"] }
The root has an empty path and no depth.
*/

use anyhow::Result;
use clap::Args;
use std::path::Path;

use hyper_command::command::{CommandTree, NodeId};

use super::format::{StyleOptions, box_header, emoji, table};
use super::shared::{load_dispatcher, output_error, print_json};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_tree(args: TreeArgs, manifest: &Path) -> Result<()> {
    let (dispatcher, _) = match load_dispatcher(manifest) {
        Ok(d) => d,
        Err(e) => return output_error(args.json, "Tree Error", &format!("{e:#}")),
    };
    let tree = dispatcher.tree();

    if args.json {
        let nodes: Vec<serde_json::Value> = tree.iter().map(|id| node_json(tree, id)).collect();
        print_json(&serde_json::Value::Array(nodes));
        return Ok(());
    }

    let style = StyleOptions::detect();
    let root = tree.node(tree.root());
    println!(
        "{}",
        box_header(
            format!("{} {}", emoji("tree", &style), root.description()),
            Some(format!("{} node(s)", tree.len())),
            &style,
        )
    );
    let rows: Vec<Vec<String>> = tree
        .iter()
        .filter(|id| !tree.is_root(*id))
        .map(|id| {
            vec![
                tree.path(id).join(" "),
                tree.depth(id).to_string(),
                tree.node(id).hooks().names().join(","),
            ]
        })
        .collect();
    println!("{}", table(&["PATH", "DEPTH", "HOOKS"], &rows, &style));
    Ok(())
}

fn node_json(tree: &CommandTree, id: NodeId) -> serde_json::Value {
    let node = tree.node(id);
    let depth = (!tree.is_root(id)).then(|| tree.depth(id));
    serde_json::json!({
        "id": id.index(),
        "path": tree.path(id),
        "description": node.description(),
        "depth": depth,
        "hooks": node.hooks().names(),
    })
}
