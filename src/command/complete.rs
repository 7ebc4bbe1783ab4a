/*!
complete.rs - suggestion engine.

Completion happens at a single position: the token currently being typed,
i.e. the last element of the argument array. A node qualifies when that
position is the one right below it (its depth + 1, or 0 for the root).

For a qualifying node every child with an example provider contributes
candidates, unless its interceptor blocks `Action::Complete`. A child's own
completer filters its candidates when the partial token is non-blank, and the
aggregate is finally run through the default prefix filter.
*/

use super::context::CommandContext;
use super::hooks::{Action, Completer};
use super::tree::{CommandTree, NodeId};
use crate::log_trace;

/// Keep candidates starting with `partial` (case-sensitive). When nothing
/// matches, the original list is returned unchanged so the user still sees
/// every option.
pub fn prefix_filter(partial: &str, examples: Vec<String>) -> Vec<String> {
    if examples.is_empty() {
        return examples;
    }
    let matched: Vec<String> = examples
        .iter()
        .filter(|e| e.starts_with(partial))
        .cloned()
        .collect();
    if matched.is_empty() { examples } else { matched }
}

/// `prefix_filter` against the token under the context cursor.
pub fn default_completer() -> Completer {
    Box::new(|ctx: &CommandContext, examples: Vec<String>| prefix_filter(ctx.argument(), examples))
}

impl CommandTree {
    /// Suggestions for the last token of `args`, or `None` when node `id` is
    /// not positioned right above it.
    pub fn complete(
        &self,
        id: NodeId,
        ctx: &mut CommandContext,
        args: &[String],
    ) -> Option<Vec<String>> {
        let mut position = self.depth(id);
        if !self.is_root(id) {
            position += 1;
        }
        if args.len() != position + 1 {
            return None;
        }
        ctx.set_arguments(args);
        ctx.set_depth(position);
        let ctx: &CommandContext = ctx;

        let partial = args[position].as_str();
        let partial_blank = partial.trim().is_empty();
        let mut examples = Vec::new();
        for &child in self.children(id) {
            let node = self.node(child);
            let Some(provider) = node.example_provider() else {
                continue;
            };
            if self.intercepts(child, ctx, Action::Complete, args) {
                continue;
            }
            let provided = provider(ctx);
            if provided.is_empty() {
                continue;
            }
            match node.completer() {
                Some(completer) if !partial_blank => examples.extend(completer(ctx, provided)),
                _ => examples.extend(provided),
            }
        }

        log_trace!(
            "[complete]({}) {} candidate(s) for '{}'",
            self.node(id).description(),
            examples.len(),
            partial
        );
        Some(prefix_filter(partial, examples))
    }
}

/* ---- Tests ---- */
#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::hooks::{acceptors, examples, interceptors};
    use crate::command::tree::TreeBuilder;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prefix_filter_keeps_matches() {
        let out = prefix_filter("wo", strings(&["ketikai", "world", "wow"]));
        assert_eq!(out, strings(&["world", "wow"]));
    }

    #[test]
    fn prefix_filter_falls_back_to_everything() {
        let all = strings(&["ketikai", "world"]);
        assert_eq!(prefix_filter("z", all.clone()), all);
    }

    #[test]
    fn prefix_filter_is_case_sensitive() {
        let all = strings(&["World", "world"]);
        assert_eq!(prefix_filter("w", all), strings(&["world"]));
    }

    #[test]
    fn prefix_filter_empty_input() {
        assert!(prefix_filter("x", Vec::new()).is_empty());
    }

    /// root -> hello -> {name (examples), hidden (complete blocked), silent (no examples)}
    fn tree() -> (CommandTree, NodeId) {
        let mut b = TreeBuilder::new("root").unwrap();
        let hello = b.command("hello").unwrap();
        b.node(hello)
            .example_provider(examples::singleton("hello"))
            .argument_acceptor(acceptors::equals("hello"));
        let name = b.command("name").unwrap();
        b.node(name)
            .example_provider(examples::collection(["ketikai", "world", "wow"]))
            .argument_acceptor(acceptors::contains(["ketikai", "world", "wow"]));
        let hidden = b.command("hidden").unwrap();
        b.node(hidden)
            .example_provider(examples::singleton("secret"))
            .action_interceptor(interceptors::on_complete(|_| true));
        let silent = b.command("silent").unwrap();
        b.node(silent).argument_acceptor(acceptors::equals("silent"));
        b.sub_command(b.root(), hello).unwrap();
        b.sub_commands(hello, [name, hidden, silent]).unwrap();
        (b.finish(), hello)
    }

    #[test]
    fn root_completes_first_token() {
        let (tree, _) = tree();
        let mut ctx = CommandContext::new();
        let out = tree.complete(tree.root(), &mut ctx, &strings(&["he"]));
        assert_eq!(out, Some(strings(&["hello"])));
    }

    #[test]
    fn blank_partial_lists_all_unblocked_examples() {
        let (tree, hello) = tree();
        let mut ctx = CommandContext::new();
        let out = tree.complete(hello, &mut ctx, &strings(&["hello", ""]));
        assert_eq!(out, Some(strings(&["ketikai", "world", "wow"])));
    }

    #[test]
    fn partial_token_filters() {
        let (tree, hello) = tree();
        let mut ctx = CommandContext::new();
        let out = tree.complete(hello, &mut ctx, &strings(&["hello", "w"]));
        assert_eq!(out, Some(strings(&["world", "wow"])));
    }

    #[test]
    fn position_mismatch_yields_none() {
        let (tree, hello) = tree();
        let mut ctx = CommandContext::new();
        assert_eq!(tree.complete(hello, &mut ctx, &strings(&["hello"])), None);
        assert_eq!(
            tree.complete(hello, &mut ctx, &strings(&["hello", "a", "b"])),
            None
        );
        assert_eq!(tree.complete(tree.root(), &mut ctx, &[]), None);
    }

    #[test]
    fn qualifying_position_without_examples_is_empty() {
        let mut b = TreeBuilder::new("root").unwrap();
        let bare = b.command("bare").unwrap();
        b.sub_command(b.root(), bare).unwrap();
        let tree = b.finish();
        let mut ctx = CommandContext::new();
        assert_eq!(tree.complete(tree.root(), &mut ctx, &strings(&["x"])), Some(vec![]));
    }

    #[test]
    fn custom_completer_skipped_for_blank_partial() {
        let mut b = TreeBuilder::new("root").unwrap();
        let color = b.command("color").unwrap();
        b.node(color)
            .example_provider(examples::collection(["red", "green", "blue"]))
            .completer(|_: &CommandContext, _: Vec<String>| {
                panic!("completer must not run for a blank partial token")
            });
        b.sub_command(b.root(), color).unwrap();
        let tree = b.finish();

        let mut ctx = CommandContext::new();
        assert_eq!(
            tree.complete(tree.root(), &mut ctx, &strings(&[""])),
            Some(strings(&["red", "green", "blue"]))
        );
        assert_eq!(
            tree.complete(tree.root(), &mut ctx, &strings(&["  "])),
            Some(strings(&["red", "green", "blue"]))
        );
    }

    #[test]
    fn custom_completer_applies_to_non_blank_partial() {
        let mut b = TreeBuilder::new("root").unwrap();
        let color = b.command("color").unwrap();
        b.node(color)
            .example_provider(examples::collection(["red", "green", "blue"]))
            .completer(|ctx: &CommandContext, examples: Vec<String>| {
                examples
                    .into_iter()
                    .filter(|e| e.contains(ctx.argument()))
                    .collect()
            });
        b.sub_command(b.root(), color).unwrap();
        let tree = b.finish();

        let mut ctx = CommandContext::new();
        // "ee" only occurs inside "green" and is a prefix of nothing, so the
        // aggregate prefix filter falls back to the completer's output.
        assert_eq!(
            tree.complete(tree.root(), &mut ctx, &strings(&["ee"])),
            Some(strings(&["green"]))
        );
    }
}
