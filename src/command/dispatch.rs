/*!
dispatch.rs - the driver for one `complete` / `execute` call.

The dispatch loop starts at the root and asks the current node to accept one
more token, once per argument, stopping early when no child matches. The node
reached is then asked to complete or execute. Each call works on a context
that is reset before and after, so nothing leaks between dispatches.

`Dispatcher` receives the tree and a context factory explicitly; there is no
global registry to look them up from.
*/

use std::fmt;
use std::sync::Arc;

use super::context::CommandContext;
use super::hooks::Action;
use super::tree::{CommandTree, NodeId};
use crate::log_trace;

/// Result of an execute dispatch.
///
/// The classic tri-state (`None` / `Some(true)` / `Some(false)`) folds the
/// first four variants into `None`; see `Outcome::into_option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Some token along the path matched no child.
    NotFound,
    /// The node reached is not positioned at the last token.
    Incomplete,
    /// The node reached has no executor.
    NoExecutor,
    /// The node's interceptor blocked execution.
    Intercepted,
    /// The executor ran and reported success (`true`) or failure (`false`).
    Executed(bool),
}

impl Outcome {
    pub fn into_option(self) -> Option<bool> {
        match self {
            Outcome::Executed(ok) => Some(ok),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Executed(true))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::NotFound => "not_found",
            Outcome::Incomplete => "incomplete",
            Outcome::NoExecutor => "no_executor",
            Outcome::Intercepted => "intercepted",
            Outcome::Executed(true) => "executed",
            Outcome::Executed(false) => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CommandTree {
    /// Run the executor of node `id` when it sits exactly at the last token.
    pub fn execute(&self, id: NodeId, ctx: &mut CommandContext, args: &[String]) -> Outcome {
        let depth = self.depth(id);
        if args.len() != depth + 1 {
            return Outcome::Incomplete;
        }
        let node = self.node(id);
        let Some(executor) = node.executor() else {
            return Outcome::NoExecutor;
        };
        ctx.set_arguments(args);
        ctx.set_depth(depth);
        if self.intercepts(id, ctx, Action::Execute, args) {
            return Outcome::Intercepted;
        }
        log_trace!("[execute]({}) running executor", node.description());
        Outcome::Executed(executor(ctx))
    }
}

pub type ContextFactory = Box<dyn Fn() -> CommandContext + Send + Sync>;

/// Deepest node reached by the dispatch loop.
struct Walk {
    node: NodeId,
    exhausted: bool,
}

pub struct Dispatcher {
    tree: Arc<CommandTree>,
    contexts: ContextFactory,
}

impl Dispatcher {
    /// Dispatcher that creates a fresh `CommandContext` per call.
    pub fn new(tree: Arc<CommandTree>) -> Self {
        Self::with_context_factory(tree, CommandContext::new)
    }

    pub fn with_context_factory(
        tree: Arc<CommandTree>,
        factory: impl Fn() -> CommandContext + Send + Sync + 'static,
    ) -> Self {
        Self {
            tree,
            contexts: Box::new(factory),
        }
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn complete(&self, args: &[String]) -> Option<Vec<String>> {
        let mut ctx = (self.contexts)();
        self.complete_with(&mut ctx, args)
    }

    pub fn execute(&self, args: &[String]) -> Outcome {
        let mut ctx = (self.contexts)();
        self.execute_with(&mut ctx, args)
    }

    /// Suggestions for the last token of `args` using a caller-owned context.
    pub fn complete_with(&self, ctx: &mut CommandContext, args: &[String]) -> Option<Vec<String>> {
        ctx.reset();
        let walk = self.walk(ctx, args);
        let completed = self.tree.complete(walk.node, ctx, args);
        ctx.reset();
        completed
    }

    /// Execute `args` using a caller-owned context.
    pub fn execute_with(&self, ctx: &mut CommandContext, args: &[String]) -> Outcome {
        ctx.reset();
        let walk = self.walk(ctx, args);
        let outcome = if walk.exhausted {
            Outcome::NotFound
        } else {
            self.tree.execute(walk.node, ctx, args)
        };
        ctx.reset();
        log_trace!("[dispatch] {:?} -> {outcome}", args);
        outcome
    }

    /// Consume one token per level, left to right, first match wins.
    fn walk(&self, ctx: &mut CommandContext, args: &[String]) -> Walk {
        let mut node = self.tree.root();
        for _ in 0..args.len() {
            match self.tree.accept(node, ctx, args) {
                Some(next) => node = next,
                None => {
                    return Walk {
                        node,
                        exhausted: true,
                    };
                }
            }
        }
        Walk {
            node,
            exhausted: false,
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("nodes", &self.tree.len())
            .finish()
    }
}

/* ---- Tests ---- */
#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::hooks::{acceptors, examples, interceptors};
    use crate::command::tree::TreeBuilder;
    use std::sync::Mutex;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    /// root -> hello (executes) -> name (ketikai|world|fuckU, "fuckU" blocked on execute)
    fn hello_tree(log: Arc<Mutex<Vec<String>>>) -> Dispatcher {
        let names = ["ketikai", "world", "fuckU"];
        let mut b = TreeBuilder::new("root").unwrap();
        let hello = b.command("hello").unwrap();
        let hello_log = Arc::clone(&log);
        b.node(hello)
            .example_provider(examples::singleton("hello"))
            .argument_acceptor(acceptors::equals("hello"))
            .executor(move |_| {
                hello_log.lock().unwrap().push("hi".into());
                true
            });
        let name = b.command("name").unwrap();
        let name_log = Arc::clone(&log);
        b.node(name)
            .example_provider(examples::collection(names))
            .argument_acceptor(acceptors::contains(names))
            .action_interceptor(interceptors::on_execute(|ctx| ctx.argument() == "fuckU"))
            .executor(move |ctx| {
                name_log.lock().unwrap().push(format!("[{}]: hi", ctx.argument()));
                true
            });
        b.sub_command(b.root(), hello).unwrap();
        b.sub_command(hello, name).unwrap();
        Dispatcher::new(Arc::new(b.finish()))
    }

    #[test]
    fn hello_scenario() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let d = hello_tree(Arc::clone(&log));

        assert_eq!(d.execute(&args(&["hello"])), Outcome::Executed(true));
        assert_eq!(d.execute(&args(&["hello", "ketikai"])).into_option(), Some(true));
        assert_eq!(d.execute(&args(&["hello", "world"])).into_option(), Some(true));
        assert_eq!(d.execute(&args(&["hello", "fuckU"])), Outcome::Intercepted);
        assert_eq!(d.execute(&args(&["hello", ""])).into_option(), None);
        assert_eq!(d.execute(&args(&["hello", "ketikai", ""])).into_option(), None);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["hi", "[ketikai]: hi", "[world]: hi"]
        );
    }

    #[test]
    fn completion_after_hello() {
        let d = hello_tree(Arc::new(Mutex::new(Vec::new())));
        assert_eq!(
            d.complete(&args(&["hello", ""])),
            Some(args(&["ketikai", "world", "fuckU"]))
        );
        assert_eq!(d.complete(&args(&["hello", "k"])), Some(args(&["ketikai"])));
        assert_eq!(d.complete(&args(&["hel"])), Some(args(&["hello"])));
        // Unknown first token: root stays current, position 0 still qualifies.
        assert_eq!(d.complete(&args(&["x"])), Some(args(&["hello"])));
        // Past the end of the tree.
        assert_eq!(d.complete(&args(&["hello", "world", ""])), Some(vec![]));
        assert_eq!(d.complete(&args(&["hello", "nobody", ""])), None);
    }

    #[test]
    fn not_found_and_empty_input() {
        let d = hello_tree(Arc::new(Mutex::new(Vec::new())));
        assert_eq!(d.execute(&args(&["bye"])), Outcome::NotFound);
        assert_eq!(d.execute(&[]), Outcome::Incomplete);
        assert_eq!(d.execute(&[]).into_option(), None);
    }

    #[test]
    fn missing_executor_is_reported() {
        let mut b = TreeBuilder::new("root").unwrap();
        let group = b.command("group").unwrap();
        b.node(group).argument_acceptor(acceptors::equals("group"));
        b.sub_command(b.root(), group).unwrap();
        let d = Dispatcher::new(Arc::new(b.finish()));
        assert_eq!(d.execute(&args(&["group"])), Outcome::NoExecutor);
    }

    #[test]
    fn executor_failure_is_false() {
        let mut b = TreeBuilder::new("root").unwrap();
        let fail = b.command("fail").unwrap();
        b.node(fail)
            .argument_acceptor(acceptors::equals("fail"))
            .executor(|_| false);
        b.sub_command(b.root(), fail).unwrap();
        let d = Dispatcher::new(Arc::new(b.finish()));
        let outcome = d.execute(&args(&["fail"]));
        assert_eq!(outcome.into_option(), Some(false));
        assert_eq!(outcome.to_string(), "failed");
    }

    #[test]
    fn context_is_reset_after_each_call() {
        let mut b = TreeBuilder::new("root").unwrap();
        let n = b.command("n").unwrap();
        b.node(n)
            .argument_acceptor(|ctx| match ctx.argument().parse::<i64>() {
                Ok(v) => {
                    ctx.put("n", v);
                    true
                }
                Err(_) => false,
            })
            .executor(|ctx| ctx.get::<i64>("n") == Some(&42));
        b.sub_command(b.root(), n).unwrap();
        let d = Dispatcher::new(Arc::new(b.finish()));

        let mut ctx = CommandContext::new();
        ctx.put("stale", true);
        assert_eq!(d.execute_with(&mut ctx, &args(&["42"])), Outcome::Executed(true));
        assert!(ctx.is_reset());

        ctx.put("stale", true);
        assert_eq!(d.complete_with(&mut ctx, &args(&[""])), Some(vec![]));
        assert!(ctx.is_reset());
    }

    #[test]
    fn repeated_dispatch_is_idempotent() {
        let d = hello_tree(Arc::new(Mutex::new(Vec::new())));
        let input = args(&["hello", "wor"]);
        let first = (d.complete(&input), d.execute(&input));
        let second = (d.complete(&input), d.execute(&input));
        assert_eq!(first, second);
    }

    #[test]
    fn custom_context_factory_is_used() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let tree = Arc::new(TreeBuilder::new("root").unwrap().finish());
        let d = Dispatcher::with_context_factory(tree, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            CommandContext::new()
        });
        d.execute(&args(&["a"]));
        d.complete(&args(&["a"]));
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_dispatches_share_the_tree() {
        let d = Arc::new(hello_tree(Arc::new(Mutex::new(Vec::new()))));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let d = Arc::clone(&d);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| d.execute(&args(&["hello", "world"])))
                        .all(|o| o == Outcome::Executed(true))
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
    }
}
