/*!
Command tree core.

Layout:
  src/command/
    mod.rs       (this file: module declarations + re-exports)
    tree.rs      (arena, TreeBuilder, depth, token acceptance)
    context.rs   (CommandContext: per-dispatch arguments, cursor, values)
    hooks.rs     (hook types, Action, stock acceptors / examples / interceptors)
    complete.rs  (completion engine + default prefix completer)
    dispatch.rs  (dispatch loop, Dispatcher, Outcome)
    error.rs     (BuildError)

Conventions:
  - Trees are assembled with `TreeBuilder` and frozen with `finish()`; after
    that nothing mutates them, so they are shared through `Arc`.
  - Per-call state goes into `CommandContext`, never into nodes.
  - "No match" is not an error: it surfaces as `None` / `Outcome` variants.
    Only configuration mistakes are `BuildError`s, and programmer mistakes
    (bad cursor, blank context key) panic.
*/

pub mod complete;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod hooks;
pub mod tree;

pub use complete::{default_completer, prefix_filter};
pub use context::CommandContext;
pub use dispatch::{ContextFactory, Dispatcher, Outcome};
pub use error::BuildError;
pub use hooks::{
    Action, ActionInterceptor, ArgumentAcceptor, Completer, ExampleProvider, Executor, Hooks,
    acceptors, examples, interceptors,
};
pub use tree::{CommandNode, CommandTree, NodeId, NodeMut, TreeBuilder};
