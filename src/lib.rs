//! Hyper Command: resolve tokenized command lines against a tree of commands.
//!
//! Layout:
//!   command   - node arena, per-dispatch context, hooks, completion, dispatch loop
//!   manifest  - declarative command definitions (YAML / JSON) compiled into a tree
//!   utils     - leveled logging
//!
//! Quick tour:
//! ```
//! use std::sync::Arc;
//! use hyper_command::command::{Dispatcher, TreeBuilder, acceptors, examples};
//!
//! let mut builder = TreeBuilder::new("root").unwrap();
//! let hello = builder.command("hello").unwrap();
//! builder
//!     .node(hello)
//!     .example_provider(examples::singleton("hello"))
//!     .argument_acceptor(acceptors::equals("hello"))
//!     .executor(|_ctx| true);
//! builder.sub_command(builder.root(), hello).unwrap();
//!
//! let dispatcher = Dispatcher::new(Arc::new(builder.finish()));
//! let args = vec!["hello".to_string()];
//! assert_eq!(dispatcher.execute(&args).into_option(), Some(true));
//! ```

pub mod command;
pub mod manifest;
pub mod utils;
