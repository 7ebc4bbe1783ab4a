/*!
CLI subcommands.

Layout:
  src/cmd/
    mod.rs       (this file: module declarations + re-exports)
    complete.rs  (CompleteArgs + execute_complete)
    exec.rs      (ExecArgs + execute_exec)
    tree.rs      (TreeArgs + execute_tree)
    shared.rs    (line splitting, manifest loading, error output)
    format.rs    (colors / boxes / tables for human output)

Conventions:
  - Each subcommand module exposes one public `execute_*` function returning
    `anyhow::Result<()>`; it receives the resolved manifest path.
  - Argument structs derive `clap::Args` and carry their own `--json` flag.
  - JSON goes to stdout, logs to stderr.
*/

pub mod complete;
pub mod exec;
pub mod format;
pub mod shared;
pub mod tree;

pub use complete::{CompleteArgs, execute_complete};
pub use exec::{ExecArgs, execute_exec};
pub use tree::{TreeArgs, execute_tree};
