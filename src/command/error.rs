//! Build-time errors for command trees.

/// Result type alias for tree construction.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Configuration errors raised while assembling a tree. None of these can
/// happen during dispatch.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    /// A node was created with an empty or whitespace-only description.
    #[error("command description must not be blank")]
    BlankDescription,

    /// The child already has a parent (or is the root of the tree).
    #[error("command '{description}' already has a parent; a parent can only be assigned once")]
    ParentAlreadySet { description: String },

    /// The id was not produced by this builder.
    #[error("node #{index} does not belong to this tree")]
    UnknownNode { index: usize },

    /// Attaching the child would make it its own ancestor.
    #[error("attaching '{child}' under '{parent}' would create a cycle")]
    Cycle { parent: String, child: String },
}
