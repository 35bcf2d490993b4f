use thiserror::Error;

/// Errors raised at the point of misuse.
///
/// Traversal and mutation never error on "no match" conditions; absence is
/// reported as an empty [`Selection`](crate::Selection) or `None`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeQueryError {
    /// Session creation with a root that is not a JSON object.
    #[error("expected the tree root to be a JSON object")]
    InvalidInput,

    /// A selection was scoped to something that cannot name overlay nodes.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
