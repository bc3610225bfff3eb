use thiserror::Error;

/// Misuse of the model API. Raised synchronously at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("a model node must be defined from a mapping, found {found}")]
    NotAMapping { found: &'static str },
    #[error("node is sealed and has no property `{key}`")]
    UnknownKey { key: String },
    #[error("`{key}` is a {found}, not a leaf value")]
    NotALeaf { key: String, found: &'static str },
    #[error("node is already attached under `{sub_key}`")]
    ParentAlreadySet { sub_key: String },
    #[error("`{key}` holds {found}, not a handler")]
    NotAHandler { key: String, found: &'static str },
}

/// Error produced by a listener while it handles a delivered batch.
///
/// Kept as a trait object so listener implementations living in other crates
/// can return their own error types.
pub type ListenerError = Box<dyn std::error::Error + 'static>;
