use thiserror::Error;
use vmbind_reactive::ModelError;

/// Failure raised by a [`Processor`](crate::Processor) while applying a value.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("`{key}` expects a {expected}, found {found}")]
    UnexpectedValue {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("no template named `{0}`")]
    UnknownTemplate(String),
    #[error("rendering a nested binder failed")]
    Nested(#[source] Box<BindError>),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("{0}")]
    Custom(String),
}

impl ProcessError {
    pub fn custom(message: impl Into<String>) -> Self {
        ProcessError::Custom(message.into())
    }
}

/// Failure of a render or dispatch pass. The remainder of the pass is
/// abandoned; nothing is retried.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("processor `{category}` failed on `{key}`")]
    Process {
        category: String,
        key: String,
        #[source]
        source: ProcessError,
    },
}

impl BindError {
    pub(crate) fn process(category: &str, key: &str, source: ProcessError) -> Self {
        BindError::Process {
            category: category.to_string(),
            key: key.to_string(),
            source,
        }
    }

    pub fn category(&self) -> &str {
        match self {
            BindError::Process { category, .. } => category,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            BindError::Process { key, .. } => key,
        }
    }
}
