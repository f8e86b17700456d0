use revtrack_types::TypeError;

/// Errors from host and patch store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The blob exists but is not valid UTF-8 text.
    #[error("{0} is not valid UTF-8 text")]
    InvalidUtf8(String),

    /// The path is not a valid location inside the host.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] TypeError),

    /// The host refused or could not complete the operation.
    #[error("host unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
