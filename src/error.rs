use thiserror::Error;

/// Crate-wide result alias. `E` is the caller's own task error type.
pub type Result<T, E> = std::result::Result<T, Error<E>>;

/// What a run can fail with: exactly one of these per run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error<E> {
    /// The run was aborted before this work finished, either because the
    /// caller's token fired or because a sibling item failed first.
    #[error("operation canceled")]
    Canceled,
    /// The caller-supplied task failed; its error is carried verbatim.
    #[error("task failed: {0}")]
    Task(E),
}

impl<E> Error<E> {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled)
    }

    /// The underlying task error, if this wasn't a cancellation.
    pub fn into_task(self) -> Option<E> {
        match self {
            Error::Task(error) => Some(error),
            Error::Canceled => None,
        }
    }
}

/* Conversion so `?` works smoothly on task results */
impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::Task(error)
    }
}
