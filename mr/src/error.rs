use std::path::PathBuf;

use thiserror::Error;

use crate::task::TaskType;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a run can fail. None of them are retried.
#[derive(Debug, Error)]
pub enum Error {
    /// A stage was handed a bad or missing parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Opening, seeking, reading or writing a file failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("input file {} is empty", .0.display())]
    EmptyInput(PathBuf),

    /// A map or reduce function panicked inside its worker.
    #[error("{phase:?} worker {index} panicked")]
    WorkerPanicked { phase: TaskType, index: usize },
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}
