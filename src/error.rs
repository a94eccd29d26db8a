use thiserror::Error;

use crate::acquisition::AcquisitionError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input '{value}': {reason}")]
    InvalidInput { value: String, reason: String },

    #[error("No renditions are available for this video")]
    EmptyCatalog,

    #[error("Quality {index} does not exist, choose between 1 and {available}")]
    RenditionNotFound { index: usize, available: usize },

    #[error("Expected a quality number, got '{0}'")]
    InvalidSelection(String),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error("Interrupted")]
    Interrupted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_input(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
