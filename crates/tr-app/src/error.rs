//! Error types for the tr-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors into the
/// unified surface both frontends recover at the operation boundary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Def(#[from] tr_deffile::DefError),

    #[error(transparent)]
    Model(#[from] tr_model::ModelError),

    #[error("{program} is not installed or configured properly on this system")]
    ExternalProcessUnavailable { program: String },

    #[error("Data cube ({inset}) specified at INSET parameter doesn't exist at {}", path.display())]
    MissingDataCube { inset: String, path: PathBuf },

    #[error("No file is open")]
    NoDocument,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tr-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<tr_core::TrError> for AppError {
    fn from(err: tr_core::TrError) -> Self {
        AppError::Model(tr_model::ModelError::Core(err))
    }
}
