use build_core::error::BuildError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    BuildError(#[from] BuildError),

    #[error("Kube error, {0}")]
    KubeError(#[from] kube::Error),

    #[error("Serde json error, {0}")]
    SerdejsonError(#[from] serde_json::Error),

    #[error("IO error, {0}")]
    IoError(#[from] std::io::Error),

    // 409 on create
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // 404 on get
    #[error("Not found: {0}")]
    NotFound(String),
}
