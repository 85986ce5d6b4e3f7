use mc_core::{CompileError, RegistryError};
use thiserror::Error;

/// Errores que ve el caller de `model_compiler` y el binario.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    Request(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Código de salida del proceso para este error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Request(_) | AppError::Json(_) => 2,
            AppError::Registry(_) => 3,
            AppError::Compile(CompileError::NoPathFound { .. }) => 4,
            AppError::Compile(CompileError::ConfigMismatch { .. })
            | AppError::Compile(CompileError::SourceKindMismatch { .. }) => 5,
            AppError::Compile(CompileError::Cancelled { .. }) => 7,
            AppError::Compile(_) => 6,
            AppError::Io(_) => 8,
        }
    }
}
