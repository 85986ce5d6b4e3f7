//! Errores del core.
//!
//! - `RegistryError`: configuración del registry (al arrancar, nunca por request).
//! - `CompileError`: lo que recibe el caller de `Compiler::compile`.
//! - `PipelineError`: resultado fallido del executor (se aplana en `CompileError`).
//! - `StepError`: fallo interno de un step concreto.

use std::fmt;

use thiserror::Error;

use crate::model::RepresentationType;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RegistryError {
    #[error("duplicate step for {source_type} -> {target_type}: '{rejected}' conflicts with '{existing}'")]
    RegistrationConflict {
        source_type: RepresentationType,
        target_type: RepresentationType,
        existing: String,
        rejected: String,
    },
}

/// Motivo por el que un campo de configuración no pudo resolverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchReason {
    /// Campo requerido sin valor en la configuración ni default.
    Missing,
    /// El valor existe pero no encaja con el tipo declarado.
    WrongKind { expected: &'static str },
    /// El valor tiene la forma correcta pero el step lo rechaza.
    Rejected { message: String },
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchReason::Missing => f.write_str("required field is missing"),
            MismatchReason::WrongKind { expected } => write!(f, "expected {expected}"),
            MismatchReason::Rejected { message } => write!(f, "rejected: {message}"),
        }
    }
}

/// Rechazo de una configuración proyectada por parte de su step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRejection {
    /// Campo culpable, si el step pudo identificarlo.
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid input artifact: {0}")]
    InvalidInput(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("step produced {found} but declared {expected}")]
    ContractViolation {
        expected: RepresentationType,
        found: RepresentationType,
    },
    #[error("tool failure: {0}")]
    Tool(String),
    #[error("step cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("step {step_index} ({source_type} -> {target_type}) failed: {cause}")]
    StepFailed {
        step_index: usize,
        source_type: RepresentationType,
        target_type: RepresentationType,
        #[source]
        cause: StepError,
    },
    #[error("pipeline cancelled at step {step_index}")]
    Cancelled { step_index: usize },
    #[error("pipeline misuse: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("no conversion path from {source_type} to {target_type}")]
    NoPathFound {
        source_type: RepresentationType,
        target_type: RepresentationType,
    },
    #[error("config mismatch at step {step_index} ('{step_id}'), field '{field}': {reason}")]
    ConfigMismatch {
        step_index: usize,
        step_id: String,
        field: String,
        reason: MismatchReason,
    },
    #[error("source artifact is {found}, request declares {expected}")]
    SourceKindMismatch {
        expected: RepresentationType,
        found: RepresentationType,
    },
    #[error("step {step_index} ({source_type} -> {target_type}) failed: {cause}")]
    StepFailed {
        step_index: usize,
        source_type: RepresentationType,
        target_type: RepresentationType,
        #[source]
        cause: StepError,
    },
    #[error("compilation cancelled at step {step_index}")]
    Cancelled { step_index: usize },
    #[error("internal: {0}")]
    Internal(String),
}

impl From<PipelineError> for CompileError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::StepFailed { step_index,
                                        source_type,
                                        target_type,
                                        cause, } => CompileError::StepFailed { step_index,
                                                                               source_type,
                                                                               target_type,
                                                                               cause },
            PipelineError::Cancelled { step_index } => CompileError::Cancelled { step_index },
            PipelineError::Internal(msg) => CompileError::Internal(msg),
        }
    }
}
