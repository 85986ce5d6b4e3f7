//! Tipos de evento del pipeline y estructura `PipelineEvent`.
//!
//! Rol:
//! - Cada ejecución del `PipelineExecutor` emite eventos a un `EventStore`
//!   append-only, identificados por un `run_id`.
//! - Con esos eventos `RunReport::replay` reconstruye el estado por step sin
//!   depender de estructuras mutables del executor.
//! - `PipelineEventKind` es el contrato observable del executor.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::RepresentationType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineEventKind {
    /// Primer evento de un run. Fija el fingerprint del path y su longitud.
    RunStarted {
        path_fingerprint: String,
        source_type: RepresentationType,
        target_type: RepresentationType,
        step_count: usize,
    },
    /// Un step comenzó. No implica éxito.
    StepStarted {
        step_index: usize,
        step_id: String,
        source_type: RepresentationType,
        target_type: RepresentationType,
    },
    /// Un step terminó correctamente.
    StepFinished { step_index: usize, step_id: String },
    /// Un step falló; el run no continúa.
    StepFailed {
        step_index: usize,
        step_id: String,
        error: String,
    },
    /// Recurso liberado por el executor. `step_index` es el step que lo creó.
    ResourceReleased { step_index: usize, resource: String },
    /// La liberación de un recurso falló (no enmascara el resultado del run).
    ReleaseFailed {
        step_index: usize,
        resource: String,
        error: String,
    },
    /// Cancelación observada antes de arrancar `step_index`.
    RunCancelled { step_index: usize },
    /// Evento de cierre de un run exitoso: tipo del artifact entregado y
    /// número de recursos transferidos al caller.
    RunCompleted {
        output_type: RepresentationType,
        handed_over: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub run_id: Uuid,
    pub kind: PipelineEventKind,
    pub ts: DateTime<Utc>,
}
