//! Reporte de un run reconstruido a partir de sus eventos.
//!
//! `RunReport::replay` consume los eventos en orden y actualiza un slot por
//! step. No guarda artifacts, sólo estado, tiempos y recursos liberados.
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::event::{PipelineEvent, PipelineEventKind};
use crate::model::RepresentationType;
use crate::step::{RunState, StepStatus};

/// Estado de un step en el reporte.
#[derive(Debug, Clone)]
pub struct StepSlot {
    pub step_id: String,
    pub source_type: RepresentationType,
    pub target_type: RepresentationType,
    pub status: StepStatus,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub released: Vec<String>, // recursos creados por este step ya liberados
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub path_fingerprint: Option<String>,
    pub steps: Vec<StepSlot>,
    pub state: RunState,
}

impl RunReport {
    pub fn replay(run_id: Uuid, events: &[PipelineEvent]) -> Self {
        let mut report = RunReport { run_id,
                                     path_fingerprint: None,
                                     steps: Vec::new(),
                                     state: RunState::Pending };
        for ev in events.iter().filter(|e| e.run_id == run_id) {
            match &ev.kind {
                PipelineEventKind::RunStarted { path_fingerprint, .. } => {
                    report.path_fingerprint = Some(path_fingerprint.clone());
                }
                PipelineEventKind::StepStarted { step_index,
                                                 step_id,
                                                 source_type,
                                                 target_type, } => {
                    let slot = report.slot(*step_index, step_id, *source_type, *target_type);
                    slot.status = StepStatus::Running;
                    slot.started_at = Some(ev.ts);
                    report.state = RunState::Running(*step_index);
                }
                PipelineEventKind::StepFinished { step_index, .. } => {
                    if let Some(slot) = report.steps.get_mut(*step_index) {
                        slot.status = StepStatus::FinishedOk;
                        slot.finished_at = Some(ev.ts);
                    }
                }
                PipelineEventKind::StepFailed { step_index, error, .. } => {
                    if let Some(slot) = report.steps.get_mut(*step_index) {
                        slot.status = StepStatus::Failed;
                        slot.error = Some(error.clone());
                        slot.finished_at = Some(ev.ts);
                    }
                    report.state = RunState::Failed(*step_index);
                }
                PipelineEventKind::ResourceReleased { step_index, resource } => {
                    if let Some(slot) = report.steps.get_mut(*step_index) {
                        slot.released.push(resource.clone());
                    }
                }
                PipelineEventKind::ReleaseFailed { .. } => {}
                PipelineEventKind::RunCancelled { step_index } => report.state = RunState::Cancelled(*step_index),
                PipelineEventKind::RunCompleted { .. } => report.state = RunState::Succeeded,
            }
        }
        report
    }

    fn slot(&mut self,
            index: usize,
            step_id: &str,
            source_type: RepresentationType,
            target_type: RepresentationType)
            -> &mut StepSlot {
        while self.steps.len() <= index {
            self.steps.push(StepSlot { step_id: step_id.to_string(),
                                       source_type,
                                       target_type,
                                       status: StepStatus::Pending,
                                       error: None,
                                       started_at: None,
                                       finished_at: None,
                                       released: vec![] });
        }
        &mut self.steps[index]
    }

    /// Índices de steps terminados correctamente.
    pub fn finished_steps(&self) -> Vec<usize> {
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status == StepStatus::FinishedOk)
            .map(|(i, _)| i)
            .collect()
    }
}
