//! Implementación del `PipelineExecutor`.

use std::io;
use std::path::PathBuf;

use log::{debug, info, warn};
use serde_json::Value;
use uuid::Uuid;

use super::ledger::{Released, ResourceLedger};
use crate::cancel::CancellationToken;
use crate::errors::{PipelineError, StepError};
use crate::event::{EventStore, InMemoryEventStore, PipelineEvent, PipelineEventKind};
use crate::model::{Artifact, Resource, StepContext};
use crate::resolver::ConversionPath;
use crate::step::{RunState, TransformationStep};

/// Ejecutor secuencial de un `ConversionPath`.
///
/// Una instancia corresponde a un único run: posee el estado (`RunState`),
/// el ledger de recursos intermedios y el store de eventos. Varios runs
/// concurrentes usan instancias distintas contra el mismo `Registry`, sin
/// coordinación.
#[derive(Debug)]
pub struct PipelineExecutor<E = InMemoryEventStore>
    where E: EventStore
{
    event_store: E,
    run_id: Uuid,
    state: RunState,
    temp_root: Option<PathBuf>,
    cancel: CancellationToken,
}

impl PipelineExecutor<InMemoryEventStore> {
    /// Crea un executor con store de eventos en memoria.
    #[inline]
    pub fn new() -> Self {
        Self::with_store(InMemoryEventStore::default())
    }
}

impl Default for PipelineExecutor<InMemoryEventStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> PipelineExecutor<E> where E: EventStore
{
    pub fn with_store(event_store: E) -> Self {
        Self { event_store,
               run_id: Uuid::new_v4(),
               state: RunState::Pending,
               temp_root: None,
               cancel: CancellationToken::new() }
    }

    /// Directorio raíz para scratch y outputs (por defecto el tmp del sistema).
    pub fn with_temp_root(mut self, root: Option<PathBuf>) -> Self {
        self.temp_root = root;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    /// Eventos del run de este executor.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.event_store.list(self.run_id)
    }

    /// Ejecuta el path completo.
    ///
    /// `initial` pasa a ser propiedad del executor: lo consume el primer step
    /// y se descarta después. `configs` debe traer una configuración por step
    /// (la salida de `ConfigProjector::project`). En éxito, el artifact final
    /// se entrega con los recursos de su step productor; todos los demás
    /// intermedios ya fueron liberados.
    pub fn execute(&mut self,
                   path: &ConversionPath<'_>,
                   initial: Artifact,
                   configs: &[Value])
                   -> Result<Artifact, PipelineError> {
        if self.state != RunState::Pending {
            return Err(PipelineError::Internal(format!("executor already used (state {:?})", self.state)));
        }
        if configs.len() != path.len() {
            return Err(PipelineError::Internal(format!("expected {} step configs, got {}",
                                                       path.len(),
                                                       configs.len())));
        }
        if initial.kind != path.source() {
            return Err(PipelineError::Internal(format!("initial artifact is {}, path starts at {}",
                                                       initial.kind,
                                                       path.source())));
        }

        let fingerprint = path.fingerprint();
        info!("run {} started: {} -> {} ({} steps, path {})",
              self.run_id,
              path.source(),
              path.target(),
              path.len(),
              &fingerprint[..12]);
        self.append(PipelineEventKind::RunStarted { path_fingerprint: fingerprint,
                                                    source_type: path.source(),
                                                    target_type: path.target(),
                                                    step_count: path.len() });

        if path.is_empty() {
            self.advance(RunState::Succeeded)?;
            self.append(PipelineEventKind::RunCompleted { output_type: initial.kind,
                                                          handed_over: 0 });
            return Ok(initial);
        }

        let mut ledger = ResourceLedger::new();
        let mut current = initial;
        for (index, step) in path.steps().iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(self.cancel_run(index, &mut ledger));
            }
            self.advance(RunState::Running(index))?;
            current = self.run_step(index, *step, &current, &configs[index], &mut ledger)?;
            if index > 0 {
                // El artifact de index-1 ya fue consumido.
                let released = ledger.release_step(index - 1);
                self.record_releases(released);
            }
        }

        self.advance(RunState::Succeeded)?;
        let last = path.len() - 1;
        let scope = ledger.take_step(last);
        debug_assert_eq!(ledger.len(), 0, "intermediate resources left after success");
        let handed_over = scope.len();
        current.adopt_scope(scope);
        self.append(PipelineEventKind::RunCompleted { output_type: current.kind,
                                                      handed_over });
        info!("run {} completed: {} ({} resources handed over)",
              self.run_id,
              current.kind,
              handed_over);
        Ok(current)
    }

    /// Invoca un step con su `StepContext` y registra lo que adquirió. El
    /// scratch se libera siempre al volver; en fallo se libera todo el ledger.
    fn run_step(&mut self,
                index: usize,
                step: &dyn TransformationStep,
                input: &Artifact,
                config: &Value,
                ledger: &mut ResourceLedger)
                -> Result<Artifact, PipelineError> {
        self.append(PipelineEventKind::StepStarted { step_index: index,
                                                     step_id: step.id().to_string(),
                                                     source_type: step.source_type(),
                                                     target_type: step.target_type() });
        debug!("run {} step {} '{}' started", self.run_id, index, step.id());

        let mut ctx = StepContext::new(index, step.id(), self.temp_root.clone())
            .with_cancellation(self.cancel.clone());
        let outcome = step.compile(input, config, &mut ctx);

        let (scratch, acquired) = ctx.into_resources();
        for resource in acquired {
            ledger.record(index, resource);
        }
        if let Some(dir) = scratch {
            let description = dir.describe();
            let result = Box::new(dir).release();
            self.record_releases(vec![(index, description, result)]);
        }

        let outcome = outcome.and_then(|artifact| {
                                 if artifact.kind == step.target_type() {
                                     Ok(artifact)
                                 } else {
                                     Err(StepError::ContractViolation { expected: step.target_type(),
                                                                        found: artifact.kind })
                                 }
                             });

        match outcome {
            Ok(artifact) => {
                self.append(PipelineEventKind::StepFinished { step_index: index,
                                                              step_id: step.id().to_string() });
                debug!("run {} step {} '{}' finished", self.run_id, index, step.id());
                Ok(artifact)
            }
            Err(cause) => {
                warn!("run {} step {} '{}' failed: {}", self.run_id, index, step.id(), cause);
                self.append(PipelineEventKind::StepFailed { step_index: index,
                                                            step_id: step.id().to_string(),
                                                            error: cause.to_string() });
                if matches!(cause, StepError::Cancelled) {
                    // El step observó la cancelación y abandonó: el run queda cancelado.
                    return Err(self.cancel_run(index, ledger));
                }
                self.advance(RunState::Failed(index))?;
                let released = ledger.release_all();
                self.record_releases(released);
                Err(PipelineError::StepFailed { step_index: index,
                                                source_type: step.source_type(),
                                                target_type: step.target_type(),
                                                cause })
            }
        }
    }

    fn cancel_run(&mut self, index: usize, ledger: &mut ResourceLedger) -> PipelineError {
        info!("run {} cancelled at step {}", self.run_id, index);
        self.append(PipelineEventKind::RunCancelled { step_index: index });
        self.state = RunState::Cancelled(index);
        let released = ledger.release_all();
        self.record_releases(released);
        PipelineError::Cancelled { step_index: index }
    }

    fn record_releases(&mut self, released: Vec<Released>) {
        for (step_index, resource, result) in released {
            match result {
                Ok(()) => {
                    debug!("run {} released {} (step {})", self.run_id, resource, step_index);
                    self.append(PipelineEventKind::ResourceReleased { step_index, resource });
                }
                Err(e) => self.release_failed(step_index, resource, e),
            }
        }
    }

    fn release_failed(&mut self, step_index: usize, resource: String, error: io::Error) {
        warn!("run {} could not release {} (step {}): {}",
              self.run_id,
              resource,
              step_index,
              error);
        self.append(PipelineEventKind::ReleaseFailed { step_index,
                                                       resource,
                                                       error: error.to_string() });
    }

    fn advance(&mut self, next: RunState) -> Result<(), PipelineError> {
        if !self.state.can_advance_to(next) {
            return Err(PipelineError::Internal(format!("invalid transition {:?} -> {:?}", self.state, next)));
        }
        self.state = next;
        Ok(())
    }

    fn append(&mut self, kind: PipelineEventKind) {
        let _ = self.event_store.append_kind(self.run_id, kind);
    }
}
