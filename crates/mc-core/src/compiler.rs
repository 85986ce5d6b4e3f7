//! Punto de entrada `compile`: Resolver -> ConfigProjector -> Executor.

use std::path::PathBuf;

use log::info;
use serde_json::Value;
use uuid::Uuid;

use crate::cancel::CancellationToken;
use crate::errors::CompileError;
use crate::event::PipelineEvent;
use crate::executor::PipelineExecutor;
use crate::model::{Artifact, RepresentationType};
use crate::projection::{ConfigProjector, UserConfig};
use crate::registry::Registry;
use crate::report::RunReport;
use crate::resolver::{ConversionPath, Resolver};

/// Path resuelto junto con la configuración proyectada de cada step.
#[derive(Debug, Clone)]
pub struct Plan<'r> {
    pub path: ConversionPath<'r>,
    pub configs: Vec<Value>,
}

/// Resultado de `Compiler::compile_traced`: el resultado más el log de
/// eventos del run. Si la compilación falla antes de ejecutar (sin path,
/// configuración inválida) `events` queda vacío.
#[derive(Debug)]
pub struct Compilation {
    pub result: Result<Artifact, CompileError>,
    pub run_id: Uuid,
    pub events: Vec<PipelineEvent>,
}

impl Compilation {
    /// Reporte por step reconstruido desde los eventos.
    pub fn report(&self) -> RunReport {
        RunReport::replay(self.run_id, &self.events)
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fachada sobre un `Registry` ya construido. Es barata de crear; cada
/// llamada a `compile` usa su propio executor.
#[derive(Debug, Clone)]
pub struct Compiler<'r> {
    registry: &'r Registry,
    temp_root: Option<PathBuf>,
    cancel: CancellationToken,
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry,
               temp_root: None,
               cancel: CancellationToken::new() }
    }

    /// Raíz para los directorios temporales de los steps.
    pub fn with_temp_root(mut self, root: Option<PathBuf>) -> Self {
        self.temp_root = root;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn resolver(&self) -> Resolver<'r> {
        Resolver::new(self.registry)
    }

    /// Resuelve el path y proyecta la configuración sin ejecutar nada.
    pub fn plan(&self,
                source: RepresentationType,
                target: RepresentationType,
                user_config: &UserConfig)
                -> Result<Plan<'r>, CompileError> {
        let path = self.resolver().resolve(source, target)?;
        let configs = ConfigProjector::project(user_config, &path)?;
        Ok(Plan { path, configs })
    }

    /// Compila `artifact` (de tipo `source`) hasta `target`.
    pub fn compile(&self,
                   artifact: Artifact,
                   source: RepresentationType,
                   target: RepresentationType,
                   user_config: &UserConfig)
                   -> Result<Artifact, CompileError> {
        self.compile_traced(artifact, source, target, user_config).result
    }

    /// Igual que `compile` pero devuelve también los eventos del run.
    pub fn compile_traced(&self,
                          artifact: Artifact,
                          source: RepresentationType,
                          target: RepresentationType,
                          user_config: &UserConfig)
                          -> Compilation {
        let mut executor = PipelineExecutor::new().with_temp_root(self.temp_root.clone())
                                                  .with_cancellation(self.cancel.clone());
        let run_id = executor.run_id();

        if artifact.kind != source {
            return Compilation { result: Err(CompileError::SourceKindMismatch { expected: source,
                                                                                found: artifact.kind }),
                                 run_id,
                                 events: Vec::new() };
        }
        let plan = match self.plan(source, target, user_config) {
            Ok(plan) => plan,
            Err(e) => {
                info!("compile {source} -> {target} rejected before execution: {e}");
                return Compilation { result: Err(e),
                                     run_id,
                                     events: Vec::new() };
            }
        };

        let result = executor.execute(&plan.path, artifact, &plan.configs)
                             .map_err(CompileError::from);
        Compilation { result,
                      run_id,
                      events: executor.events() }
    }
}
