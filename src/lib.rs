//! model-compiler
//!
//! Este crate actúa como la capa de aplicación sobre `mc-core`:
//! - `config`: settings del proceso leídos del entorno.
//! - `request`: peticiones de compilación (fichero JSON, entorno, overrides).
//! - `export`: copia del artifact final a `<export_path>/<version>/`.
//! - `compile_request` / `compile_batch`: compilación de una o varias
//!   peticiones contra un `Registry` inmutable.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;
pub mod errors;
pub mod export;
pub mod request;

use std::collections::HashSet;
use std::path::PathBuf;

use log::info;
use mc_core::{Artifact, CancellationToken, Compiler, Registry, RunReport};
use rayon::prelude::*;
use uuid::Uuid;

pub use config::Settings;
pub use errors::AppError;
pub use export::{export_artifact, ExportedModel};
pub use request::{CompileRequest, RequestSources};

/// Registry con todos los steps de `mc-adapters`.
pub fn default_registry() -> Result<Registry, AppError> {
    Ok(mc_adapters::default_registry()?)
}

/// Resultado de compilar y exportar una petición.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    pub run_id: Uuid,
    pub report: RunReport,
    pub exported: ExportedModel,
}

/// Compila `request` y exporta el resultado.
pub fn compile_request(registry: &Registry, settings: &Settings, request: &CompileRequest) -> Result<CompileOutcome, AppError> {
    compile_with(registry, settings, request, &CancellationToken::new())
}

/// Compila peticiones independientes en paralelo (rayon). El resultado i
/// corresponde a la petición i. Cancelar `cancel` detiene cada run antes de
/// su siguiente step. Si dos peticiones exportan al mismo
/// `<export_path>/<version>`, sólo la primera se compila.
pub fn compile_batch(registry: &Registry,
                     settings: &Settings,
                     requests: &[CompileRequest],
                     cancel: &CancellationToken)
                     -> Vec<Result<CompileOutcome, AppError>> {
    let mut seen = HashSet::new();
    let duplicated: Vec<bool> = requests.iter()
                                        .map(|r| match export_root(settings, r) {
                                            Ok(root) => !seen.insert(root.join(&r.version)),
                                            Err(_) => false,
                                        })
                                        .collect();
    requests.par_iter()
            .zip(duplicated.par_iter())
            .map(|(request, duplicated)| {
                if *duplicated {
                    return Err(AppError::Request(format!("export target {} is claimed by an earlier request in the batch",
                                                         export_root(settings, request)?.join(&request.version)
                                                                                        .display())));
                }
                compile_with(registry, settings, request, cancel)
            })
            .collect()
}

fn export_root(settings: &Settings, request: &CompileRequest) -> Result<PathBuf, AppError> {
    request.export_path
           .clone()
           .or_else(|| settings.export_dir.clone())
           .ok_or_else(|| AppError::Request("no export_path in request or environment".into()))
}

fn compile_with(registry: &Registry,
                settings: &Settings,
                request: &CompileRequest,
                cancel: &CancellationToken)
                -> Result<CompileOutcome, AppError> {
    let export_root = export_root(settings, request)?;

    let compiler = Compiler::new(registry).with_temp_root(settings.scratch_dir.clone())
                                          .with_cancellation(cancel.clone());
    let compilation = compiler.compile_traced(Artifact::from_path(request.source_type, &request.model_path),
                                              request.source_type,
                                              request.target_type,
                                              &request.config);
    let report = compilation.report();
    let run_id = compilation.run_id;
    let artifact = compilation.result?;
    info!("run {run_id}: {} -> {} finished with {} steps",
          request.source_type,
          request.target_type,
          report.steps.len());

    let exported = export_artifact(artifact, &export_root, &request.version)?;
    Ok(CompileOutcome { run_id,
                        report,
                        exported })
}
