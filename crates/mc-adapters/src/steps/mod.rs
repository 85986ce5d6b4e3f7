//! Steps hoja: una arista del grafo por par (fuente, destino) soportado.
//!
//! Los steps no invocan las herramientas reales de cada framework: validan
//! el input, dejan en el scratch la invocación que se habría lanzado y
//! escriben en el output dir los ficheros del formato destino junto a un
//! `manifest.json`. El core sólo ve artifacts con `Payload::Path`.

use std::fs;

use log::debug;
use mc_core::constants::COMPILER_VERSION;
use mc_core::{Artifact, RepresentationType, StepContext, StepError, TransformationStep};
use serde::Serialize;
use serde_json::{json, Value};

use crate::configs::SignatureHints;
use crate::manifest::{digest_path, InputRecord, Manifest};

/// Forma en disco de la salida de un step.
#[derive(Debug, Clone, Copy)]
pub enum Layout {
    /// Un único fichero; el payload apunta a él.
    File(&'static str),
    /// Varios ficheros; el payload apunta al directorio.
    Dir(&'static [&'static str]),
}

impl Layout {
    fn files(&self) -> Vec<&'static str> {
        match self {
            Layout::File(f) => vec![*f],
            Layout::Dir(names) => names.to_vec(),
        }
    }
}

/// Descripción estática de un step hoja.
#[derive(Debug, Clone, Copy)]
pub struct LeafSpec {
    pub id: &'static str,
    pub source: RepresentationType,
    pub target: RepresentationType,
    pub layout: Layout,
}

/// Cuerpo común de todos los steps hoja.
pub(crate) fn emit<C>(spec: &LeafSpec,
                      input: &Artifact,
                      config: &C,
                      invocation: Value,
                      ctx: &mut StepContext)
                      -> Result<Artifact, StepError>
    where C: Serialize + SignatureHints
{
    let src = input.path()
                   .ok_or_else(|| StepError::InvalidInput(format!("{} expects a path payload", spec.id)))?;
    if !src.exists() {
        return Err(StepError::InvalidInput(format!("{} does not exist", src.display())));
    }
    if ctx.is_cancelled() {
        return Err(StepError::Cancelled);
    }
    let sha256 = digest_path(src)?;

    let scratch = ctx.scratch_dir()?.to_path_buf();
    fs::write(scratch.join("invocation.json"), serde_json::to_vec_pretty(&invocation)?)?;

    let out_dir = ctx.output_dir()?;
    let files = spec.layout.files();
    for name in &files {
        fs::write(out_dir.join(name),
                  format!("{} produced by {} from {}\n", spec.target, spec.id, src.display()))?;
    }
    let manifest = Manifest { compiler_version: COMPILER_VERSION.to_string(),
                              step: spec.id.to_string(),
                              source_type: spec.source,
                              target_type: spec.target,
                              input: InputRecord { path: src.to_path_buf(),
                                                   sha256: sha256.clone() },
                              config: serde_json::to_value(config)?,
                              invocation,
                              outputs: files.iter().map(|f| f.to_string()).collect() };
    manifest.write_to(&out_dir)?;
    debug!("{} wrote {:?} into {}", spec.id, files, out_dir.display());

    let payload_path = match spec.layout {
        Layout::File(name) => out_dir.join(name),
        Layout::Dir(_) => out_dir,
    };
    let metadata = json!({
        "step": spec.id,
        "input_sha256": sha256,
        "inputs": config.input_names(),
        "outputs": config.output_names(),
    });
    Ok(Artifact::from_path(spec.target, payload_path).with_metadata(metadata))
}

/// Declara un step hoja: struct unitario + `TypedStep` delegando en `emit`.
macro_rules! leaf_step {
    (
        $(#[$meta:meta])*
        $name:ident {
            id: $id:expr,
            source: $source:ident,
            target: $target:ident,
            config: $config:ty,
            layout: $layout:expr,
            invocation($cfg:ident) $body:block
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl $name {
            pub const SPEC: $crate::steps::LeafSpec =
                $crate::steps::LeafSpec { id: $id,
                                          source: mc_core::RepresentationType::$source,
                                          target: mc_core::RepresentationType::$target,
                                          layout: $layout };
        }

        impl mc_core::TypedStep for $name {
            type Config = $config;
            const SOURCE: mc_core::RepresentationType = mc_core::RepresentationType::$source;
            const TARGET: mc_core::RepresentationType = mc_core::RepresentationType::$target;

            fn id(&self) -> &'static str {
                $id
            }

            fn compile_typed(&self,
                             input: &mc_core::Artifact,
                             config: $config,
                             ctx: &mut mc_core::StepContext)
                             -> Result<mc_core::Artifact, mc_core::StepError> {
                let invocation = {
                    let $cfg = &config;
                    $body
                };
                $crate::steps::emit(&Self::SPEC, input, &config, invocation, ctx)
            }
        }
    };
}

mod onnx;
mod openvino;
mod tensorflow;
mod tensorrt;
mod torch;

pub use onnx::{FrozenGraphToOnnx, OnnxFileToOnnx, PaddleToOnnx, TorchToOnnx};
pub use openvino::{FrozenGraphToOpenvino, OnnxToOpenvino};
pub use tensorflow::{FrozenGraphToSavedModel, KerasToFrozenGraph, SavedModelToTfLite};
pub use tensorrt::OnnxToTensorRt;
pub use torch::TorchToTorchScript;

/// Todos los steps hoja, en orden de registro. El orden desempata caminos de
/// igual longitud.
pub fn all() -> Vec<Box<dyn TransformationStep>> {
    vec![Box::new(KerasToFrozenGraph),
         Box::new(FrozenGraphToSavedModel),
         Box::new(FrozenGraphToOnnx),
         Box::new(FrozenGraphToOpenvino),
         Box::new(OnnxFileToOnnx),
         Box::new(TorchToOnnx),
         Box::new(PaddleToOnnx),
         Box::new(OnnxToOpenvino),
         Box::new(OnnxToTensorRt),
         Box::new(SavedModelToTfLite),
         Box::new(TorchToTorchScript)]
}
