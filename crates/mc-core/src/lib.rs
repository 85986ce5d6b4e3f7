//! mc-core: núcleo del compilador de formatos de modelo.
//!
//! Registry de steps -> Resolver (BFS) -> ConfigProjector -> PipelineExecutor
//! con liberación garantizada de recursos intermedios.
pub mod cancel;
pub mod compiler;
pub mod constants;
pub mod errors;
pub mod event;
pub mod executor;
pub mod hashing;
pub mod model;
pub mod projection;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod step;

pub use cancel::CancellationToken;
pub use compiler::{Compilation, Compiler, Plan};
pub use errors::{CompileError, ConfigRejection, MismatchReason, PipelineError, RegistryError, StepError};
pub use event::{EventStore, InMemoryEventStore, PipelineEvent, PipelineEventKind};
pub use executor::PipelineExecutor;
pub use model::{Artifact, Payload, RepresentationType, Resource, ResourceScope, StepContext};
pub use projection::{ConfigLayer, ConfigProjector, ConfigSchema, EnvLayer, FieldKind, LayeredConfig, UserConfig, ValueLayer};
pub use registry::{Registry, RegistryBuilder};
pub use report::{RunReport, StepSlot};
pub use resolver::{ConversionPath, Reachable, Resolver};
pub use step::{NoConfig, RunState, StepConfig, StepStatus, TransformationStep, TypedStep};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[derive(Debug)]
    struct Rename {
        id: &'static str,
        from: RepresentationType,
        to: RepresentationType,
    }

    impl TransformationStep for Rename {
        fn id(&self) -> &str {
            self.id
        }

        fn source_type(&self) -> RepresentationType {
            self.from
        }

        fn target_type(&self) -> RepresentationType {
            self.to
        }

        fn config_schema(&self) -> ConfigSchema {
            ConfigSchema::new("rename").with_default("suffix", FieldKind::String, json!("x"))
        }

        fn compile(&self, input: &Artifact, config: &serde_json::Value, _ctx: &mut StepContext) -> Result<Artifact, StepError> {
            let base = match &input.payload {
                Payload::Json(v) => v.as_str().unwrap_or_default().to_string(),
                _ => String::new(),
            };
            let suffix = config["suffix"].as_str().unwrap_or_default();
            Ok(Artifact::new(self.to, Payload::Json(json!(format!("{base}.{suffix}")))))
        }
    }

    #[test]
    fn compile_chains_two_steps_in_memory() {
        let registry = Registry::builder().add_step(Rename { id: "frozen_to_onnx",
                                                             from: RepresentationType::FrozenGraphFile,
                                                             to: RepresentationType::OnnxModel })
                                          .unwrap()
                                          .add_step(Rename { id: "onnx_to_trt",
                                                             from: RepresentationType::OnnxModel,
                                                             to: RepresentationType::TensorRtModel })
                                          .unwrap()
                                          .build();
        let input = Artifact::new(RepresentationType::FrozenGraphFile, Payload::Json(json!("m")));
        let mut user = Map::new();
        user.insert("suffix".into(), json!("y"));

        let compilation = Compiler::new(&registry).compile_traced(input,
                                                                  RepresentationType::FrozenGraphFile,
                                                                  RepresentationType::TensorRtModel,
                                                                  &user);
        let report = compilation.report();
        let out = compilation.result.unwrap();
        assert_eq!(out.kind, RepresentationType::TensorRtModel);
        assert_eq!(out.payload, Payload::Json(json!("m.y.y")));
        assert_eq!(report.state, RunState::Succeeded);
        assert_eq!(report.finished_steps(), vec![0, 1]);
    }
}
