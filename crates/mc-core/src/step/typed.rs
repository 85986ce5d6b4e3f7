use serde::de::DeserializeOwned;
use serde_json::Value;

use super::TransformationStep;
use crate::errors::{ConfigRejection, StepError};
use crate::model::{Artifact, RepresentationType, StepContext};
use crate::projection::ConfigSchema;

/// Configuración tipada de un step: un struct serde que además declara su
/// esquema para que el projector sepa qué campos seleccionar.
pub trait StepConfig: DeserializeOwned {
    fn schema() -> ConfigSchema;
}

/// Configuración vacía para steps que no aceptan parámetros.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct NoConfig {}

impl StepConfig for NoConfig {
    fn schema() -> ConfigSchema {
        ConfigSchema::new("none")
    }
}

/// Interfaz de alto nivel para definir steps con configuración tipada.
///
/// Implementadores escriben `compile_typed` con su struct de configuración;
/// el adaptador de abajo lo convierte en un `TransformationStep` neutro.
pub trait TypedStep {
    type Config: StepConfig;

    /// Identificador estable del step.
    fn id(&self) -> &'static str;

    /// Nombre amigable (por defecto usa el id).
    fn name(&self) -> &str {
        self.id()
    }

    const SOURCE: RepresentationType;
    const TARGET: RepresentationType;

    fn compile_typed(&self, input: &Artifact, config: Self::Config, ctx: &mut StepContext) -> Result<Artifact, StepError>;
}

// -------------------------------------------------------------
// Adaptador: cualquier `TypedStep` implementa `TransformationStep` neutro.
// -------------------------------------------------------------
impl<T> TransformationStep for T where T: TypedStep + Send + Sync + std::fmt::Debug
{
    fn id(&self) -> &str {
        <Self as TypedStep>::id(self)
    }

    fn name(&self) -> &str {
        <Self as TypedStep>::name(self)
    }

    fn source_type(&self) -> RepresentationType {
        T::SOURCE
    }

    fn target_type(&self) -> RepresentationType {
        T::TARGET
    }

    fn config_schema(&self) -> ConfigSchema {
        <T::Config as StepConfig>::schema()
    }

    fn validate_config(&self, config: &Value) -> Result<(), ConfigRejection> {
        match serde_json::from_value::<T::Config>(config.clone()) {
            Ok(_) => Ok(()),
            Err(e) => Err(ConfigRejection { field: rejected_field::<T::Config>(config),
                                            message: e.to_string() }),
        }
    }

    fn compile(&self, input: &Artifact, config: &Value, ctx: &mut StepContext) -> Result<Artifact, StepError> {
        let typed: T::Config =
            serde_json::from_value(config.clone()).map_err(|e| StepError::InvalidConfig(e.to_string()))?;
        self.compile_typed(input, typed, ctx)
    }
}

/// Primer campo cuya ausencia hace que la configuración deserialice.
fn rejected_field<C: DeserializeOwned>(config: &Value) -> Option<String> {
    let fields = config.as_object()?;
    fields.keys()
          .find(|key| {
              let mut rest = fields.clone();
              rest.remove(key.as_str());
              serde_json::from_value::<C>(Value::Object(rest)).is_ok()
          })
          .cloned()
}
