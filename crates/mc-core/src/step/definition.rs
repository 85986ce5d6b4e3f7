use std::fmt::Debug;

use serde_json::Value;

use crate::errors::{ConfigRejection, StepError};
use crate::model::{Artifact, RepresentationType, StepContext};
use crate::projection::ConfigSchema;

/// Trait que define un step de transformación (una arista del grafo de
/// conversiones). Implementaciones deben respetar el contrato de tipos:
/// consumir un artifact `source_type` y producir uno `target_type`.
pub trait TransformationStep: Send + Sync + Debug {
    /// Identificador estable y único dentro del registry.
    fn id(&self) -> &str;

    /// Nombre opcional amigable.
    fn name(&self) -> &str {
        self.id()
    }

    fn source_type(&self) -> RepresentationType;

    fn target_type(&self) -> RepresentationType;

    /// Forma de la configuración que espera el step (su config type).
    fn config_schema(&self) -> ConfigSchema;

    /// Valida la configuración ya proyectada antes de ejecutar ningún step.
    fn validate_config(&self, _config: &Value) -> Result<(), ConfigRejection> {
        Ok(())
    }

    /// Ejecuta la transformación. `config` ya viene proyectado: contiene
    /// exactamente los campos declarados en `config_schema`.
    ///
    /// El step no debe liberar el input; recursos propios se piden a `ctx`.
    fn compile(&self, input: &Artifact, config: &Value, ctx: &mut StepContext) -> Result<Artifact, StepError>;
}
