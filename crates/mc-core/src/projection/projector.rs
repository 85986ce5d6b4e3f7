//! `ConfigProjector`: reparte la configuración única del usuario entre los
//! steps de un `ConversionPath`.
//!
//! Para cada step se construye un objeto JSON con exactamente los campos de
//! su `ConfigSchema`. Precedencia por campo (de menor a mayor):
//! default del esquema -> clave de nivel superior -> sección del usuario bajo
//! `configs.<nombre del config type>`. La selección depende sólo del esquema
//! declarado por el step, nunca de adivinar por el nombre del step.

use std::collections::BTreeSet;

use log::debug;
use serde_json::{Map, Value};

use super::merge::merge_json;
use crate::constants::CONFIG_SECTIONS_KEY;
use crate::errors::{CompileError, MismatchReason};
use crate::resolver::ConversionPath;
use crate::step::TransformationStep;

/// Configuración tal como la entrega el caller.
pub type UserConfig = Map<String, Value>;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigProjector;

impl ConfigProjector {
    /// Proyecta la configuración para todos los steps del path, en orden.
    /// Falla con el primer `ConfigMismatch` encontrado; no se ejecuta nada.
    pub fn project(user: &UserConfig, path: &ConversionPath<'_>) -> Result<Vec<Value>, CompileError> {
        let configs = path.steps()
                          .iter()
                          .enumerate()
                          .map(|(i, step)| Self::project_step(i, *step, user))
                          .collect::<Result<Vec<_>, _>>()?;
        Self::log_unused(user, path);
        Ok(configs)
    }

    /// Proyección para un único step (posición `step_index` en el path).
    pub fn project_step(step_index: usize, step: &dyn TransformationStep, user: &UserConfig) -> Result<Value, CompileError> {
        let schema = step.config_schema();
        let effective = Self::effective_values(user, schema.name());

        let mut out = Map::new();
        for field in schema.fields() {
            let supplied = effective.get(&field.name).filter(|v| !v.is_null());
            let value = match (supplied, &field.default) {
                (Some(v), _) => {
                    let coerced = field.kind.coerce(v).ok_or_else(|| CompileError::ConfigMismatch {
                        step_index,
                        step_id: step.id().to_string(),
                        field: field.name.clone(),
                        reason: MismatchReason::WrongKind { expected: field.kind.label() },
                    })?;
                    Some(coerced)
                }
                (None, Some(default)) => Some(default.clone()),
                (None, None) if field.required => {
                    return Err(CompileError::ConfigMismatch { step_index,
                                                              step_id: step.id().to_string(),
                                                              field: field.name.clone(),
                                                              reason: MismatchReason::Missing });
                }
                (None, None) => None,
            };
            if let Some(v) = value {
                out.insert(field.name.clone(), v);
            }
        }
        let projected = Value::Object(out);
        if let Err(rejection) = step.validate_config(&projected) {
            return Err(CompileError::ConfigMismatch { step_index,
                                                      step_id: step.id().to_string(),
                                                      field: rejection.field.unwrap_or_else(|| schema.name().to_string()),
                                                      reason: MismatchReason::Rejected { message: rejection.message } });
        }
        debug!("projected config step={} index={} config_type={} fields={}",
               step.id(),
               step_index,
               schema.name(),
               projected.as_object().map_or(0, |m| m.len()));
        Ok(projected)
    }

    /// Valores de nivel superior con la sección del config type encima.
    fn effective_values(user: &UserConfig, config_type: &str) -> Map<String, Value> {
        let mut top = user.clone();
        let section = top.remove(CONFIG_SECTIONS_KEY)
                         .and_then(|s| s.get(config_type).cloned())
                         .unwrap_or_else(|| Value::Object(Map::new()));
        match merge_json(&Value::Object(top), &section) {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    fn log_unused(user: &UserConfig, path: &ConversionPath<'_>) {
        let schemas: Vec<_> = path.steps().iter().map(|s| s.config_schema()).collect();
        let unused: BTreeSet<&str> = user.keys()
                                         .map(String::as_str)
                                         .filter(|k| *k != CONFIG_SECTIONS_KEY)
                                         .filter(|k| !schemas.iter().any(|s| s.accepts(k)))
                                         .collect();
        if !unused.is_empty() {
            debug!("config fields not accepted by any step on the path: {:?}", unused);
        }
        if let Some(Value::Object(sections)) = user.get(CONFIG_SECTIONS_KEY) {
            for name in sections.keys() {
                if !schemas.iter().any(|s| s.name() == name) {
                    debug!("config section '{name}' does not match any config type on the path");
                }
            }
        }
    }
}
