//! mc-adapters: steps hoja concretos para el compilador de modelos.
//!
//! Este crate provee:
//! - Configuraciones tipadas por config type (`configs`).
//! - Un step por cada conversión soportada (`steps`), declarados con el
//!   macro interno `leaf_step!`.
//! - Detección del tipo fuente a partir de la ruta del modelo (`detect`).
//! - Manifest + digest SHA-256 de inputs (`manifest`).
//!
//! El core no conoce ningún framework; todo lo específico vive aquí.

pub mod configs;
pub mod detect;
pub mod manifest;
pub mod steps;

use mc_core::{Registry, RegistryBuilder, RegistryError};

pub use detect::detect_source_type;

/// Registra todos los steps hoja en `builder`, en el orden canónico.
pub fn register_all(builder: RegistryBuilder) -> Result<RegistryBuilder, RegistryError> {
    builder.extend(steps::all())
}

/// Registry con el catálogo completo de steps de este crate.
pub fn default_registry() -> Result<Registry, RegistryError> {
    Ok(register_all(Registry::builder())?.build())
}
