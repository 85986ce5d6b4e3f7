//! Proyección de la configuración del usuario a configuraciones por step.
//!
//! - `schema`: forma declarada de la config de cada step (`ConfigSchema`).
//! - `projector`: selección/merge/validación por step (`ConfigProjector`).
//! - `layer`: composición de fuentes de configuración (fichero, entorno, CLI).
//! - `merge`: helpers de merge JSON deterministas.

pub mod layer;
pub mod merge;
pub mod projector;
pub mod schema;

pub use layer::{ConfigLayer, EnvLayer, LayeredConfig, ValueLayer};
pub use merge::{merge_json, merge_json_deep};
pub use projector::{ConfigProjector, UserConfig};
pub use schema::{ConfigSchema, FieldKind, FieldSpec};
