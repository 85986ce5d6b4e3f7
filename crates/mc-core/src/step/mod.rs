//! Definiciones relacionadas a steps.
//!
//! Un step es una arista del grafo de conversiones: transforma un artifact de
//! un `RepresentationType` en otro, usando una configuración con forma
//! declarada. Este módulo define:
//! - `TransformationStep`: interfaz neutral usada por registry y executor.
//! - `TypedStep` + `StepConfig`: interfaz de alto nivel con config tipada.
//! - `StepStatus` / `RunState`: estados observables de una ejecución.

pub mod definition;
mod status;
pub mod typed;

pub use definition::TransformationStep;
pub use status::{RunState, StepStatus};
pub use typed::{NoConfig, StepConfig, TypedStep};
