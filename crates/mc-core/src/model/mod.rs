//! Modelos neutrales (RepresentationType, Artifact, recursos, StepContext).

pub mod artifact;
pub mod context;
pub mod representation;
pub mod resource;

pub use artifact::{Artifact, Payload};
pub use context::StepContext;
pub use representation::{RepresentationType, UnknownRepresentation};
pub use resource::{Resource, ResourceScope, TempPath};
