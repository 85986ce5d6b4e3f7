pub mod types;
pub use types::{RunReport, StepSlot};
