//! Ejecución de pipelines.
//!
//! `PipelineExecutor` recorre un `ConversionPath` aplicando cada step a la
//! salida del anterior. El ledger (`ResourceLedger`) garantiza que ningún
//! recurso intermedio sobrevive al run, termine éste en éxito, fallo o
//! cancelación.
mod core;
mod ledger;

pub use self::core::PipelineExecutor;
