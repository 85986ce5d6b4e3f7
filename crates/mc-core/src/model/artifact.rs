//! Artifact neutral del pipeline.
//!
//! Un `Artifact` es la unidad que fluye entre steps:
//! - `kind` es el `RepresentationType` que el step productor prometió.
//! - `payload` referencia el contenido (ruta, buffer o JSON); el core no lo
//!   interpreta.
//! - `metadata` anota información auxiliar (firmas de inputs/outputs, ...).
//! - `scope` agrupa los recursos temporales que respaldan el payload.
//!
//! Un artifact no es `Clone`: es dueño de su scope.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{RepresentationType, ResourceScope};

/// Referencia al contenido de un artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    Path(PathBuf),
    Bytes(Vec<u8>),
    Json(Value),
}

#[derive(Debug)]
pub struct Artifact {
    pub kind: RepresentationType,
    pub payload: Payload,
    pub metadata: Option<Value>,
    scope: ResourceScope,
}

impl Artifact {
    pub fn new(kind: RepresentationType, payload: Payload) -> Self {
        Self { kind,
               payload,
               metadata: None,
               scope: ResourceScope::new() }
    }

    /// Artifact respaldado por una ruta del usuario (sin recursos propios).
    pub fn from_path(kind: RepresentationType, path: impl Into<PathBuf>) -> Self {
        Self::new(kind, Payload::Path(path.into()))
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Ruta del payload si éste es de tipo `Path`.
    pub fn path(&self) -> Option<&Path> {
        match &self.payload {
            Payload::Path(p) => Some(p.as_path()),
            _ => None,
        }
    }

    pub fn scope(&self) -> &ResourceScope {
        &self.scope
    }

    /// Reemplaza el scope. Lo usa el executor al transferir los recursos del
    /// último step al caller.
    pub(crate) fn adopt_scope(&mut self, scope: ResourceScope) {
        self.scope = scope;
    }

    /// Separa payload y scope para que el caller gestione la liberación.
    pub fn into_parts(self) -> (RepresentationType, Payload, Option<Value>, ResourceScope) {
        (self.kind, self.payload, self.metadata, self.scope)
    }

    /// Libera explícitamente los recursos que respaldan el artifact.
    pub fn release(self) -> std::io::Result<()> {
        self.scope.release()
    }
}
