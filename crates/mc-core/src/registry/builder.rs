//! Builder para `Registry`.
//!
//! Permite declarar todos los steps en un único punto de arranque:
//!
//! ```ignore
//! let registry = Registry::builder()
//!     .add_step(FrozenGraphToOnnx)?
//!     .add_step(OnnxToTensorRt)?
//!     .build();
//! ```
//!
//! Cada `add_step` valida el par `(source, target)` en el momento, de modo
//! que un conflicto aborta el arranque antes de que exista ningún `Compiler`.

use crate::errors::RegistryError;
use crate::registry::Registry;
use crate::step::TransformationStep;

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self { registry: Registry::new() }
    }

    /// Añade un step; falla en el primer par duplicado.
    #[inline]
    pub fn add_step<S>(mut self, step: S) -> Result<Self, RegistryError>
        where S: TransformationStep + 'static
    {
        self.registry.register(step)?;
        Ok(self)
    }

    /// Variante para steps ya boxeados (p.ej. listas generadas por plugins).
    pub fn add_boxed(mut self, step: Box<dyn TransformationStep>) -> Result<Self, RegistryError> {
        self.registry.register_boxed(step)?;
        Ok(self)
    }

    /// Añade todos los steps de un iterador, en orden.
    pub fn extend<I>(mut self, steps: I) -> Result<Self, RegistryError>
        where I: IntoIterator<Item = Box<dyn TransformationStep>>
    {
        for step in steps {
            self.registry.register_boxed(step)?;
        }
        Ok(self)
    }

    /// Construye el `Registry` final, inmutable a partir de aquí.
    #[inline]
    pub fn build(self) -> Registry {
        self.registry
    }
}
