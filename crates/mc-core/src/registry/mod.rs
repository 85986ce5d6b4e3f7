//! Registry de steps de transformación.
//!
//! El registry es el catálogo (inmutable tras el arranque) de aristas del
//! grafo de conversiones. Se indexa por tipo fuente (en orden de registro,
//! que es el orden que usa el resolver para desempatar) y por par
//! `(fuente, destino)`. Registrar dos steps para el mismo par es un error de
//! configuración que se reporta inmediatamente.

pub mod builder;

pub use builder::RegistryBuilder;

use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::debug;

use crate::errors::RegistryError;
use crate::model::RepresentationType;
use crate::step::TransformationStep;

type Edge = (RepresentationType, RepresentationType);

#[derive(Debug, Default)]
pub struct Registry {
    steps: Vec<Box<dyn TransformationStep>>,
    by_source: IndexMap<RepresentationType, Vec<usize>>,
    by_pair: IndexMap<Edge, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder encadenable que falla en el primer conflicto.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registra un step. Falla con `RegistrationConflict` si ya existe un
    /// step para el mismo par `(source_type, target_type)`.
    pub fn register<S>(&mut self, step: S) -> Result<(), RegistryError>
        where S: TransformationStep + 'static
    {
        self.register_boxed(Box::new(step))
    }

    pub fn register_boxed(&mut self, step: Box<dyn TransformationStep>) -> Result<(), RegistryError> {
        let edge = (step.source_type(), step.target_type());
        if let Some(&existing) = self.by_pair.get(&edge) {
            return Err(RegistryError::RegistrationConflict { source_type: edge.0,
                                                             target_type: edge.1,
                                                             existing: self.steps[existing].id().to_string(),
                                                             rejected: step.id().to_string() });
        }
        let index = self.steps.len();
        debug!("register step={} {} -> {} config_type={}",
               step.id(),
               edge.0,
               edge.1,
               step.config_schema().name());
        self.by_pair.insert(edge, index);
        self.by_source.entry(edge.0).or_default().push(index);
        self.steps.push(step);
        Ok(())
    }

    /// Steps utilizables como arista saliente de `source`, en orden de registro.
    pub fn lookup_by_source(&self, source: RepresentationType) -> Vec<&dyn TransformationStep> {
        self.by_source
            .get(&source)
            .map(|idxs| idxs.iter().map(|&i| self.steps[i].as_ref()).collect())
            .unwrap_or_default()
    }

    /// Step directo `source -> target` si existe.
    pub fn lookup_exact(&self, source: RepresentationType, target: RepresentationType) -> Option<&dyn TransformationStep> {
        self.by_pair.get(&(source, target)).map(|&i| self.steps[i].as_ref())
    }

    /// Todos los steps en orden de registro.
    pub fn steps(&self) -> impl Iterator<Item = &dyn TransformationStep> {
        self.steps.iter().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Tipos que aparecen como fuente o destino de algún step.
    pub fn representation_types(&self) -> BTreeSet<RepresentationType> {
        self.by_pair.keys().flat_map(|(s, t)| [*s, *t]).collect()
    }

    /// Unión ordenada de los campos declarados por todos los config types.
    pub fn config_fields(&self) -> Vec<String> {
        let fields: BTreeSet<String> = self.steps
                                           .iter()
                                           .flat_map(|s| {
                                               s.config_schema()
                                                .fields()
                                                .iter()
                                                .map(|f| f.name.clone())
                                                .collect::<Vec<_>>()
                                           })
                                           .collect();
        fields.into_iter().collect()
    }
}
