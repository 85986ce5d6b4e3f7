//! Resolución de caminos de conversión.
//!
//! Los `RepresentationType` son nodos y los steps registrados aristas
//! dirigidas. `Resolver::resolve` hace un BFS desde el tipo fuente explorando
//! las aristas de cada nodo en orden de registro y se detiene al descubrir el
//! tipo destino, así que devuelve siempre un camino con el mínimo número de
//! saltos y, entre empates, el primero según el orden de registro. El
//! conjunto de visitados tolera ciclos en el grafo.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;
use serde_json::json;

use crate::constants::COMPILER_VERSION;
use crate::errors::CompileError;
use crate::hashing::hash_value;
use crate::model::RepresentationType;
use crate::registry::Registry;
use crate::step::TransformationStep;

/// Secuencia ordenada de steps que conecta `source` con `target`.
///
/// Invariantes: `steps[0].source_type() == source`, cada destino coincide con
/// la fuente del siguiente y `steps[last].target_type() == target`. Un path
/// vacío representa la identidad (`source == target`).
#[derive(Debug, Clone)]
pub struct ConversionPath<'r> {
    source: RepresentationType,
    target: RepresentationType,
    steps: Vec<&'r dyn TransformationStep>,
}

impl<'r> ConversionPath<'r> {
    pub fn identity(t: RepresentationType) -> Self {
        Self { source: t,
               target: t,
               steps: Vec::new() }
    }

    pub fn source(&self) -> RepresentationType {
        self.source
    }

    pub fn target(&self) -> RepresentationType {
        self.target
    }

    pub fn steps(&self) -> &[&'r dyn TransformationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Cadena de tipos recorrida: `[source, t1, t2, ..., target]`.
    pub fn types(&self) -> Vec<RepresentationType> {
        let mut out = vec![self.source];
        out.extend(self.steps.iter().map(|s| s.target_type()));
        out
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    /// Hash estable del camino (aristas + config types + versión del core).
    pub fn fingerprint(&self) -> String {
        let edges: Vec<_> = self.steps
                                .iter()
                                .map(|s| {
                                    json!({
                                        "id": s.id(),
                                        "source": s.source_type(),
                                        "target": s.target_type(),
                                        "config_type": s.config_schema().name(),
                                    })
                                })
                                .collect();
        hash_value(&json!({
            "compiler_version": COMPILER_VERSION,
            "source": self.source,
            "target": self.target,
            "edges": edges,
        }))
    }
}

/// Tipo alcanzable desde una fuente y a cuántos saltos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reachable {
    pub target: RepresentationType,
    pub hops: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r Registry,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Calcula el camino más corto `source -> target`.
    pub fn resolve(&self, source: RepresentationType, target: RepresentationType) -> Result<ConversionPath<'r>, CompileError> {
        if source == target {
            return Ok(ConversionPath::identity(source));
        }
        // Atajo: con pares únicos, una arista directa es exactamente lo que
        // encontraría el BFS en su primer nivel.
        if let Some(step) = self.registry.lookup_exact(source, target) {
            debug!("resolve {source} -> {target}: direct step {}", step.id());
            return Ok(ConversionPath { source,
                                       target,
                                       steps: vec![step] });
        }
        let steps = self.search(source, target)
                        .ok_or(CompileError::NoPathFound { source_type: source,
                                                           target_type: target })?;
        debug!("resolve {source} -> {target}: {} hops via {:?}",
               steps.len(),
               steps.iter().map(|s| s.id()).collect::<Vec<_>>());
        Ok(ConversionPath { source,
                            target,
                            steps })
    }

    /// BFS completo, sin atajo. Devuelve los steps del camino encontrado.
    pub(crate) fn search(&self, source: RepresentationType, target: RepresentationType) -> Option<Vec<&'r dyn TransformationStep>> {
        let mut parents: HashMap<RepresentationType, &'r dyn TransformationStep> = HashMap::new();
        let mut visited: HashSet<RepresentationType> = HashSet::from([source]);
        let mut queue = VecDeque::from([source]);

        while let Some(node) = queue.pop_front() {
            for step in self.registry.lookup_by_source(node) {
                let next = step.target_type();
                if !visited.insert(next) {
                    continue;
                }
                parents.insert(next, step);
                if next == target {
                    return Some(Self::backtrack(&parents, source, target));
                }
                queue.push_back(next);
            }
        }
        None
    }

    fn backtrack(parents: &HashMap<RepresentationType, &'r dyn TransformationStep>,
                 source: RepresentationType,
                 target: RepresentationType)
                 -> Vec<&'r dyn TransformationStep> {
        let mut steps = Vec::new();
        let mut cursor = target;
        while cursor != source {
            match parents.get(&cursor) {
                Some(step) => {
                    steps.push(*step);
                    cursor = step.source_type();
                }
                None => break,
            }
        }
        steps.reverse();
        steps
    }

    /// Todos los tipos alcanzables desde `source` (excluida la propia fuente),
    /// en orden BFS.
    pub fn reachable_from(&self, source: RepresentationType) -> Vec<Reachable> {
        let mut visited: HashSet<RepresentationType> = HashSet::from([source]);
        let mut queue = VecDeque::from([(source, 0usize)]);
        let mut out = Vec::new();
        while let Some((node, hops)) = queue.pop_front() {
            for step in self.registry.lookup_by_source(node) {
                let next = step.target_type();
                if visited.insert(next) {
                    out.push(Reachable { target: next,
                                         hops: hops + 1 });
                    queue.push_back((next, hops + 1));
                }
            }
        }
        out
    }
}
