//! Ledger de recursos de un run.
//!
//! Registra, en orden de creación, cada recurso que un step adquirió a través
//! de su `StepContext`, junto al índice del step. El executor decide cuándo
//! liberar: por step (cuando su artifact ya fue consumido) o todo (fallo o
//! cancelación), siempre en orden inverso de creación. Lo que quede al hacer
//! `Drop` se libera igualmente.

use std::io;

use crate::model::{Resource, ResourceScope};

#[derive(Debug)]
struct LedgerEntry {
    step_index: usize,
    resource: Box<dyn Resource>,
}

/// Resultado de liberar un recurso: (step que lo creó, descripción, resultado).
pub(crate) type Released = (usize, String, io::Result<()>);

#[derive(Debug, Default)]
pub(crate) struct ResourceLedger {
    entries: Vec<LedgerEntry>,
}

impl ResourceLedger {
    pub(crate) fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub(crate) fn record(&mut self, step_index: usize, resource: Box<dyn Resource>) {
        self.entries.push(LedgerEntry { step_index, resource });
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Libera los recursos de `step_index`, del más reciente al más antiguo.
    pub(crate) fn release_step(&mut self, step_index: usize) -> Vec<Released> {
        let mut released = Vec::new();
        let mut i = self.entries.len();
        while i > 0 {
            i -= 1;
            if self.entries[i].step_index == step_index {
                let entry = self.entries.remove(i);
                released.push(Self::release_entry(entry));
            }
        }
        released
    }

    /// Libera todo en orden inverso de creación.
    pub(crate) fn release_all(&mut self) -> Vec<Released> {
        let mut released = Vec::with_capacity(self.entries.len());
        while let Some(entry) = self.entries.pop() {
            released.push(Self::release_entry(entry));
        }
        released
    }

    /// Extrae (sin liberar) los recursos de `step_index` como scope del
    /// artifact final, preservando su orden de creación.
    pub(crate) fn take_step(&mut self, step_index: usize) -> ResourceScope {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries).into_iter()
                                                                                .partition(|e| e.step_index == step_index);
        self.entries = kept;
        ResourceScope::from(taken.into_iter().map(|e| e.resource).collect::<Vec<_>>())
    }

    fn release_entry(entry: LedgerEntry) -> Released {
        let description = entry.resource.describe();
        (entry.step_index, description, entry.resource.release())
    }
}

impl Drop for ResourceLedger {
    fn drop(&mut self) {
        for (step_index, resource, result) in self.release_all() {
            if let Err(e) = result {
                log::warn!("ledger drop: release of {resource} (step {step_index}) failed: {e}");
            }
        }
    }
}
