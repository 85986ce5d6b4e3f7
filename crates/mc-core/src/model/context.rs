//! Contexto entregado a cada invocación de un step.
//!
//! El executor crea un `StepContext` por step. A través de él el step obtiene
//! un directorio scratch (privado, se borra al volver del step) y un
//! directorio de salida cuyo ciclo de vida sigue al artifact producido. Todo
//! lo que el step pida aquí queda registrado en el ledger del executor, así
//! que un fallo a mitad del step no deja recursos huérfanos.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::resource::{create_temp_dir, Resource};
use crate::cancel::CancellationToken;

pub struct StepContext {
    step_index: usize,
    step_id: String,
    temp_root: Option<PathBuf>,
    scratch: Option<TempDir>,
    output_dir: Option<PathBuf>,
    acquired: Vec<Box<dyn Resource>>,
    cancel: CancellationToken,
}

impl StepContext {
    pub(crate) fn new(step_index: usize, step_id: &str, temp_root: Option<PathBuf>) -> Self {
        Self { step_index,
               step_id: step_id.to_string(),
               temp_root,
               scratch: None,
               output_dir: None,
               acquired: Vec::new(),
               cancel: CancellationToken::new() }
    }

    pub(crate) fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn step_id(&self) -> &str {
        &self.step_id
    }

    /// Permite a steps largos abandonar el trabajo con `StepError::Cancelled`.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Directorio de trabajo interno del step. Se crea bajo demanda y el
    /// executor lo elimina en cuanto el step retorna.
    pub fn scratch_dir(&mut self) -> io::Result<&Path> {
        if self.scratch.is_none() {
            let label = format!("{}-scratch", self.step_id);
            self.scratch = Some(create_temp_dir(self.temp_root.as_deref(), &label)?);
        }
        match &self.scratch {
            Some(dir) => Ok(dir.path()),
            None => Err(io::Error::other("scratch dir unavailable")),
        }
    }

    /// Directorio donde el step escribe su artifact de salida. Queda a cargo
    /// del executor: se libera cuando el siguiente step lo consume o, si es
    /// el último, pasa al caller dentro del scope del artifact final.
    pub fn output_dir(&mut self) -> io::Result<PathBuf> {
        if let Some(dir) = &self.output_dir {
            return Ok(dir.clone());
        }
        let label = format!("{}-out", self.step_id);
        let dir = create_temp_dir(self.temp_root.as_deref(), &label)?;
        let path = dir.path().to_path_buf();
        self.acquired.push(Box::new(dir));
        self.output_dir = Some(path.clone());
        Ok(path)
    }

    /// Registra un recurso adicional que respalda la salida del step.
    pub fn track(&mut self, resource: Box<dyn Resource>) {
        self.acquired.push(resource);
    }

    /// Devuelve (scratch, recursos de salida) para que el executor los gestione.
    pub(crate) fn into_resources(self) -> (Option<TempDir>, Vec<Box<dyn Resource>>) {
        (self.scratch, self.acquired)
    }
}
