//! Recursos temporales que respaldan a un artifact.
//!
//! Un step puede materializar su salida en disco (directorios, ficheros) o
//! abrir handles que deben vivir mientras el siguiente step consume el
//! artifact. Esos recursos se modelan con el trait `Resource` y se agrupan en
//! un `ResourceScope`. El executor es quien decide cuándo se liberan; el step
//! sólo los declara.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Recurso liberable de forma explícita.
///
/// `release` consume el recurso y reporta el error de IO si lo hubiera.
/// Las implementaciones deben además liberar en `Drop` (o ser inocuas) para
/// que un scope abandonado durante un panic no deje basura.
pub trait Resource: Send + fmt::Debug {
    /// Descripción corta para logs y eventos (normalmente la ruta).
    fn describe(&self) -> String;

    fn release(self: Box<Self>) -> io::Result<()>;
}

impl Resource for TempDir {
    fn describe(&self) -> String {
        self.path().display().to_string()
    }

    fn release(self: Box<Self>) -> io::Result<()> {
        (*self).close()
    }
}

/// Directorio temporal con nombre legible, usado para scratch y outputs.
pub(crate) fn create_temp_dir(root: Option<&Path>, label: &str) -> io::Result<TempDir> {
    let prefix = format!("{}{}-", crate::constants::TEMP_PREFIX, label);
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix);
    match root {
        Some(r) => {
            std::fs::create_dir_all(r)?;
            builder.tempdir_in(r)
        }
        None => builder.tempdir(),
    }
}

/// Conjunto ordenado de recursos que respaldan un artifact.
///
/// El orden es el de creación; `release` libera en orden inverso.
#[derive(Debug, Default)]
pub struct ResourceScope {
    resources: Vec<Box<dyn Resource>>,
}

impl ResourceScope {
    pub fn new() -> Self {
        Self { resources: Vec::new() }
    }

    pub fn push(&mut self, resource: Box<dyn Resource>) {
        self.resources.push(resource);
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.resources.iter().map(|r| r.describe()).collect()
    }

    /// Libera todos los recursos en orden inverso de creación. Devuelve el
    /// primer error pero intenta liberar el resto igualmente.
    pub fn release(mut self) -> io::Result<()> {
        let mut first_err = None;
        while let Some(r) = self.resources.pop() {
            if let Err(e) = r.release() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl From<Vec<Box<dyn Resource>>> for ResourceScope {
    fn from(resources: Vec<Box<dyn Resource>>) -> Self {
        Self { resources }
    }
}

impl Drop for ResourceScope {
    fn drop(&mut self) {
        while let Some(r) = self.resources.pop() {
            if let Err(e) = r.release() {
                log::warn!("resource release on drop failed: {e}");
            }
        }
    }
}

/// Fichero suelto creado por un step fuera de un directorio temporal.
#[derive(Debug)]
pub struct TempPath {
    path: PathBuf,
    released: bool,
}

impl TempPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(),
               released: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remove(&mut self) -> io::Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl Resource for TempPath {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn release(mut self: Box<Self>) -> io::Result<()> {
        self.remove()
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        let _ = self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_release_removes_directories() {
        let dir = create_temp_dir(None, "scope").unwrap();
        let path = dir.path().to_path_buf();
        std::fs::write(path.join("model.onnx"), b"stub").unwrap();

        let mut scope = ResourceScope::new();
        scope.push(Box::new(dir));
        assert_eq!(scope.len(), 1);
        scope.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn temp_path_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("calibration.cache");
        std::fs::write(&file, b"x").unwrap();
        {
            let mut scope = ResourceScope::new();
            scope.push(Box::new(TempPath::new(&file)));
        }
        assert!(!file.exists());
    }
}
