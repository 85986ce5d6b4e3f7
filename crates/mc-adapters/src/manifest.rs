//! Manifest que cada step hoja deja junto a su salida y digest de inputs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mc_core::RepresentationType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub path: PathBuf,
    pub sha256: String,
}

/// Registro de una invocación de step: qué consumió, con qué configuración
/// y qué ficheros produjo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub compiler_version: String,
    pub step: String,
    pub source_type: RepresentationType,
    pub target_type: RepresentationType,
    pub input: InputRecord,
    pub config: Value,
    pub invocation: Value,
    pub outputs: Vec<String>,
}

impl Manifest {
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(MANIFEST_FILE);
        let body = serde_json::to_vec_pretty(self).map_err(io::Error::other)?;
        fs::write(&path, body)?;
        Ok(path)
    }

    /// Lee el manifest que acompaña a `artifact_path` (el propio directorio
    /// o el directorio que contiene el fichero).
    pub fn read_for(artifact_path: &Path) -> io::Result<Self> {
        let dir = if artifact_path.is_dir() {
            artifact_path
        } else {
            artifact_path.parent()
                         .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "artifact path has no parent"))?
        };
        let body = fs::read(dir.join(MANIFEST_FILE))?;
        serde_json::from_slice(&body).map_err(io::Error::other)
    }
}

/// SHA-256 en hex de un fichero, o de un directorio completo (rutas
/// relativas + contenido, en orden lexicográfico).
pub fn digest_path(path: &Path) -> io::Result<String> {
    let mut hasher = Sha256::new();
    if path.is_dir() {
        let mut files = Vec::new();
        collect_files(path, &mut files)?;
        files.sort();
        for file in files {
            let rel = file.strip_prefix(path).unwrap_or(&file);
            hasher.update(rel.to_string_lossy().as_bytes());
            hasher.update([0u8]);
            hasher.update(fs::read(&file)?);
        }
    } else {
        hasher.update(fs::read(path)?);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}
