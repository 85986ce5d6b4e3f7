//! Exportación del artifact final a `<export_root>/<version>/`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use mc_core::{Artifact, Payload, RepresentationType};

use crate::request::is_single_component;

/// Resultado de una exportación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedModel {
    pub kind: RepresentationType,
    /// Directorio de la versión exportada.
    pub version_dir: PathBuf,
    /// Ficheros escritos, relativos a `version_dir`.
    pub files: Vec<PathBuf>,
}

/// Copia el payload de `artifact` en `<export_root>/<version>/` y libera
/// después los recursos temporales que lo respaldaban.
///
/// Un payload fichero se copia con su nombre; un directorio se copia con su
/// contenido. Falla si el directorio de versión ya existe y no está vacío.
pub fn export_artifact(artifact: Artifact, export_root: &Path, version: &str) -> io::Result<ExportedModel> {
    if !is_single_component(version) {
        return Err(io::Error::new(io::ErrorKind::InvalidInput,
                                  format!("version '{version}' is not a plain directory name")));
    }
    let version_dir = export_root.join(version);
    if version_dir.is_dir() && fs::read_dir(&version_dir)?.next().is_some() {
        return Err(io::Error::new(io::ErrorKind::AlreadyExists,
                                  format!("{} already exists and is not empty", version_dir.display())));
    }
    fs::create_dir_all(&version_dir)?;

    let (kind, payload, _metadata, scope) = artifact.into_parts();
    let mut files = Vec::new();
    match &payload {
        Payload::Path(src) if src.is_dir() => copy_dir(src, &version_dir, Path::new(""), &mut files)?,
        Payload::Path(src) => {
            let name = src.file_name()
                          .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "payload path has no file name"))?;
            fs::copy(src, version_dir.join(name))?;
            files.push(PathBuf::from(name));
        }
        Payload::Bytes(bytes) => {
            fs::write(version_dir.join("model.bin"), bytes)?;
            files.push(PathBuf::from("model.bin"));
        }
        Payload::Json(value) => {
            let body = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
            fs::write(version_dir.join("model.json"), body)?;
            files.push(PathBuf::from("model.json"));
        }
    }
    files.sort();

    if let Err(e) = scope.release() {
        warn!("exported {} but releasing its temporary files failed: {e}", version_dir.display());
    }
    info!("exported {kind} to {} ({} files)", version_dir.display(), files.len());
    Ok(ExportedModel { kind,
                       version_dir,
                       files })
}

fn copy_dir(src: &Path, dst: &Path, rel: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let rel_path = rel.join(entry.file_name());
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            fs::create_dir_all(&target)?;
            copy_dir(&entry.path(), &target, &rel_path, files)?;
        } else {
            fs::copy(entry.path(), &target)?;
            files.push(rel_path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exports_single_file_payload_under_version() {
        let src = tempfile::tempdir().unwrap();
        let model = src.path().join("model.plan");
        fs::write(&model, b"plan").unwrap();
        let out = tempfile::tempdir().unwrap();

        let exported = export_artifact(Artifact::from_path(RepresentationType::TensorRtModel, &model),
                                       out.path(),
                                       "1").unwrap();
        assert_eq!(exported.version_dir, out.path().join("1"));
        assert_eq!(exported.files, vec![PathBuf::from("model.plan")]);
        assert_eq!(fs::read(out.path().join("1").join("model.plan")).unwrap(), b"plan");
        // Artifact sin scope propio: la ruta del usuario sigue intacta.
        assert!(model.exists());
    }

    #[test]
    fn exports_directory_payload_recursively() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("saved_model.pb"), b"g").unwrap();
        fs::create_dir(src.path().join("variables")).unwrap();
        fs::write(src.path().join("variables").join("variables.index"), b"i").unwrap();
        let out = tempfile::tempdir().unwrap();

        let exported = export_artifact(Artifact::from_path(RepresentationType::SavedModelFile, src.path()),
                                       out.path(),
                                       "2").unwrap();
        assert_eq!(exported.files,
                   vec![PathBuf::from("saved_model.pb"), PathBuf::from("variables").join("variables.index")]);
        assert!(out.path().join("2").join("variables").join("variables.index").is_file());
    }

    #[test]
    fn json_payload_and_occupied_version_dir() {
        let out = tempfile::tempdir().unwrap();
        let art = Artifact::new(RepresentationType::OnnxModel, Payload::Json(json!({"graph": []})));
        let exported = export_artifact(art, out.path(), "1").unwrap();
        assert_eq!(exported.files, vec![PathBuf::from("model.json")]);

        let again = Artifact::new(RepresentationType::OnnxModel, Payload::Bytes(vec![1, 2]));
        let err = export_artifact(again, out.path(), "1").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn version_cannot_escape_the_export_root() {
        let work = tempfile::tempdir().unwrap();
        let root = work.path().join("exports");
        for bad in ["../escaped", "/abs"] {
            let art = Artifact::new(RepresentationType::OnnxModel, Payload::Bytes(vec![0]));
            let err = export_artifact(art, &root, bad).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{bad}");
        }
        assert!(!work.path().join("escaped").exists());
        assert!(!root.exists());
    }
}
