//! Detección del `RepresentationType` de un modelo a partir de su ruta.

use std::fs;
use std::path::Path;

use mc_core::RepresentationType;

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| exts.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

fn dir_contains(dir: &Path, pred: impl Fn(&Path) -> bool) -> bool {
    match fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(Result::ok).any(|e| pred(&e.path())),
        Err(_) => false,
    }
}

/// Infiere el tipo fuente:
/// - directorio con `saved_model.pb` -> SavedModel
/// - directorio con un `.pdmodel` -> Paddle
/// - `.pb` -> grafo congelado, `.h5`/`.keras` -> Keras, `.onnx` -> ONNX,
///   `.pt`/`.pth` -> PyTorch, `.pdmodel` -> Paddle
///
/// Devuelve `None` si la ruta no existe o no encaja con ningún formato.
pub fn detect_source_type(path: &Path) -> Option<RepresentationType> {
    if path.is_dir() {
        if path.join("saved_model.pb").is_file() {
            return Some(RepresentationType::SavedModelFile);
        }
        if dir_contains(path, |p| has_extension(p, &["pdmodel"])) {
            return Some(RepresentationType::PaddleModelFile);
        }
        return None;
    }
    if !path.is_file() {
        return None;
    }
    if has_extension(path, &["pb"]) {
        Some(RepresentationType::FrozenGraphFile)
    } else if has_extension(path, &["h5", "keras"]) {
        Some(RepresentationType::KerasModelFile)
    } else if has_extension(path, &["onnx"]) {
        Some(RepresentationType::OnnxModelFile)
    } else if has_extension(path, &["pt", "pth"]) {
        Some(RepresentationType::TorchModelFile)
    } else if has_extension(path, &["pdmodel"]) {
        Some(RepresentationType::PaddleModelFile)
    } else {
        None
    }
}
