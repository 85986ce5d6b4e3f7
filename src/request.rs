//! Petición de compilación en la forma JSON de entrada:
//!
//! ```json
//! { "serving_type": "tensorrt", "model_path": "model.h5",
//!   "export_path": "out", "version": 1, "max_batch_size": 4 }
//! ```
//!
//! Las claves reservadas describen la petición; el resto es la
//! configuración de usuario que el proyector reparte entre los steps.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::debug;
use mc_core::{ConfigLayer, EnvLayer, LayeredConfig, RepresentationType, UserConfig, ValueLayer};
use serde_json::Value;

use crate::config::CONFIG_ENV_PREFIX;
use crate::errors::AppError;

pub const SERVING_TYPE: &str = "serving_type";
pub const MODEL_PATH: &str = "model_path";
pub const SOURCE_TYPE: &str = "source_type";
pub const EXPORT_PATH: &str = "export_path";
pub const VERSION: &str = "version";

const RESERVED: [&str; 5] = [SERVING_TYPE, MODEL_PATH, SOURCE_TYPE, EXPORT_PATH, VERSION];

pub const DEFAULT_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq)]
pub struct CompileRequest {
    pub source_type: RepresentationType,
    pub target_type: RepresentationType,
    pub model_path: PathBuf,
    pub export_path: Option<PathBuf>,
    pub version: String,
    pub config: UserConfig,
}

impl CompileRequest {
    /// Construye la petición desde el objeto ya combinado. Sin `source_type`
    /// el tipo se infiere de `model_path`.
    pub fn from_map(mut map: UserConfig) -> Result<Self, AppError> {
        let target_type = required_str(&map, SERVING_TYPE)?.parse::<RepresentationType>()
                                                           .map_err(|e| AppError::Request(e.to_string()))?;
        let model_path = PathBuf::from(required_str(&map, MODEL_PATH)?);
        let source_type = match optional_str(&map, SOURCE_TYPE)? {
            Some(raw) => raw.parse::<RepresentationType>()
                            .map_err(|e| AppError::Request(e.to_string()))?,
            None => mc_adapters::detect_source_type(&model_path).ok_or_else(|| {
                        AppError::Request(format!("cannot detect source type of {}", model_path.display()))
                    })?,
        };
        let export_path = optional_str(&map, EXPORT_PATH)?.map(PathBuf::from);
        let version = match map.get(VERSION) {
            None | Some(Value::Null) => DEFAULT_VERSION.to_string(),
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => return Err(AppError::Request(format!("invalid {VERSION}: {other}"))),
        };
        if !is_single_component(&version) {
            return Err(AppError::Request(format!("{VERSION} must be a plain directory name, got '{version}'")));
        }

        for key in RESERVED {
            map.remove(key);
        }
        debug!("request {source_type} -> {target_type} with {} config keys", map.len());
        Ok(Self { source_type,
                  target_type,
                  model_path,
                  export_path,
                  version,
                  config: map })
    }

    pub fn from_value(value: Value) -> Result<Self, AppError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(AppError::Request(format!("request must be a JSON object, got {other}"))),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        Self::from_value(read_json(path)?)
    }
}

/// `true` si `name` es exactamente un componente normal de ruta.
pub fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}

fn required_str<'a>(map: &'a UserConfig, key: &str) -> Result<&'a str, AppError> {
    optional_str(map, key)?.ok_or_else(|| AppError::Request(format!("missing '{key}'")))
}

fn optional_str<'a>(map: &'a UserConfig, key: &str) -> Result<Option<&'a str>, AppError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(AppError::Request(format!("'{key}' must be a string, got {other}"))),
    }
}

fn read_json(path: &Path) -> Result<Value, AppError> {
    let body = fs::read(path)?;
    Ok(serde_json::from_slice(&body)?)
}

/// Fuentes de una petición, en orden de precedencia creciente: fichero JSON,
/// entorno (`MODEL_COMPILER_CFG_<CAMPO>`) y overrides `clave=valor`.
#[derive(Debug, Default)]
pub struct RequestSources {
    layers: LayeredConfig,
}

impl RequestSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Añade el contenido de un fichero JSON como capa.
    pub fn file(mut self, path: &Path) -> Result<Self, AppError> {
        let values = match read_json(path)? {
            Value::Object(map) => map,
            _ => return Err(AppError::Request(format!("{} is not a JSON object", path.display()))),
        };
        self.layers.push(Box::new(ValueLayer::new(path.display().to_string(), values)));
        Ok(self)
    }

    pub fn env(self) -> Self {
        self.layer(EnvLayer::new(CONFIG_ENV_PREFIX))
    }

    /// Overrides `clave=valor`; las claves con punto anidan objetos.
    pub fn overrides<'a>(self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.layer(ValueLayer::from_assignments("overrides", pairs))
    }

    pub fn layer(mut self, layer: impl ConfigLayer + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Combina las capas y construye la petición. `known_fields` son los
    /// campos de configuración declarados por el registry.
    pub fn build(&self, known_fields: &[String]) -> Result<CompileRequest, AppError> {
        CompileRequest::from_map(self.layers.apply(known_fields))
    }
}

/// Separa un argumento `clave=valor`.
pub fn split_assignment(raw: &str) -> Result<(&str, &str), AppError> {
    match raw.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim(), v)),
        _ => Err(AppError::Request(format!("expected key=value, got '{raw}'"))),
    }
}
