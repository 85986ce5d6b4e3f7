//! Capas de configuración de usuario.
//!
//! `LayeredConfig` aplica una secuencia de `ConfigLayer` de forma
//! determinista y devuelve la `UserConfig` resultante. El orden de merge es
//! el de inserción (típicamente: fichero -> entorno -> overrides explícitos);
//! cada capa gana sobre las anteriores.

use std::fmt;

use serde_json::{Map, Value};

use super::merge::merge_json_deep;
use super::projector::UserConfig;

/// Fuente de valores de configuración.
pub trait ConfigLayer: Send + Sync + fmt::Debug {
    /// Nombre de la capa para logs.
    fn name(&self) -> &str;

    /// Devuelve los valores aportados por la capa. `known_fields` es la unión
    /// de los campos declarados por los steps registrados; las capas que no
    /// pueden enumerar sus claves (p.ej. el entorno) lo usan para buscar.
    fn values(&self, known_fields: &[String]) -> UserConfig;
}

/// Capa con valores fijos (contenido de un fichero JSON, overrides de CLI).
#[derive(Debug, Clone, Default)]
pub struct ValueLayer {
    name: String,
    values: UserConfig,
}

impl ValueLayer {
    pub fn new(name: impl Into<String>, values: UserConfig) -> Self {
        Self { name: name.into(),
               values }
    }

    /// Construye la capa a partir de pares `clave=valor`. El valor se
    /// interpreta como JSON si es posible y como texto en caso contrario.
    /// Las claves con punto (`configs.openvino.max_batch_size`) crean objetos
    /// anidados.
    pub fn from_assignments<'a>(name: impl Into<String>, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut root = Value::Object(Map::new());
        for (key, raw) in pairs {
            let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            let nested = key.rsplit('.').fold(value, |acc, part| {
                                            let mut m = Map::new();
                                            m.insert(part.to_string(), acc);
                                            Value::Object(m)
                                        });
            root = merge_json_deep(&root, &nested);
        }
        let values = match root {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        Self::new(name, values)
    }
}

impl ConfigLayer for ValueLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn values(&self, _known_fields: &[String]) -> UserConfig {
        self.values.clone()
    }
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Capa que lee variables de entorno: por cada campo conocido busca
/// `<PREFIX><CAMPO_EN_MAYÚSCULAS>` (p.ej. `MAX_BATCH_SIZE`).
pub struct EnvLayer {
    prefix: String,
    lookup: Lookup,
}

impl EnvLayer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_lookup(prefix, |k| std::env::var(k).ok())
    }

    /// Variante con función de búsqueda inyectada (tests, fuentes no-env).
    pub fn with_lookup(prefix: impl Into<String>, lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self { prefix: prefix.into(),
               lookup: Box::new(lookup) }
    }

    fn var_name(&self, field: &str) -> String {
        format!("{}{}", self.prefix, field.to_ascii_uppercase())
    }
}

impl fmt::Debug for EnvLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvLayer").field("prefix", &self.prefix).finish()
    }
}

impl ConfigLayer for EnvLayer {
    fn name(&self) -> &str {
        "env"
    }

    fn values(&self, known_fields: &[String]) -> UserConfig {
        let mut out = Map::new();
        for field in known_fields {
            if let Some(raw) = (self.lookup)(&self.var_name(field)) {
                out.insert(field.clone(), Value::String(raw));
            }
        }
        out
    }
}

/// Composición ordenada de capas.
#[derive(Debug, Default)]
pub struct LayeredConfig {
    pub layers: Vec<Box<dyn ConfigLayer>>,
}

impl LayeredConfig {
    /// Crea un `LayeredConfig` vacío.
    pub fn new() -> Self {
        Self { layers: vec![] }
    }

    pub fn with_layers(layers: Vec<Box<dyn ConfigLayer>>) -> Self {
        Self { layers }
    }

    pub fn push(&mut self, layer: Box<dyn ConfigLayer>) {
        self.layers.push(layer);
    }

    /// Aplica las capas en orden y devuelve la configuración resultante.
    pub fn apply(&self, known_fields: &[String]) -> UserConfig {
        let mut accumulated = Value::Object(Map::new());
        for layer in self.layers.iter() {
            let v = layer.values(known_fields);
            log::debug!("config layer '{}' contributed {} keys", layer.name(), v.len());
            accumulated = merge_json_deep(&accumulated, &Value::Object(v));
        }
        match accumulated {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }
}
