//! Esquema declarado de la configuración de un step.
//!
//! El esquema es puramente estructural: nombre del config type, y por cada
//! campo su tipo JSON, si es requerido y su default. El projector no sabe qué
//! significa cada campo; sólo selecciona, coerciona y valida.

use serde_json::{Number, Value};

/// Tipo estructural de un campo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Bool,
    StringList,
    IntegerList,
    /// Cualquier valor JSON (p.ej. listas de shapes anidadas).
    Json,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Bool => "bool",
            FieldKind::StringList => "list of strings",
            FieldKind::IntegerList => "list of integers",
            FieldKind::Json => "json value",
        }
    }

    /// Normaliza `value` al tipo del campo. Los valores que llegan como texto
    /// (variables de entorno, `--set k=v`) se convierten:
    /// `"4"` -> `4`, `"true"` -> `true`, `"a,b"` -> `["a","b"]`.
    /// Devuelve `None` si el valor no encaja.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (FieldKind::Json, v) => Some(v.clone()),
            (FieldKind::String, Value::String(_)) => Some(value.clone()),
            (FieldKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Some(value.clone()),
            (FieldKind::Integer, Value::String(s)) => parse_integer(s),
            (FieldKind::Bool, Value::Bool(_)) => Some(value.clone()),
            (FieldKind::Bool, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(Value::Bool(true)),
                "false" | "0" | "no" => Some(Value::Bool(false)),
                _ => None,
            },
            (FieldKind::StringList, Value::Array(items)) if items.iter().all(Value::is_string) => Some(value.clone()),
            (FieldKind::StringList, Value::String(s)) => {
                Some(Value::Array(split_list(s).map(|p| Value::String(p.to_string())).collect()))
            }
            (FieldKind::IntegerList, Value::Array(items)) => {
                items.iter()
                     .map(|i| FieldKind::Integer.coerce(i))
                     .collect::<Option<Vec<_>>>()
                     .map(Value::Array)
            }
            (FieldKind::IntegerList, Value::String(s)) => {
                split_list(s).map(parse_integer).collect::<Option<Vec<_>>>().map(Value::Array)
            }
            _ => None,
        }
    }
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|p| !p.is_empty())
}

fn parse_integer(s: &str) -> Option<Value> {
    s.trim().parse::<i64>().ok().map(|n| Value::Number(Number::from(n)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
}

/// Config type de un step: nombre + campos en orden de declaración.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSchema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl ConfigSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               fields: Vec::new() }
    }

    /// Campo obligatorio sin default.
    pub fn required(mut self, name: &str, kind: FieldKind) -> Self {
        self.push(name, kind, true, None);
        self
    }

    /// Campo opcional; si falta no se incluye en la configuración proyectada.
    pub fn optional(mut self, name: &str, kind: FieldKind) -> Self {
        self.push(name, kind, false, None);
        self
    }

    /// Campo con default documentado.
    pub fn with_default(mut self, name: &str, kind: FieldKind, default: Value) -> Self {
        self.push(name, kind, false, Some(default));
        self
    }

    fn push(&mut self, name: &str, kind: FieldKind, required: bool, default: Option<Value>) {
        // Redeclarar un campo reemplaza la declaración anterior.
        self.fields.retain(|f| f.name != name);
        self.fields.push(FieldSpec { name: name.to_string(),
                                     kind,
                                     required,
                                     default });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn accepts(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}
