//! Utilidades para fusionar configuración JSON de forma determinista.
//!
//! `merge_json` es un merge "shallow" donde las claves de `b` reemplazan a
//! las de `a`. `merge_json_deep` desciende en objetos anidados; lo usan las
//! capas de configuración para que las secciones por config type se combinen
//! en vez de sustituirse.

use serde_json::Value;

/// Merge shallow: keys from `b` override keys from `a` when both are objects.
/// Cuando alguno de los dos valores no es objeto, `b` tiene precedencia.
pub fn merge_json(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Object(ma), Value::Object(mb)) => {
            let mut out = ma.clone();
            for (k, v) in mb.iter() {
                out.insert(k.clone(), v.clone());
            }
            Value::Object(out)
        }
        // Non-objects: override
        (_, other) => other.clone(),
    }
}

/// Merge recursivo: objetos anidados se combinan clave a clave.
pub fn merge_json_deep(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Object(ma), Value::Object(mb)) => {
            let mut out = ma.clone();
            for (k, v) in mb.iter() {
                let merged = match out.get(k) {
                    Some(existing) => merge_json_deep(existing, v),
                    None => v.clone(),
                };
                out.insert(k.clone(), merged);
            }
            Value::Object(out)
        }
        (_, other) => other.clone(),
    }
}
