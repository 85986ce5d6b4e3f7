//! Configuraciones tipadas de los steps hoja.
//!
//! Cada struct declara su `ConfigSchema` (nombre del config type + campos) y
//! se deserializa desde la configuración proyectada. Los defaults del esquema
//! y los `#[serde(default)]` coinciden para que un step invocado fuera del
//! projector se comporte igual.

use mc_core::{ConfigSchema, FieldKind, NoConfig, StepConfig};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Tipos de dato de tensor aceptados por los compiladores de destino.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    #[serde(alias = "HALF")]
    Float16,
    Bfloat16,
    #[default]
    Float,
    Double,
    String,
}

/// Pistas de firma (nombres de entradas/salidas) que los steps copian a la
/// metadata del artifact.
pub trait SignatureHints {
    fn input_names(&self) -> &[String] {
        &[]
    }

    fn output_names(&self) -> &[String] {
        &[]
    }
}

impl SignatureHints for NoConfig {}

fn names(v: &Option<Vec<String>>) -> &[String] {
    v.as_deref().unwrap_or(&[])
}

// ----------------------------------------------------------------------------
// ONNX
// ----------------------------------------------------------------------------

pub const DEFAULT_OPSET: i64 = 11;

fn default_opset() -> i64 {
    DEFAULT_OPSET
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnnxConfig {
    #[serde(default)]
    pub input_names: Option<Vec<String>>,
    #[serde(default)]
    pub output_names: Option<Vec<String>>,
    #[serde(default)]
    pub input_formats: Option<Vec<String>>,
    #[serde(default = "default_opset")]
    pub opset_version: i64,
}

impl StepConfig for OnnxConfig {
    fn schema() -> ConfigSchema {
        ConfigSchema::new("onnx").optional("input_names", FieldKind::StringList)
                                 .optional("output_names", FieldKind::StringList)
                                 .optional("input_formats", FieldKind::StringList)
                                 .with_default("opset_version", FieldKind::Integer, json!(DEFAULT_OPSET))
    }
}

impl SignatureHints for OnnxConfig {
    fn input_names(&self) -> &[String] {
        names(&self.input_names)
    }

    fn output_names(&self) -> &[String] {
        names(&self.output_names)
    }
}

// ----------------------------------------------------------------------------
// SavedModel
// ----------------------------------------------------------------------------

/// Signature del SavedModel generado a partir de un grafo congelado.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedModelConfig {
    #[serde(default)]
    pub input_names: Option<Vec<String>>,
    #[serde(default)]
    pub output_names: Option<Vec<String>>,
}

impl StepConfig for SavedModelConfig {
    fn schema() -> ConfigSchema {
        ConfigSchema::new("saved_model").optional("input_names", FieldKind::StringList)
                                        .optional("output_names", FieldKind::StringList)
    }
}

impl SignatureHints for SavedModelConfig {
    fn input_names(&self) -> &[String] {
        names(&self.input_names)
    }

    fn output_names(&self) -> &[String] {
        names(&self.output_names)
    }
}

// ----------------------------------------------------------------------------
// OpenVINO
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenvinoConfig {
    #[serde(default)]
    pub input_names: Option<Vec<String>>,
    #[serde(default)]
    pub output_names: Option<Vec<String>>,
    #[serde(default)]
    pub input_shapes: Option<Value>,
    #[serde(default)]
    pub max_batch_size: Option<i64>,
    #[serde(default)]
    pub enable_nhwc_to_nchw: bool,
}

impl StepConfig for OpenvinoConfig {
    fn schema() -> ConfigSchema {
        ConfigSchema::new("openvino").optional("input_names", FieldKind::StringList)
                                     .optional("output_names", FieldKind::StringList)
                                     .optional("input_shapes", FieldKind::Json)
                                     .optional("max_batch_size", FieldKind::Integer)
                                     .with_default("enable_nhwc_to_nchw", FieldKind::Bool, json!(false))
    }
}

impl SignatureHints for OpenvinoConfig {
    fn input_names(&self) -> &[String] {
        names(&self.input_names)
    }

    fn output_names(&self) -> &[String] {
        names(&self.output_names)
    }
}

impl OpenvinoConfig {
    /// Argumentos del model optimizer correspondientes a esta configuración.
    /// Sin `enable_nhwc_to_nchw` se desactiva la conversión de layout.
    pub fn optimizer_args(&self, script: &str) -> Value {
        let mut args = serde_json::Map::new();
        args.insert("script_name".into(), json!(script));
        args.insert("model_name".into(), json!("model"));
        if !self.enable_nhwc_to_nchw {
            args.insert("disable_nhwc_to_nchw".into(), Value::Null);
        }
        if let Some(v) = &self.input_names {
            args.insert("input".into(), json!(v.join(",")));
        }
        if let Some(v) = &self.output_names {
            args.insert("output".into(), json!(v.join(",")));
        }
        if let Some(v) = &self.input_shapes {
            args.insert("input_shape".into(), v.clone());
        }
        if let Some(b) = self.max_batch_size {
            args.insert("batch".into(), json!(b.to_string()));
        }
        Value::Object(args)
    }
}

// ----------------------------------------------------------------------------
// TensorRT
// ----------------------------------------------------------------------------

pub const DEFAULT_WORKSPACE_BYTES: i64 = 1 << 30;

fn default_batch() -> i64 {
    1
}

fn default_workspace() -> i64 {
    DEFAULT_WORKSPACE_BYTES
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorRtConfig {
    #[serde(default = "default_batch")]
    pub max_batch_size: i64,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default = "default_workspace")]
    pub max_workspace_size_byte: i64,
    #[serde(default)]
    pub input_shapes: Option<Value>,
}

impl StepConfig for TensorRtConfig {
    fn schema() -> ConfigSchema {
        ConfigSchema::new("tensorrt").with_default("max_batch_size", FieldKind::Integer, json!(1))
                                     .with_default("data_type", FieldKind::String, json!("FLOAT"))
                                     .with_default("max_workspace_size_byte",
                                                   FieldKind::Integer,
                                                   json!(DEFAULT_WORKSPACE_BYTES))
                                     .optional("input_shapes", FieldKind::Json)
    }
}

impl SignatureHints for TensorRtConfig {}

// ----------------------------------------------------------------------------
// TensorFlow Lite
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfLiteConfig {
    #[serde(default)]
    pub optimization: bool,
    #[serde(default)]
    pub supported_types: Option<Vec<DataType>>,
}

impl StepConfig for TfLiteConfig {
    fn schema() -> ConfigSchema {
        ConfigSchema::new("tflite").with_default("optimization", FieldKind::Bool, json!(false))
                                   .optional("supported_types", FieldKind::StringList)
    }
}

impl SignatureHints for TfLiteConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_defaults_match_serde_defaults() {
        let onnx: OnnxConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(onnx.opset_version, DEFAULT_OPSET);
        let trt: TensorRtConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(trt.data_type, DataType::Float);
        assert_eq!(trt.max_batch_size, 1);
        let ov: OpenvinoConfig = serde_json::from_value(json!({})).unwrap();
        assert!(!ov.enable_nhwc_to_nchw);
        let schema = TensorRtConfig::schema();
        assert_eq!(schema.field("data_type").unwrap().default, Some(json!("FLOAT")));
    }

    #[test]
    fn half_is_an_alias_for_float16() {
        let trt: TensorRtConfig = serde_json::from_value(json!({"data_type": "HALF"})).unwrap();
        assert_eq!(trt.data_type, DataType::Float16);
        assert!(serde_json::from_value::<TensorRtConfig>(json!({"data_type": "FP7"})).is_err());
    }

    #[test]
    fn optimizer_args_follow_config() {
        let cfg = OpenvinoConfig { input_names: Some(vec!["x".into(), "y".into()]),
                                   output_names: None,
                                   input_shapes: Some(json!([[1, 224, 224, 3]])),
                                   max_batch_size: Some(4),
                                   enable_nhwc_to_nchw: false };
        let args = cfg.optimizer_args("mo_tf.py");
        assert_eq!(args["script_name"], json!("mo_tf.py"));
        assert!(args.as_object().unwrap().contains_key("disable_nhwc_to_nchw"));
        assert_eq!(args["input"], json!("x,y"));
        assert_eq!(args["batch"], json!("4"));
        assert!(args.get("output").is_none());

        let cfg = OpenvinoConfig { enable_nhwc_to_nchw: true,
                                   ..cfg };
        assert!(!cfg.optimizer_args("mo_onnx.py").as_object().unwrap().contains_key("disable_nhwc_to_nchw"));
    }
}
