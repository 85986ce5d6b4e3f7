//! Tipos de representación de modelos.
//!
//! Un `RepresentationType` identifica una clase de artifact (un frozen graph,
//! un plan de TensorRT, ...). Es el nodo del grafo de conversiones: los steps
//! registrados son las aristas. La enumeración es fija para que el registry
//! valide las aristas una sola vez al registrar.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationType {
    /// Fichero `.pb` con un GraphDef congelado de TensorFlow.
    FrozenGraphFile,
    /// Directorio SavedModel de TensorFlow.
    SavedModelFile,
    /// Fichero `.h5` de Keras.
    KerasModelFile,
    /// Fichero `.onnx` tal como lo entrega el usuario.
    OnnxModelFile,
    /// Checkpoint de PyTorch (`.pt` / `.pth`).
    TorchModelFile,
    /// Directorio con `.pdmodel` / `.pdiparams` de Paddle.
    PaddleModelFile,
    /// Modelo ONNX normalizado (intermedio común).
    OnnxModel,
    /// Par `model.xml` + `model.bin` de OpenVINO.
    OpenvinoModel,
    /// Plan serializado de TensorRT.
    #[serde(rename = "tensorrt_model")]
    TensorRtModel,
    /// Flat buffer de TensorFlow Lite.
    #[serde(rename = "tflite_model")]
    TfLiteModel,
    /// Módulo TorchScript trazado.
    #[serde(rename = "torchscript_model")]
    TorchScriptModel,
}

impl RepresentationType {
    pub const ALL: [RepresentationType; 11] = [RepresentationType::FrozenGraphFile,
                                                RepresentationType::SavedModelFile,
                                                RepresentationType::KerasModelFile,
                                                RepresentationType::OnnxModelFile,
                                                RepresentationType::TorchModelFile,
                                                RepresentationType::PaddleModelFile,
                                                RepresentationType::OnnxModel,
                                                RepresentationType::OpenvinoModel,
                                                RepresentationType::TensorRtModel,
                                                RepresentationType::TfLiteModel,
                                                RepresentationType::TorchScriptModel];

    /// Nombre estable (snake_case) usado en logs, errores y JSON.
    pub fn name(&self) -> &'static str {
        match self {
            RepresentationType::FrozenGraphFile => "frozen_graph_file",
            RepresentationType::SavedModelFile => "saved_model_file",
            RepresentationType::KerasModelFile => "keras_model_file",
            RepresentationType::OnnxModelFile => "onnx_model_file",
            RepresentationType::TorchModelFile => "torch_model_file",
            RepresentationType::PaddleModelFile => "paddle_model_file",
            RepresentationType::OnnxModel => "onnx_model",
            RepresentationType::OpenvinoModel => "openvino_model",
            RepresentationType::TensorRtModel => "tensorrt_model",
            RepresentationType::TfLiteModel => "tflite_model",
            RepresentationType::TorchScriptModel => "torchscript_model",
        }
    }
}

impl fmt::Display for RepresentationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown representation type: {0}")]
pub struct UnknownRepresentation(pub String);

impl FromStr for RepresentationType {
    type Err = UnknownRepresentation;

    /// Acepta el nombre snake_case y los alias de `serving_type`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if let Some(t) = Self::ALL.iter().find(|t| t.name() == normalized) {
            return Ok(*t);
        }
        match normalized.as_str() {
            "tf" | "saved_model" => Ok(RepresentationType::SavedModelFile),
            "frozen_graph" | "pb" => Ok(RepresentationType::FrozenGraphFile),
            "keras" | "h5" => Ok(RepresentationType::KerasModelFile),
            "onnx" => Ok(RepresentationType::OnnxModel),
            "openvino" => Ok(RepresentationType::OpenvinoModel),
            "tensorrt" | "trt" => Ok(RepresentationType::TensorRtModel),
            "tflite" => Ok(RepresentationType::TfLiteModel),
            "torchscript" => Ok(RepresentationType::TorchScriptModel),
            "torch" | "pytorch" => Ok(RepresentationType::TorchModelFile),
            "paddle" => Ok(RepresentationType::PaddleModelFile),
            _ => Err(UnknownRepresentation(s.to_string())),
        }
    }
}
