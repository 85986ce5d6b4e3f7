//! Steps con destino ONNX.

use serde_json::json;

use super::Layout;
use crate::configs::OnnxConfig;

leaf_step! {
    /// Grafo congelado de TensorFlow -> modelo ONNX (tf2onnx).
    FrozenGraphToOnnx {
        id: "frozen_graph_to_onnx",
        source: FrozenGraphFile,
        target: OnnxModel,
        config: OnnxConfig,
        layout: Layout::File("model.onnx"),
        invocation(cfg) {
            json!({
                "tool": "tf2onnx",
                "opset": cfg.opset_version,
                "inputs_as_nchw": cfg.input_formats,
                "input_names": cfg.input_names,
                "output_names": cfg.output_names,
            })
        }
    }
}

leaf_step! {
    /// Fichero `.onnx` en disco -> modelo ONNX cargado y validado.
    OnnxFileToOnnx {
        id: "onnx_file_to_onnx",
        source: OnnxModelFile,
        target: OnnxModel,
        config: OnnxConfig,
        layout: Layout::File("model.onnx"),
        invocation(cfg) {
            json!({"tool": "onnx.checker", "input_names": cfg.input_names, "output_names": cfg.output_names})
        }
    }
}

leaf_step! {
    TorchToOnnx {
        id: "torch_to_onnx",
        source: TorchModelFile,
        target: OnnxModel,
        config: OnnxConfig,
        layout: Layout::File("model.onnx"),
        invocation(cfg) {
            json!({
                "tool": "torch.onnx.export",
                "opset_version": cfg.opset_version,
                "input_names": cfg.input_names,
                "output_names": cfg.output_names,
            })
        }
    }
}

leaf_step! {
    /// Directorio de inferencia de Paddle (`.pdmodel` + `.pdiparams`) -> ONNX.
    PaddleToOnnx {
        id: "paddle_to_onnx",
        source: PaddleModelFile,
        target: OnnxModel,
        config: OnnxConfig,
        layout: Layout::File("model.onnx"),
        invocation(cfg) {
            json!({"tool": "paddle2onnx", "opset_version": cfg.opset_version})
        }
    }
}
