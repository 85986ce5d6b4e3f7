use serde_json::json;

use super::Layout;
use crate::configs::TensorRtConfig;

leaf_step! {
    /// Modelo ONNX -> plan serializado de TensorRT.
    OnnxToTensorRt {
        id: "onnx_to_tensorrt",
        source: OnnxModel,
        target: TensorRtModel,
        config: TensorRtConfig,
        layout: Layout::File("model.plan"),
        invocation(cfg) {
            json!({
                "tool": "trt.OnnxParser",
                "max_batch_size": cfg.max_batch_size,
                "precision": cfg.data_type,
                "max_workspace_size": cfg.max_workspace_size_byte,
                "input_shapes": cfg.input_shapes,
            })
        }
    }
}
