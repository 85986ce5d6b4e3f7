//! Steps con destino OpenVINO IR (`model.xml` + `model.bin`).

use super::Layout;
use crate::configs::OpenvinoConfig;

const IR_FILES: &[&str] = &["model.xml", "model.bin"];

leaf_step! {
    FrozenGraphToOpenvino {
        id: "frozen_graph_to_openvino",
        source: FrozenGraphFile,
        target: OpenvinoModel,
        config: OpenvinoConfig,
        layout: Layout::Dir(IR_FILES),
        invocation(cfg) {
            cfg.optimizer_args("mo_tf.py")
        }
    }
}

leaf_step! {
    OnnxToOpenvino {
        id: "onnx_to_openvino",
        source: OnnxModel,
        target: OpenvinoModel,
        config: OpenvinoConfig,
        layout: Layout::Dir(IR_FILES),
        invocation(cfg) {
            cfg.optimizer_args("mo_onnx.py")
        }
    }
}
