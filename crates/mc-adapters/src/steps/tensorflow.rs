//! Steps dentro del ecosistema TensorFlow (Keras, grafo congelado,
//! SavedModel, TFLite).

use mc_core::NoConfig;
use serde_json::json;

use super::Layout;
use crate::configs::{SavedModelConfig, TfLiteConfig};

leaf_step! {
    /// Modelo Keras (`.h5`) -> grafo congelado (`.pb`).
    KerasToFrozenGraph {
        id: "keras_to_frozen_graph",
        source: KerasModelFile,
        target: FrozenGraphFile,
        config: NoConfig,
        layout: Layout::File("frozen_graph.pb"),
        invocation(_cfg) {
            json!({"tool": "keras.freeze_session"})
        }
    }
}

leaf_step! {
    /// Grafo congelado -> SavedModel con la signature de `configs.saved_model`.
    FrozenGraphToSavedModel {
        id: "frozen_graph_to_saved_model",
        source: FrozenGraphFile,
        target: SavedModelFile,
        config: SavedModelConfig,
        layout: Layout::Dir(&["saved_model.pb", "variables.index"]),
        invocation(cfg) {
            json!({
                "tool": "tf.compat.v1.saved_model.Builder",
                "signature_inputs": cfg.input_names,
                "signature_outputs": cfg.output_names,
            })
        }
    }
}

leaf_step! {
    SavedModelToTfLite {
        id: "saved_model_to_tflite",
        source: SavedModelFile,
        target: TfLiteModel,
        config: TfLiteConfig,
        layout: Layout::File("model.tflite"),
        invocation(cfg) {
            json!({
                "tool": "tf.lite.TFLiteConverter",
                "optimizations": if cfg.optimization { json!(["DEFAULT"]) } else { json!([]) },
                "supported_types": cfg.supported_types,
            })
        }
    }
}
