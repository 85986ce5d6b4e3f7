use mc_core::NoConfig;
use serde_json::json;

use super::Layout;

leaf_step! {
    /// Modelo PyTorch -> TorchScript (`torch.jit.trace`).
    TorchToTorchScript {
        id: "torch_to_torchscript",
        source: TorchModelFile,
        target: TorchScriptModel,
        config: NoConfig,
        layout: Layout::File("model.pt"),
        invocation(_cfg) {
            json!({"tool": "torch.jit.trace"})
        }
    }
}
