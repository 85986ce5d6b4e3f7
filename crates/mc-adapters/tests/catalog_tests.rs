use std::fs;

use mc_adapters::manifest::{digest_path, Manifest};
use mc_adapters::{default_registry, detect_source_type};
use mc_core::{Artifact, CompileError, Compiler, MismatchReason, Registry, RepresentationType as RT, Resolver, StepError, UserConfig};
use serde_json::{json, Value};

fn user(v: Value) -> UserConfig {
    v.as_object().cloned().unwrap_or_default()
}

fn registry() -> Registry {
    default_registry().expect("catalog has no conflicting pairs")
}

#[test]
fn catalog_registers_every_supported_pair() {
    let registry = registry();
    assert_eq!(registry.len(), 11);
    for (s, t) in [(RT::KerasModelFile, RT::FrozenGraphFile),
                   (RT::FrozenGraphFile, RT::SavedModelFile),
                   (RT::FrozenGraphFile, RT::OnnxModel),
                   (RT::FrozenGraphFile, RT::OpenvinoModel),
                   (RT::OnnxModelFile, RT::OnnxModel),
                   (RT::TorchModelFile, RT::OnnxModel),
                   (RT::PaddleModelFile, RT::OnnxModel),
                   (RT::OnnxModel, RT::OpenvinoModel),
                   (RT::OnnxModel, RT::TensorRtModel),
                   (RT::SavedModelFile, RT::TfLiteModel),
                   (RT::TorchModelFile, RT::TorchScriptModel)]
    {
        assert!(registry.lookup_exact(s, t).is_some(), "{s} -> {t} missing");
    }
}

#[test]
fn multi_hop_routes_through_the_catalog() {
    let registry = registry();
    let resolver = Resolver::new(&registry);
    let ids = |s, t| resolver.resolve(s, t).unwrap().step_ids().iter().map(|i| i.to_string()).collect::<Vec<_>>();

    assert_eq!(ids(RT::KerasModelFile, RT::TensorRtModel),
               vec!["keras_to_frozen_graph", "frozen_graph_to_onnx", "onnx_to_tensorrt"]);
    assert_eq!(ids(RT::KerasModelFile, RT::TfLiteModel),
               vec!["keras_to_frozen_graph", "frozen_graph_to_saved_model", "saved_model_to_tflite"]);
    assert_eq!(ids(RT::TorchModelFile, RT::OpenvinoModel), vec!["torch_to_onnx", "onnx_to_openvino"]);
    assert_eq!(ids(RT::FrozenGraphFile, RT::OpenvinoModel), vec!["frozen_graph_to_openvino"]);

    let err = resolver.resolve(RT::TfLiteModel, RT::OnnxModel).unwrap_err();
    assert!(matches!(err, CompileError::NoPathFound { .. }));

    let reach: Vec<_> = resolver.reachable_from(RT::TorchModelFile).into_iter().map(|r| r.target).collect();
    assert_eq!(reach,
               vec![RT::OnnxModel, RT::TorchScriptModel, RT::OpenvinoModel, RT::TensorRtModel]);
}

#[test]
fn keras_to_tensorrt_writes_plan_with_projected_config() {
    let registry = registry();
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.h5");
    fs::write(&model, b"keras weights").unwrap();

    let out = Compiler::new(&registry).compile(Artifact::from_path(RT::KerasModelFile, &model),
                                               RT::KerasModelFile,
                                               RT::TensorRtModel,
                                               &user(json!({"max_batch_size": 4, "data_type": "HALF"})))
                                      .unwrap();
    let plan = out.path().unwrap().to_path_buf();
    assert!(plan.ends_with("model.plan"));
    assert!(plan.is_file());

    let manifest = Manifest::read_for(&plan).unwrap();
    assert_eq!(manifest.step, "onnx_to_tensorrt");
    assert_eq!(manifest.target_type, RT::TensorRtModel);
    assert_eq!(manifest.config["max_batch_size"], json!(4));
    assert_eq!(manifest.config["data_type"], json!("FLOAT16"));
    // El ONNX intermedio ya no existe.
    assert!(!manifest.input.path.exists());
    assert_eq!(out.metadata.as_ref().unwrap()["step"], json!("onnx_to_tensorrt"));

    out.release().unwrap();
    assert!(!plan.exists());
    assert!(model.exists());
}

#[test]
fn first_step_records_digest_of_user_model() {
    let registry = registry();
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.h5");
    fs::write(&model, b"keras weights").unwrap();

    let out = Compiler::new(&registry).compile(Artifact::from_path(RT::KerasModelFile, &model),
                                               RT::KerasModelFile,
                                               RT::FrozenGraphFile,
                                               &UserConfig::new())
                                      .unwrap();
    let manifest = Manifest::read_for(out.path().unwrap()).unwrap();
    assert_eq!(manifest.input.path, model);
    assert_eq!(manifest.input.sha256, digest_path(&model).unwrap());
    assert_eq!(out.metadata.as_ref().unwrap()["input_sha256"], json!(manifest.input.sha256));
}

#[test]
fn openvino_ir_is_a_directory_and_honours_layout_flag() {
    let registry = registry();
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("frozen.pb");
    fs::write(&model, b"graph").unwrap();

    let cfg = user(json!({
        "input_names": "x,y",
        "configs": {"openvino": {"enable_nhwc_to_nchw": "true", "max_batch_size": 2}}
    }));
    let out = Compiler::new(&registry).compile(Artifact::from_path(RT::FrozenGraphFile, &model),
                                               RT::FrozenGraphFile,
                                               RT::OpenvinoModel,
                                               &cfg)
                                      .unwrap();
    let ir = out.path().unwrap();
    assert!(ir.is_dir());
    assert!(ir.join("model.xml").is_file());
    assert!(ir.join("model.bin").is_file());

    let manifest = Manifest::read_for(ir).unwrap();
    let invocation = manifest.invocation.as_object().unwrap();
    assert_eq!(invocation["script_name"], json!("mo_tf.py"));
    assert!(!invocation.contains_key("disable_nhwc_to_nchw"));
    assert_eq!(invocation["batch"], json!("2"));
    assert_eq!(invocation["input"], json!("x,y"));
    assert_eq!(out.metadata.as_ref().unwrap()["inputs"], json!(["x", "y"]));
}

#[test]
fn invalid_enum_value_is_rejected_before_any_step_runs() {
    let registry = registry();
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.onnx");
    fs::write(&model, b"onnx").unwrap();

    let run = Compiler::new(&registry).with_temp_root(Some(dir.path().join("tmp")))
                                      .compile_traced(Artifact::from_path(RT::OnnxModelFile, &model),
                                                      RT::OnnxModelFile,
                                                      RT::TensorRtModel,
                                                      &user(json!({"data_type": "FP7"})));
    match &run.result {
        Err(CompileError::ConfigMismatch { step_index,
                                           step_id,
                                           field,
                                           reason: MismatchReason::Rejected { message }, }) => {
            assert_eq!(*step_index, 1);
            assert_eq!(step_id, "onnx_to_tensorrt");
            assert_eq!(field, "data_type");
            assert!(message.contains("FP7"), "{message}");
        }
        other => panic!("expected a config mismatch, got {other:?}"),
    }
    // Ningún step llegó a ejecutarse ni a pedir directorios.
    assert!(run.events.is_empty());
    assert!(!dir.path().join("tmp").exists());
}

#[test]
fn bad_supported_type_entry_names_the_field() {
    let registry = registry();
    let err = Compiler::new(&registry).plan(RT::SavedModelFile,
                                            RT::TfLiteModel,
                                            &user(json!({"supported_types": "FLOAT,FP7"})))
                                      .unwrap_err();
    assert!(matches!(err,
                     CompileError::ConfigMismatch { step_index: 0,
                                                    ref field,
                                                    reason: MismatchReason::Rejected { .. },
                                                    .. } if field == "supported_types"));
}

#[test]
fn missing_model_is_invalid_input() {
    let registry = registry();
    let dir = tempfile::tempdir().unwrap();
    let err = Compiler::new(&registry).compile(Artifact::from_path(RT::TorchModelFile, dir.path().join("nope.pt")),
                                               RT::TorchModelFile,
                                               RT::TorchScriptModel,
                                               &UserConfig::new())
                                      .unwrap_err();
    assert!(matches!(err,
                     CompileError::StepFailed { step_index: 0,
                                                cause: StepError::InvalidInput(_),
                                                .. }));
}

#[test]
fn detected_type_drives_a_compile() {
    let registry = registry();
    let dir = tempfile::tempdir().unwrap();
    let saved = dir.path().join("saved");
    fs::create_dir(&saved).unwrap();
    fs::write(saved.join("saved_model.pb"), b"graph").unwrap();

    let source = detect_source_type(&saved).unwrap();
    assert_eq!(source, RT::SavedModelFile);
    let out = Compiler::new(&registry).compile(Artifact::from_path(source, &saved),
                                               source,
                                               RT::TfLiteModel,
                                               &user(json!({"optimization": true})))
                                      .unwrap();
    let manifest = Manifest::read_for(out.path().unwrap()).unwrap();
    assert_eq!(manifest.invocation["optimizations"], json!(["DEFAULT"]));
    assert_eq!(manifest.input.sha256, digest_path(&saved).unwrap());
}

#[test]
fn saved_model_signature_ignores_openvino_section() {
    let registry = registry();
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("frozen.pb");
    fs::write(&model, b"graph").unwrap();
    let compiler = Compiler::new(&registry);

    let only_openvino = user(json!({"configs": {"openvino": {"input_names": "a,b"}}}));
    let out = compiler.compile(Artifact::from_path(RT::FrozenGraphFile, &model),
                               RT::FrozenGraphFile,
                               RT::SavedModelFile,
                               &only_openvino)
                      .unwrap();
    let manifest = Manifest::read_for(out.path().unwrap()).unwrap();
    assert_eq!(manifest.invocation["signature_inputs"], Value::Null);

    let both = user(json!({"configs": {"openvino": {"input_names": "a,b"},
                                       "saved_model": {"input_names": "x"}}}));
    let out = compiler.compile(Artifact::from_path(RT::FrozenGraphFile, &model),
                               RT::FrozenGraphFile,
                               RT::SavedModelFile,
                               &both)
                      .unwrap();
    let manifest = Manifest::read_for(out.path().unwrap()).unwrap();
    assert_eq!(manifest.invocation["signature_inputs"], json!(["x"]));
    assert_eq!(out.metadata.as_ref().unwrap()["inputs"], json!(["x"]));
}
