use std::fs;
use std::path::{Path, PathBuf};

use mc_adapters::manifest::Manifest;
use mc_core::{CancellationToken, CompileError, RepresentationType as RT, StepStatus};
use model_compiler::{compile_batch, compile_request, default_registry, AppError, CompileRequest, RequestSources, Settings};
use serde_json::{json, Value};

fn write_json(path: &Path, v: Value) {
    fs::write(path, serde_json::to_vec_pretty(&v).unwrap()).unwrap();
}

fn settings(scratch: &Path) -> Settings {
    Settings { scratch_dir: Some(scratch.to_path_buf()),
               ..Settings::default() }
}

fn request(v: Value) -> CompileRequest {
    CompileRequest::from_value(v).unwrap()
}

#[test]
fn request_file_compiles_and_exports_versioned_model() {
    let registry = default_registry().unwrap();
    let work = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let model = work.path().join("model.h5");
    fs::write(&model, b"keras").unwrap();
    let export = work.path().join("export");
    let file = work.path().join("request.json");
    write_json(&file,
               json!({"serving_type": "tensorrt",
                      "model_path": model,
                      "export_path": export,
                      "version": 2,
                      "max_batch_size": 1,
                      "data_type": "FLOAT"}));

    let known = registry.config_fields();
    let req = RequestSources::new().file(&file)
                                   .unwrap()
                                   .overrides([("max_batch_size", "16")])
                                   .build(&known)
                                   .unwrap();
    assert_eq!(req.source_type, RT::KerasModelFile);

    let outcome = compile_request(&registry, &settings(scratch.path()), &req).unwrap();
    assert_eq!(outcome.exported.version_dir, export.join("2"));
    assert_eq!(outcome.exported.files, vec![PathBuf::from("model.plan")]);
    assert!(export.join("2").join("model.plan").is_file());

    let ids: Vec<_> = outcome.report.steps.iter().map(|s| s.step_id.as_str()).collect();
    assert_eq!(ids, vec!["keras_to_frozen_graph", "frozen_graph_to_onnx", "onnx_to_tensorrt"]);
    assert!(outcome.report.steps.iter().all(|s| s.status == StepStatus::FinishedOk));
    assert_eq!(outcome.report.run_id, outcome.run_id);

    // Intermedios y salida temporal liberados tras exportar.
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    assert!(model.exists());
}

#[test]
fn openvino_export_copies_the_ir_directory() {
    let registry = default_registry().unwrap();
    let work = tempfile::tempdir().unwrap();
    let model = work.path().join("model.onnx");
    fs::write(&model, b"onnx").unwrap();

    let req = request(json!({"serving_type": "openvino",
                             "model_path": model,
                             "export_path": work.path().join("out"),
                             "configs": {"openvino": {"max_batch_size": 8}}}));
    let outcome = compile_request(&registry, &Settings::default(), &req).unwrap();
    let files: Vec<_> = outcome.exported.files.iter().map(|f| f.to_string_lossy().to_string()).collect();
    assert_eq!(files, vec!["manifest.json", "model.bin", "model.xml"]);

    let manifest = Manifest::read_for(&outcome.exported.version_dir).unwrap();
    assert_eq!(manifest.step, "onnx_to_openvino");
    assert_eq!(manifest.invocation["batch"], json!("8"));
}

#[test]
fn batch_keeps_request_order_and_isolates_failures() {
    let registry = default_registry().unwrap();
    let work = tempfile::tempdir().unwrap();
    let torch = work.path().join("net.pt");
    fs::write(&torch, b"torch").unwrap();
    let export = work.path().join("export");

    let requests = vec![request(json!({"serving_type": "onnx", "model_path": torch,
                                       "export_path": export.join("a")})),
                        request(json!({"serving_type": "onnx", "model_path": torch,
                                       "source_type": "tflite_model",
                                       "export_path": export.join("b")})),
                        request(json!({"serving_type": "torchscript", "model_path": torch,
                                       "export_path": export.join("c")}))];
    let results = compile_batch(&registry, &Settings::default(), &requests, &CancellationToken::new());
    assert_eq!(results.len(), 3);

    assert!(export.join("a").join("1").join("model.onnx").is_file());
    assert!(matches!(&results[1],
                     Err(AppError::Compile(CompileError::SourceKindMismatch { .. }))
                     | Err(AppError::Compile(CompileError::NoPathFound { .. }))));
    assert!(!export.join("b").exists());
    let third = results[2].as_ref().unwrap();
    assert_eq!(third.exported.kind, RT::TorchScriptModel);
    assert!(export.join("c").join("1").join("model.pt").is_file());
}

#[test]
fn cancelled_batch_runs_no_step() {
    let registry = default_registry().unwrap();
    let work = tempfile::tempdir().unwrap();
    let model = work.path().join("m.pb");
    fs::write(&model, b"graph").unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let requests = vec![request(json!({"serving_type": "tensorrt", "model_path": model,
                                       "export_path": work.path().join("out")}))];
    let results = compile_batch(&registry, &Settings::default(), &requests, &token);
    assert!(matches!(&results[0], Err(AppError::Compile(CompileError::Cancelled { step_index: 0 }))));
    assert!(!work.path().join("out").exists());
}

#[test]
fn batch_rejects_requests_sharing_an_export_target() {
    let registry = default_registry().unwrap();
    let work = tempfile::tempdir().unwrap();
    let onnx = work.path().join("m.onnx");
    fs::write(&onnx, b"onnx").unwrap();
    let torch = work.path().join("net.pt");
    fs::write(&torch, b"torch").unwrap();
    let export = work.path().join("export");
    let settings = Settings { export_dir: Some(export.clone()),
                              ..Settings::default() };

    // La segunda llega al mismo destino por el fallback de settings.
    let requests = vec![request(json!({"serving_type": "onnx", "model_path": onnx,
                                       "export_path": export, "version": 3})),
                        request(json!({"serving_type": "onnx", "model_path": torch, "version": "3"})),
                        request(json!({"serving_type": "onnx", "model_path": torch, "version": "4"}))];
    let results = compile_batch(&registry, &settings, &requests, &CancellationToken::new());

    let first = results[0].as_ref().unwrap();
    assert_eq!(first.exported.version_dir, export.join("3"));
    assert!(matches!(&results[1], Err(AppError::Request(m)) if m.contains("earlier request")));
    assert_eq!(results[1].as_ref().unwrap_err().exit_code(), 2);
    assert!(results[2].is_ok());
    assert_eq!(fs::read_dir(export.join("3")).unwrap().count(), 1);
    let body = fs::read_to_string(export.join("3").join("model.onnx")).unwrap();
    assert!(body.contains("onnx_file_to_onnx"));
}

#[test]
fn export_root_falls_back_to_settings_and_refuses_to_overwrite() {
    let registry = default_registry().unwrap();
    let work = tempfile::tempdir().unwrap();
    let model = work.path().join("m.onnx");
    fs::write(&model, b"onnx").unwrap();
    let settings = Settings { export_dir: Some(work.path().join("exports")),
                              ..Settings::default() };

    let req = request(json!({"serving_type": "onnx", "model_path": model}));
    let first = compile_request(&registry, &settings, &req).unwrap();
    assert_eq!(first.exported.version_dir, work.path().join("exports").join("1"));

    let err = compile_request(&registry, &settings, &req).unwrap_err();
    assert!(matches!(err, AppError::Io(ref e) if e.kind() == std::io::ErrorKind::AlreadyExists));
    assert_eq!(err.exit_code(), 8);
}
