use std::path::PathBuf;
use std::process::exit;

use mc_core::{CancellationToken, Registry, RepresentationType, Resolver, StepStatus};
use model_compiler::config::{init_dotenv, Settings};
use model_compiler::request::split_assignment;
use model_compiler::{compile_batch, default_registry, AppError, CompileOutcome, RequestSources};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage:
  model-compiler compile --config <file> [--config <file>]... [--set key=value]...
  model-compiler targets <source_type>
  model-compiler steps";

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_target(true)
                             .with_writer(std::io::stderr)
                             .try_init()
                             .ok();
}

fn usage_error(msg: &str) -> ! {
    eprintln!("[model-compiler] {msg}\n{USAGE}");
    exit(1);
}

fn fail(err: AppError) -> ! {
    eprintln!("[model-compiler] error: {err}");
    exit(err.exit_code());
}

fn main() {
    init_dotenv();
    let settings = Settings::from_env();
    init_tracing(&settings);

    let registry = match default_registry() {
        Ok(r) => r,
        Err(e) => fail(e),
    };

    // CLI mínima: `compile`, `targets`, `steps`
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("compile") => run_compile(&registry, &settings, &args[2..]),
        Some("targets") => match args.get(2) {
            Some(raw) => run_targets(&registry, raw),
            None => usage_error("targets needs a source type"),
        },
        Some("steps") => run_steps(&registry),
        Some("-h") | Some("--help") => println!("{USAGE}"),
        Some(other) => usage_error(&format!("unknown command '{other}'")),
        None => usage_error("missing command"),
    }
}

fn run_compile(registry: &Registry, settings: &Settings, args: &[String]) {
    let mut configs: Vec<PathBuf> = Vec::new();
    let mut sets: Vec<String> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                match args.get(i) {
                    Some(v) => configs.push(PathBuf::from(v)),
                    None => usage_error("--config needs a file"),
                }
            }
            "--set" => {
                i += 1;
                match args.get(i) {
                    Some(v) => sets.push(v.clone()),
                    None => usage_error("--set needs key=value"),
                }
            }
            other => usage_error(&format!("unexpected argument '{other}'")),
        }
        i += 1;
    }
    if configs.is_empty() {
        usage_error("compile needs at least one --config");
    }

    let mut overrides = Vec::with_capacity(sets.len());
    for raw in &sets {
        match split_assignment(raw) {
            Ok(pair) => overrides.push(pair),
            Err(e) => fail(e),
        }
    }

    let known = registry.config_fields();
    let mut requests = Vec::with_capacity(configs.len());
    for file in &configs {
        let built = RequestSources::new().file(file)
                                         .map(|s| s.env().overrides(overrides.iter().copied()))
                                         .and_then(|s| s.build(&known));
        match built {
            Ok(req) => requests.push(req),
            Err(e) => fail(e),
        }
    }

    let results = compile_batch(registry, settings, &requests, &CancellationToken::new());
    let mut first_error: Option<AppError> = None;
    for (file, result) in configs.iter().zip(results) {
        match result {
            Ok(outcome) => print_outcome(file, &outcome),
            Err(e) => {
                eprintln!("[model-compiler] {}: {e}", file.display());
                first_error.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_error {
        exit(e.exit_code());
    }
}

fn print_outcome(file: &std::path::Path, outcome: &CompileOutcome) {
    println!("{}: run {} -> {}", file.display(), outcome.run_id, outcome.exported.version_dir.display());
    for (i, slot) in outcome.report.steps.iter().enumerate() {
        let status = match slot.status {
            StepStatus::FinishedOk => "ok",
            StepStatus::Failed => "failed",
            StepStatus::Running => "running",
            StepStatus::Pending => "pending",
        };
        println!("  [{i}] {} ({} -> {}) {status}", slot.step_id, slot.source_type, slot.target_type);
    }
    for f in &outcome.exported.files {
        println!("  {}", f.display());
    }
}

fn run_targets(registry: &Registry, raw: &str) {
    let source = match raw.parse::<RepresentationType>() {
        Ok(t) => t,
        Err(e) => fail(AppError::Request(e.to_string())),
    };
    let reachable = Resolver::new(registry).reachable_from(source);
    if reachable.is_empty() {
        println!("no targets reachable from {source}");
        return;
    }
    for r in reachable {
        match Resolver::new(registry).resolve(source, r.target) {
            Ok(path) => println!("{:<20} {} hop(s): {}", r.target.name(), r.hops, path.step_ids().join(" -> ")),
            Err(e) => fail(e.into()),
        }
    }
}

fn run_steps(registry: &Registry) {
    for step in registry.steps() {
        let schema = step.config_schema();
        let fields: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        println!("{:<28} {} -> {} [{}: {}]",
                 step.id(),
                 step.source_type(),
                 step.target_type(),
                 schema.name(),
                 fields.join(", "));
    }
}
