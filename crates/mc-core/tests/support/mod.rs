//! Steps falsos que registran lo que hacen, para tests de integración.
#![allow(dead_code)]

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use mc_core::{Artifact, ConfigSchema, FieldKind, Payload, RepresentationType, Resource, StepContext, StepError,
              TransformationStep};
use serde_json::{json, Value};

/// Bitácora compartida entre steps y recursos falsos.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

/// Recurso que anota su liberación en el journal.
#[derive(Debug)]
pub struct TrackedResource {
    label: String,
    journal: Journal,
    released: bool,
}

impl TrackedResource {
    pub fn new(label: impl Into<String>, journal: &Journal) -> Self {
        let label = label.into();
        journal.push(format!("acquire:{label}"));
        Self { label,
               journal: journal.clone(),
               released: false }
    }
}

impl Resource for TrackedResource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn release(mut self: Box<Self>) -> io::Result<()> {
        self.released = true;
        self.journal.push(format!("release:{}", self.label));
        Ok(())
    }
}

impl Drop for TrackedResource {
    fn drop(&mut self) {
        if !self.released {
            self.journal.push(format!("drop:{}", self.label));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    /// Devuelve un artifact de un tipo distinto al declarado.
    WrongKind,
}

/// Step falso configurable.
///
/// Al ejecutarse anota `run:<id>` y la config recibida, adquiere dos
/// recursos (`<id>#a`, `<id>#b`), crea un scratch dir y un output dir, y
/// devuelve un artifact JSON con el rastro de steps recorridos.
#[derive(Debug, Clone)]
pub struct FakeStep {
    pub id: &'static str,
    pub from: RepresentationType,
    pub to: RepresentationType,
    pub schema: ConfigSchema,
    pub behavior: Behavior,
    pub journal: Journal,
    pub seen_configs: Arc<Mutex<Vec<Value>>>,
    pub dirs: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
}

impl FakeStep {
    pub fn new(id: &'static str, from: RepresentationType, to: RepresentationType, journal: &Journal) -> Self {
        Self { id,
               from,
               to,
               schema: ConfigSchema::new(id),
               behavior: Behavior::Succeed,
               journal: journal.clone(),
               seen_configs: Arc::default(),
               dirs: Arc::default() }
    }

    pub fn with_schema(mut self, schema: ConfigSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn behaving(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn configs(&self) -> Vec<Value> {
        self.seen_configs.lock().unwrap().clone()
    }

    /// (scratch, output) de cada invocación.
    pub fn dirs(&self) -> Vec<(PathBuf, PathBuf)> {
        self.dirs.lock().unwrap().clone()
    }
}

impl TransformationStep for FakeStep {
    fn id(&self) -> &str {
        self.id
    }

    fn source_type(&self) -> RepresentationType {
        self.from
    }

    fn target_type(&self) -> RepresentationType {
        self.to
    }

    fn config_schema(&self) -> ConfigSchema {
        self.schema.clone()
    }

    fn compile(&self, input: &Artifact, config: &Value, ctx: &mut StepContext) -> Result<Artifact, StepError> {
        self.journal.push(format!("run:{}", self.id));
        self.seen_configs.lock().unwrap().push(config.clone());

        let scratch = ctx.scratch_dir()?.to_path_buf();
        std::fs::write(scratch.join("work.tmp"), b"scratch")?;
        let out_dir = ctx.output_dir()?;
        std::fs::write(out_dir.join("model.out"), self.id.as_bytes())?;
        self.dirs.lock().unwrap().push((scratch, out_dir.clone()));

        ctx.track(Box::new(TrackedResource::new(format!("{}#a", self.id), &self.journal)));
        ctx.track(Box::new(TrackedResource::new(format!("{}#b", self.id), &self.journal)));

        let mut trail = match &input.payload {
            Payload::Json(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        trail.push(json!(self.id));

        match self.behavior {
            Behavior::Succeed => Ok(Artifact::new(self.to, Payload::Json(Value::Array(trail)))),
            Behavior::WrongKind => Ok(Artifact::new(self.from, Payload::Json(Value::Array(trail)))),
            Behavior::Fail => Err(StepError::Tool(format!("{} exploded", self.id))),
        }
    }
}

/// Esquema con un campo entero con default, útil en varios tests.
pub fn batch_schema(name: &str) -> ConfigSchema {
    ConfigSchema::new(name).with_default("max_batch_size", FieldKind::Integer, json!(1))
}

pub fn json_input(kind: RepresentationType) -> Artifact {
    Artifact::new(kind, Payload::Json(json!([])))
}
