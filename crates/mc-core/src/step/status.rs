/// Estado de un step dentro de una ejecución.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Running`
/// - `Running` -> `FinishedOk`
/// - `Running` -> `Failed`
///
/// No se permiten reversiones o saltos arbitrarios entre estados.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// El paso está pendiente de ejecución.
    Pending,
    /// El paso está en ejecución.
    Running,
    /// El paso finalizó correctamente.
    FinishedOk,
    /// El paso falló.
    Failed,
}

/// Estado de una ejecución completa del pipeline.
///
/// `Pending -> Running(i) -> Succeeded` o `Running(i) -> Failed(i)`.
/// La cancelación sólo ocurre entre steps: `Pending | Running(i) -> Cancelled(j)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running(usize),
    Succeeded,
    Failed(usize),
    Cancelled(usize),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed(_) | RunState::Cancelled(_))
    }

    /// Comprueba si `next` es una transición válida desde `self`.
    pub fn can_advance_to(&self, next: RunState) -> bool {
        match (*self, next) {
            (RunState::Pending, RunState::Running(0)) => true,
            (RunState::Pending, RunState::Succeeded) => true,
            (RunState::Pending, RunState::Cancelled(0)) => true,
            (RunState::Running(i), RunState::Running(j)) => j == i + 1,
            (RunState::Running(_), RunState::Succeeded) => true,
            (RunState::Running(i), RunState::Failed(j)) => i == j,
            (RunState::Running(i), RunState::Cancelled(j)) => j == i + 1,
            _ => false,
        }
    }
}
