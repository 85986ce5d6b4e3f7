//! Configuración del proceso leída del entorno.
//! Carga `.env` una sola vez y expone `Settings` (raíz de temporales, filtro
//! de logs y raíz de exportación por defecto).

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

pub const SCRATCH_DIR_VAR: &str = "MODEL_COMPILER_SCRATCH_DIR";
pub const LOG_VAR: &str = "MODEL_COMPILER_LOG";
pub const EXPORT_DIR_VAR: &str = "MODEL_COMPILER_EXPORT_DIR";

/// Prefijo de las variables que aportan campos de configuración de steps
/// (`MODEL_COMPILER_CFG_MAX_BATCH_SIZE=4`).
pub const CONFIG_ENV_PREFIX: &str = "MODEL_COMPILER_CFG_";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Raíz de los directorios temporales de los steps; `None` usa el
    /// directorio temporal del sistema.
    pub scratch_dir: Option<PathBuf>,
    pub log_filter: String,
    /// Raíz de exportación cuando la petición no trae `export_path`.
    pub export_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self { scratch_dir: None,
               log_filter: "info".to_string(),
               export_dir: None }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Construye los settings con una función de búsqueda arbitraria.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        Self { scratch_dir: non_empty(SCRATCH_DIR_VAR).map(PathBuf::from),
               log_filter: non_empty(LOG_VAR).unwrap_or_else(|| "info".to_string()),
               export_dir: non_empty(EXPORT_DIR_VAR).map(PathBuf::from) }
    }
}

/// Forzar carga temprana de .env desde el binario.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_nothing_is_set() {
        let s = Settings::from_lookup(|_| None);
        assert_eq!(s, Settings::default());
        assert_eq!(s.log_filter, "info");
    }

    #[test]
    fn reads_every_variable_and_ignores_blank_values() {
        let vars: HashMap<&str, &str> = [(SCRATCH_DIR_VAR, "/tmp/mc"),
                                         (LOG_VAR, "debug,mc_core=trace"),
                                         (EXPORT_DIR_VAR, "  ")].into_iter()
                                                                .collect();
        let s = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(s.scratch_dir, Some(PathBuf::from("/tmp/mc")));
        assert_eq!(s.log_filter, "debug,mc_core=trace");
        assert_eq!(s.export_dir, None);
    }
}
