//! Constantes del compilador core.
//!
//! Estos valores participan en el fingerprint de los `ConversionPath` y en
//! el nombre de los recursos temporales que crea el executor. Cambiar
//! `COMPILER_VERSION` invalida los fingerprints calculados previamente.

/// Versión lógica del core. Se incluye en `ConversionPath::fingerprint` para
/// que un cambio incompatible del motor produzca fingerprints distintos aunque
/// el grafo registrado no cambie.
pub const COMPILER_VERSION: &str = "MC1.0";

/// Prefijo de los directorios temporales (scratch y output) de cada step.
pub const TEMP_PREFIX: &str = "model-compiler-";

/// Nombre de la sección que agrupa overrides por tipo de configuración
/// dentro de la configuración de usuario.
pub const CONFIG_SECTIONS_KEY: &str = "configs";
