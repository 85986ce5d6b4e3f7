//! Errores de la aplicación (binario y API de peticiones).

pub mod app_error;

pub use app_error::AppError;
