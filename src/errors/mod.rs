//! Errores de la aplicación de demo.
pub mod script_error;

pub use script_error::ScriptError;
