use thiserror::Error;
use wizard_core::WizardError;

/// Errores al cargar o ejecutar un script de requests.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Script inválido: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Request {index} no es un objeto JSON")]
    BadRequest { index: usize },
    #[error("Error del wizard: {0}")]
    Wizard(#[from] WizardError),
}
