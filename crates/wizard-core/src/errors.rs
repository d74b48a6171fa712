//! Errores del wizard.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::ValidationErrors;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum WizardError {
    /// Input inválido para el step actual (recuperable: se re-renderiza el step).
    #[error("validation failed for fields: {}", .0.field_names().join(", "))]
    Validation(ValidationErrors),
    /// Wizard mal configurado (sin steps, ids duplicados, todos inactivos).
    #[error("configuration error: {0}")]
    Configuration(String),
    /// No hay condición registrada con ese nombre.
    #[error("no condition registered under name '{0}'")]
    ConditionLookup(String),
    #[error("wizard not started")]
    NotStarted,
    #[error("wizard already finished")]
    Finished,
    /// Operación pedida mientras el handler de finalización está en curso.
    #[error("finish already in progress")]
    FinishInProgress,
    #[error("steps not completed: {}", .0.join(", "))]
    IncompleteSteps(Vec<String>),
    #[error("step '{0}' cannot be navigated to")]
    NavigationDenied(String),
    #[error("unknown step '{0}'")]
    UnknownStep(String),
    #[error("completion handler failed: {0}")]
    Completion(String),
    #[error("session error: {0}")]
    Session(String),
}

impl WizardError {
    /// Errores que el host debería mostrar como página de error y no como
    /// mensajes de campo.
    pub fn is_fatal(&self) -> bool {
        !matches!(self,
                  WizardError::Validation(_)
                  | WizardError::NavigationDenied(_)
                  | WizardError::IncompleteSteps(_)
                  | WizardError::FinishInProgress)
    }
}
