use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::WizardError;
use crate::field::FormData;

/// Agregado final entregado al handler de finalización.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardResult {
    pub traversal_id: Uuid,
    pub wizard: String,
    /// Todos los campos de los steps activos, en orden estático.
    pub data: FormData,
    /// Los mismos datos agrupados por step.
    pub by_step: IndexMap<String, FormData>,
    /// Copia del contexto del host con el `apply` de cada step activo.
    pub context: Value,
}

/// Recibe el agregado al finalizar. Un error deja el wizard en su último
/// step con la sesión intacta.
pub trait CompletionHandler {
    fn complete(&mut self, result: &WizardResult) -> Result<(), WizardError>;
}

impl<F> CompletionHandler for F where F: FnMut(&WizardResult) -> Result<(), WizardError>
{
    fn complete(&mut self, result: &WizardResult) -> Result<(), WizardError> {
        self(result)
    }
}

/// Resultado de una acción de navegación.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Moved { from: String, to: String },
    Stayed { step_id: String },
    Finished(WizardResult),
}

impl Transition {
    /// Step en el que queda el wizard (None tras finalizar).
    pub fn step_id(&self) -> Option<&str> {
        match self {
            Transition::Moved { to, .. } => Some(to),
            Transition::Stayed { step_id } => Some(step_id),
            Transition::Finished(_) => None,
        }
    }
}

/// Estados del wizard. `Done` es terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Idle,
    /// Posición dentro de la lista de steps activos.
    AtStep(usize),
    Finishing,
    Done,
}
