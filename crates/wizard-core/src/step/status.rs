use serde::{Deserialize, Serialize};

/// Estado de un step activo desde el punto de vista de la navegación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
    /// Aún no se ha enviado con datos válidos.
    Pending,
    /// Es el step que se está mostrando.
    Current,
    /// Sus datos ya están validados en la sesión.
    Completed,
}
