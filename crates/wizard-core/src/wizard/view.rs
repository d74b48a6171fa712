//! Vistas de sólo lectura para que el host renderice la navegación.

use serde::{Deserialize, Serialize};

use crate::step::StepState;

/// Resumen de un step activo para la lista de navegación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummary {
    pub id: String,
    pub label: String,
    /// Posición en la lista de steps activos.
    pub position: usize,
    pub state: StepState,
    /// Se puede saltar a él con `jump`.
    pub can_jump: bool,
}
