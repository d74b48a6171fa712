//! Tipos de evento del wizard y estructura `WizardEvent`.
//!
//! Cada transición del `Wizard` deja un evento en su `EventLog`. No
//! participan en la lógica de navegación: sirven para observar qué pasó en
//! un request (logs, tests, auditoría del host).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WizardEventKind {
    /// El wizard se posicionó en su primer step del request. `resumed` indica
    /// que la sesión ya existía.
    Started { traversal_id: Uuid, step_id: String, resumed: bool },
    /// La lista de steps activos cambió respecto al cálculo anterior.
    ActiveStepsChanged { active: Vec<String> },
    /// Datos válidos de un step guardados en la sesión.
    StepSubmitted { step_id: String },
    /// Submit rechazado por validación; `fields` son los campos con error.
    StepRejected { step_id: String, fields: Vec<String> },
    Moved { from: String, to: String },
    /// Cierre: el handler aceptó el agregado y la sesión fue eliminada.
    Finished { traversal_id: Uuid, field_count: usize },
    /// Recorrido abandonado explícitamente.
    Cleared { traversal_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardEvent {
    pub seq: u64, // orden de append dentro del log
    pub kind: WizardEventKind,
    pub ts: DateTime<Utc>,
}
