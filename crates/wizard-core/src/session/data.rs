use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::field::FormData;

/// Datos acumulados de un recorrido del wizard.
///
/// Invariante: `steps` sólo contiene datos que pasaron la validación de su
/// step. Los datos de steps que luego quedan inactivos se conservan aquí,
/// pero no entran en el agregado final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSession {
    pub traversal_id: Uuid,
    /// `definition_hash` de la definición que creó la sesión.
    pub definition_hash: String,
    /// Datos por step (id -> campos), en orden de primer envío.
    pub steps: IndexMap<String, FormData>,
    /// Steps enviados con datos válidos al menos una vez.
    pub completed: BTreeSet<String>,
    /// Step que se mostraba en el último request.
    pub current_step: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(definition_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self { traversal_id: Uuid::new_v4(),
               definition_hash: definition_hash.into(),
               steps: IndexMap::new(),
               completed: BTreeSet::new(),
               current_step: None,
               started_at: now,
               updated_at: now }
    }

    /// Sin datos de ningún step.
    pub fn is_empty(&self) -> bool {
        self.steps.values().all(|d| d.is_empty())
    }

    pub fn step_data(&self, step_id: &str) -> Option<&FormData> {
        self.steps.get(step_id)
    }

    /// Valor de un campo en un step concreto.
    pub fn value(&self, step_id: &str, field: &str) -> Option<&Value> {
        self.steps.get(step_id).and_then(|d| d.get(field))
    }

    /// Primer valor encontrado para `field` en cualquier step.
    pub fn field(&self, field: &str) -> Option<&Value> {
        self.steps.values().find_map(|d| d.get(field))
    }

    pub fn is_completed(&self, step_id: &str) -> bool {
        self.completed.contains(step_id)
    }

    /// Guarda los datos validados de un step (reemplazan por completo a los
    /// anteriores de ese step) y lo marca como completado.
    pub fn record_step(&mut self, step_id: &str, data: FormData) {
        self.steps.insert(step_id.to_string(), data);
        self.completed.insert(step_id.to_string());
        self.touch();
    }

    /// Datos iniciales (p.ej. cargados del contexto); no marcan el step como
    /// completado.
    pub fn prefill_step(&mut self, step_id: &str, data: FormData) {
        if data.is_empty() {
            return;
        }
        self.steps.entry(step_id.to_string()).or_default().extend(data);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
