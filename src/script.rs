//! Ejecución de scripts de requests contra un wizard.
//!
//! Cada request del script es un formulario enviado (objeto JSON con los
//! campos y el botón pulsado). Por cada uno se construye un `Wizard` nuevo
//! sobre el mismo store de sesión, igual que haría un servidor web entre
//! requests.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wizard_core::field::FieldError;
use wizard_core::{form_data, ConditionEvaluator, FormData, InMemorySessionStore, Transition, Wizard, WizardConfig,
                  WizardDefinition, WizardError};

use crate::errors::ScriptError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Objeto del host (prefill y destino de `apply`).
    #[serde(default = "empty_object")]
    pub context: Value,
    #[serde(default)]
    pub context_key: Option<String>,
    pub requests: Vec<Value>,
}

fn empty_object() -> Value {
    json!({})
}

impl Script {
    pub fn new(requests: Vec<Value>) -> Self {
        Self { context: empty_object(),
               context_key: None,
               requests }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Acepta un objeto `Script` o directamente un array de requests.
    pub fn from_json(raw: &str) -> Result<Self, ScriptError> {
        let value: Value = serde_json::from_str(raw)?;
        match value {
            Value::Array(requests) => Ok(Self::new(requests)),
            other => Ok(serde_json::from_value(other)?),
        }
    }
}

/// Qué pasó con un request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Moved { from: String, to: String },
    Stayed { step: String },
    Invalid { step: String, errors: Vec<FieldError> },
    Denied { message: String },
    Finished { data: FormData, context: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestReport {
    pub index: usize,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Ejecuta el script y devuelve un reporte por request. Los errores de
/// navegación recuperables quedan en el reporte; los fatales cortan la
/// ejecución.
pub fn run_script<C: ConditionEvaluator>(script: &Script,
                                         definition: &Arc<WizardDefinition>,
                                         conditions: &C,
                                         config: &WizardConfig)
                                         -> Result<Vec<RequestReport>, ScriptError> {
    let mut store = InMemorySessionStore::new();
    let mut reports = Vec::with_capacity(script.requests.len());

    for (index, request) in script.requests.iter().enumerate() {
        if !request.is_object() {
            return Err(ScriptError::BadRequest { index });
        }
        let form = form_data(request.clone());

        let mut builder = Wizard::builder(Arc::clone(definition), &mut store, conditions).config(config.clone())
                                                                                         .context(script.context
                                                                                                        .clone());
        if let Some(key) = &script.context_key {
            builder = builder.context_key(key.clone());
        }
        let mut wizard = builder.build();

        let outcome = match wizard.handle(&form) {
            Ok(Transition::Moved { from, to }) => Outcome::Moved { from, to },
            Ok(Transition::Stayed { step_id }) => Outcome::Stayed { step: step_id },
            Ok(Transition::Finished(result)) => Outcome::Finished { data: result.data,
                                                                    context: result.context },
            Err(WizardError::Validation(errors)) => {
                let step = wizard.current_step().map(|s| s.id().to_string()).unwrap_or_default();
                Outcome::Invalid { step,
                                   errors: errors.errors }
            }
            Err(e) if !e.is_fatal() => Outcome::Denied { message: e.to_string() },
            Err(e) => return Err(e.into()),
        };
        info!("request {index}: {outcome:?}");
        reports.push(RequestReport { index, outcome });
    }
    Ok(reports)
}
