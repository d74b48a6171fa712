//! Definición inmutable de un wizard: nombre, steps en orden estático y
//! `definition_hash`.
//!
//! La definición se comparte (`Arc`) entre todas las instancias del wizard;
//! ninguna operación de navegación la modifica.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde_json::json;

use crate::constants::SESSION_SCHEMA_VERSION;
use crate::errors::WizardError;
use crate::hashing::hash_value;
use crate::step::StepDefinition;

pub struct WizardDefinition {
    pub name: String,
    pub steps: Vec<Arc<dyn StepDefinition>>,
    pub definition_hash: String,
}

impl WizardDefinition {
    pub fn builder(name: impl Into<String>) -> WizardDefinitionBuilder {
        WizardDefinitionBuilder { name: name.into(),
                                  steps: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Índice estático del step `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id() == id)
    }

    pub fn step(&self, id: &str) -> Option<&dyn StepDefinition> {
        self.steps.iter().find(|s| s.id() == id).map(|s| s.as_ref())
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id()).collect()
    }
}

impl fmt::Debug for WizardDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardDefinition")
         .field("name", &self.name)
         .field("steps", &self.step_ids())
         .field("definition_hash", &self.definition_hash)
         .finish()
    }
}

pub struct WizardDefinitionBuilder {
    name: String,
    steps: Vec<Arc<dyn StepDefinition>>,
}

impl WizardDefinitionBuilder {
    pub fn step(mut self, step: impl StepDefinition + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn build(self) -> Result<WizardDefinition, WizardError> {
        build_wizard_definition(self.name, self.steps)
    }
}

/// Valida y construye la definición. Rechaza wizards sin steps y ids
/// duplicados.
pub fn build_wizard_definition(name: impl Into<String>,
                               steps: Vec<Arc<dyn StepDefinition>>)
                               -> Result<WizardDefinition, WizardError> {
    let name = name.into();
    if steps.is_empty() {
        return Err(WizardError::Configuration(format!("wizard '{name}' has no steps")));
    }
    let mut seen = HashSet::new();
    for step in &steps {
        if !seen.insert(step.id()) {
            return Err(WizardError::Configuration(format!("duplicate step id '{}' in wizard '{name}'", step.id())));
        }
    }
    let definition_hash = definition_hash(&name, &steps);
    Ok(WizardDefinition { name,
                          steps,
                          definition_hash })
}

fn definition_hash(name: &str, steps: &[Arc<dyn StepDefinition>]) -> String {
    let steps_json: Vec<serde_json::Value> = steps.iter()
                                                  .map(|s| {
                                                      json!({
                                                          "id": s.id(),
                                                          "fields": s.fields().iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
                                                          "condition": s.condition(),
                                                      })
                                                  })
                                                  .collect();
    hash_value(&json!({
        "schema_version": SESSION_SCHEMA_VERSION,
        "name": name,
        "steps": steps_json,
    }))
}
