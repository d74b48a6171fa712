use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::WizardError;

use super::{ConditionContext, ConditionEvaluator, StepCondition};

/// Tabla explícita nombre -> condición.
#[derive(Clone, Default)]
pub struct ConditionRegistry {
    entries: HashMap<String, Arc<dyn StepCondition>>,
}

impl ConditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra (o reemplaza) la condición `name` a partir de un closure.
    pub fn register<F>(&mut self, name: impl Into<String>, condition: F)
        where F: Fn(&ConditionContext<'_>) -> bool + Send + Sync + 'static
    {
        self.entries.insert(name.into(), Arc::new(condition));
    }

    /// Registra un tipo que implementa `StepCondition`.
    pub fn register_condition(&mut self, name: impl Into<String>, condition: impl StepCondition + 'static) {
        self.entries.insert(name.into(), Arc::new(condition));
    }

    /// Variante encadenable de `register`.
    pub fn with<F>(mut self, name: impl Into<String>, condition: F) -> Self
        where F: Fn(&ConditionContext<'_>) -> bool + Send + Sync + 'static
    {
        self.register(name, condition);
        self
    }

    /// Variante encadenable de `register_condition`.
    pub fn with_condition(mut self, name: impl Into<String>, condition: impl StepCondition + 'static) -> Self {
        self.register_condition(name, condition);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionRegistry").field("names", &self.names()).finish()
    }
}

impl ConditionEvaluator for ConditionRegistry {
    fn resolve(&self, name: &str, ctx: &ConditionContext<'_>) -> Result<bool, WizardError> {
        let condition = self.entries
                            .get(name)
                            .ok_or_else(|| WizardError::ConditionLookup(name.to_string()))?;
        Ok(condition.validate(ctx))
    }
}
