//! Condiciones de activación de steps.
//!
//! Un step con `condition = Some(name)` sólo está activo si la condición
//! registrada bajo `name` devuelve `true`. La búsqueda pasa por un
//! `ConditionEvaluator` inyectado en el wizard; `ConditionRegistry` es la
//! implementación por tabla explícita nombre -> predicado.

mod registry;

pub use registry::ConditionRegistry;

use std::sync::Arc;

use serde_json::Value;

use crate::errors::WizardError;
use crate::session::WizardSession;

/// Lo que una condición puede observar al decidir.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    /// Objeto de contenido del host.
    pub context: &'a Value,
    /// Nombre del wizard que evalúa.
    pub wizard: &'a str,
    /// Step cuya activación se decide.
    pub step_id: &'a str,
    /// Steps anteriores a `step_id` que ya resultaron activos en esta
    /// evaluación, en orden estático.
    pub active_steps: &'a [&'a str],
    /// Datos acumulados hasta ahora.
    pub session: &'a WizardSession,
}

impl<'a> ConditionContext<'a> {
    /// Valor de `field` en el primer step activo anterior que lo tenga. Los
    /// datos de steps inactivos no cuentan.
    pub fn field(&self, field: &str) -> Option<&'a Value> {
        self.active_steps
            .iter()
            .find_map(|step_id| self.session.value(step_id, field))
    }

    /// Valor de `field` en `step_id`, sólo si ese step es un activo anterior.
    pub fn value(&self, step_id: &str, field: &str) -> Option<&'a Value> {
        if !self.active_steps.iter().any(|s| *s == step_id) {
            return None;
        }
        self.session.value(step_id, field)
    }

    /// Valor de `field` en cualquier step de la sesión, activo o no, incluidos
    /// steps posteriores y datos precargados.
    pub fn raw_field(&self, field: &str) -> Option<&'a Value> {
        self.session.field(field)
    }

    /// `true` si `field` contiene exactamente el string `expected`.
    pub fn field_equals(&self, field: &str, expected: &str) -> bool {
        self.field(field).and_then(Value::as_str) == Some(expected)
    }
}

/// Predicado de activación.
pub trait StepCondition: Send + Sync {
    fn validate(&self, ctx: &ConditionContext<'_>) -> bool;
}

impl<F> StepCondition for F where F: Fn(&ConditionContext<'_>) -> bool + Send + Sync
{
    fn validate(&self, ctx: &ConditionContext<'_>) -> bool {
        self(ctx)
    }
}

/// Resuelve una condición por nombre y la evalúa.
pub trait ConditionEvaluator {
    /// `Err(WizardError::ConditionLookup)` si no hay nada registrado con ese nombre.
    fn resolve(&self, name: &str, ctx: &ConditionContext<'_>) -> Result<bool, WizardError>;
}

impl<T: ConditionEvaluator + ?Sized> ConditionEvaluator for &T {
    fn resolve(&self, name: &str, ctx: &ConditionContext<'_>) -> Result<bool, WizardError> {
        (**self).resolve(name, ctx)
    }
}

impl<T: ConditionEvaluator + ?Sized> ConditionEvaluator for Arc<T> {
    fn resolve(&self, name: &str, ctx: &ConditionContext<'_>) -> Result<bool, WizardError> {
        (**self).resolve(name, ctx)
    }
}
