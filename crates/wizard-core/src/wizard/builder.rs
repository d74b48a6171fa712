//! Builder para `Wizard`.
//!
//! El store de sesión y el evaluador de condiciones son obligatorios (se
//! inyectan al crear el builder); el resto tiene defaults razonables:
//! `WizardConfig::default()`, contexto `{}` y sin handler de finalización.
//!
//! ```ignore
//! let mut wizard = Wizard::builder(definition, &mut session, registry)
//!     .context(json!({"title": "draft"}))
//!     .on_finish(|result: &WizardResult| { save(result); Ok(()) })
//!     .build();
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::condition::ConditionEvaluator;
use crate::config::WizardConfig;
use crate::errors::WizardError;
use crate::session::SessionStore;

use super::result::{CompletionHandler, WizardResult};
use super::{Wizard, WizardDefinition};

pub struct WizardBuilder<S: SessionStore, C: ConditionEvaluator> {
    pub(crate) definition: Arc<WizardDefinition>,
    pub(crate) store: S,
    pub(crate) conditions: C,
    pub(crate) config: WizardConfig,
    pub(crate) context: Value,
    pub(crate) context_key: Option<String>,
    pub(crate) on_finish: Option<Box<dyn CompletionHandler + Send>>,
}

impl<S: SessionStore, C: ConditionEvaluator> WizardBuilder<S, C> {
    pub fn config(mut self, config: WizardConfig) -> Self {
        self.config = config;
        self
    }

    /// Objeto de contenido del host (fuente de `load`, destino de `apply`).
    pub fn context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Sufijo para la clave de sesión, p.ej. la ruta del objeto editado,
    /// de modo que dos wizards iguales sobre objetos distintos no compartan
    /// datos.
    pub fn context_key(mut self, key: impl Into<String>) -> Self {
        self.context_key = Some(key.into());
        self
    }

    pub fn on_finish<F>(mut self, handler: F) -> Self
        where F: FnMut(&WizardResult) -> Result<(), WizardError> + Send + 'static
    {
        self.on_finish = Some(Box::new(handler));
        self
    }

    pub fn completion_handler(mut self, handler: impl CompletionHandler + Send + 'static) -> Self {
        self.on_finish = Some(Box::new(handler));
        self
    }

    pub fn build(self) -> Wizard<S, C> {
        let mut session_key = format!("{}.{}", self.config.session_key_prefix, self.definition.name);
        if let Some(key) = &self.context_key {
            session_key.push('.');
            session_key.push_str(key);
        }
        Wizard::from_parts(self, session_key)
    }
}
