//! Configuración del wizard.
//! `WizardConfig::default()` es lo que usa la librería si el host no pasa
//! nada; `from_env` lee variables de entorno (cargando `.env` una sola vez).

use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::constants::DEFAULT_SESSION_PREFIX;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    /// Prefijo de la clave bajo la que se guarda la sesión del wizard.
    pub session_key_prefix: String,
    /// Al reanudar, volver al step en el que quedó el usuario.
    pub restore_position: bool,
    /// Descartar sesiones creadas por una definición distinta (otro
    /// `definition_hash`).
    pub reset_on_definition_change: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self { session_key_prefix: DEFAULT_SESSION_PREFIX.to_string(),
               restore_position: true,
               reset_on_definition_change: true }
    }
}

impl WizardConfig {
    /// Variables: `WIZARD_SESSION_PREFIX`, `WIZARD_RESTORE_POSITION`,
    /// `WIZARD_RESET_ON_DEFINITION_CHANGE`. Valores ausentes o ilegibles
    /// caen al default.
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let defaults = Self::default();
        let session_key_prefix = env::var("WIZARD_SESSION_PREFIX").ok()
                                                                   .filter(|v| !v.trim().is_empty())
                                                                   .unwrap_or(defaults.session_key_prefix);
        let restore_position = env_flag("WIZARD_RESTORE_POSITION").unwrap_or(defaults.restore_position);
        let reset_on_definition_change =
            env_flag("WIZARD_RESET_ON_DEFINITION_CHANGE").unwrap_or(defaults.reset_on_definition_change);
        Self { session_key_prefix,
               restore_position,
               reset_on_definition_change }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| parse_flag(&v))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
