//! Constantes del wizard.
//!
//! Los nombres de botones siguen la convención de formularios del host
//! (`form.buttons.<accion>`), de modo que un formulario HTML existente puede
//! enviar sus acciones sin traducción.

/// Versión del formato serializado de `WizardSession`. Forma parte del
/// `definition_hash`, así que subirla invalida las sesiones guardadas.
pub const SESSION_SCHEMA_VERSION: u32 = 1;

/// Prefijo por defecto de la clave de sesión.
pub const DEFAULT_SESSION_PREFIX: &str = "formwizard";

pub const BUTTON_CONTINUE: &str = "form.buttons.continue";
pub const BUTTON_BACK: &str = "form.buttons.back";
pub const BUTTON_FINISH: &str = "form.buttons.finish";
pub const BUTTON_CLEAR: &str = "form.buttons.clear";

/// Parámetro del request con el id del step al que se quiere saltar.
pub const JUMP_PARAM: &str = "wizard.step";
