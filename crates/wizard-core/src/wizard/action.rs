//! Acciones externas del wizard, tal como llegan en un submit.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{BUTTON_BACK, BUTTON_CLEAR, BUTTON_CONTINUE, BUTTON_FINISH, JUMP_PARAM};
use crate::field::FormData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardAction {
    Continue,
    Back,
    Finish,
    Clear,
    /// Salto directo a un step (navegación por la lista de steps).
    Jump(String),
}

impl WizardAction {
    pub fn from_button(name: &str) -> Option<Self> {
        match name {
            BUTTON_CONTINUE => Some(Self::Continue),
            BUTTON_BACK => Some(Self::Back),
            BUTTON_FINISH => Some(Self::Finish),
            BUTTON_CLEAR => Some(Self::Clear),
            _ => None,
        }
    }

    /// Detecta la acción de un formulario enviado. Si llegan varios botones
    /// gana el más conservador: clear, back, finish, continue. El salto sólo
    /// se considera sin botones.
    pub fn from_form(form: &FormData) -> Option<Self> {
        for button in [BUTTON_CLEAR, BUTTON_BACK, BUTTON_FINISH, BUTTON_CONTINUE] {
            if form.contains_key(button) {
                return Self::from_button(button);
            }
        }
        match form.get(JUMP_PARAM) {
            Some(Value::String(id)) if !id.trim().is_empty() => Some(Self::Jump(id.trim().to_string())),
            _ => None,
        }
    }

    pub fn button_name(&self) -> Option<&'static str> {
        match self {
            Self::Continue => Some(BUTTON_CONTINUE),
            Self::Back => Some(BUTTON_BACK),
            Self::Finish => Some(BUTTON_FINISH),
            Self::Clear => Some(BUTTON_CLEAR),
            Self::Jump(_) => None,
        }
    }
}
