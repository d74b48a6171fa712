//! Campos de formulario y su validación.
//!
//! El host normalmente aporta el sistema de campos; aquí sólo existe lo que el
//! wizard necesita para decidir si un step puede avanzar: un descriptor
//! (`FieldSpec`), los datos enviados (`FormData`) y la conversión campo a
//! campo que produce `FieldError`s.
//!
//! Los valores llegan como `serde_json::Value` (normalmente strings, tal como
//! los envía un formulario HTML) y se convierten al tipo del campo.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Datos de formulario: nombre de campo -> valor. Conserva el orden de los
/// campos tal como fueron declarados/enviados.
pub type FormData = IndexMap<String, Value>;

pub const MSG_REQUIRED: &str = "Required input is missing.";
pub const MSG_CONSTRAINT: &str = "Constraint not satisfied";
pub const MSG_TOO_LONG: &str = "Value is too long";
pub const MSG_NOT_INTEGER: &str = "The entered value is not a valid integer literal.";
pub const MSG_NOT_BOOLEAN: &str = "The entered value is not a valid boolean.";
pub const MSG_WRONG_TYPE: &str = "Object is of wrong type.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Texto de una sola línea.
    TextLine,
    /// Texto libre (admite saltos de línea).
    Text,
    Integer,
    Boolean,
    /// Uno de los valores listados.
    Choice(Vec<String>),
}

/// Descriptor de un campo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub title: String,
    pub kind: FieldKind,
    pub required: bool,
    pub max_length: Option<usize>,
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, title: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(),
               title: title.into(),
               kind,
               required: true,
               max_length: None,
               default: None }
    }

    pub fn text_line(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(name, title, FieldKind::TextLine)
    }

    pub fn text(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(name, title, FieldKind::Text)
    }

    pub fn integer(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(name, title, FieldKind::Integer)
    }

    pub fn boolean(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(name, title, FieldKind::Boolean)
    }

    pub fn choice<I, S>(name: impl Into<String>, title: impl Into<String>, options: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self::new(name, title, FieldKind::Choice(options.into_iter().map(Into::into).collect()))
    }

    /// Marca el campo como opcional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Valor usado cuando un campo opcional llega vacío.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Convierte el valor enviado al tipo del campo.
    ///
    /// `Ok(None)` significa que el campo es opcional, llegó vacío y no tiene
    /// default: no aporta nada a los datos del step.
    pub fn convert(&self, raw: Option<&Value>) -> Result<Option<Value>, String> {
        let raw = raw.filter(|v| !is_blank(v));
        let Some(raw) = raw else {
            if self.kind == FieldKind::Boolean {
                return Ok(Some(Value::Bool(false)));
            }
            if self.required {
                return Err(MSG_REQUIRED.to_string());
            }
            return Ok(self.default.clone());
        };

        match &self.kind {
            FieldKind::TextLine => {
                let s = raw.as_str().ok_or_else(|| MSG_WRONG_TYPE.to_string())?;
                if s.contains('\n') || s.contains('\r') {
                    return Err(MSG_CONSTRAINT.to_string());
                }
                self.check_length(s)?;
                Ok(Some(Value::String(s.to_string())))
            }
            FieldKind::Text => {
                let s = raw.as_str().ok_or_else(|| MSG_WRONG_TYPE.to_string())?;
                self.check_length(s)?;
                Ok(Some(Value::String(s.to_string())))
            }
            FieldKind::Integer => match raw {
                Value::Number(n) => n.as_i64()
                                     .map(|i| Some(Value::from(i)))
                                     .ok_or_else(|| MSG_NOT_INTEGER.to_string()),
                Value::String(s) => s.trim()
                                     .parse::<i64>()
                                     .map(|i| Some(Value::from(i)))
                                     .map_err(|_| MSG_NOT_INTEGER.to_string()),
                _ => Err(MSG_NOT_INTEGER.to_string()),
            },
            FieldKind::Boolean => match raw {
                Value::Bool(b) => Ok(Some(Value::Bool(*b))),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "on" | "true" | "1" | "yes" => Ok(Some(Value::Bool(true))),
                    "off" | "false" | "0" | "no" => Ok(Some(Value::Bool(false))),
                    _ => Err(MSG_NOT_BOOLEAN.to_string()),
                },
                _ => Err(MSG_NOT_BOOLEAN.to_string()),
            },
            FieldKind::Choice(options) => {
                let s = raw.as_str().ok_or_else(|| MSG_WRONG_TYPE.to_string())?;
                if options.iter().any(|o| o == s) {
                    Ok(Some(Value::String(s.to_string())))
                } else {
                    Err(MSG_CONSTRAINT.to_string())
                }
            }
        }
    }

    fn check_length(&self, s: &str) -> Result<(), String> {
        match self.max_length {
            Some(max) if s.chars().count() > max => Err(MSG_TOO_LONG.to_string()),
            _ => Ok(()),
        }
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Error de un campo concreto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Conjunto de errores de campo de un submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError { field: field.into(),
                                      message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Valida `input` contra `fields` y devuelve sólo los datos convertidos de
/// esos campos. Claves no declaradas se ignoran.
pub fn validate_fields(fields: &[FieldSpec], input: &FormData) -> Result<FormData, ValidationErrors> {
    let mut out = FormData::new();
    let mut errors = ValidationErrors::default();
    for field in fields {
        match field.convert(input.get(&field.name)) {
            Ok(Some(v)) => {
                out.insert(field.name.clone(), v);
            }
            Ok(None) => {}
            Err(msg) => errors.push(field.name.clone(), msg),
        }
    }
    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

/// Atajo para construir `FormData` desde un objeto JSON. Cualquier otro
/// valor produce un formulario vacío.
pub fn form_data(value: Value) -> FormData {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => FormData::new(),
    }
}
