use serde_json::Value;

use crate::field::{validate_fields, FieldSpec, FormData, ValidationErrors};

/// Trait que define un Step. Las implementaciones son inmutables y se
/// comparten entre todas las instancias de un mismo wizard.
pub trait StepDefinition: Send + Sync {
    /// Identificador estable y único dentro del wizard (prefijo del form).
    fn id(&self) -> &str;

    /// Nombre opcional amigable.
    fn label(&self) -> &str {
        self.id()
    }

    fn description(&self) -> Option<&str> {
        None
    }

    /// Campos propios del step, en orden.
    fn fields(&self) -> &[FieldSpec];

    /// Nombre de la condición que activa el step. `None` = siempre activo.
    fn condition(&self) -> Option<&str> {
        None
    }

    /// Valida el input enviado y devuelve sólo los datos de los campos propios.
    fn validate(&self, input: &FormData) -> Result<FormData, ValidationErrors> {
        validate_fields(self.fields(), input)
    }

    /// Valores iniciales extraídos del contexto del host (modo edición).
    /// Por defecto toma las claves homónimas de un objeto JSON.
    fn load(&self, context: &Value) -> FormData {
        let mut out = FormData::new();
        if let Value::Object(map) = context {
            for field in self.fields() {
                if let Some(v) = map.get(&field.name) {
                    out.insert(field.name.clone(), v.clone());
                }
            }
        }
        out
    }

    /// Escribe los datos del step sobre el contexto al finalizar. Por defecto
    /// asigna las claves homónimas si el contexto es un objeto JSON.
    fn apply(&self, context: &mut Value, data: &FormData) {
        if let Value::Object(map) = context {
            for (k, v) in data {
                map.insert(k.clone(), v.clone());
            }
        }
    }
}
