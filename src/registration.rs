//! Wizard de registro usado por el binario de demo.
//!
//! Cuatro steps: `account`, `profile`, `company` (sólo para cuentas de
//! empresa) y `confirm`. Muestra las tres formas de declarar un step: la
//! macro `wizard_step!`, el builder de `Step` y una implementación manual de
//! `StepDefinition` con validación propia.

use std::sync::Arc;

use serde_json::{json, Value};
use wizard_core::field::{validate_fields, ValidationErrors};
use wizard_core::{wizard_step, ConditionRegistry, FieldSpec, FormData, Step, StepDefinition, WizardDefinition,
                  WizardError};

pub const WIZARD_NAME: &str = "registration";
pub const IS_BUSINESS: &str = "is_business";
pub const MSG_MUST_AGREE: &str = "You must accept the terms.";

wizard_step!(AccountStep {
    id: "account",
    label: "Account",
    fields: [FieldSpec::text_line("email", "E-mail").max_length(120),
             FieldSpec::choice("account_type", "Account type", ["personal", "business"])]
});

fn profile_step() -> Step {
    Step::builder("profile").label("Profile")
                            .description("Tell us about yourself")
                            .field(FieldSpec::text_line("full_name", "Full name"))
                            .field(FieldSpec::integer("age", "Age").optional())
                            .field(FieldSpec::boolean("newsletter", "Newsletter"))
                            .build()
}

fn company_step() -> Step {
    Step::builder("company").label("Company")
                            .field(FieldSpec::text_line("company", "Company name"))
                            .field(FieldSpec::text_line("vat", "VAT number").optional().max_length(20))
                            .condition(IS_BUSINESS)
                            .build()
}

/// Último step: exige aceptar los términos.
pub struct ConfirmStep {
    fields: Vec<FieldSpec>,
}

impl ConfirmStep {
    pub fn new() -> Self {
        Self { fields: vec![FieldSpec::boolean("agree", "I accept the terms"),
                            FieldSpec::text("comments", "Comments").optional()] }
    }
}

impl Default for ConfirmStep {
    fn default() -> Self {
        Self::new()
    }
}

impl StepDefinition for ConfirmStep {
    fn id(&self) -> &str {
        "confirm"
    }

    fn label(&self) -> &str {
        "Confirm"
    }

    fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn validate(&self, input: &FormData) -> Result<FormData, ValidationErrors> {
        let data = validate_fields(&self.fields, input)?;
        if data.get("agree") != Some(&Value::Bool(true)) {
            let mut errors = ValidationErrors::default();
            errors.push("agree", MSG_MUST_AGREE);
            return Err(errors);
        }
        Ok(data)
    }

    // los comentarios no se copian al objeto del host
    fn apply(&self, context: &mut Value, data: &FormData) {
        if let (Value::Object(map), Some(agree)) = (context, data.get("agree")) {
            map.insert("agree".into(), agree.clone());
        }
    }
}

pub fn registration_definition() -> Result<WizardDefinition, WizardError> {
    WizardDefinition::builder(WIZARD_NAME).step(AccountStep::new())
                                          .step(profile_step())
                                          .step(company_step())
                                          .step(ConfirmStep::new())
                                          .build()
}

/// Condiciones del wizard de registro.
pub fn registration_conditions() -> ConditionRegistry {
    ConditionRegistry::new().with(IS_BUSINESS, |c| c.field_equals("account_type", "business"))
}

/// Script de ejemplo: una cuenta de empresa con un error de validación, un
/// paso atrás y la corrección del tipo de cuenta.
pub fn builtin_requests() -> Vec<Value> {
    vec![json!({}),
         json!({"form.buttons.continue": "Continue", "email": "ada@example.com", "account_type": "business"}),
         json!({"form.buttons.continue": "Continue", "full_name": "", "age": "x"}),
         json!({"form.buttons.continue": "Continue", "full_name": "Ada Lovelace", "age": "36", "newsletter": "on"}),
         json!({"form.buttons.continue": "Continue", "company": "Analytical Engines Ltd"}),
         json!({"wizard.step": "account"}),
         json!({"form.buttons.continue": "Continue", "email": "ada@example.com", "account_type": "personal"}),
         json!({"wizard.step": "confirm"}),
         json!({"form.buttons.finish": "Finish"}),
         json!({"form.buttons.finish": "Finish", "agree": "on"}),]
}

pub fn shared_definition() -> Result<Arc<WizardDefinition>, WizardError> {
    registration_definition().map(Arc::new)
}
