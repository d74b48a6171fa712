use crate::field::FieldSpec;

use super::StepDefinition;

/// Step construido en código, sin tipo propio.
#[derive(Debug, Clone)]
pub struct Step {
    id: String,
    label: String,
    description: Option<String>,
    fields: Vec<FieldSpec>,
    condition: Option<String>,
}

impl Step {
    pub fn new(id: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        let id = id.into();
        Self { label: id.clone(),
               id,
               description: None,
               fields,
               condition: None }
    }

    pub fn builder(id: impl Into<String>) -> StepBuilder {
        StepBuilder { step: Step::new(id, Vec::new()) }
    }
}

impl StepDefinition for Step {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.label
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
    fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }
}

pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.step.label = label.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.step.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.step.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.step.fields.extend(fields);
        self
    }

    /// Nombre de la condición registrada que decide si el step está activo.
    pub fn condition(mut self, name: impl Into<String>) -> Self {
        self.step.condition = Some(name.into());
        self
    }

    pub fn build(self) -> Step {
        self.step
    }
}
