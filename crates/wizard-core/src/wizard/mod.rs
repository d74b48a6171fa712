//! Wizard: máquina de estados de navegación sobre una `WizardDefinition`.
//!
//! Provee la definición, el builder, las acciones externas y el motor
//! (`Wizard`) que calcula los steps activos y mueve la posición actual.

pub mod action;
pub mod builder;
mod engine;
pub mod definition;
pub mod result;
pub mod view;

pub use action::WizardAction;
pub use builder::WizardBuilder;
pub use engine::Wizard;
pub use definition::{build_wizard_definition, WizardDefinition, WizardDefinitionBuilder};
pub use result::{CompletionHandler, Transition, WizardResult, WizardState};
pub use view::StepSummary;
