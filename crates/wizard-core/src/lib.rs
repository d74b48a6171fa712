//! wizard-core: wizard de formularios multi-step con sesión y condiciones
pub mod condition;
pub mod config;
pub mod constants;
pub mod errors;
pub mod event;
pub mod field;
pub mod hashing;
pub mod session;
pub mod step;
pub mod wizard;

pub use condition::{ConditionContext, ConditionEvaluator, ConditionRegistry, StepCondition};
pub use config::WizardConfig;
pub use errors::WizardError;
pub use event::{EventLog, WizardEvent, WizardEventKind};
pub use field::{form_data, FieldKind, FieldSpec, FormData, ValidationErrors};
pub use session::{InMemorySessionStore, SessionStore, WizardSession};
pub use step::{Step, StepBuilder, StepDefinition, StepState};
pub use wizard::{Transition, Wizard, WizardAction, WizardBuilder, WizardDefinition, WizardResult, WizardState};
