//! formwizard
//!
//! Aplicación de demo sobre `wizard-core`:
//! - `registration` define un wizard de registro con un step condicional.
//! - `script` reproduce una secuencia de requests contra ese wizard.
//! - `errors` agrupa los errores propios de la demo.
//!
//! Puede usarse desde `main.rs` o desde los tests de integración.

pub mod errors;
pub mod registration;
pub mod script;

pub use registration::{registration_conditions, registration_definition, shared_definition};
pub use script::{run_script, Outcome, RequestReport, Script};
