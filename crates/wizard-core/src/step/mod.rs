//! Definiciones relacionadas a Steps.
//!
//! Un Step es una página del wizard: declara un subconjunto fijo de campos y,
//! opcionalmente, el nombre de una condición que decide si está activo. Este
//! módulo define:
//! - `StepDefinition`: interfaz neutral usada por el wizard.
//! - `Step` / `StepBuilder`: implementación concreta construida en código.
//! - `wizard_step!`: macro para declarar steps como tipos.
//! - `StepState`: estado de un step visto desde la navegación.

pub mod definition;
pub mod macros;
mod simple;
mod status;

pub use definition::StepDefinition;
pub use simple::{Step, StepBuilder};
pub use status::StepState;
