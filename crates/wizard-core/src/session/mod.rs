//! Sesión del wizard y trait `SessionStore`.
//!
//! La sesión acumula los datos validados de cada step entre requests. Se
//! serializa con serde dentro de la sesión del host bajo la clave del wizard.

mod data;
mod store;

pub use data::WizardSession;
pub use store::{InMemorySessionStore, SessionStore};
