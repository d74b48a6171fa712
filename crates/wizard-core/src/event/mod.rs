//! Eventos del wizard y log append-only.

mod event_log;
mod types;

pub use event_log::EventLog;
pub use types::{WizardEvent, WizardEventKind};
