use chrono::Utc;

use super::{WizardEvent, WizardEventKind};

#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<WizardEvent>,
}

impl EventLog {
    /// Agrega un evento a partir de su kind y devuelve el evento completo.
    pub fn append(&mut self, kind: WizardEventKind) -> &WizardEvent {
        let seq = self.events.len() as u64;
        self.events.push(WizardEvent { seq, kind, ts: Utc::now() });
        &self.events[self.events.len() - 1]
    }

    pub fn list(&self) -> &[WizardEvent] {
        &self.events
    }

    /// Variante compacta de la secuencia de eventos, útil en tests.
    pub fn variants(&self) -> Vec<&'static str> {
        self.events
            .iter()
            .map(|e| match e.kind {
                WizardEventKind::Started { .. } => "S",
                WizardEventKind::ActiveStepsChanged { .. } => "A",
                WizardEventKind::StepSubmitted { .. } => "U",
                WizardEventKind::StepRejected { .. } => "R",
                WizardEventKind::Moved { .. } => "M",
                WizardEventKind::Finished { .. } => "F",
                WizardEventKind::Cleared { .. } => "C",
            })
            .collect()
    }
}
