//! Core Wizard implementation

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::{json, Value};

use crate::condition::{ConditionContext, ConditionEvaluator, ConditionRegistry};
use crate::config::WizardConfig;
use crate::errors::WizardError;
use crate::event::{EventLog, WizardEvent, WizardEventKind};
use crate::field::FormData;
use crate::session::{InMemorySessionStore, SessionStore, WizardSession};
use crate::step::{StepDefinition, StepState};

use super::action::WizardAction;
use super::builder::WizardBuilder;
use super::result::{CompletionHandler, Transition, WizardResult, WizardState};
use super::view::StepSummary;
use super::WizardDefinition;

/// Motor de navegación de un wizard.
///
/// Una instancia vive lo que dura un request: se construye con la sesión del
/// host, se posiciona con `start()` y ejecuta una acción. Todo el estado que
/// debe sobrevivir entre requests está en `WizardSession`, guardada en el
/// `SessionStore` bajo `session_key`.
///
/// Invariantes:
/// - `active` contiene índices estáticos en orden creciente.
/// - En `AtStep(p)` con `active` no vacío, `p < active.len()`.
/// - Tras `Done` ninguna operación modifica la sesión.
pub struct Wizard<S: SessionStore, C: ConditionEvaluator> {
    definition: Arc<WizardDefinition>,
    store: S,
    conditions: C,
    config: WizardConfig,
    context: Value,
    session_key: String,
    session: WizardSession,
    /// La sesión ya existe en el store (se cargó o se guardó en este request).
    persisted: bool,
    active: Vec<usize>,
    state: WizardState,
    on_finish: Option<Box<dyn CompletionHandler + Send>>,
    events: EventLog,
}

impl<S: SessionStore, C: ConditionEvaluator> Wizard<S, C> {
    /// Crea un builder con el store de sesión y el evaluador de condiciones.
    #[inline]
    pub fn builder(definition: Arc<WizardDefinition>, store: S, conditions: C) -> WizardBuilder<S, C> {
        WizardBuilder { definition,
                        store,
                        conditions,
                        config: WizardConfig::default(),
                        context: json!({}),
                        context_key: None,
                        on_finish: None }
    }

    pub(crate) fn from_parts(builder: WizardBuilder<S, C>, session_key: String) -> Self {
        let session = WizardSession::new(builder.definition.definition_hash.clone());
        Self { definition: builder.definition,
               store: builder.store,
               conditions: builder.conditions,
               config: builder.config,
               context: builder.context,
               session_key,
               session,
               persisted: false,
               active: Vec::new(),
               state: WizardState::Idle,
               on_finish: builder.on_finish,
               events: EventLog::default() }
    }

    // ---------------------------------------------------------------------
    // Ciclo de vida
    // ---------------------------------------------------------------------

    /// Carga (o crea) la sesión, calcula los steps activos y se posiciona.
    ///
    /// Con `restore_position` y una sesión previa, vuelve al step en el que
    /// quedó el usuario si sigue activo; si no, al primer step activo.
    /// Llamarlo de nuevo en el mismo request no tiene efecto.
    pub fn start(&mut self) -> Result<(), WizardError> {
        match self.state {
            WizardState::Idle => {}
            WizardState::AtStep(_) => return Ok(()),
            WizardState::Finishing => return Err(WizardError::FinishInProgress),
            WizardState::Done => return Err(WizardError::Finished),
        }

        let resumed = self.load_session();
        self.refresh_active()?;
        if self.active.is_empty() {
            return Err(WizardError::Configuration(format!("wizard '{}' has no active steps", self.definition.name)));
        }

        let restored = if resumed && self.config.restore_position {
            self.session
                .current_step
                .as_deref()
                .and_then(|id| self.position_of(id))
        } else {
            None
        };
        let position = restored.unwrap_or(0);
        self.state = WizardState::AtStep(position);
        let step_id = self.step_id_at(position).to_string();
        self.session.current_step = Some(step_id.clone());

        info!("wizard '{}' started at step '{}' (resumed={}, traversal={})",
              self.definition.name, step_id, resumed, self.session.traversal_id);
        self.events.append(WizardEventKind::Started { traversal_id: self.session.traversal_id,
                                                      step_id,
                                                      resumed });
        Ok(())
    }

    /// Recalcula la lista de steps activos evaluando la condición de cada
    /// step en orden estático. No modifica la sesión; con los mismos datos
    /// produce siempre la misma lista.
    ///
    /// Si el step actual deja de estar activo, la posición pasa al primer
    /// step activo posterior en orden estático, o al último activo.
    pub fn update_active_steps(&mut self) -> Result<(), WizardError> {
        if self.state == WizardState::Done {
            return Err(WizardError::Finished);
        }
        let anchor = self.current_static_index();
        self.refresh_active()?;
        if let Some(anchor) = anchor {
            self.reposition(anchor);
        }
        Ok(())
    }

    /// Valida el input del step actual y avanza.
    ///
    /// Con input inválido devuelve `WizardError::Validation` sin mover la
    /// posición ni tocar la sesión. Con input válido guarda los datos,
    /// recalcula los steps activos y va al primer step activo cuyo índice
    /// estático sea mayor que el del step recién completado. Si no hay
    /// ninguno, finaliza; si quedara algún step activo sin completar (una
    /// condición activó un step anterior), va a ese step.
    pub fn next(&mut self, input: &FormData) -> Result<Transition, WizardError> {
        let (_, completed_idx) = self.current_slot()?;
        let step = Arc::clone(&self.definition.steps[completed_idx]);
        let previous = self.session.clone();
        self.submit(step.as_ref(), input)?;
        if let Err(e) = self.refresh_active() {
            self.session = previous;
            return Err(e);
        }
        self.persist()?;
        self.reposition(completed_idx);

        let from = step.id().to_string();
        if let Some(target) = self.active.iter().position(|&i| i > completed_idx) {
            return self.move_to(from, target);
        }
        if let Some(target) = self.first_incomplete_position() {
            debug!("wizard '{}': no step after '{}', returning to incomplete step", self.definition.name, from);
            return self.move_to(from, target);
        }
        self.finish().map(Transition::Finished)
    }

    /// Retrocede una posición en la lista de steps activos, sin validar ni
    /// descartar datos. En el primer step no se mueve.
    pub fn previous(&mut self) -> Result<Transition, WizardError> {
        let (position, _) = self.current_slot()?;
        if position == 0 {
            return Ok(Transition::Stayed { step_id: self.step_id_at(0).to_string() });
        }
        let from = self.step_id_at(position).to_string();
        self.move_to(from, position - 1)
    }

    /// Salta a un step activo. Permitido hacia atrás siempre y hacia adelante
    /// sólo si todos los steps activos anteriores al destino están completos.
    pub fn jump(&mut self, step_id: &str) -> Result<Transition, WizardError> {
        let (position, _) = self.current_slot()?;
        if self.definition.index_of(step_id).is_none() {
            return Err(WizardError::UnknownStep(step_id.to_string()));
        }
        let target = self.position_of(step_id)
                         .ok_or_else(|| WizardError::NavigationDenied(step_id.to_string()))?;
        if !self.can_jump_to(target, position) {
            return Err(WizardError::NavigationDenied(step_id.to_string()));
        }
        let from = self.step_id_at(position).to_string();
        self.move_to(from, target)
    }

    /// Finaliza: exige todos los steps activos completos, entrega el agregado
    /// al handler y elimina la sesión. Si el handler falla, el wizard vuelve a
    /// su step con la sesión intacta.
    pub fn finish(&mut self) -> Result<WizardResult, WizardError> {
        let (position, _) = self.current_slot()?;
        let missing = self.incomplete_steps();
        if !missing.is_empty() {
            return Err(WizardError::IncompleteSteps(missing));
        }

        self.state = WizardState::Finishing;
        let result = self.aggregate();
        if let Some(handler) = self.on_finish.as_mut() {
            if let Err(e) = handler.complete(&result) {
                warn!("wizard '{}': completion handler failed: {e}", self.definition.name);
                self.state = WizardState::AtStep(position);
                return Err(e);
            }
        }

        self.store.remove(&self.session_key);
        self.persisted = false;
        let traversal_id = self.session.traversal_id;
        self.session = WizardSession::new(self.definition.definition_hash.clone());
        self.state = WizardState::Done;

        info!("wizard '{}' finished (traversal={}, fields={})",
              self.definition.name, traversal_id, result.data.len());
        self.events.append(WizardEventKind::Finished { traversal_id,
                                                       field_count: result.data.len() });
        Ok(result)
    }

    /// Botón "Finish": guarda el input del step actual y finaliza.
    pub fn finish_with(&mut self, input: &FormData) -> Result<WizardResult, WizardError> {
        let (_, idx) = self.current_slot()?;
        let step = Arc::clone(&self.definition.steps[idx]);
        self.submit(step.as_ref(), input)?;
        self.persist()?;
        self.update_active_steps()?;
        self.finish()
    }

    /// Abandona el recorrido: elimina la sesión y vuelve al primer step con
    /// una sesión nueva.
    pub fn clear(&mut self) -> Result<Transition, WizardError> {
        match self.state {
            WizardState::Idle => return Err(WizardError::NotStarted),
            WizardState::Done => return Err(WizardError::Finished),
            _ => {}
        }
        let old_traversal = self.session.traversal_id;
        self.store.remove(&self.session_key);
        self.persisted = false;
        self.session = self.fresh_session();
        info!("wizard '{}' cleared (traversal={})", self.definition.name, old_traversal);
        self.events.append(WizardEventKind::Cleared { traversal_id: old_traversal });

        self.refresh_active()?;
        if self.active.is_empty() {
            return Err(WizardError::Configuration(format!("wizard '{}' has no active steps", self.definition.name)));
        }
        self.state = WizardState::AtStep(0);
        let step_id = self.step_id_at(0).to_string();
        self.session.current_step = Some(step_id.clone());
        Ok(Transition::Stayed { step_id })
    }

    /// Despacha un submit según el botón pulsado. Sin botón sólo se
    /// re-renderiza el step actual. Arranca el wizard si hace falta.
    pub fn handle(&mut self, form: &FormData) -> Result<Transition, WizardError> {
        if self.state == WizardState::Idle {
            self.start()?;
        }
        match WizardAction::from_form(form) {
            Some(WizardAction::Continue) => self.next(form),
            Some(WizardAction::Back) => self.previous(),
            Some(WizardAction::Finish) => self.finish_with(form).map(Transition::Finished),
            Some(WizardAction::Clear) => self.clear(),
            Some(WizardAction::Jump(id)) => self.jump(&id),
            None => {
                let (position, _) = self.current_slot()?;
                Ok(Transition::Stayed { step_id: self.step_id_at(position).to_string() })
            }
        }
    }

    // ---------------------------------------------------------------------
    // Consultas
    // ---------------------------------------------------------------------

    pub fn definition(&self) -> &WizardDefinition {
        &self.definition
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn context(&self) -> &Value {
        &self.context
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn events(&self) -> &[WizardEvent] {
        self.events.list()
    }

    /// Variante compacta de eventos (ver `EventLog::variants`).
    pub fn event_variants(&self) -> Vec<&'static str> {
        self.events.variants()
    }

    /// Posición actual en la lista de steps activos.
    pub fn position(&self) -> Option<usize> {
        match self.state {
            WizardState::AtStep(p) if p < self.active.len() => Some(p),
            _ => None,
        }
    }

    pub fn active_steps(&self) -> Vec<&dyn StepDefinition> {
        self.active
            .iter()
            .map(|&i| self.definition.steps[i].as_ref())
            .collect()
    }

    pub fn active_step_ids(&self) -> Vec<&str> {
        self.active
            .iter()
            .map(|&i| self.definition.steps[i].id())
            .collect()
    }

    pub fn is_active(&self, step_id: &str) -> bool {
        self.position_of(step_id).is_some()
    }

    pub fn current_step(&self) -> Option<&dyn StepDefinition> {
        self.current_static_index()
            .map(|i| self.definition.steps[i].as_ref())
    }

    /// Valores guardados del step actual, para re-renderizar el formulario.
    pub fn current_values(&self) -> FormData {
        self.current_step()
            .and_then(|s| self.session.step_data(s.id()).cloned())
            .unwrap_or_default()
    }

    pub fn on_first_step(&self) -> bool {
        self.position() == Some(0)
    }

    pub fn on_last_step(&self) -> bool {
        matches!(self.position(), Some(p) if p + 1 == self.active.len())
    }

    pub fn all_steps_finished(&self) -> bool {
        !self.active.is_empty() && self.incomplete_steps().is_empty()
    }

    /// Ids de steps activos aún no completados, en orden.
    pub fn incomplete_steps(&self) -> Vec<String> {
        self.active
            .iter()
            .map(|&i| self.definition.steps[i].id())
            .filter(|id| !self.session.is_completed(id))
            .map(str::to_string)
            .collect()
    }

    /// Lista de navegación: un resumen por step activo.
    pub fn steps_overview(&self) -> Vec<StepSummary> {
        let current = self.position();
        self.active
            .iter()
            .enumerate()
            .map(|(position, &i)| {
                let step = &self.definition.steps[i];
                let state = if current == Some(position) {
                    StepState::Current
                } else if self.session.is_completed(step.id()) {
                    StepState::Completed
                } else {
                    StepState::Pending
                };
                let can_jump = match current {
                    Some(p) => position != p && self.can_jump_to(position, p),
                    None => false,
                };
                StepSummary { id: step.id().to_string(),
                              label: step.label().to_string(),
                              position,
                              state,
                              can_jump }
            })
            .collect()
    }

    /// Botones a mostrar en el step actual.
    pub fn available_actions(&self) -> Vec<WizardAction> {
        if self.position().is_none() {
            return Vec::new();
        }
        let mut actions = Vec::with_capacity(3);
        if !self.on_first_step() {
            actions.push(WizardAction::Back);
        }
        if self.on_last_step() {
            actions.push(WizardAction::Finish);
        } else {
            actions.push(WizardAction::Continue);
        }
        actions.push(WizardAction::Clear);
        actions
    }

    // ---------------------------------------------------------------------
    // Internos
    // ---------------------------------------------------------------------

    /// (posición, índice estático) del step actual.
    fn current_slot(&self) -> Result<(usize, usize), WizardError> {
        match self.state {
            WizardState::Idle => Err(WizardError::NotStarted),
            WizardState::Done => Err(WizardError::Finished),
            WizardState::Finishing => Err(WizardError::FinishInProgress),
            WizardState::AtStep(position) => {
                if self.active.is_empty() {
                    return Err(WizardError::Configuration(format!("wizard '{}' has no active steps",
                                                                  self.definition.name)));
                }
                let position = position.min(self.active.len() - 1);
                Ok((position, self.active[position]))
            }
        }
    }

    fn current_static_index(&self) -> Option<usize> {
        self.position().map(|p| self.active[p])
    }

    fn position_of(&self, step_id: &str) -> Option<usize> {
        self.active
            .iter()
            .position(|&i| self.definition.steps[i].id() == step_id)
    }

    fn step_id_at(&self, position: usize) -> &str {
        self.definition.steps[self.active[position]].id()
    }

    fn first_incomplete_position(&self) -> Option<usize> {
        self.active
            .iter()
            .position(|&i| !self.session.is_completed(self.definition.steps[i].id()))
    }

    fn can_jump_to(&self, target: usize, current: usize) -> bool {
        target <= current
        || self.active[..target].iter()
                                .all(|&i| self.session.is_completed(self.definition.steps[i].id()))
    }

    /// Reubica la posición tras un cambio de la lista activa: primer step
    /// activo con índice estático >= `anchor`, o el último activo.
    fn reposition(&mut self, anchor: usize) {
        if self.active.is_empty() {
            return;
        }
        let position = self.active
                           .iter()
                           .position(|&i| i >= anchor)
                           .unwrap_or(self.active.len() - 1);
        if let WizardState::AtStep(old) = self.state {
            if old != position {
                debug!("wizard '{}': position {} -> {} after active list change",
                       self.definition.name, old, position);
            }
            self.state = WizardState::AtStep(position);
            self.session.current_step = Some(self.step_id_at(position).to_string());
        }
    }

    fn compute_active(&self) -> Result<Vec<usize>, WizardError> {
        let mut active = Vec::with_capacity(self.definition.len());
        let mut active_ids: Vec<&str> = Vec::with_capacity(self.definition.len());
        for (idx, step) in self.definition.steps.iter().enumerate() {
            let is_active = match step.condition() {
                None => true,
                Some(name) => {
                    let ctx = ConditionContext { context: &self.context,
                                                 wizard: &self.definition.name,
                                                 step_id: step.id(),
                                                 active_steps: &active_ids,
                                                 session: &self.session };
                    self.conditions.resolve(name, &ctx)?
                }
            };
            if is_active {
                active.push(idx);
                active_ids.push(step.id());
            }
        }
        Ok(active)
    }

    /// Recalcula `active`; devuelve si cambió.
    fn refresh_active(&mut self) -> Result<bool, WizardError> {
        let computed = self.compute_active()?;
        if computed == self.active {
            return Ok(false);
        }
        self.active = computed;
        let ids: Vec<String> = self.active_step_ids().into_iter().map(str::to_string).collect();
        debug!("wizard '{}': active steps {:?}", self.definition.name, ids);
        self.events.append(WizardEventKind::ActiveStepsChanged { active: ids });
        Ok(true)
    }

    fn submit(&mut self, step: &dyn StepDefinition, input: &FormData) -> Result<(), WizardError> {
        match step.validate(input) {
            Ok(data) => {
                debug!("wizard '{}': step '{}' accepted {} field(s)",
                       self.definition.name,
                       step.id(),
                       data.len());
                self.session.record_step(step.id(), data);
                self.events.append(WizardEventKind::StepSubmitted { step_id: step.id().to_string() });
                Ok(())
            }
            Err(errors) => {
                let fields: Vec<String> = errors.field_names().into_iter().map(str::to_string).collect();
                debug!("wizard '{}': step '{}' rejected, invalid fields {:?}",
                       self.definition.name,
                       step.id(),
                       fields);
                self.events.append(WizardEventKind::StepRejected { step_id: step.id().to_string(),
                                                                   fields });
                Err(WizardError::Validation(errors))
            }
        }
    }

    /// Posiciona el wizard en `target`. La sesión sólo se guarda si ya
    /// existe en el store.
    fn move_to(&mut self, from: String, target: usize) -> Result<Transition, WizardError> {
        let to = self.step_id_at(target).to_string();
        self.state = WizardState::AtStep(target);
        self.session.current_step = Some(to.clone());
        if self.persisted {
            self.persist()?;
        }
        if from == to {
            return Ok(Transition::Stayed { step_id: to });
        }
        debug!("wizard '{}': {} -> {}", self.definition.name, from, to);
        self.events.append(WizardEventKind::Moved { from: from.clone(),
                                                    to: to.clone() });
        Ok(Transition::Moved { from, to })
    }

    /// Guarda la sesión en el store.
    fn persist(&mut self) -> Result<(), WizardError> {
        self.session.touch();
        let value = self.session
                        .to_value()
                        .map_err(|e| WizardError::Session(e.to_string()))?;
        self.store.set(&self.session_key, value);
        self.persisted = true;
        Ok(())
    }

    /// Carga la sesión del store; devuelve si se reanudó una existente.
    fn load_session(&mut self) -> bool {
        let Some(raw) = self.store.get(&self.session_key) else {
            self.session = self.fresh_session();
            return false;
        };
        match WizardSession::from_value(raw) {
            Ok(session)
                if session.definition_hash == self.definition.definition_hash
                   || !self.config.reset_on_definition_change =>
            {
                self.session = session;
                self.persisted = true;
                true
            }
            Ok(session) => {
                warn!("wizard '{}': discarding session of traversal {} created by another definition",
                      self.definition.name, session.traversal_id);
                self.store.remove(&self.session_key);
                self.session = self.fresh_session();
                false
            }
            Err(e) => {
                warn!("wizard '{}': discarding unreadable session: {e}", self.definition.name);
                self.store.remove(&self.session_key);
                self.session = self.fresh_session();
                false
            }
        }
    }

    /// Sesión nueva precargada con el `load` de cada step.
    fn fresh_session(&self) -> WizardSession {
        let mut session = WizardSession::new(self.definition.definition_hash.clone());
        for step in &self.definition.steps {
            session.prefill_step(step.id(), step.load(&self.context));
        }
        session
    }

    fn aggregate(&self) -> WizardResult {
        let mut data = FormData::new();
        let mut by_step = IndexMap::new();
        let mut context = self.context.clone();
        for &idx in &self.active {
            let step = &self.definition.steps[idx];
            let step_data = self.session.step_data(step.id()).cloned().unwrap_or_default();
            for (k, v) in &step_data {
                data.insert(k.clone(), v.clone());
            }
            step.apply(&mut context, &step_data);
            by_step.insert(step.id().to_string(), step_data);
        }
        WizardResult { traversal_id: self.session.traversal_id,
                       wizard: self.definition.name.clone(),
                       data,
                       by_step,
                       context }
    }
}

impl Wizard<InMemorySessionStore, ConditionRegistry> {
    /// Builder con store de sesión en memoria.
    #[inline]
    pub fn in_memory(definition: Arc<WizardDefinition>,
                     conditions: ConditionRegistry)
                     -> WizardBuilder<InMemorySessionStore, ConditionRegistry> {
        Wizard::builder(definition, InMemorySessionStore::new(), conditions)
    }
}
