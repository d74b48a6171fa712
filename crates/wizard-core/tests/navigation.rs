use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use wizard_core::{form_data, ConditionRegistry, FieldSpec, FormData, InMemorySessionStore, SessionStore, Step,
                  Transition, Wizard, WizardAction, WizardDefinition, WizardError, WizardState};

fn linear() -> Arc<WizardDefinition> {
    let def = WizardDefinition::builder("linear").step(Step::new("one",
                                                                 vec![FieldSpec::text_line("name", "Name"),
                                                                      FieldSpec::integer("age", "Age")]))
                                                 .step(Step::new("two", vec![FieldSpec::text_line("city", "City")]))
                                                 .step(Step::new("three", vec![FieldSpec::boolean("agree", "Agree")]))
                                                 .build()
                                                 .expect("definition");
    Arc::new(def)
}

fn one_ok() -> FormData {
    form_data(json!({"name": "Ada", "age": "36"}))
}

fn two_ok() -> FormData {
    form_data(json!({"city": "Lima"}))
}

#[test]
fn invalid_next_keeps_position_and_session() {
    let mut store = InMemorySessionStore::new();
    let mut wizard = Wizard::builder(linear(), &mut store, ConditionRegistry::new()).build();
    wizard.start().expect("start");
    let session_before = wizard.session().clone();

    let err = wizard.next(&form_data(json!({"age": "old"}))).unwrap_err();
    let WizardError::Validation(errors) = &err else { panic!("expected validation error") };
    assert_eq!(errors.field_names(), vec!["name", "age"]);
    assert!(!err.is_fatal());

    assert_eq!(wizard.position(), Some(0));
    assert_eq!(wizard.session(), &session_before);
    assert!(wizard.session().step_data("one").is_none());
    assert!(wizard.store().get(wizard.session_key()).is_none());
    assert_eq!(wizard.event_variants(), vec!["A", "S", "R"]);
}

#[test]
fn finish_clears_session() {
    let mut store = InMemorySessionStore::new();
    {
        let mut wizard = Wizard::builder(linear(), &mut store, ConditionRegistry::new()).build();
        wizard.start().expect("start");
        wizard.next(&one_ok()).expect("one");
        assert!(wizard.store().get("formwizard.linear").is_some());
        wizard.next(&two_ok()).expect("two");
        let traversal = wizard.session().traversal_id;

        let t = wizard.next(&form_data(json!({"agree": "yes"}))).expect("three");
        let Transition::Finished(result) = t else { panic!("expected finish") };
        assert_eq!(result.traversal_id, traversal);
        assert_eq!(result.wizard, "linear");
        assert_eq!(result.data.keys().collect::<Vec<_>>(), vec!["name", "age", "city", "agree"]);
        assert_eq!(result.data["age"], json!(36));

        assert_eq!(wizard.state(), WizardState::Done);
        assert!(wizard.session().is_empty());
        assert_ne!(wizard.session().traversal_id, traversal);
    }
    assert!(store.is_empty());
}

#[test]
fn done_is_terminal() {
    let mut wizard = Wizard::in_memory(linear(), ConditionRegistry::new()).build();
    wizard.start().expect("start");
    wizard.next(&one_ok()).expect("one");
    wizard.next(&two_ok()).expect("two");
    wizard.next(&FormData::new()).expect("unchecked box is false");
    assert_eq!(wizard.state(), WizardState::Done);

    assert_eq!(wizard.next(&one_ok()).unwrap_err(), WizardError::Finished);
    assert_eq!(wizard.previous().unwrap_err(), WizardError::Finished);
    assert_eq!(wizard.finish().unwrap_err(), WizardError::Finished);
    assert_eq!(wizard.clear().unwrap_err(), WizardError::Finished);
    assert_eq!(wizard.jump("one").unwrap_err(), WizardError::Finished);
    assert_eq!(wizard.start().unwrap_err(), WizardError::Finished);
    assert!(wizard.available_actions().is_empty());
}

#[test]
fn navigation_requires_start() {
    let mut wizard = Wizard::in_memory(linear(), ConditionRegistry::new()).build();
    assert_eq!(wizard.next(&one_ok()).unwrap_err(), WizardError::NotStarted);
    assert_eq!(wizard.previous().unwrap_err(), WizardError::NotStarted);
    assert_eq!(wizard.state(), WizardState::Idle);
}

#[test]
fn previous_keeps_data_and_stops_at_first_step() {
    let mut wizard = Wizard::in_memory(linear(), ConditionRegistry::new()).build();
    wizard.start().expect("start");
    assert_eq!(wizard.previous().expect("stay"), Transition::Stayed { step_id: "one".into() });
    assert!(wizard.on_first_step());

    wizard.next(&one_ok()).expect("one");
    let t = wizard.previous().expect("back");
    assert_eq!(t, Transition::Moved { from: "two".into(),
                                      to: "one".into() });
    assert_eq!(wizard.current_values()["name"], json!("Ada"));
    assert!(wizard.session().is_completed("one"));
}

#[test]
fn next_goes_to_step_activated_by_submitted_data() {
    let def = WizardDefinition::builder("signup").step(Step::new("account",
                                                                 vec![FieldSpec::choice("kind",
                                                                                        "Kind",
                                                                                        ["personal", "business"])]))
                                                 .step(Step::builder("company").field(FieldSpec::text_line("company", "Company"))
                                                                               .condition("is_business")
                                                                               .build())
                                                 .step(Step::new("confirm", vec![FieldSpec::boolean("agree", "Agree")]))
                                                 .build()
                                                 .expect("definition");
    let registry = ConditionRegistry::new().with("is_business", |c| c.field_equals("kind", "business"));
    let mut wizard = Wizard::in_memory(Arc::new(def), registry).build();
    wizard.start().expect("start");
    assert_eq!(wizard.active_step_ids(), vec!["account", "confirm"]);

    let t = wizard.next(&form_data(json!({"kind": "business"}))).expect("account");
    assert_eq!(t.step_id(), Some("company"));
    wizard.next(&form_data(json!({"company": "ACME"}))).expect("company");

    // volver y cambiar de opinión: company queda inactivo y se salta
    wizard.jump("account").expect("jump back");
    let t = wizard.next(&form_data(json!({"kind": "personal"}))).expect("account again");
    assert_eq!(t, Transition::Moved { from: "account".into(),
                                      to: "confirm".into() });
    assert_eq!(wizard.active_step_ids(), vec!["account", "confirm"]);

    let t = wizard.next(&form_data(json!({"agree": "on"}))).expect("confirm");
    let Transition::Finished(result) = t else { panic!("expected finish") };
    assert!(!result.data.contains_key("company"));
    assert_eq!(result.data["kind"], json!("personal"));
}

#[test]
fn next_returns_to_earlier_step_activated_late() {
    // "extra" va antes que "last" pero sólo se activa con datos de "last";
    // por eso la condición usa `raw_field`
    let def = WizardDefinition::builder("late").step(Step::new("first", vec![FieldSpec::text_line("a", "A")]))
                                               .step(Step::builder("extra").field(FieldSpec::text_line("x", "X"))
                                                                           .condition("wants_extra")
                                                                           .build())
                                               .step(Step::new("last", vec![FieldSpec::boolean("more", "More")]))
                                               .build()
                                               .expect("definition");
    let registry = ConditionRegistry::new().with("wants_extra", |c| c.raw_field("more") == Some(&json!(true)));
    let mut wizard = Wizard::in_memory(Arc::new(def), registry).build();
    wizard.start().expect("start");
    wizard.next(&form_data(json!({"a": "1"}))).expect("first");

    let t = wizard.next(&form_data(json!({"more": "on"}))).expect("last");
    assert_eq!(t, Transition::Moved { from: "last".into(),
                                      to: "extra".into() });
    assert_eq!(wizard.incomplete_steps(), vec!["extra".to_string()]);

    let t = wizard.next(&form_data(json!({"x": "y"}))).expect("extra");
    assert_eq!(t.step_id(), Some("last"));
    assert!(wizard.all_steps_finished());
    let result = wizard.finish().expect("finish");
    assert_eq!(result.data.keys().collect::<Vec<_>>(), vec!["a", "x", "more"]);
}

#[test]
fn current_step_deactivated_moves_forward_or_to_last() {
    let flag = Arc::new(AtomicBool::new(true));
    let def = WizardDefinition::builder("clamp").step(Step::new("one", vec![]))
                                                .step(Step::builder("two").condition("flag").build())
                                                .step(Step::new("three", vec![]))
                                                .step(Step::builder("four").condition("flag").build())
                                                .build()
                                                .expect("definition");
    let cond = Arc::clone(&flag);
    let registry = ConditionRegistry::new().with("flag", move |_| cond.load(Ordering::SeqCst));
    let mut wizard = Wizard::in_memory(Arc::new(def), registry).build();
    wizard.start().expect("start");
    wizard.next(&FormData::new()).expect("one");
    assert_eq!(wizard.current_step().map(|s| s.id()), Some("two"));

    flag.store(false, Ordering::SeqCst);
    wizard.update_active_steps().expect("update");
    assert_eq!(wizard.current_step().map(|s| s.id()), Some("three"));
    assert_eq!(wizard.position(), Some(1));

    flag.store(true, Ordering::SeqCst);
    wizard.update_active_steps().expect("update");
    // "three" sigue activo: conserva su identidad
    assert_eq!(wizard.current_step().map(|s| s.id()), Some("three"));
    wizard.next(&FormData::new()).expect("three");
    assert_eq!(wizard.current_step().map(|s| s.id()), Some("four"));

    flag.store(false, Ordering::SeqCst);
    wizard.update_active_steps().expect("update");
    assert_eq!(wizard.current_step().map(|s| s.id()), Some("three"));
    assert!(wizard.on_last_step());
}

#[test]
fn jump_permissions() {
    let mut wizard = Wizard::in_memory(linear(), ConditionRegistry::new()).build();
    wizard.start().expect("start");

    assert_eq!(wizard.jump("three").unwrap_err(), WizardError::NavigationDenied("three".into()));
    assert_eq!(wizard.jump("nope").unwrap_err(), WizardError::UnknownStep("nope".into()));

    wizard.next(&one_ok()).expect("one");
    wizard.jump("one").expect("backwards is always allowed");
    // "one" completo: se puede volver a "two" sin reenviar
    wizard.jump("two").expect("forward over completed steps");
    assert_eq!(wizard.jump("three").unwrap_err(), WizardError::NavigationDenied("three".into()));

    let overview = wizard.steps_overview();
    let states: Vec<_> = overview.iter().map(|s| (s.id.as_str(), s.can_jump)).collect();
    assert_eq!(states, vec![("one", true), ("two", false), ("three", false)]);
}

#[test]
fn finish_requires_completed_steps() {
    let mut wizard = Wizard::in_memory(linear(), ConditionRegistry::new()).build();
    wizard.start().expect("start");
    wizard.next(&one_ok()).expect("one");
    assert_eq!(wizard.finish().unwrap_err(),
               WizardError::IncompleteSteps(vec!["two".into(), "three".into()]));
    assert_eq!(wizard.position(), Some(1));
}

#[test]
fn clear_starts_a_new_traversal() {
    let mut store = InMemorySessionStore::new();
    let mut wizard = Wizard::builder(linear(), &mut store, ConditionRegistry::new()).build();
    wizard.start().expect("start");
    wizard.next(&one_ok()).expect("one");
    let old = wizard.session().traversal_id;

    let t = wizard.clear().expect("clear");
    assert_eq!(t, Transition::Stayed { step_id: "one".into() });
    assert_ne!(wizard.session().traversal_id, old);
    assert!(wizard.session().is_empty());
    assert!(wizard.store().get(wizard.session_key()).is_none());
    assert_eq!(wizard.event_variants().last(), Some(&"C"));
}

#[test]
fn failing_handler_keeps_session_and_step() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let mut store = InMemorySessionStore::new();
    let mut wizard = Wizard::builder(linear(), &mut store, ConditionRegistry::new())
        .on_finish(move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(WizardError::Completion("storage unavailable".into()))
            } else {
                Ok(())
            }
        })
        .build();
    wizard.start().expect("start");
    wizard.next(&one_ok()).expect("one");
    wizard.next(&two_ok()).expect("two");

    let err = wizard.next(&form_data(json!({"agree": "on"}))).unwrap_err();
    assert_eq!(err, WizardError::Completion("storage unavailable".into()));
    assert_eq!(wizard.state(), WizardState::AtStep(2));
    assert!(wizard.all_steps_finished());
    assert!(wizard.store().get(wizard.session_key()).is_some());

    let result = wizard.finish().expect("second attempt");
    assert_eq!(result.data["agree"], json!(true));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(wizard.store().get(wizard.session_key()).is_none());
}

#[test]
fn handle_dispatches_buttons() {
    let mut wizard = Wizard::in_memory(linear(), ConditionRegistry::new()).build();

    // sin botón: sólo renderiza (y arranca)
    let t = wizard.handle(&form_data(json!({"name": "ignored"}))).expect("render");
    assert_eq!(t, Transition::Stayed { step_id: "one".into() });
    assert_eq!(wizard.available_actions(), vec![WizardAction::Continue, WizardAction::Clear]);

    let t = wizard.handle(&form_data(json!({"form.buttons.continue": "Continue", "name": "Ada", "age": "36"})))
                  .expect("continue");
    assert_eq!(t.step_id(), Some("two"));
    assert!(!wizard.session().step_data("one").expect("data").contains_key("form.buttons.continue"));

    let t = wizard.handle(&form_data(json!({"form.buttons.back": "Back"}))).expect("back");
    assert_eq!(t.step_id(), Some("one"));

    let t = wizard.handle(&form_data(json!({"wizard.step": "two"}))).expect("jump");
    assert_eq!(t.step_id(), Some("two"));
    wizard.handle(&form_data(json!({"form.buttons.continue": "", "city": "Lima"}))).expect("continue");
    assert_eq!(wizard.available_actions(),
               vec![WizardAction::Back, WizardAction::Finish, WizardAction::Clear]);

    let t = wizard.handle(&form_data(json!({"form.buttons.finish": "", "agree": "on"}))).expect("finish");
    assert!(matches!(t, Transition::Finished(ref r) if r.data["agree"] == json!(true)));
}

#[test]
fn chained_condition_ignores_data_of_inactive_steps() {
    let def = WizardDefinition::builder("vat").step(Step::new("account",
                                                              vec![FieldSpec::choice("kind",
                                                                                     "Kind",
                                                                                     ["personal", "business"])]))
                                              .step(Step::builder("company").field(FieldSpec::text_line("company", "Company"))
                                                                            .field(FieldSpec::boolean("needs_vat", "VAT"))
                                                                            .condition("is_business")
                                                                            .build())
                                              .step(Step::builder("vat").field(FieldSpec::text_line("vat_number", "VAT number"))
                                                                        .condition("needs_vat")
                                                                        .build())
                                              .step(Step::new("confirm", vec![FieldSpec::boolean("agree", "Agree")]))
                                              .build()
                                              .expect("definition");
    let registry = ConditionRegistry::new().with("is_business", |c| c.field_equals("kind", "business"))
                                           .with("needs_vat", |c| c.field("needs_vat") == Some(&json!(true)));
    let mut wizard = Wizard::in_memory(Arc::new(def), registry).build();
    wizard.start().expect("start");

    wizard.next(&form_data(json!({"kind": "business"}))).expect("account");
    wizard.next(&form_data(json!({"company": "ACME", "needs_vat": "on"}))).expect("company");
    wizard.next(&form_data(json!({"vat_number": "ES-1"}))).expect("vat");
    assert_eq!(wizard.active_step_ids(), vec!["account", "company", "vat", "confirm"]);

    wizard.jump("account").expect("jump back");
    let t = wizard.next(&form_data(json!({"kind": "personal"}))).expect("account again");
    // company queda inactivo y arrastra a vat aunque sus datos sigan en la sesión
    assert_eq!(t.step_id(), Some("confirm"));
    assert_eq!(wizard.active_step_ids(), vec!["account", "confirm"]);
    assert_eq!(wizard.session().value("company", "needs_vat"), Some(&json!(true)));

    let t = wizard.next(&form_data(json!({"agree": "on"}))).expect("confirm");
    let Transition::Finished(result) = t else { panic!("expected finish") };
    assert_eq!(result.data.keys().collect::<Vec<_>>(), vec!["kind", "agree"]);
}

/// Falla la búsqueda cuando el step "one" trae `a = "boom"`.
struct FailsOnBoom;

impl wizard_core::ConditionEvaluator for FailsOnBoom {
    fn resolve(&self, name: &str, ctx: &wizard_core::ConditionContext<'_>) -> Result<bool, WizardError> {
        if ctx.raw_field("a") == Some(&json!("boom")) {
            return Err(WizardError::ConditionLookup(name.to_string()));
        }
        Ok(true)
    }
}

#[test]
fn lookup_error_on_next_leaves_stored_session_untouched() {
    let def = WizardDefinition::builder("lookup").step(Step::new("one", vec![FieldSpec::text_line("a", "A")]))
                                                 .step(Step::builder("two").condition("any").build())
                                                 .build()
                                                 .expect("definition");
    let mut store = InMemorySessionStore::new();
    let mut wizard = Wizard::builder(Arc::new(def), &mut store, FailsOnBoom).build();
    wizard.start().expect("start");
    wizard.next(&form_data(json!({"a": "ok"}))).expect("one");
    wizard.previous().expect("back");
    let stored = wizard.store().get(wizard.session_key()).expect("stored session");

    let err = wizard.next(&form_data(json!({"a": "boom"}))).unwrap_err();
    assert_eq!(err, WizardError::ConditionLookup("any".into()));
    assert_eq!(wizard.position(), Some(0));
    assert_eq!(wizard.session().value("one", "a"), Some(&json!("ok")));
    assert_eq!(wizard.store().get(wizard.session_key()), Some(stored));
}

/// Handler que guarda los resultados recibidos.
#[derive(Default)]
struct Collect {
    results: Arc<std::sync::Mutex<Vec<wizard_core::WizardResult>>>,
}

impl wizard_core::wizard::CompletionHandler for Collect {
    fn complete(&mut self, result: &wizard_core::WizardResult) -> Result<(), WizardError> {
        self.results
            .lock()
            .map_err(|e| WizardError::Completion(e.to_string()))?
            .push(result.clone());
        Ok(())
    }
}

#[test]
fn completion_handler_type_receives_the_aggregate() {
    let handler = Collect::default();
    let results = Arc::clone(&handler.results);
    let mut wizard = Wizard::in_memory(linear(), ConditionRegistry::new()).completion_handler(handler)
                                                                          .build();
    wizard.start().expect("start");
    wizard.next(&one_ok()).expect("one");
    wizard.next(&two_ok()).expect("two");
    wizard.next(&form_data(json!({"agree": "on"}))).expect("three");

    let results = results.lock().expect("lock");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].by_step["two"]["city"], json!("Lima"));
}
