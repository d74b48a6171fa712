use serde_json::json;
use wizard_core::WizardConfig;

use formwizard::registration::{builtin_requests, MSG_MUST_AGREE};
use formwizard::{registration_conditions, run_script, shared_definition, Outcome, Script};

fn moved(from: &str, to: &str) -> Outcome {
    Outcome::Moved { from: from.into(),
                     to: to.into() }
}

#[test]
fn builtin_script_skips_company_after_switching_to_personal() {
    let definition = shared_definition().expect("definition");
    let script = Script::new(builtin_requests());
    let reports = run_script(&script, &definition, &registration_conditions(), &WizardConfig::default())
        .expect("script runs");
    let outcomes: Vec<&Outcome> = reports.iter().map(|r| &r.outcome).collect();

    assert_eq!(outcomes[0], &Outcome::Stayed { step: "account".into() });
    assert_eq!(outcomes[1], &moved("account", "profile"));
    let Outcome::Invalid { step, errors } = outcomes[2] else { panic!("expected invalid profile") };
    assert_eq!(step, "profile");
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["full_name", "age"]);
    assert_eq!(outcomes[3], &moved("profile", "company"));
    assert_eq!(outcomes[4], &moved("company", "confirm"));
    assert_eq!(outcomes[5], &moved("confirm", "account"));
    assert_eq!(outcomes[6], &moved("account", "profile"));
    assert_eq!(outcomes[7], &moved("profile", "confirm"));
    let Outcome::Invalid { errors, .. } = outcomes[8] else { panic!("expected invalid confirm") };
    assert_eq!(errors[0].message, MSG_MUST_AGREE);

    let Outcome::Finished { data, .. } = outcomes[9] else { panic!("expected finish") };
    assert_eq!(data["account_type"], json!("personal"));
    assert_eq!(data["age"], json!(36));
    assert!(!data.contains_key("company"));
    assert_eq!(reports.len(), 10);
}

#[test]
fn fixture_script_with_context() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/business_signup.json");
    let script = Script::from_path(path).expect("fixture loads");
    assert_eq!(script.context_key.as_deref(), Some("user-42"));

    let definition = shared_definition().expect("definition");
    let reports = run_script(&script, &definition, &registration_conditions(), &WizardConfig::default())
        .expect("script runs");

    assert!(matches!(&reports[3].outcome, Outcome::Denied { message } if message.contains("confirm")));
    assert_eq!(reports[4].outcome, moved("company", "confirm"));

    let Outcome::Finished { data, context } = &reports[5].outcome else { panic!("expected finish") };
    assert_eq!(data["company"], json!("Compilers Inc"));
    assert_eq!(data["newsletter"], json!(false));
    assert_eq!(data["comments"], json!("ok"));
    assert_eq!(context["agree"], json!(true));
    assert_eq!(context["full_name"], json!("Grace Hopper"));
    assert!(context.get("comments").is_none());
}

#[test]
fn non_object_request_is_rejected() {
    let definition = shared_definition().expect("definition");
    let script = Script::new(vec![json!({}), json!("continue")]);
    let err = run_script(&script, &definition, &registration_conditions(), &WizardConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "Request 1 no es un objeto JSON");
}
