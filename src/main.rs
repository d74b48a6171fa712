use anyhow::{Context, Result};
use log::info;
use wizard_core::WizardConfig;

use formwizard::registration::{builtin_requests, registration_conditions, shared_definition};
use formwizard::{run_script, Outcome, Script};

fn main() -> Result<()> {
    env_logger::init();
    let config = WizardConfig::from_env();

    // CLI mínima: `formwizard [--json] [<script.json>]`
    let args: Vec<String> = std::env::args().skip(1).collect();
    let json_output = args.iter().any(|a| a == "--json");
    let script = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => Script::from_path(path).with_context(|| format!("loading script {path}"))?,
        None => Script::new(builtin_requests()),
    };

    let definition = shared_definition()?;
    info!("running {} request(s) against wizard '{}' (definition {})",
          script.requests.len(),
          definition.name,
          definition.definition_hash);
    let reports = run_script(&script, &definition, &registration_conditions(), &config)?;

    for report in &reports {
        if json_output {
            println!("{}", serde_json::to_string(report)?);
            continue;
        }
        match &report.outcome {
            Outcome::Moved { from, to } => println!("[{}] {from} -> {to}", report.index),
            Outcome::Stayed { step } => println!("[{}] stay on {step}", report.index),
            Outcome::Invalid { step, errors } => {
                println!("[{}] {step} rejected:", report.index);
                for e in errors {
                    println!("      {}: {}", e.field, e.message);
                }
            }
            Outcome::Denied { message } => println!("[{}] denied: {message}", report.index),
            Outcome::Finished { data, .. } => {
                println!("[{}] finished with {} field(s):", report.index, data.len());
                println!("{}", serde_json::to_string_pretty(data)?);
            }
        }
    }
    Ok(())
}
