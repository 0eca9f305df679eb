//! Attrition Risk Engine - Main Entry Point
//!
//! Loads the HR dataset, trains the attrition model, reports its hold-out
//! performance and scores two example employee profiles.

use anyhow::{Context, Result};
use attrition_risk::{
    config::{AppConfig, LoggingConfig},
    loader::DataLoader,
    models::inference::PredictionEngine,
    overview::DataOverview,
    training::ModelTrainer,
    types::form::{EmployeeForm, FormSchema},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load configuration before logging so the level and format apply
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("Starting Attrition Risk Engine");
    info!(
        data = %config.data.path.display(),
        test_size = config.training.test_size,
        seed = config.training.random_seed,
        solver = ?config.training.solver,
        "Configuration loaded successfully"
    );

    let loader = DataLoader::new();
    let table = loader
        .load(&config.data.path)
        .with_context(|| format!("Failed to load dataset {}", config.data.path.display()))?;

    DataOverview::from_table(&table)
        .context("Failed to summarise dataset")?
        .log_summary();

    let trainer = ModelTrainer::new(config.training.clone());
    let outcome = trainer.train(&table).context("Failed to train attrition model")?;
    outcome.metrics.print_summary();

    let schema = FormSchema::from_table(&outcome.cleaned)?;
    info!(
        job_roles = schema.job_roles.len(),
        departments = schema.departments.len(),
        income_min = schema.monthly_income.min,
        income_max = schema.monthly_income.max,
        "Prediction form ready"
    );

    let engine = PredictionEngine::new(outcome.clone())?;
    let default_form = EmployeeForm::from_dataset(&outcome.cleaned)?;
    let example_form = default_form.clone().with_high_risk_example();

    for (name, form) in [("dataset defaults", &default_form), ("high-risk example", &example_form)] {
        let assessment = engine
            .assess(form)
            .with_context(|| format!("Failed to assess {name}"))?;
        info!(
            profile = name,
            label = %assessment.label,
            "{}",
            assessment.probability_display()
        );
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    }

    Ok(())
}

/// Install the global subscriber from the logging section
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("attrition_risk={}", logging.level).parse()?);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
