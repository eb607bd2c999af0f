use std::path::PathBuf;

use admission_form::{AdmissionForm, FormConfig, LoggingSubmitter};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod input;

use input::{ApplicationInput, SubmitReport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "admission_cli=debug,admission_form=debug,admission_core=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: admission-cli <application.json>")?;

    let config = FormConfig::from_env();
    tracing::info!(
        max_document_size_bytes = config.max_document_size_bytes,
        scan_delay = ?config.document_scan_delay,
        "Admission form runner starting"
    );

    let input = ApplicationInput::load(&path)?;
    let mut form = AdmissionForm::new();
    input.apply(&mut form, &config.scanner()).await?;

    let outcome = form.submit(&LoggingSubmitter).await;
    let report = SubmitReport::new(&outcome, &form);
    for (field, message) in report.errors.iter() {
        tracing::warn!(field, message, "Field rejected");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
