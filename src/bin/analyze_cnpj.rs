//! Command-line analysis of a single CNPJ.
//!
//! Usage: `analyze_cnpj [CNPJ]`. Without an argument the CNPJ is read from stdin.

use rust_cnpj_risk_api::config::Config;
use rust_cnpj_risk_api::pipeline::{AnalysisOutcome, AnalysisPipeline};
use rust_cnpj_risk_api::presentation::render_outcome;
use std::io::{self, BufRead, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn read_cnpj() -> anyhow::Result<String> {
    if let Some(arg) = std::env::args().nth(1) {
        return Ok(arg);
    }

    print!("CNPJ: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the report on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_cnpj_risk_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env()?;
    let cnpj = read_cnpj()?;
    if cnpj.is_empty() {
        anyhow::bail!("No CNPJ given");
    }

    let pipeline = AnalysisPipeline::from_config(&config)?;
    let outcome = pipeline.run(&cnpj).await;

    println!("{}", render_outcome(&outcome, config.locale));

    if !matches!(outcome, AnalysisOutcome::Completed(_)) {
        std::process::exit(1);
    }
    Ok(())
}
