use anyhow::{Context, Result};
use statement_analyzer::{run_batch, AnalyzerConfig, StatementInput};
use std::io::Write;

fn main() -> Result<()> {
    // 1. Load .env, init tracing (stderr, so stdout carries only the report)
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // 2. Configuration
    let config = AnalyzerConfig::from_env().context("Failed to load analyzer configuration")?;
    let pipeline = config.build_pipeline()?;

    // 3. Input batch
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("STATEMENTS_PATH").ok())
        .context("Usage: statement-analyzer <statements.json> (or set STATEMENTS_PATH)")?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read statements from {path}"))?;
    let inputs: Vec<StatementInput> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse statements from {path}"))?;

    // 4. Analyze and emit
    let report = run_batch(&pipeline, &inputs, config.threads)?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report).context("Failed to write report")?;
    writeln!(stdout)?;
    Ok(())
}
