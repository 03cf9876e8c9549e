//! keycheck
//!
//! Checks that OPENAI_API_KEY and ANTHROPIC_API_KEY are set and that both
//! providers answer a minimal "Say OK" request.

use std::process::ExitCode;

use clap::Parser;
use keycheck_cli::{build_verifier, env, render, Args, Format, DEFAULT_LOG_FILTER};
use keycheck_core::Secrets;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    if args.list {
        print!("{}", render::render_check_list());
        return Ok(ExitCode::SUCCESS);
    }

    // Load environment variables before anything reads them
    let loaded = match &args.env_file {
        Some(path) => vec![env::load_env_file(path)?],
        None => env::load_default_env_files(),
    };

    // Initialize logging; stdout is reserved for the report
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    for path in &loaded {
        info!("Loaded environment from {}", path.display());
    }

    // Re-parse so KEYCHECK_* values from the env files apply
    let args = if loaded.is_empty() { args } else { Args::parse() };

    let secrets = Secrets::from_env();
    let verifier = build_verifier(&args, secrets)?;

    info!("Running {} checks", verifier.plan().len());
    let report = verifier.run().await;

    match args.format {
        Format::Text => print!("{}", render::render_text(&report)),
        Format::Json => println!("{}", render::render_json(&report)?),
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
