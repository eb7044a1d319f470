use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use newsverify_common::Config;
use newsverify_pipeline::Verifier;

#[derive(Parser)]
#[command(name = "verify", about = "Verify the factual claims of a news article")]
struct Cli {
    /// Article URL. Prompted for on stdin when omitted.
    url: Option<String>,

    /// Pretty-print the JSON outcome
    #[arg(long)]
    pretty: bool,
}

fn prompt_for_url() -> Result<String> {
    print!("Enter news article URL: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read URL from stdin")?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the JSON outcome.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("newsverify=info".parse()?))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let url = match cli.url {
        Some(url) => url.trim().to_string(),
        None => prompt_for_url()?,
    };
    if url.is_empty() {
        bail!("Please enter a valid article URL.");
    }

    let verifier = Verifier::from_config(&config)?;
    info!(url = url.as_str(), "Running verification");
    let outcome = verifier.verify_article(&url).await;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{json}");
    Ok(())
}
