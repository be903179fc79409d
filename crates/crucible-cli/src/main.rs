use anyhow::{Context, Result};
use clap::Parser;
use crucible_core::{CodeExecutionEngine, CodeExecutor, ExecutionRequest, ExecutorConfig};
use log::LevelFilter;
use tokio::io::AsyncReadExt;

#[derive(Parser, Debug)]
#[clap(
    name = "Crucible",
    author,
    version = "0.1.0",
    about = "Crucible code execution engine"
)]
struct Cli {
    #[clap(
        long,
        short,
        default_value = "crucible.yaml",
        help = "Path to the engine configuration file"
    )]
    config: String,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(help = "Path to a JSON execution request, or '-' to read it from stdin")]
    request: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::Info);
    env_logger::Builder::new().filter_level(level).init();

    let config = ExecutorConfig::from_file(&cli.config)
        .await
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;

    let raw_request = if cli.request == "-" {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .context("failed to read the request from stdin")?;
        buffer
    } else {
        tokio::fs::read_to_string(&cli.request)
            .await
            .with_context(|| format!("failed to read the request from {}", cli.request))?
    };
    let request: ExecutionRequest =
        serde_json::from_str(&raw_request).context("the request is not valid JSON")?;

    let engine = CodeExecutionEngine::from_config(config)?;
    let result = engine.process(request).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
