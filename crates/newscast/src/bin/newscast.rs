use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use newscast::{
    openai::OpenAIClient, tracing::init_tracing_subscriber, AvatarRenderer, Config, DidClient,
    NewsScraper, NewscastProcessor, ProgressEvent,
};

#[derive(Parser)]
#[command(name = "newscast", about = "News headlines to avatar video generator")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline once and print the result as JSON
    Run,
    /// Run the pipeline, printing one JSON progress event per line
    Stream,
    /// Show the state of a render job
    Status { talk_id: String },
    /// Delete a rendered video
    Delete { talk_id: String },
}

type Processor = NewscastProcessor<NewsScraper, OpenAIClient, DidClient>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let config = cli.config.validate()?;

    match cli.command {
        Command::Run => {
            tracing::info!(article_count = config.article_count, "Running pipeline once...");
            let processor = Processor::from_config(&config)?;
            let run = processor.run(config.article_count).await?;
            println!("{}", serde_json::to_string_pretty(&run)?);
        }
        Command::Stream => {
            let processor = Arc::new(Processor::from_config(&config)?);
            let mut events = processor.run_with_progress(config.article_count);
            let mut failed = false;

            while let Some(event) = events.next().await {
                failed |= matches!(event, ProgressEvent::Error { .. });
                println!("{}", serde_json::to_string(&event)?);
            }

            if failed {
                anyhow::bail!("News video generation failed");
            }
        }
        Command::Status { talk_id } => {
            let did = DidClient::from_config(&config)?;
            let job = did
                .poll(&talk_id)
                .await
                .with_context(|| format!("Failed to fetch status for {talk_id}"))?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }
        Command::Delete { talk_id } => {
            let did = DidClient::from_config(&config)?;
            let deleted = did.delete(&talk_id).await;
            println!("{}", serde_json::json!({ "deleted": deleted }));
            if !deleted {
                anyhow::bail!("Failed to delete video {talk_id}");
            }
        }
    }

    Ok(())
}
