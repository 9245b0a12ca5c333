//! Entry point for the `daily-dispatch` binary
//!
//! Wires the real directory, provider and Slack clients into the run
//! coordinator and performs a single run.

use std::path::PathBuf;

use clap::Parser;

use coordinator::services::{FileDirectory, PostgrestDirectory, SlackMessenger};
use coordinator::{
    CoordinatorResult, DirectoryClient, DirectorySettings, DirectorySource, DispatchConfig, Messenger,
    RunCoordinator, RunOptions, RunReport, RunStatus,
};
use generator::{ContentGenerator, LlmContentGenerator, OpenAiCompatibleProvider};
use shared::logging;

/// Generates today's learning content and sends it to every subscriber
#[derive(Parser)]
#[command(name = "daily-dispatch")]
#[command(about = "Generates daily language-learning content and delivers it over Slack")]
pub struct Args {
    /// Only deliver to the subscriber with this Slack user id
    #[arg(long)]
    pub uid: Option<String>,

    /// Read subscribers from a JSON file instead of the hosted store
    #[arg(long)]
    pub subscribers_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Number of keys generated at the same time
    #[arg(long)]
    pub generation_concurrency: Option<usize>,

    /// Number of messages in flight at the same time
    #[arg(long)]
    pub dispatch_concurrency: Option<usize>,
}

const SCOPE: &str = "daily-dispatch";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init_tracing(Some(&args.log_level));

    let source = match &args.subscribers_file {
        Some(path) => DirectorySource::File(path.clone()),
        None => DirectorySource::Postgrest,
    };

    let config = DispatchConfig::from_env(source).map_err(|e| {
        logging::log_error(&SCOPE, "Configuration", &e);
        e
    })?;

    let mut options = config.options;
    if let Some(n) = args.generation_concurrency {
        options.generation_concurrency = n;
    }
    if let Some(n) = args.dispatch_concurrency {
        options.dispatch_concurrency = n;
    }

    tracing::debug!(
        provider = %config.provider.provider,
        model = %config.provider.model,
        policy = ?options.policy,
        generation_concurrency = options.generation_concurrency,
        dispatch_concurrency = options.dispatch_concurrency,
        "Configuration loaded"
    );

    let generator = LlmContentGenerator::new(OpenAiCompatibleProvider::new(config.provider.clone())?);
    let messenger = SlackMessenger::new(config.messenger.clone())?;
    let target = args.uid.as_deref();

    let report = match config.directory {
        DirectorySettings::Postgrest { url, api_key, timeout } => {
            let directory = PostgrestDirectory::new(url, api_key, timeout)?;
            run_with(directory, generator, messenger, options, target).await?
        }
        DirectorySettings::File(path) => {
            run_with(FileDirectory::new(path), generator, messenger, options, target).await?
        }
    };

    // Per-subscriber failures are already logged one by one; the run itself completed
    if let RunStatus::NoMatchingSubscriber { target } = &report.status {
        logging::log_progress(&report.run_id, "No delivery", &format!("recipient {target} is not subscribed"));
    }

    Ok(())
}

async fn run_with<D, G, M>(
    directory: D,
    generator: G,
    messenger: M,
    options: RunOptions,
    target: Option<&str>,
) -> CoordinatorResult<RunReport>
where
    D: DirectoryClient,
    G: ContentGenerator,
    M: Messenger,
{
    RunCoordinator::new(directory, generator, messenger, options)
        .run(target)
        .await
}
