use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use idea_pulse_common::Config;
use idea_pulse_worker::traits::TokioClock;
use idea_pulse_worker::{HarvestJob, Scheduler, Targets};
use reddit_client::RedditClient;
use supabase_client::SupabaseClient;

#[derive(Parser)]
#[command(name = "idea-pulse", about = "Harvests startup ideas and pain points from Reddit into Supabase")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one harvest pass and exit
    Run,
    /// Run a harvest now and then every interval, forever (default)
    Schedule,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("idea_pulse=info".parse()?))
        .init();

    let cli = Cli::parse();

    info!("Idea Pulse worker starting...");

    // Load config; any missing credential stops the process here
    let config = Config::from_env().context("Failed to load configuration")?;

    let reddit = RedditClient::new(
        &config.reddit_client_id,
        &config.reddit_client_secret,
        &config.reddit_user_agent,
    )
    .context("Failed to build Reddit client")?;
    let supabase = SupabaseClient::new(&config.supabase_url, &config.supabase_service_key)
        .context("Failed to build Supabase client")?;
    let clock = Arc::new(TokioClock);

    let job = HarvestJob::new(
        Arc::new(reddit),
        Arc::new(supabase),
        clock.clone(),
        Targets::default(),
        &config.supabase_table,
        config.result_limit,
    );
    let mut scheduler = Scheduler::new(Arc::new(job), clock, config.interval);

    match cli.command.unwrap_or(Command::Schedule) {
        Command::Run => {
            // Job failures are logged inside the scheduler and never change the exit code
            let _ = scheduler.tick().await;
            info!("Idea Pulse worker completed");
        }
        Command::Schedule => {
            info!("Running initial Reddit data collection");
            scheduler.run().await;
        }
    }

    Ok(())
}
