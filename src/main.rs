use banking_event_receiver::application::ledger::Ledger;
use banking_event_receiver::application::shutdown::shutdown_channel;
use banking_event_receiver::application::worker::MessageWorker;
use banking_event_receiver::config::{RetrySchedule, WorkerConfig};
use banking_event_receiver::domain::account::{Balance, BankAccount};
use banking_event_receiver::domain::ports::QueueMessage;
use banking_event_receiver::infrastructure::in_memory::{InMemoryAccountStore, InMemoryQueue};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Optional file of transaction events to enqueue, one JSON object per line
    events: Option<PathBuf>,

    /// Accounts to seed, as <uuid>=<balance>
    #[arg(long = "seed", value_parser = parse_seed)]
    seeds: Vec<(Uuid, Decimal)>,

    /// Retry backoff delays in seconds
    #[arg(long, value_delimiter = ',', default_values_t = [5, 25, 125])]
    retry_delays: Vec<u64>,

    /// Idle poll interval in seconds
    #[arg(long, default_value_t = 10)]
    poll_interval: u64,
}

fn parse_seed(s: &str) -> Result<(Uuid, Decimal), String> {
    let (id, balance) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <uuid>=<balance>, got {s:?}"))?;
    let id = Uuid::from_str(id).map_err(|e| e.to_string())?;
    let balance = Decimal::from_str(balance).map_err(|e| e.to_string())?;
    Ok((id, balance))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let store = Arc::new(InMemoryAccountStore::new());
    for (id, balance) in cli.seeds {
        store
            .seed(BankAccount::with_balance(id, Balance::new(balance)))
            .await;
    }

    let queue = Arc::new(InMemoryQueue::new());
    if let Some(path) = cli.events {
        let events = std::fs::read_to_string(path).into_diagnostic()?;
        for line in events.lines().filter(|l| !l.trim().is_empty()) {
            queue.enqueue(QueueMessage::new(line)).await;
        }
    }

    let config = WorkerConfig {
        retry_schedule: RetrySchedule::from_secs(&cli.retry_delays),
        poll_interval: Duration::from_secs(cli.poll_interval),
    };
    let worker = MessageWorker::new(queue, Ledger::new(store), config);

    let (sender, token) = shutdown_channel();
    let handle = tokio::spawn(async move { worker.run(token).await });

    tokio::signal::ctrl_c().await.into_diagnostic()?;
    sender.shutdown();
    handle.await.into_diagnostic()?;

    Ok(())
}
