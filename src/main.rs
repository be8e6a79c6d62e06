use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use tg_statusbot::{config, notifier, poller, practicum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file (optional; built-in defaults apply when absent)
    #[arg(long)]
    config: Option<PathBuf>,
}

// The appender guard must outlive main so buffered lines are flushed on exit.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn init_logging(app: &config::App) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match &app.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {path}"))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };
    let stdout_layer = app
        .log_stdout
        .then(|| tracing_subscriber::fmt::layer().with_target(false).compact());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = config::load(args.config.as_deref())?;
    init_logging(&cfg.app)?;

    let credentials = match config::Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(config::ConfigError::MissingCredentials(names)) => {
            for name in names {
                error!(credential = name, "required credential is missing or empty");
            }
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let endpoint = Url::parse(&cfg.app.endpoint).context("invalid app.endpoint URL")?;
    let api = practicum::PracticumClient::with_base_url(
        credentials.practicum_token.clone(),
        endpoint,
        Duration::from_secs(cfg.app.request_timeout_secs),
    );
    let tg = notifier::TelegramNotifier::new(&credentials.telegram_token, &credentials.chat_id)?;

    info!("starting homework status poller");
    poller::run(
        &api,
        &tg,
        Duration::from_secs(cfg.app.poll_interval_secs),
        Duration::from_secs(cfg.app.max_backoff_secs),
    )
    .await;

    Ok(())
}
