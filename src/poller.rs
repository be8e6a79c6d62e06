//! The poll loop: fetch, validate, format, dedupe, notify, sleep.
use chrono::Utc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::notifier::Notifier;
use crate::practicum::{self, FetchError, StatusApi, ValidationError};
use crate::status::{self, FormatError};

/// Anything that can go wrong before the notify step of one cycle. The loop
/// converts it into the user-facing failure sentence; it never escapes.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// The only state surviving across cycles.
#[derive(Debug)]
pub struct PollState {
    pub cursor: i64,
    pub last_message: String,
    pub consecutive_failures: u32,
}

impl PollState {
    pub fn new(cursor: i64) -> Self {
        Self {
            cursor,
            last_message: String::new(),
            consecutive_failures: 0,
        }
    }
}

/// One fetch→validate→format pass. `Ok(None)` means the server reported no
/// homeworks in the polled window. The newest homework is the first element.
async fn next_message(
    api: &dyn StatusApi,
    cursor: i64,
) -> Result<(Option<String>, Option<i64>), CycleError> {
    let raw = api.fetch(cursor).await?;
    let response = practicum::validate(&raw)?;
    let message = match response.homeworks.first() {
        Some(homework) => Some(status::parse_status(homework)?),
        None => None,
    };
    Ok((message, response.current_date))
}

async fn send_deduped(notifier: &dyn Notifier, state: &mut PollState, message: &str) {
    if message == state.last_message {
        debug!("message unchanged; skipping notification");
        return;
    }
    match notifier.notify(message).await {
        Ok(()) => {
            info!(message, "notification delivered");
            state.last_message = message.to_string();
        }
        // Left last_message untouched so the next cycle retries delivery.
        Err(err) => error!(%err, "failed to deliver notification"),
    }
}

/// Run one poll cycle against the loop state. Failures are contained here:
/// they are reported through the notifier as the generic failure sentence and
/// counted in `state.consecutive_failures` for backoff.
pub async fn run_cycle(api: &dyn StatusApi, notifier: &dyn Notifier, state: &mut PollState) {
    match next_message(api, state.cursor).await {
        Ok((found, current_date)) => {
            match found {
                Some(message) => send_deduped(notifier, state, &message).await,
                None => debug!("no new homework status in the polled window"),
            }
            if let Some(ts) = current_date {
                state.cursor = ts;
            }
            state.consecutive_failures = 0;
        }
        Err(err) => {
            error!(%err, "poll cycle failed");
            let message = format!("Сбой в работе программы: {err}");
            send_deduped(notifier, state, &message).await;
            state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        }
    }
}

/// Sleep duration after a cycle: the fixed interval normally, doubling per
/// consecutive failure beyond the first, capped at `max_backoff`.
fn backoff_delay(interval: Duration, max_backoff: Duration, failures: u32) -> Duration {
    if failures <= 1 {
        return interval;
    }
    let factor = 1u32 << (failures - 1).min(6);
    interval.saturating_mul(factor).min(max_backoff)
}

/// Poll until the process is terminated. The cursor starts at process start
/// time and follows the server-provided `current_date` afterwards.
pub async fn run(
    api: &dyn StatusApi,
    notifier: &dyn Notifier,
    interval: Duration,
    max_backoff: Duration,
) {
    let mut state = PollState::new(Utc::now().timestamp());
    loop {
        run_cycle(api, notifier, &mut state).await;
        let delay = backoff_delay(interval, max_backoff, state.consecutive_failures);
        debug!(seconds = delay.as_secs(), "sleeping until next poll");
        tokio::time::sleep(delay).await;
    }
}
