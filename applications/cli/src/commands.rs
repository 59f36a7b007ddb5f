//! Command implementations.
//!
//! Each command returns the value `main` prints, so they can be driven
//! directly from tests.

use crate::error::{CliError, Result};
use serde_json::Value;
use tether_sync::{AgentStatus, FlushReport, SaveOutcome, SyncAgent};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Parse `raw` as JSON and save it under `key`.
pub async fn save(agent: &SyncAgent, key: &str, raw: &str) -> Result<SaveOutcome> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(agent.save(key, value).await?)
}

pub async fn load(agent: &SyncAgent, key: &str) -> Result<Option<Value>> {
    Ok(agent.load(key).await?)
}

pub fn status(agent: &SyncAgent) -> AgentStatus {
    agent.status()
}

/// Push queued writes now instead of waiting for a reconnect.
pub async fn flush(agent: &SyncAgent) -> Result<FlushReport> {
    if !agent.is_online() {
        return Err(CliError::Offline(
            "nothing can be flushed; drop --offline or check the remote URL".to_string(),
        ));
    }
    Ok(agent.flush_pending_sync().await)
}

/// Emit the current value of `key`, then every polled value, until `stop`
/// is cancelled.
pub async fn watch<F>(agent: &SyncAgent, key: &str, stop: CancellationToken, emit: F) -> Result<()>
where
    F: Fn(Value) + Send + Sync + 'static,
{
    if let Some(value) = agent.load(key).await? {
        emit(value);
    }

    let subscription = agent.subscribe(key, emit);
    info!(key = %key, "Watching for changes");

    stop.cancelled().await;
    subscription.unsubscribe();
    Ok(())
}

/// Render a value for stdout.
pub fn render<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}
