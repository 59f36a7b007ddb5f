use crate::agent::{AgentInner, SyncAgent};
use std::sync::Weak;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Registry entry for the poll currently attached to a key
#[derive(Debug)]
pub(crate) struct ActivePoll {
    pub(crate) id: u64,
    pub(crate) token: CancellationToken,
}

/// Handle to a periodic poll started by [`SyncAgent::subscribe`].
///
/// Dropping the handle leaves the poll running; it stops on
/// [`Subscription::unsubscribe`], when the key is subscribed again, or when
/// the agent shuts down.
#[derive(Debug)]
pub struct Subscription {
    key: String,
    id: u64,
    token: CancellationToken,
    agent: Weak<AgentInner>,
}

impl Subscription {
    pub(crate) fn new(key: String, id: u64, token: CancellationToken, agent: Weak<AgentInner>) -> Self {
        Self {
            key,
            id,
            token,
            agent,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// False once the poll has been cancelled by any means.
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Stop the poll.
    pub fn unsubscribe(self) {
        self.token.cancel();
        if let Some(inner) = self.agent.upgrade() {
            inner.remove_subscription(&self.key, self.id);
        }
        debug!(key = %self.key, "Unsubscribed");
    }
}

/// Run the poll loop for one subscription until its token is cancelled or
/// the agent is gone. The first tick fires one full period after start.
pub(crate) fn spawn_poll<F>(
    agent: Weak<AgentInner>,
    key: String,
    id: u64,
    token: CancellationToken,
    period: Duration,
    callback: F,
) where
    F: Fn(serde_json::Value) + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(inner) = agent.upgrade() else { break };
                    let handle = SyncAgent::from_inner(inner);
                    if !handle.is_online() {
                        trace!(key = %key, "Offline - skipping poll");
                        continue;
                    }

                    match handle.load(&key).await {
                        Ok(Some(value)) => callback(value),
                        Ok(None) => trace!(key = %key, "Poll found no value"),
                        Err(e) => warn!(key = %key, error = %e, "Poll failed"),
                    }
                }
            }
        }

        debug!(key = %key, "Subscription poll stopped");
        if let Some(inner) = agent.upgrade() {
            inner.remove_subscription(&key, id);
        }
    });
}
