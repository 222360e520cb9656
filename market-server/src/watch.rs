//! Change subscriptions
//!
//! A [`Subscription`] owns one background task that re-reads a value
//! whenever the managers announce a change for its key, and on a fallback
//! poll interval. The callback only fires when the value differs from the
//! last one delivered. Dropping the handle stops the task.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::MarketResult;

/// Capacity of each manager's change channel
const FEED_CAPACITY: usize = 256;

/// Broadcast of changed keys (an order id, a recipient user id, ...)
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<String>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Announce a change; no-op without listeners
    pub fn publish(&self, key: &str) {
        let _ = self.tx.send(key.to_string());
    }

    pub fn listen(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running watch; cancel with [`unsubscribe`](Self::unsubscribe) or drop
#[derive(Debug)]
pub struct Subscription {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stop delivery and wait for the watch task to exit
    pub async fn unsubscribe(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!(error = %e, "Watch task ended abnormally");
        }
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
            && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawn a watch over `key`.
///
/// `fetch` reads the current value; failures are logged and the previous
/// delivery stands. The first value is delivered immediately.
pub(crate) fn spawn_watch<T, F, Fut, C>(
    label: &'static str,
    key: String,
    feed: &ChangeFeed,
    poll_interval: Duration,
    fetch: F,
    mut callback: C,
) -> Subscription
where
    T: PartialEq + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = MarketResult<T>> + Send,
    C: FnMut(&T) + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();
    let mut changes = feed.listen();

    let task = tokio::spawn(async move {
        tracing::debug!(watch = label, key = %key, "Watch started");
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + poll_interval,
            poll_interval,
        );
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut feed_open = true;
        let mut last: Option<T> = None;

        loop {
            match fetch().await {
                Ok(value) => {
                    if last.as_ref() != Some(&value) && !cancelled.is_cancelled() {
                        callback(&value);
                        last = Some(value);
                    }
                }
                Err(e) => {
                    tracing::warn!(watch = label, key = %key, error = %e, "Watch refresh failed");
                }
            }

            // Wait for a relevant change, the next poll, or cancellation
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => {
                        tracing::debug!(watch = label, key = %key, "Watch stopped");
                        return;
                    }
                    received = changes.recv(), if feed_open => match received {
                        Ok(changed) if changed == key => break,
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(_)) => break,
                        Err(broadcast::error::RecvError::Closed) => {
                            feed_open = false;
                            continue;
                        }
                    },
                    _ = ticker.tick() => break,
                }
            }
        }
    });

    Subscription {
        token,
        task: Some(task),
    }
}
