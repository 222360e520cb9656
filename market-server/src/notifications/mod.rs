//! Notification Manager
//!
//! Notifications are immutable apart from their read and archived flags.
//! Every write publishes the recipient's user id on the change feed, which
//! is what wakes [`subscribe`](NotificationManager::subscribe) watches.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shared::models::{
    Channel, Notification, NotificationCreate, NotificationFilters, NotificationPage,
};
use shared::util::generate_id;

use crate::error::{MarketError, MarketResult};
use crate::store::{
    BatchOp, Collection, DocumentStore, MAX_CAS_ATTEMPTS, Query, Record, StoreError, collections,
};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::watch::{ChangeFeed, Subscription, spawn_watch};

pub const DEFAULT_PAGE_LIMIT: usize = 50;
/// Unread notifications delivered to a subscriber
pub const SUBSCRIPTION_LIMIT: usize = 10;
/// Longest accepted notification body
const MAX_MESSAGE_LEN: usize = 2000;

impl Record for Notification {
    const COLLECTION: &'static str = collections::NOTIFICATIONS;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct NotificationManager {
    notifications: Collection<Notification>,
    feed: ChangeFeed,
    poll_interval: Duration,
}

impl std::fmt::Debug for NotificationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationManager")
            .field("store", &self.notifications.store().backend())
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl NotificationManager {
    pub fn new(store: Arc<dyn DocumentStore>, poll_interval: Duration) -> Self {
        Self {
            notifications: Collection::new(store),
            feed: ChangeFeed::new(),
            poll_interval,
        }
    }

    /// Store a new unread notification
    pub async fn create(&self, data: NotificationCreate) -> MarketResult<Notification> {
        validate_required_text(&data.user_id, "user_id", MAX_NAME_LEN)?;
        validate_required_text(&data.title, "title", MAX_NAME_LEN)?;
        validate_required_text(&data.message, "message", MAX_MESSAGE_LEN)?;

        let channels = if data.channels.is_empty() {
            vec![Channel::App]
        } else {
            data.channels
        };
        let notification = Notification {
            id: generate_id(),
            user_id: data.user_id,
            user_role: data.user_role,
            kind: data.kind,
            category: data.category,
            title: data.title,
            message: data.message,
            data: data.data,
            priority: data.priority,
            channels,
            related_entity_id: data.related_entity_id,
            related_entity_type: data.related_entity_type,
            is_read: false,
            is_archived: false,
            created_at: self.notifications.now(),
            read_at: None,
        };

        self.notifications.insert(&notification).await?;
        self.feed.publish(&notification.user_id);
        tracing::debug!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            kind = notification.kind.as_str(),
            "Notification created"
        );
        Ok(notification)
    }

    pub async fn get(&self, notification_id: &str) -> MarketResult<Notification> {
        Ok(self.notifications.require(notification_id).await?.record)
    }

    /// Newest first. `unread_count` ignores the filters.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        filters: &NotificationFilters,
    ) -> MarketResult<NotificationPage> {
        let limit = filters.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = filters.offset.unwrap_or(0);

        let mut query = Query::new()
            .eq("user_id", user_id)
            .order_by("created_at", true)
            .offset(offset)
            .limit(limit);
        if let Some(kind) = filters.kind {
            query = query.eq("type", kind.as_str());
        }
        if let Some(is_read) = filters.is_read {
            query = query.eq("is_read", is_read);
        }
        if !filters.include_archived {
            query = query.eq("is_archived", false);
        }

        let (notifications, total) = self.notifications.find(&query).await?;
        let unread_count = self.unread_count(user_id).await?;
        Ok(NotificationPage {
            has_more: offset + notifications.len() < total,
            notifications,
            total,
            unread_count,
        })
    }

    pub async fn unread_count(&self, user_id: &str) -> MarketResult<usize> {
        let query = Query::new()
            .eq("user_id", user_id)
            .eq("is_read", false)
            .limit(0);
        let (_, total) = self.notifications.find(&query).await?;
        Ok(total)
    }

    pub async fn mark_read(&self, notification_id: &str) -> MarketResult<Notification> {
        let (notification, changed) = self
            .notifications
            .modify(notification_id, |n, now| {
                if n.is_read {
                    return Ok::<_, MarketError>(false);
                }
                n.is_read = true;
                n.read_at = Some(now);
                Ok(true)
            })
            .await?;
        if changed {
            self.feed.publish(&notification.user_id);
        }
        Ok(notification)
    }

    /// Mark every unread notification of `user_id` read in one batch.
    ///
    /// Each update is conditional on the version that was read; if anything
    /// changed in between, the whole batch is dropped and rebuilt.
    pub async fn mark_all_read(&self, user_id: &str) -> MarketResult<usize> {
        let unread = Query::new().eq("user_id", user_id).eq("is_read", false);

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let pending = self.notifications.find_versioned(&unread).await?;
            if pending.is_empty() {
                return Ok(0);
            }

            let now = self.notifications.now();
            let ops: Vec<BatchOp> = pending
                .iter()
                .map(|v| {
                    BatchOp::update(
                        collections::NOTIFICATIONS,
                        &v.record.id,
                        json!({ "is_read": true, "read_at": now }),
                        Some(v.version),
                    )
                })
                .collect();

            match self.notifications.store().atomic_batch(ops).await {
                Ok(()) => {
                    self.feed.publish(user_id);
                    tracing::info!(user_id = %user_id, count = pending.len(), "Marked all notifications read");
                    return Ok(pending.len());
                }
                Err(StoreError::VersionConflict { .. } | StoreError::NotFound { .. }) => {
                    tracing::debug!(user_id = %user_id, attempt, "Batch conflicted, rebuilding");
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::Contended {
            collection: collections::NOTIFICATIONS.to_string(),
            id: user_id.to_string(),
            attempts: MAX_CAS_ATTEMPTS,
        }
        .into())
    }

    pub async fn archive(&self, notification_id: &str) -> MarketResult<Notification> {
        let (notification, ()) = self
            .notifications
            .modify(notification_id, |n, _| {
                n.is_archived = true;
                Ok::<_, MarketError>(())
            })
            .await?;
        self.feed.publish(&notification.user_id);
        Ok(notification)
    }

    /// Latest unread notifications, newest first
    pub async fn latest_unread(&self, user_id: &str) -> MarketResult<Vec<Notification>> {
        let query = Query::new()
            .eq("user_id", user_id)
            .eq("is_read", false)
            .order_by("created_at", true)
            .limit(SUBSCRIPTION_LIMIT);
        Ok(self.notifications.find(&query).await?.0)
    }

    /// Deliver the user's unread set now and whenever it changes
    pub fn subscribe<F>(&self, user_id: &str, mut callback: F) -> Subscription
    where
        F: FnMut(&[Notification]) + Send + 'static,
    {
        let manager = self.clone();
        let uid = user_id.to_string();
        spawn_watch(
            "notifications",
            user_id.to_string(),
            &self.feed,
            self.poll_interval,
            move || {
                let manager = manager.clone();
                let uid = uid.clone();
                async move { manager.latest_unread(&uid).await }
            },
            move |unread: &Vec<Notification>| callback(unread),
        )
    }
}

#[cfg(test)]
mod tests;
