use shared::models::{Actor, AnalyticsEvent, AnalyticsEventCreate};
use shared::util::generate_id;

use super::AnalyticsService;
use crate::error::{MarketError, MarketResult};
use crate::store::{Query, Record, collections};
use crate::utils::validation::validate_required_text;

pub const MAX_EVENT_NAME_LEN: usize = 64;
/// Serialized size limit of an event's `data`
pub const MAX_EVENT_DATA_BYTES: usize = 4096;

impl Record for AnalyticsEvent {
    const COLLECTION: &'static str = collections::ANALYTICS_EVENTS;

    fn id(&self) -> &str {
        &self.id
    }
}

impl AnalyticsService {
    /// Append a usage event for `user`.
    ///
    /// Only malformed input is an error. A failed write is logged and
    /// dropped.
    pub async fn record_event(&self, user: &Actor, input: AnalyticsEventCreate) -> MarketResult<()> {
        validate_required_text(&input.event, "event", MAX_EVENT_NAME_LEN)?;
        let data = input.data.unwrap_or_else(|| serde_json::json!({}));
        if !data.is_object() {
            return Err(MarketError::validation("event data must be a JSON object"));
        }
        let size = data.to_string().len();
        if size > MAX_EVENT_DATA_BYTES {
            return Err(MarketError::validation(format!(
                "event data exceeds {MAX_EVENT_DATA_BYTES} bytes, got {size}"
            )));
        }

        let event = AnalyticsEvent {
            id: generate_id(),
            user_id: user.id.clone(),
            user_role: user.role,
            event: input.event.trim().to_string(),
            data,
            session_id: input.session_id,
            timestamp: self.events.now(),
        };
        match self.events.insert(&event).await {
            Ok(()) => {
                tracing::debug!(user_id = %user.id, event = %event.event, "Analytics event recorded");
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, event = %event.event, error = %e, "Analytics event dropped");
            }
        }
        Ok(())
    }

    /// Newest events first, optionally for one user
    pub async fn recent_events(
        &self,
        user_id: Option<&str>,
        limit: usize,
    ) -> MarketResult<Vec<AnalyticsEvent>> {
        let mut query = Query::new().order_by("timestamp", true).limit(limit);
        if let Some(user_id) = user_id {
            query = query.eq("user_id", user_id);
        }
        Ok(self.events.find(&query).await?.0)
    }
}
