//! Outbound messaging (WhatsApp/SMS style)
//!
//! Nothing is delivered: [`LogMessageSender`] records the message in the
//! log and hands back a receipt. Order updates send through
//! [`send_detached`] so a failed send never touches the order.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MarketResult;
use crate::utils::validation::validate_phone;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub message_id: String,
    pub status: String,
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, phone: &str, text: &str) -> MarketResult<MessageReceipt>;
}

#[derive(Debug, Clone, Default)]
pub struct LogMessageSender;

#[async_trait]
impl MessageSender for LogMessageSender {
    async fn send(&self, phone: &str, text: &str) -> MarketResult<MessageReceipt> {
        validate_phone(phone)?;
        let receipt = MessageReceipt {
            message_id: format!("wa_{}", uuid::Uuid::new_v4().simple()),
            status: "sent".to_string(),
        };
        tracing::info!(
            target: "messaging",
            message_id = %receipt.message_id,
            phone = %phone,
            chars = text.chars().count(),
            "Message queued"
        );
        Ok(receipt)
    }
}

/// Fire-and-forget send; failures are logged only
pub fn send_detached(sender: Arc<dyn MessageSender>, phone: String, text: String) {
    tokio::spawn(async move {
        if let Err(e) = sender.send(&phone, &text).await {
            tracing::warn!(phone = %phone, error = %e, "Message send failed");
        }
    });
}
