//! Surplus Item Model

use serde::{Deserialize, Serialize};

use super::order::{Quality, Unit};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurplusStatus {
    #[default]
    Available,
    Reserved,
    PartiallySold,
    Sold,
    Expired,
    Withdrawn,
}

impl SurplusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurplusStatus::Available => "available",
            SurplusStatus::Reserved => "reserved",
            SurplusStatus::PartiallySold => "partially_sold",
            SurplusStatus::Sold => "sold",
            SurplusStatus::Expired => "expired",
            SurplusStatus::Withdrawn => "withdrawn",
        }
    }

    /// Read-only statuses: no reservation or withdrawal applies any more
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            SurplusStatus::Sold | SurplusStatus::Expired | SurplusStatus::Withdrawn
        )
    }
}

/// A buyer's claim on part of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub buyer_id: String,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub quantity: f64,
    pub reserved_at: i64,
    pub expires_at: i64,
}

/// Surplus listing entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurplusItem {
    pub id: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub vendor_phone: String,
    pub location: String,
    pub address: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub quality: Quality,
    pub unit: Unit,
    /// Fixed at creation
    pub original_quantity: f64,
    pub remaining_quantity: f64,
    pub price: f64,
    pub original_price: f64,
    pub discount_percentage: i32,
    pub min_quantity: f64,
    pub max_quantity: f64,
    pub status: SurplusStatus,
    pub reservations: Vec<Reservation>,
    pub expires_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SurplusItem {
    /// Status as displayed and queried: `expired` wins once `now` passes `expires_at`
    pub fn effective_status(&self, now: i64) -> SurplusStatus {
        if now > self.expires_at {
            SurplusStatus::Expired
        } else {
            self.status
        }
    }
}

/// Create listing payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurplusCreate {
    /// Caller-chosen id, makes a retried create idempotent
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub quality: Option<Quality>,
    pub unit: Unit,
    pub quantity: f64,
    pub price: f64,
    pub original_price: Option<f64>,
    pub min_quantity: Option<f64>,
    pub max_quantity: Option<f64>,
    pub location: String,
    pub address: Option<String>,
    /// Expiry as Unix milliseconds
    pub expiry_date: i64,
}

/// Reserve request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub quantity: f64,
    pub expires_at: Option<i64>,
}

/// Listing filters; `status` is matched against the effective status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurplusFilters {
    pub location: Option<String>,
    pub category: Option<String>,
    pub status: Option<SurplusStatus>,
    pub vendor_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(status: SurplusStatus, expires_at: i64) -> SurplusItem {
        SurplusItem {
            id: "s1".into(),
            vendor_id: "v1".into(),
            vendor_name: "Ravi".into(),
            vendor_phone: "+919800000001".into(),
            location: "Pune".into(),
            address: None,
            name: "Tomatoes".into(),
            description: None,
            category: "vegetables".into(),
            quality: Quality::Standard,
            unit: Unit::Kg,
            original_quantity: 10.0,
            remaining_quantity: 10.0,
            price: 20.0,
            original_price: 25.0,
            discount_percentage: 20,
            min_quantity: 1.0,
            max_quantity: 10.0,
            status,
            reservations: vec![],
            expires_at,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_effective_status_expiry_supersedes() {
        let item = listing(SurplusStatus::PartiallySold, 1_000);
        assert_eq!(item.effective_status(999), SurplusStatus::PartiallySold);
        assert_eq!(item.effective_status(1_000), SurplusStatus::PartiallySold);
        assert_eq!(item.effective_status(1_001), SurplusStatus::Expired);

        let sold = listing(SurplusStatus::Sold, 1_000);
        assert_eq!(sold.effective_status(2_000), SurplusStatus::Expired);
    }

    #[test]
    fn test_closed_statuses() {
        assert!(SurplusStatus::Sold.is_closed());
        assert!(SurplusStatus::Withdrawn.is_closed());
        assert!(SurplusStatus::Expired.is_closed());
        assert!(!SurplusStatus::PartiallySold.is_closed());
        assert_eq!(SurplusStatus::PartiallySold.as_str(), "partially_sold");
    }
}
