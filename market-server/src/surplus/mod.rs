//! Surplus Manager
//!
//! A listing's `remaining_quantity` only ever goes down, through
//! reservations. The quantity check, the decrement, the status
//! recomputation and the reservation append are one compare-and-swap
//! write, so two buyers can never take the same units.
//!
//! Once `expires_at` has passed a listing reads as `expired` regardless of
//! its stored status; `get_item` and `list_items` report that effective
//! status.

use std::sync::Arc;
use std::time::Duration;

use shared::models::{
    Actor, Page, Quality, Reservation, SurplusCreate, SurplusFilters, SurplusItem, SurplusStatus,
};
use shared::util::{child_id, generate_id};

use crate::error::{MarketError, MarketResult};
use crate::money;
use crate::store::{Collection, DocumentStore, Query, Record, collections};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_LOCATION_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MIN_LOCATION_LEN,
    validate_optional_text, validate_required_text, validate_text_length,
};

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const DEFAULT_MIN_QUANTITY: f64 = 1.0;

impl Record for SurplusItem {
    const COLLECTION: &'static str = collections::SURPLUS;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct SurplusManager {
    items: Collection<SurplusItem>,
    reservation_hold: Duration,
}

impl std::fmt::Debug for SurplusManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurplusManager")
            .field("store", &self.items.store().backend())
            .field("reservation_hold", &self.reservation_hold)
            .finish()
    }
}

impl SurplusManager {
    pub fn new(store: Arc<dyn DocumentStore>, reservation_hold: Duration) -> Self {
        Self {
            items: Collection::new(store),
            reservation_hold,
        }
    }

    pub async fn create_surplus_item(
        &self,
        data: SurplusCreate,
        vendor: &Actor,
    ) -> MarketResult<String> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&data.category, "category", MAX_NAME_LEN)?;
        validate_text_length(&data.location, "location", MIN_LOCATION_LEN, MAX_LOCATION_LEN)?;
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
        money::validate_surplus_amounts(&data)?;

        let now = self.items.now();
        if data.expiry_date <= now {
            return Err(MarketError::validation("expiry_date must be in the future"));
        }

        let min_quantity = data
            .min_quantity
            .unwrap_or(DEFAULT_MIN_QUANTITY.min(data.quantity));
        let max_quantity = data.max_quantity.unwrap_or(data.quantity);
        if min_quantity > data.quantity {
            return Err(MarketError::validation(format!(
                "min_quantity ({min_quantity}) exceeds the listed quantity ({})",
                data.quantity
            )));
        }

        let caller_chose_id = data.id.is_some();
        let id = data.id.unwrap_or_else(generate_id);
        let item = SurplusItem {
            id: id.clone(),
            vendor_id: vendor.id.clone(),
            vendor_name: vendor.name.clone(),
            vendor_phone: vendor.phone.clone(),
            location: data.location.trim().to_string(),
            address: data.address,
            name: data.name.trim().to_string(),
            description: data.description,
            category: data.category,
            quality: data.quality.unwrap_or(Quality::Standard),
            unit: data.unit,
            original_quantity: data.quantity,
            remaining_quantity: data.quantity,
            price: data.price,
            original_price: data.original_price.unwrap_or(data.price),
            discount_percentage: money::discount_percentage(data.price, data.original_price),
            min_quantity,
            max_quantity,
            status: SurplusStatus::Available,
            reservations: Vec::new(),
            expires_at: data.expiry_date,
            created_at: now,
            updated_at: now,
        };

        self.items.insert_idempotent(&item, caller_chose_id).await?;
        tracing::info!(
            item_id = %id,
            vendor_id = %vendor.id,
            quantity = item.original_quantity,
            discount = item.discount_percentage,
            "Surplus item listed"
        );
        Ok(id)
    }

    /// Claim `quantity` units for `buyer`.
    ///
    /// Without `expires_at` the hold lasts the configured reservation window.
    pub async fn reserve(
        &self,
        item_id: &str,
        buyer: &Actor,
        quantity: f64,
        expires_at: Option<i64>,
    ) -> MarketResult<(SurplusItem, Reservation)> {
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(MarketError::validation(format!(
                "quantity must be positive, got {quantity}"
            )));
        }
        money::validate_quantity_scale(quantity, "quantity")?;
        let hold_ms = i64::try_from(self.reservation_hold.as_millis()).unwrap_or(i64::MAX);

        let (item, reservation) = self
            .items
            .modify(item_id, |item, now| {
                let status = item.effective_status(now);
                if matches!(status, SurplusStatus::Withdrawn | SurplusStatus::Expired) {
                    return Err(MarketError::Unavailable {
                        item_id: item.id.clone(),
                        status,
                    });
                }
                if item.vendor_id == buyer.id {
                    return Err(MarketError::permission_denied(
                        "vendors cannot reserve their own surplus",
                    ));
                }
                if quantity > item.remaining_quantity {
                    return Err(MarketError::InsufficientQuantity {
                        item_id: item.id.clone(),
                        requested: quantity,
                        remaining: item.remaining_quantity,
                    });
                }

                let remaining = money::subtract_quantity(item.remaining_quantity, quantity);
                let takes_rest = remaining == 0.0;
                if quantity < item.min_quantity && !takes_rest {
                    return Err(MarketError::validation(format!(
                        "minimum reservation is {} {}, got {quantity}",
                        item.min_quantity,
                        item.unit.as_str()
                    )));
                }
                if quantity > item.max_quantity {
                    return Err(MarketError::validation(format!(
                        "maximum reservation is {} {}, got {quantity}",
                        item.max_quantity,
                        item.unit.as_str()
                    )));
                }

                let hold_until = expires_at.unwrap_or(now.saturating_add(hold_ms));
                if hold_until <= now {
                    return Err(MarketError::validation("reservation expiry must be in the future"));
                }

                let reservation = Reservation {
                    id: child_id("reservation", item.reservations.len() + 1),
                    buyer_id: buyer.id.clone(),
                    buyer_name: buyer.name.clone(),
                    buyer_phone: buyer.phone.clone(),
                    quantity,
                    reserved_at: now,
                    expires_at: hold_until,
                };
                item.reservations.push(reservation.clone());
                item.remaining_quantity = remaining;
                item.status = if remaining == 0.0 {
                    SurplusStatus::Sold
                } else {
                    SurplusStatus::PartiallySold
                };
                item.updated_at = now;
                Ok(reservation)
            })
            .await?;

        tracing::info!(
            item_id = %item_id,
            buyer_id = %buyer.id,
            quantity,
            remaining = item.remaining_quantity,
            status = item.status.as_str(),
            "Surplus reserved"
        );
        Ok((item, reservation))
    }

    /// Take a listing off the market. Only its vendor may, and not once sold.
    pub async fn withdraw(&self, item_id: &str, vendor_id: &str) -> MarketResult<SurplusItem> {
        let (item, ()) = self
            .items
            .modify(item_id, |item, now| {
                if item.vendor_id != vendor_id {
                    return Err(MarketError::permission_denied(
                        "only the listing vendor can withdraw it",
                    ));
                }
                let status = item.effective_status(now);
                if status.is_closed() {
                    return Err(MarketError::Unavailable {
                        item_id: item.id.clone(),
                        status,
                    });
                }
                item.status = SurplusStatus::Withdrawn;
                item.updated_at = now;
                Ok(())
            })
            .await?;

        tracing::info!(item_id = %item_id, vendor_id = %vendor_id, "Surplus withdrawn");
        Ok(item)
    }

    pub async fn get_item(&self, item_id: &str) -> MarketResult<SurplusItem> {
        let now = self.items.now();
        let mut item = self.items.require(item_id).await?.record;
        item.status = item.effective_status(now);
        Ok(item)
    }

    /// Newest first; the status filter matches the effective status
    pub async fn list_items(&self, filters: &SurplusFilters) -> MarketResult<Page<SurplusItem>> {
        let limit = filters.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = filters.offset.unwrap_or(0);
        let now = self.items.now();

        let mut query = Query::new()
            .order_by("created_at", true)
            .offset(offset)
            .limit(limit);
        if let Some(location) = filters.location.as_deref().filter(|l| !l.is_empty()) {
            query = query.contains_text("location", location);
        }
        if let Some(category) = &filters.category {
            query = query.eq("category", category.as_str());
        }
        if let Some(vendor_id) = &filters.vendor_id {
            query = query.eq("vendor_id", vendor_id.as_str());
        }
        match filters.status {
            Some(SurplusStatus::Expired) => query = query.lt("expires_at", now),
            Some(status) => {
                query = query.eq("status", status.as_str()).gte("expires_at", now);
            }
            None => {}
        }

        let (mut items, total) = self.items.find(&query).await?;
        for item in &mut items {
            item.status = item.effective_status(now);
        }
        Ok(Page::new(items, total, offset, limit))
    }
}

#[cfg(test)]
mod tests;
