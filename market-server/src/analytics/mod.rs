//! Dashboard rollups and the usage event log
//!
//! Dashboards are read-only aggregates computed from the stored documents
//! on request. The only write is the event log in [`events`], which never
//! fails a caller because of storage.

mod events;

pub use events::{MAX_EVENT_NAME_LEN, MAX_EVENT_DATA_BYTES};

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use shared::models::{
    Actor, AdminDashboard, AnalyticsEvent, BuyingGroup, Dashboard, Order, OrderStatus, Role, SupplierDashboard,
    SurplusItem, SurplusStatus, VendorDashboard,
};

use crate::error::MarketResult;
use crate::money::{line_value, sum, to_decimal, to_f64};
use crate::profiles::ProfileManager;
use crate::store::{Collection, DocumentStore, Query};

#[derive(Clone)]
pub struct AnalyticsService {
    orders: Collection<Order>,
    groups: Collection<BuyingGroup>,
    surplus: Collection<SurplusItem>,
    events: Collection<AnalyticsEvent>,
    profiles: ProfileManager,
}

impl std::fmt::Debug for AnalyticsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsService")
            .field("store", &self.orders.store().backend())
            .finish()
    }
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn DocumentStore>, profiles: ProfileManager) -> Self {
        Self {
            orders: Collection::new(store.clone()),
            groups: Collection::new(store.clone()),
            surplus: Collection::new(store.clone()),
            events: Collection::new(store),
            profiles,
        }
    }

    /// Dashboard shaped for the caller's role
    pub async fn dashboard(&self, user: &Actor) -> MarketResult<Dashboard> {
        let dashboard = match user.role {
            Role::Vendor => Dashboard::Vendor(self.vendor_dashboard(&user.id).await?),
            Role::Supplier => Dashboard::Supplier(self.supplier_dashboard(&user.id).await?),
            Role::Admin => Dashboard::Admin(self.admin_dashboard().await?),
        };
        tracing::debug!(user_id = %user.id, role = user.role.as_str(), "Dashboard computed");
        Ok(dashboard)
    }

    pub async fn vendor_dashboard(&self, vendor_id: &str) -> MarketResult<VendorDashboard> {
        let (orders, orders_placed) = self
            .orders
            .find(&Query::new().eq("vendor_id", vendor_id))
            .await?;
        let (_, groups_joined) = self
            .groups
            .find(&Query::new().array_contains("members", vendor_id).limit(0))
            .await?;
        let (listings, _) = self
            .surplus
            .find(&Query::new().eq("vendor_id", vendor_id))
            .await?;

        let now = self.surplus.now();
        let open_orders = orders.iter().filter(|o| !o.status.is_terminal()).count();
        let total_spent = sum(orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .map(Order::payable_amount));
        let active_surplus_listings = listings
            .iter()
            .filter(|item| {
                matches!(
                    item.effective_status(now),
                    SurplusStatus::Available | SurplusStatus::PartiallySold
                )
            })
            .count();
        let surplus_revenue = sum(listings.iter().map(|item| {
            let sold = (to_decimal(item.original_quantity) - to_decimal(item.remaining_quantity))
                .max(Decimal::ZERO);
            line_value(item.price, to_f64(sold))
        }));

        Ok(VendorDashboard {
            orders_placed: orders_placed as u64,
            open_orders: open_orders as u64,
            total_spent,
            groups_joined: groups_joined as u64,
            active_surplus_listings: active_surplus_listings as u64,
            surplus_revenue,
        })
    }

    pub async fn supplier_dashboard(&self, supplier_id: &str) -> MarketResult<SupplierDashboard> {
        let (orders, handled) = self
            .orders
            .find(&Query::new().eq("supplier_id", supplier_id))
            .await?;

        let delivered: Vec<&Order> = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .collect();
        let revenue = sum(delivered.iter().map(|o| o.payable_amount()));

        let completion_rate = if handled == 0 {
            0.0
        } else {
            to_f64(
                Decimal::from(delivered.len() as u64) * Decimal::ONE_HUNDRED
                    / Decimal::from(handled as u64),
            )
        };
        let average_order_value = if delivered.is_empty() {
            0.0
        } else {
            to_f64(to_decimal(revenue) / Decimal::from(delivered.len() as u64))
        };

        Ok(SupplierDashboard {
            orders_handled: handled as u64,
            orders_delivered: delivered.len() as u64,
            revenue,
            completion_rate,
            average_order_value,
        })
    }

    pub async fn admin_dashboard(&self) -> MarketResult<AdminDashboard> {
        let platform = self.profiles.platform_stats().await?;
        let (_, total_groups) = self.groups.find(&Query::new().limit(0)).await?;
        let (_, total_surplus_listings) = self.surplus.find(&Query::new().limit(0)).await?;

        let mut orders_by_status = BTreeMap::new();
        let mut total_orders = 0;
        let statuses = OrderStatus::PIPELINE
            .into_iter()
            .chain([OrderStatus::Cancelled, OrderStatus::Returned]);
        for status in statuses {
            let (_, count) = self
                .orders
                .find(&Query::new().eq("status", status.as_str()).limit(0))
                .await?;
            total_orders += count as u64;
            if count > 0 {
                orders_by_status.insert(status.as_str().to_string(), count as u64);
            }
        }

        Ok(AdminDashboard {
            platform,
            total_groups: total_groups as u64,
            total_orders,
            orders_by_status,
            total_surplus_listings: total_surplus_listings as u64,
        })
    }
}
