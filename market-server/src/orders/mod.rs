//! Order Manager
//!
//! Orders move through the fulfillment pipeline defined by
//! [`OrderStatus::can_transition_to`]. Every status change appends exactly
//! one [`TimelineEntry`] in the same write as the status itself.
//!
//! ```text
//! update_order_status(id, status, actor, options)
//!     ├─ 1. Read order + version
//!     ├─ 2. Role authority (vendor: own orders, limited statuses;
//!     │     supplier: unassigned or assigned to them)
//!     ├─ 3. Transition check against the current status
//!     ├─ 4. Append timeline entry (timestamp never earlier than the last)
//!     ├─ 5. Compare-and-swap write (retry on conflict)
//!     └─ 6. Quote side effects: notification + message (best-effort)
//! ```

use std::sync::Arc;
use std::time::Duration;

use shared::models::{
    Actor, Channel, NotificationCategory, NotificationCreate, NotificationKind, Order,
    OrderCreate, OrderFilters, OrderItem, OrderStatus, Page, PaymentStatus, Priority, Quality,
    Role, StatusUpdateOptions, TimelineEntry,
};
use shared::util::{child_id, generate_id, generate_order_number};

use crate::error::{MarketError, MarketResult};
use crate::groups::GroupManager;
use crate::messaging::{MessageSender, send_detached};
use crate::money;
use crate::notifications::NotificationManager;
use crate::store::{Collection, DocumentStore, Query, Record, collections};
use crate::utils::validation::{MAX_ADDRESS_LEN, MAX_NOTE_LEN, validate_optional_text};
use crate::watch::{ChangeFeed, Subscription, spawn_watch};

pub const DEFAULT_PAGE_LIMIT: usize = 20;

impl Record for Order {
    const COLLECTION: &'static str = collections::ORDERS;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct OrderManager {
    orders: Collection<Order>,
    groups: GroupManager,
    notifications: NotificationManager,
    messenger: Arc<dyn MessageSender>,
    feed: ChangeFeed,
    poll_interval: Duration,
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("store", &self.orders.store().backend())
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl OrderManager {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        groups: GroupManager,
        notifications: NotificationManager,
        messenger: Arc<dyn MessageSender>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            orders: Collection::new(store),
            groups,
            notifications,
            messenger,
            feed: ChangeFeed::new(),
            poll_interval,
        }
    }

    /// Create a draft order for `vendor` in an existing group
    pub async fn create_order(&self, data: OrderCreate, vendor: &Actor) -> MarketResult<String> {
        if data.items.is_empty() {
            return Err(MarketError::validation("order must contain at least one item"));
        }
        for item in &data.items {
            money::validate_order_item(item)?;
        }
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
        validate_optional_text(&data.delivery_instructions, "delivery_instructions", MAX_NOTE_LEN)?;
        validate_optional_text(&data.delivery_address, "delivery_address", MAX_ADDRESS_LEN)?;

        let group = self.groups.get_group(&data.group_id).await?;

        let now = self.orders.now();
        let caller_chose_id = data.id.is_some();
        let id = data.id.unwrap_or_else(generate_id);
        let total_amount = money::order_total(&data.items);

        let items = data
            .items
            .into_iter()
            .enumerate()
            .map(|(i, input)| OrderItem {
                id: child_id("item", i + 1),
                name: input.name.trim().to_string(),
                category: input.category,
                quantity: input.quantity,
                unit: input.unit,
                quality: input.quality.unwrap_or(Quality::Standard),
                estimated_price: input.estimated_price,
                quoted_price: None,
                final_price: None,
                is_substitutable: input.is_substitutable.unwrap_or(true),
                notes: input.notes,
            })
            .collect();

        let order = Order {
            id: id.clone(),
            order_number: generate_order_number(now),
            group_id: group.id,
            group_name: group.name,
            vendor_id: vendor.id.clone(),
            vendor_name: vendor.name.clone(),
            vendor_phone: vendor.phone.clone(),
            supplier_id: None,
            supplier_name: None,
            items,
            status: OrderStatus::Draft,
            priority: data.priority.unwrap_or(Priority::Medium),
            total_amount,
            quoted_amount: None,
            final_amount: None,
            delivery_date: data.delivery_date,
            delivery_location: data.delivery_location,
            delivery_address: data.delivery_address,
            delivery_instructions: data.delivery_instructions,
            payment_status: PaymentStatus::Pending,
            payment_method: data.payment_method.unwrap_or_default(),
            notes: data.notes,
            timeline: vec![TimelineEntry {
                id: child_id("timeline", 1),
                status: OrderStatus::Draft,
                timestamp: now,
                note: Some("Order created".to_string()),
                updated_by: vendor.clone(),
                attachments: Vec::new(),
                location: None,
                estimated_time: None,
                quoted_amount: None,
                is_public: true,
                notification_sent: false,
            }],
            created_at: now,
            updated_at: now,
        };

        let created = self.orders.insert_idempotent(&order, caller_chose_id).await?;
        if created {
            self.feed.publish(&id);
            if let Err(e) = self.groups.record_order(&order.group_id).await {
                tracing::warn!(group_id = %order.group_id, error = %e, "Failed to update group stats");
            }
            tracing::info!(
                order_id = %id,
                order_number = %order.order_number,
                vendor_id = %vendor.id,
                total_amount,
                "Order created"
            );
        }
        Ok(id)
    }

    /// Move an order to `status`, appending one timeline entry
    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        actor: &Actor,
        options: StatusUpdateOptions,
    ) -> MarketResult<Order> {
        if let Some(amount) = options.quoted_amount
            && !(amount.is_finite() && amount >= 0.0)
        {
            return Err(MarketError::validation(format!(
                "quoted_amount must be a non-negative number, got {amount}"
            )));
        }
        validate_optional_text(&options.note, "note", MAX_NOTE_LEN)?;

        let (order, previous) = self
            .orders
            .modify(order_id, |order, now| {
                let owns_order = order.vendor_id == actor.id;
                if !actor.role.may_set_order_status(status, owns_order) {
                    return Err(MarketError::permission_denied(format!(
                        "{} may not set order {} to {status}",
                        actor.role, order.id
                    )));
                }
                if actor.role == Role::Supplier
                    && order.supplier_id.as_deref().is_some_and(|s| s != actor.id)
                {
                    return Err(MarketError::permission_denied(format!(
                        "order {} is assigned to another supplier",
                        order.id
                    )));
                }
                if !order.status.can_transition_to(status) {
                    return Err(MarketError::InvalidTransition {
                        order_id: order.id.clone(),
                        from: order.status,
                        to: status,
                    });
                }
                Ok(apply_status(order, status, actor, &options, now))
            })
            .await?;

        self.feed.publish(order_id);
        tracing::info!(
            order_id = %order_id,
            from = previous.as_str(),
            to = status.as_str(),
            actor_id = %actor.id,
            role = actor.role.as_str(),
            "Order status updated"
        );

        if status == OrderStatus::Quoted && actor.id != order.vendor_id {
            self.announce_quote(&order).await;
        }
        Ok(order)
    }

    /// Quote side effects. Failures are logged, never returned.
    async fn announce_quote(&self, order: &Order) {
        let amount = order.quoted_amount.unwrap_or(order.total_amount);
        let message = format!(
            "Your order #{} has been quoted at ₹{}",
            order.order_number, amount
        );

        let notification = NotificationCreate {
            user_id: order.vendor_id.clone(),
            user_role: Role::Vendor,
            kind: NotificationKind::Order,
            category: NotificationCategory::Info,
            title: "Order Quote Received".to_string(),
            message: message.clone(),
            data: Some(serde_json::json!({
                "order_id": order.id,
                "quoted_amount": amount,
            })),
            priority: Priority::Medium,
            channels: vec![Channel::App, Channel::Whatsapp],
            related_entity_id: Some(order.id.clone()),
            related_entity_type: Some("order".to_string()),
        };
        if let Err(e) = self.notifications.create(notification).await {
            tracing::warn!(order_id = %order.id, error = %e, "Quote notification failed");
        }

        send_detached(self.messenger.clone(), order.vendor_phone.clone(), message);
    }

    pub async fn get_order(&self, order_id: &str) -> MarketResult<Order> {
        Ok(self.orders.require(order_id).await?.record)
    }

    /// Newest first. `user_id` matches the vendor, or the supplier when
    /// `role` is supplier; admins see everything.
    pub async fn list_orders(&self, filters: &OrderFilters) -> MarketResult<Page<Order>> {
        let limit = filters.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = filters.offset.unwrap_or(0);

        let mut query = Query::new()
            .order_by("created_at", true)
            .offset(offset)
            .limit(limit);
        if let Some(user_id) = &filters.user_id {
            match filters.role.unwrap_or(Role::Vendor) {
                Role::Vendor => query = query.eq("vendor_id", user_id.as_str()),
                Role::Supplier => query = query.eq("supplier_id", user_id.as_str()),
                Role::Admin => {}
            }
        }
        if let Some(status) = filters.status {
            query = query.eq("status", status.as_str());
        }
        if let Some(group_id) = &filters.group_id {
            query = query.eq("group_id", group_id.as_str());
        }

        let (orders, total) = self.orders.find(&query).await?;
        Ok(Page::new(orders, total, offset, limit))
    }

    /// Orders still waiting for a supplier (draft or pending, unassigned)
    pub async fn open_for_quotes(&self, limit: usize) -> MarketResult<Vec<Order>> {
        let query = Query::new()
            .eq("supplier_id", serde_json::Value::Null)
            .order_by("created_at", true);
        let (orders, _) = self.orders.find(&query).await?;
        Ok(orders
            .into_iter()
            .filter(|o| matches!(o.status, OrderStatus::Draft | OrderStatus::Pending))
            .take(limit)
            .collect())
    }

    /// Deliver the order now and on every change; `None` once it is gone
    pub fn watch_order<F>(&self, order_id: &str, mut callback: F) -> Subscription
    where
        F: FnMut(Option<&Order>) + Send + 'static,
    {
        let orders = self.orders.clone();
        let id = order_id.to_string();
        spawn_watch(
            "order",
            order_id.to_string(),
            &self.feed,
            self.poll_interval,
            move || {
                let orders = orders.clone();
                let id = id.clone();
                async move { Ok::<_, MarketError>(orders.get(&id).await?.map(|v| v.record)) }
            },
            move |order: &Option<Order>| callback(order.as_ref()),
        )
    }
}

/// Mutate `order` for an accepted status change; returns the previous status
fn apply_status(
    order: &mut Order,
    status: OrderStatus,
    actor: &Actor,
    options: &StatusUpdateOptions,
    now: i64,
) -> OrderStatus {
    let previous = order.status;
    // Never earlier than the entry before it, whatever the clock did
    let timestamp = order
        .timeline
        .last()
        .map_or(now, |last| now.max(last.timestamp));

    order.timeline.push(TimelineEntry {
        id: child_id("timeline", order.timeline.len() + 1),
        status,
        timestamp,
        note: options.note.clone(),
        updated_by: actor.clone(),
        attachments: options.attachments.clone(),
        location: options.location.clone(),
        estimated_time: options.estimated_time.clone(),
        quoted_amount: options.quoted_amount,
        is_public: options.is_public.unwrap_or(true),
        notification_sent: false,
    });

    order.status = status;
    if let Some(amount) = options.quoted_amount {
        order.quoted_amount = Some(amount);
    }
    if status == OrderStatus::Quoted && actor.role == Role::Supplier && order.supplier_id.is_none()
    {
        order.supplier_id = Some(actor.id.clone());
        order.supplier_name = Some(actor.name.clone());
    }
    if status == OrderStatus::Delivered && order.final_amount.is_none() {
        order.final_amount = Some(order.payable_amount());
    }
    order.updated_at = timestamp;
    previous
}

#[cfg(test)]
mod tests;
