use super::*;
use crate::messaging::MessageReceipt;
use crate::store::RedbStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::{BuyingGroupCreate, NotificationFilters, OrderItemInput, Unit};

/// Records every message instead of sending it
#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, phone: &str, text: &str) -> MarketResult<MessageReceipt> {
        self.sent.lock().push((phone.to_string(), text.to_string()));
        Ok(MessageReceipt {
            message_id: "wa_test".to_string(),
            status: "sent".to_string(),
        })
    }
}

struct Harness {
    orders: OrderManager,
    notifications: NotificationManager,
    groups: GroupManager,
    sender: Arc<RecordingSender>,
    group_id: String,
}

async fn create_test_harness() -> Harness {
    let store: Arc<dyn DocumentStore> = Arc::new(RedbStore::open_in_memory().unwrap());
    let groups = GroupManager::new(store.clone());
    let notifications = NotificationManager::new(store.clone(), Duration::from_secs(3600));
    let sender = Arc::new(RecordingSender::default());
    let orders = OrderManager::new(
        store,
        groups.clone(),
        notifications.clone(),
        sender.clone(),
        Duration::from_secs(3600),
    );

    let group_id = groups
        .create_group(
            BuyingGroupCreate {
                name: "Sector 5 Veggies".to_string(),
                location: "Pune".to_string(),
                category: "vegetables".to_string(),
                ..Default::default()
            },
            &vendor(),
        )
        .await
        .unwrap();

    Harness {
        orders,
        notifications,
        groups,
        sender,
        group_id,
    }
}

fn vendor() -> Actor {
    Actor::new("v1", "Ravi", "+919800000001", Role::Vendor)
}

fn other_vendor() -> Actor {
    Actor::new("v2", "Meena", "+919800000002", Role::Vendor)
}

fn supplier() -> Actor {
    Actor::new("s1", "Fresh Farms", "+919800000101", Role::Supplier)
}

fn other_supplier() -> Actor {
    Actor::new("s2", "Green Valley", "+919800000102", Role::Supplier)
}

fn admin() -> Actor {
    Actor::new("a1", "Ops", "+919800000201", Role::Admin)
}

fn item(name: &str, price: f64, quantity: f64) -> OrderItemInput {
    OrderItemInput {
        name: name.to_string(),
        category: "vegetables".to_string(),
        quantity,
        unit: Unit::Kg,
        quality: None,
        estimated_price: price,
        is_substitutable: None,
        notes: None,
    }
}

fn order_data(group_id: &str, items: Vec<OrderItemInput>) -> OrderCreate {
    OrderCreate {
        id: None,
        group_id: group_id.to_string(),
        items,
        priority: None,
        delivery_date: None,
        delivery_location: None,
        delivery_address: None,
        delivery_instructions: None,
        payment_method: None,
        notes: None,
    }
}

async fn create_test_order(h: &Harness) -> String {
    h.orders
        .create_order(order_data(&h.group_id, vec![item("Onions", 25.0, 10.0)]), &vendor())
        .await
        .unwrap()
}

fn note(text: &str) -> StatusUpdateOptions {
    StatusUpdateOptions {
        note: Some(text.to_string()),
        ..Default::default()
    }
}

fn quote(amount: f64) -> StatusUpdateOptions {
    StatusUpdateOptions {
        quoted_amount: Some(amount),
        ..Default::default()
    }
}

/// Wait for detached sends to run
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}
