//! Shared fixtures for the integration suites

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use market_server::auth::JwtConfig;
use market_server::messaging::LogMessageSender;
use market_server::store::MemoryStore;
use market_server::{Config, JwtService, ServerState, build_app};
use shared::models::{
    Actor, BuyingGroupCreate, OrderCreate, OrderItemInput, Role, SurplusCreate, Unit,
};
use shared::util::now_millis;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789-abcdef";

pub fn vendor(n: u32) -> Actor {
    Actor::new(
        format!("vendor_{n}"),
        format!("Vendor {n}"),
        format!("+91980000{n:04}"),
        Role::Vendor,
    )
}

pub fn supplier(n: u32) -> Actor {
    Actor::new(
        format!("supplier_{n}"),
        format!("Supplier {n}"),
        format!("+91970000{n:04}"),
        Role::Supplier,
    )
}

pub fn admin() -> Actor {
    Actor::new("admin_1", "Ops", "+919600000001", Role::Admin)
}

/// Demo-mode state on a fresh in-memory store
pub fn create_test_state() -> ServerState {
    let jwt = JwtService::with_config(JwtConfig::with_secret(TEST_SECRET).unwrap());
    ServerState::with_store(
        Config::demo(),
        Arc::new(MemoryStore::new()),
        jwt,
        Arc::new(LogMessageSender),
    )
}

pub fn token(state: &ServerState, user: &Actor) -> String {
    state.jwt_service().generate_token(user).unwrap()
}

pub fn group_input(name: &str, max_members: Option<u32>) -> BuyingGroupCreate {
    BuyingGroupCreate {
        name: name.to_string(),
        location: "Pune".to_string(),
        category: "vegetables".to_string(),
        max_members,
        ..Default::default()
    }
}

pub fn order_input(group_id: &str, items: &[(&str, f64, f64)]) -> OrderCreate {
    OrderCreate {
        id: None,
        group_id: group_id.to_string(),
        items: items
            .iter()
            .map(|(name, price, quantity)| OrderItemInput {
                name: name.to_string(),
                category: "vegetables".to_string(),
                quantity: *quantity,
                unit: Unit::Kg,
                quality: None,
                estimated_price: *price,
                is_substitutable: None,
                notes: None,
            })
            .collect(),
        priority: None,
        delivery_date: None,
        delivery_location: None,
        delivery_address: None,
        delivery_instructions: None,
        payment_method: None,
        notes: None,
    }
}

pub fn surplus_input(quantity: f64, price: f64, original_price: Option<f64>) -> SurplusCreate {
    SurplusCreate {
        id: None,
        name: "Tomatoes".to_string(),
        description: None,
        category: "vegetables".to_string(),
        quality: None,
        unit: Unit::Kg,
        quantity,
        price,
        original_price,
        min_quantity: None,
        max_quantity: None,
        location: "Pune".to_string(),
        address: None,
        expiry_date: now_millis() + 6 * 3_600_000,
    }
}

/// One request through the full middleware stack
pub async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub fn test_app(state: &ServerState) -> Router {
    build_app(state.clone())
}
