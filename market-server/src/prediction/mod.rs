//! Purchase recommendations
//!
//! [`Predictor`] is the boundary to a recommendation engine. No trained
//! model ships here; [`HistoryPredictor`] suggests items from the vendor's
//! own recent orders, which is enough to drive the endpoint and its tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared::models::{Order, OrderStatus, Unit};

use crate::money::{line_value, to_decimal, to_f64};

/// Orders looked at when building recommendations
pub const HISTORY_WINDOW: usize = 20;
/// Recommendations returned at most
pub const MAX_RECOMMENDATIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub category: String,
    pub unit: Unit,
    pub quantity: Range,
    /// 0-100
    pub confidence: u8,
    /// Per unit
    pub price: Range,
    pub rationale: String,
}

/// Extra inputs for a prediction
#[derive(Debug, Clone, Default)]
pub struct PredictionContext {
    pub previous_orders: Vec<Order>,
    pub seasonality: Option<String>,
    /// Upper bound on the summed minimum cost of the recommendations
    pub budget: Option<f64>,
}

pub trait Predictor: Send + Sync {
    fn predict(
        &self,
        business_type: &str,
        location: &str,
        context: &PredictionContext,
    ) -> Vec<Recommendation>;
}

#[derive(Debug, Clone, Default)]
pub struct HistoryPredictor;

#[derive(Default)]
struct ItemHistory {
    name: String,
    category: String,
    unit: Option<Unit>,
    orders: usize,
    quantities: Vec<f64>,
    prices: Vec<f64>,
}

impl Predictor for HistoryPredictor {
    fn predict(
        &self,
        business_type: &str,
        location: &str,
        context: &PredictionContext,
    ) -> Vec<Recommendation> {
        let orders: Vec<&Order> = context
            .previous_orders
            .iter()
            .filter(|o| !matches!(o.status, OrderStatus::Cancelled | OrderStatus::Returned))
            .take(HISTORY_WINDOW)
            .collect();
        if orders.is_empty() {
            tracing::debug!(business_type, location, "No order history to predict from");
            return Vec::new();
        }

        let mut history: HashMap<(String, Unit), ItemHistory> = HashMap::new();
        for order in &orders {
            let mut seen = Vec::new();
            for item in &order.items {
                let key = (item.name.trim().to_lowercase(), item.unit);
                let entry = history.entry(key.clone()).or_default();
                if entry.name.is_empty() {
                    entry.name = item.name.trim().to_string();
                    entry.category = item.category.clone();
                    entry.unit = Some(item.unit);
                }
                entry.quantities.push(item.quantity);
                entry.prices.push(item.estimated_price);
                if !seen.contains(&key) {
                    entry.orders += 1;
                    seen.push(key);
                }
            }
        }

        let mut recommendations: Vec<Recommendation> = history
            .into_values()
            .filter_map(|h| h.into_recommendation(orders.len(), context.seasonality.as_deref()))
            .collect();
        recommendations.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then_with(|| a.name.cmp(&b.name))
        });
        recommendations.truncate(MAX_RECOMMENDATIONS);

        if let Some(budget) = context.budget {
            let mut spent = to_decimal(0.0);
            recommendations.retain(|r| {
                let cost = to_decimal(line_value(r.price.min, r.quantity.min));
                if spent + cost > to_decimal(budget) {
                    return false;
                }
                spent += cost;
                true
            });
        }

        tracing::debug!(
            business_type,
            location,
            orders = orders.len(),
            recommendations = recommendations.len(),
            "Recommendations built from order history"
        );
        recommendations
    }
}

impl ItemHistory {
    fn into_recommendation(self, window: usize, seasonality: Option<&str>) -> Option<Recommendation> {
        let unit = self.unit?;
        let (qty_min, qty_max) = bounds(&self.quantities)?;
        let (price_min, price_max) = bounds(&self.prices)?;
        let confidence = ((self.orders as f64 / window as f64) * 100.0).round() as u8;

        let mut rationale = format!("Ordered in {} of your last {window} orders", self.orders);
        if let Some(season) = seasonality.filter(|s| !s.trim().is_empty()) {
            rationale.push_str(&format!(" ({season})"));
        }

        Some(Recommendation {
            name: self.name,
            category: self.category,
            unit,
            quantity: Range {
                min: qty_min,
                max: qty_max,
            },
            confidence: confidence.min(100),
            price: Range {
                min: to_f64(to_decimal(price_min)),
                max: to_f64(to_decimal(price_max)),
            },
            rationale,
        })
    }
}

fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied().filter(|v| v.is_finite());
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderItem, PaymentMethod, PaymentStatus, Priority, Quality};

    fn item(name: &str, quantity: f64, price: f64) -> OrderItem {
        OrderItem {
            id: "item_1".to_string(),
            name: name.to_string(),
            category: "vegetables".to_string(),
            quantity,
            unit: Unit::Kg,
            quality: Quality::Standard,
            estimated_price: price,
            quoted_price: None,
            final_price: None,
            is_substitutable: true,
            notes: None,
        }
    }

    fn order(id: &str, status: OrderStatus, items: Vec<OrderItem>) -> Order {
        Order {
            id: id.to_string(),
            order_number: format!("ORD{id}"),
            group_id: "g1".to_string(),
            group_name: "Sector 5".to_string(),
            vendor_id: "v1".to_string(),
            vendor_name: "Ravi".to_string(),
            vendor_phone: "+919800000001".to_string(),
            supplier_id: None,
            supplier_name: None,
            items,
            status,
            priority: Priority::Medium,
            total_amount: 0.0,
            quoted_amount: None,
            final_amount: None,
            delivery_date: None,
            delivery_location: None,
            delivery_address: None,
            delivery_instructions: None,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::default(),
            notes: None,
            timeline: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn history() -> PredictionContext {
        PredictionContext {
            previous_orders: vec![
                order(
                    "1",
                    OrderStatus::Delivered,
                    vec![item("Onions", 15.0, 25.0), item("Tomatoes", 5.0, 30.0)],
                ),
                order("2", OrderStatus::Delivered, vec![item("onions ", 20.0, 28.0)]),
                order("3", OrderStatus::Pending, vec![item("Onions", 18.0, 26.0)]),
                order("4", OrderStatus::Delivered, vec![item("Potatoes", 10.0, 20.0)]),
                order("5", OrderStatus::Cancelled, vec![item("Saffron", 1.0, 500.0)]),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_no_history_no_recommendations() {
        let predictor = HistoryPredictor;
        let recs = predictor.predict("street-food", "Mumbai", &PredictionContext::default());
        assert!(recs.is_empty());
    }

    #[test]
    fn test_recommendations_ranked_by_frequency() {
        let recs = HistoryPredictor.predict("street-food", "Mumbai", &history());

        let names: Vec<_> = recs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Onions", "Potatoes", "Tomatoes"]);

        let onions = &recs[0];
        assert_eq!(onions.confidence, 75);
        assert_eq!(onions.quantity, Range { min: 15.0, max: 20.0 });
        assert_eq!(onions.price, Range { min: 25.0, max: 28.0 });
        assert_eq!(onions.rationale, "Ordered in 3 of your last 4 orders");
        assert_eq!(recs[1].confidence, 25);
    }

    #[test]
    fn test_cancelled_orders_ignored() {
        let recs = HistoryPredictor.predict("street-food", "Pune", &history());
        assert!(recs.iter().all(|r| r.name != "Saffron"));
    }

    #[test]
    fn test_budget_trims_recommendations() {
        let mut context = history();
        // onions 375, then potatoes would reach 575, tomatoes reach 525
        context.budget = Some(550.0);
        let recs = HistoryPredictor.predict("street-food", "Pune", &context);
        let names: Vec<_> = recs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Onions", "Tomatoes"]);
    }

    #[test]
    fn test_seasonality_noted_in_rationale() {
        let mut context = history();
        context.seasonality = Some("festival season".to_string());
        let recs = HistoryPredictor.predict("street-food", "Pune", &context);
        assert!(recs[0].rationale.ends_with("(festival season)"));
    }

    #[test]
    fn test_predictor_behind_trait_object() {
        let predictor: Box<dyn Predictor> = Box::new(HistoryPredictor);
        let recs = predictor.predict("tea-stall", "Delhi", &history());
        assert_eq!(recs.len(), 3);
    }
}
