//! Query model and the in-process evaluator shared by every store

use serde_json::Value;
use std::cmp::Ordering;

use super::Document;

/// Filter on one (possibly dotted) field path
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq { field: String, value: Value },
    /// Case-insensitive substring match on a string field
    ContainsText { field: String, needle: String },
    /// Array field holds `value`
    ArrayContains { field: String, value: Value },
    Gte { field: String, value: Value },
    Lt { field: String, value: Value },
}

impl Predicate {
    pub fn matches(&self, data: &Value) -> bool {
        match self {
            Predicate::Eq { field, value } => lookup(data, field) == Some(value),
            Predicate::ContainsText { field, needle } => lookup(data, field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase())),
            Predicate::ArrayContains { field, value } => lookup(data, field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
            Predicate::Gte { field, value } => lookup(data, field)
                .and_then(|v| compare(v, value))
                .is_some_and(|o| o != Ordering::Less),
            Predicate::Lt { field, value } => lookup(data, field)
                .and_then(|v| compare(v, value))
                .is_some_and(|o| o == Ordering::Less),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

/// Predicates are AND-ed. Results are ordered by `order_by` (ties by id) and
/// then windowed by `offset`/`limit`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(Predicate::Eq {
            field: field.to_string(),
            value: value.into(),
        })
    }

    pub fn contains_text(self, field: &str, needle: &str) -> Self {
        self.filter(Predicate::ContainsText {
            field: field.to_string(),
            needle: needle.to_string(),
        })
    }

    pub fn array_contains(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(Predicate::ArrayContains {
            field: field.to_string(),
            value: value.into(),
        })
    }

    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(Predicate::Gte {
            field: field.to_string(),
            value: value.into(),
        })
    }

    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(Predicate::Lt {
            field: field.to_string(),
            value: value.into(),
        })
    }

    pub fn order_by(mut self, field: &str, descending: bool) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            descending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn matches(&self, data: &Value) -> bool {
        self.predicates.iter().all(|p| p.matches(data))
    }

    /// Run this query over every document of a collection
    pub fn evaluate(&self, documents: impl IntoIterator<Item = Document>) -> QueryPage {
        let mut matched: Vec<Document> = documents
            .into_iter()
            .filter(|doc| self.matches(&doc.data))
            .collect();

        match &self.order_by {
            Some(order) => matched.sort_by(|a, b| {
                compare_for_sort(
                    lookup(&a.data, &order.field),
                    lookup(&b.data, &order.field),
                    order.descending,
                )
                .then_with(|| a.id.cmp(&b.id))
            }),
            None => matched.sort_by(|a, b| a.id.cmp(&b.id)),
        }

        let total = matched.len();
        let documents = matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        QueryPage { documents, total }
    }
}

/// Result window plus the number of matches before windowing
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub documents: Vec<Document>,
    pub total: usize,
}

/// Resolve a dotted path such as `updated_by.id`
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |current, segment| current.get(segment))
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total order for sorting: missing and null values sort last in either direction
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>, descending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = compare(x, y).unwrap_or(Ordering::Equal);
            if descending { ord.reverse() } else { ord }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document {
            id: id.to_string(),
            version: 1,
            data,
        }
    }

    fn sample() -> Vec<Document> {
        vec![
            doc("a", json!({"location": "Koregaon Park, Pune", "created_at": 10, "members": ["u1"]})),
            doc("b", json!({"location": "Andheri, Mumbai", "created_at": 30, "members": ["u1", "u2"]})),
            doc("c", json!({"location": "PUNE camp", "created_at": 20, "members": ["u3"]})),
            doc("d", json!({"location": "Pune", "created_at": 20, "members": []})),
        ]
    }

    #[test]
    fn test_contains_text_is_case_insensitive() {
        let page = Query::new().contains_text("location", "pune").evaluate(sample());
        let ids: Vec<_> = page.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_array_contains() {
        let page = Query::new().array_contains("members", "u1").evaluate(sample());
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_order_desc_with_stable_ties() {
        let page = Query::new().order_by("created_at", true).evaluate(sample());
        let ids: Vec<_> = page.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "d", "a"]);
    }

    #[test]
    fn test_offset_and_limit_keep_total() {
        let page = Query::new()
            .order_by("created_at", true)
            .offset(1)
            .limit(2)
            .evaluate(sample());
        let ids: Vec<_> = page.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
        assert_eq!(page.total, 4);
    }

    #[test]
    fn test_range_predicates() {
        let page = Query::new().gte("created_at", 20).evaluate(sample());
        assert_eq!(page.total, 3);
        let page = Query::new().lt("created_at", 20).evaluate(sample());
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_dotted_lookup_and_missing_fields() {
        let data = json!({"updated_by": {"id": "s1"}});
        assert_eq!(lookup(&data, "updated_by.id"), Some(&json!("s1")));
        assert_eq!(lookup(&data, "updated_by.name"), None);

        let q = Query::new().eq("supplier_id", "s1");
        assert!(!q.matches(&json!({"vendor_id": "v1"})));
        assert!(!q.matches(&json!({"supplier_id": null})));
    }

    #[test]
    fn test_nulls_sort_last_both_directions() {
        let docs = || {
            vec![
                doc("x", json!({"delivery_date": null})),
                doc("y", json!({"delivery_date": 5})),
                doc("z", json!({"delivery_date": 9})),
            ]
        };
        let ids = |page: QueryPage| page.documents.into_iter().map(|d| d.id).collect::<Vec<_>>();
        assert_eq!(ids(Query::new().order_by("delivery_date", false).evaluate(docs())), ["y", "z", "x"]);
        assert_eq!(ids(Query::new().order_by("delivery_date", true).evaluate(docs())), ["z", "y", "x"]);
    }
}
