// Turns loosely typed database rows into the typed records the analyzers consume.
use crate::model::{BundleType, OrderRecord, OrderStatus};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;

/// An order row as it comes out of `bundle_revenue`, before any coercion.
#[derive(Debug, Clone)]
pub struct RawOrderRow {
    pub id: String,
    pub bundle_id: String,
    pub bundle_name: Option<String>,
    pub bundle_type: Option<String>,
    pub revenue: Value,
    pub discount_amount: Value,
    pub quantity: Value,
    pub order_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub customer_email: Option<String>,
    pub first_purchase: Option<i64>,
}

pub fn normalize_orders(rows: Vec<RawOrderRow>) -> Vec<OrderRecord> {
    rows.into_iter().map(normalize_order).collect()
}

pub fn normalize_order(row: RawOrderRow) -> OrderRecord {
    OrderRecord {
        id: row.id,
        bundle_id: row.bundle_id,
        bundle_name: row.bundle_name.unwrap_or_default(),
        bundle_type: row.bundle_type.as_deref().and_then(BundleType::parse),
        revenue: coerce_amount(&row.revenue),
        discount_amount: coerce_amount(&row.discount_amount),
        quantity: coerce_quantity(&row.quantity),
        status: row
            .order_status
            .as_deref()
            .map(OrderStatus::parse)
            .unwrap_or(OrderStatus::Other),
        created_at: row.created_at,
        customer_id: row.customer_email.filter(|c| !c.trim().is_empty()),
        first_purchase: row.first_purchase.map(|flag| flag != 0),
    }
}

/// Numeric column to `f64`; anything unreadable becomes 0.
pub fn coerce_amount(value: &Value) -> f64 {
    let amount = match value {
        Value::Integer(i) => *i as f64,
        Value::Real(r) => *r,
        Value::Text(t) => t.trim().parse::<f64>().unwrap_or(0.0),
        Value::Null | Value::Blob(_) => 0.0,
    };
    if amount.is_finite() { amount } else { 0.0 }
}

pub fn coerce_optional_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        other => Some(coerce_amount(other)),
    }
}

pub fn coerce_quantity(value: &Value) -> u32 {
    let amount = coerce_amount(value).trunc();
    if amount <= 0.0 {
        0
    } else if amount >= u32::MAX as f64 {
        u32::MAX
    } else {
        amount as u32
    }
}

/// JSON text column passed through as-is; text that is not JSON is kept as a string.
pub fn parse_json_column(raw: Option<String>) -> serde_json::Value {
    match raw {
        None => serde_json::Value::Null,
        Some(text) => serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)),
    }
}
