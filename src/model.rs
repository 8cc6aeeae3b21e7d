// Core structs: OrderRecord, StoreRecord, bundle listings and the errors shared by storage
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    Fixed,
    Infinite,
    Byob,
}

impl BundleType {
    pub const ALL: [BundleType; 3] = [BundleType::Fixed, BundleType::Infinite, BundleType::Byob];

    /// Case-insensitive; returns `None` for anything outside the three known kinds.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "fixed" => Some(BundleType::Fixed),
            "infinite" => Some(BundleType::Infinite),
            "byob" | "build-your-own" | "build_your_own" => Some(BundleType::Byob),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BundleType::Fixed => "fixed",
            BundleType::Infinite => "infinite",
            BundleType::Byob => "byob",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
    Cancelled,
    Other,
}

impl OrderStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other => "other",
        }
    }
}

/// One bundle purchase, already normalized at the storage boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: String,
    pub bundle_id: String,
    pub bundle_name: String,
    pub bundle_type: Option<BundleType>,
    pub revenue: f64,
    pub discount_amount: f64,
    pub quantity: u32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub customer_id: Option<String>,
    pub first_purchase: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    pub myshopify_domain: String,
    pub shop: String,
    pub name: String,
    pub url: Option<String>,
    pub currency_code: String,
    pub plan_display_name: Option<String>,
    pub shopify_plus: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub contact_email: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub installed_at: Option<DateTime<Utc>>,
}

/// Store metadata the analytics view needs next to the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub name: String,
    pub currency_code: String,
    pub plan_display_name: Option<String>,
    pub shopify_plus: bool,
}

/// Compact store reference attached to cross-shop bundle listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopBrief {
    pub myshopify_domain: String,
    pub url: Option<String>,
    pub name: String,
    pub plan_display_name: Option<String>,
}

impl From<&StoreRecord> for ShopBrief {
    fn from(store: &StoreRecord) -> Self {
        Self {
            myshopify_domain: store.myshopify_domain.clone(),
            url: store.url.clone(),
            name: store.name.clone(),
            plan_display_name: store.plan_display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleListing {
    pub id: String,
    pub user_id: String,
    pub shop: String,
    pub bundle_name: String,
    pub bundle_type: String,
    pub discount_type: Option<String>,
    pub discount_value: Option<f64>,
    pub product_handle: Option<String>,
    pub products: Value,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_info: Option<ShopBrief>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ByobListing {
    pub id: String,
    pub user_id: String,
    pub shop: String,
    pub bundle_name: String,
    pub bundle_type: String,
    pub discount_type: Option<String>,
    pub discount_value: Option<f64>,
    pub products: Value,
    pub product_status: Option<String>,
    pub conditions: Value,
    pub tiers: Value,
    pub media: Value,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_info: Option<ShopBrief>,
}

/// A row of the combined bundle table: either a regular bundle or a BYOB.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CatalogEntry {
    Bundle(BundleListing),
    Byob(ByobListing),
}

impl CatalogEntry {
    pub fn bundle_name(&self) -> &str {
        match self {
            CatalogEntry::Bundle(b) => &b.bundle_name,
            CatalogEntry::Byob(b) => &b.bundle_name,
        }
    }

    pub fn bundle_type(&self) -> &str {
        match self {
            CatalogEntry::Bundle(b) => &b.bundle_type,
            CatalogEntry::Byob(b) => &b.bundle_type,
        }
    }

    pub fn discount_type(&self) -> Option<&str> {
        match self {
            CatalogEntry::Bundle(b) => b.discount_type.as_deref(),
            CatalogEntry::Byob(b) => b.discount_type.as_deref(),
        }
    }

    pub fn discount_value(&self) -> Option<f64> {
        match self {
            CatalogEntry::Bundle(b) => b.discount_value,
            CatalogEntry::Byob(b) => b.discount_value,
        }
    }

    /// Lower-cased `status` (or BYOB `productStatus`), "unknown" when neither is set.
    pub fn status(&self) -> String {
        let raw = match self {
            CatalogEntry::Bundle(b) => b.status.as_deref(),
            CatalogEntry::Byob(b) => b.product_status.as_deref(),
        };
        raw.filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn product_count(&self) -> usize {
        let products = match self {
            CatalogEntry::Bundle(b) => &b.products,
            CatalogEntry::Byob(b) => &b.products,
        };
        products.as_array().map(|p| p.len()).unwrap_or(0)
    }

    pub fn shop(&self) -> &str {
        match self {
            CatalogEntry::Bundle(b) => &b.shop,
            CatalogEntry::Byob(b) => &b.shop,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            CatalogEntry::Bundle(b) => &b.user_id,
            CatalogEntry::Byob(b) => &b.user_id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            CatalogEntry::Bundle(b) => b.created_at,
            CatalogEntry::Byob(b) => b.created_at,
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("failed to encode json column: {0}")]
    Json(#[from] serde_json::Error),
}
