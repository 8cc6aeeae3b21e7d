//! Read-side use cases: each call fetches what it needs from a [`Repository`]
//! and shapes it for the presentation layer.

use crate::analyzer::inventory::{BundleCounts, StoreOverview, bundle_counts};
use crate::analyzer::revenue::{AnalyticsSummary, RankedBundle, aggregate};
use crate::analyzer::store_age::{compact_age, store_age, time_ago};
use crate::model::{BundleListing, ByobListing, CatalogEntry, ShopBrief, StorageError, StoreInfo, StoreRecord};
use crate::storage::Repository;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("store {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Trailing period the analytics view covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookbackWindow {
    Week,
    #[default]
    Month,
    Quarter,
}

impl LookbackWindow {
    pub fn days(self) -> i64 {
        match self {
            LookbackWindow::Week => 7,
            LookbackWindow::Month => 30,
            LookbackWindow::Quarter => 90,
        }
    }

    pub fn from_days(days: i64) -> Option<Self> {
        match days {
            7 => Some(LookbackWindow::Week),
            30 => Some(LookbackWindow::Month),
            90 => Some(LookbackWindow::Quarter),
            _ => None,
        }
    }

    /// Reads a `period` query value; anything but 7, 30 or 90 falls back to 30.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match raw.trim().parse::<i64>().ok().and_then(Self::from_days) {
            Some(window) => window,
            None => {
                warn!("Unsupported period '{}', using {} days", raw, Self::default().days());
                Self::default()
            }
        }
    }

    /// Inclusive `[now - days, now]`.
    pub fn range(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - Duration::days(self.days()), now)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopAnalytics {
    pub analytics: AnalyticsSummary,
    pub shop_info: StoreInfo,
    pub currency: String,
    pub period: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub ranking: Vec<RankedBundle>,
}

/// Analytics for one store over `window`, ending at `now`.
pub async fn shop_analytics(
    repo: &dyn Repository,
    shop: &str,
    window: LookbackWindow,
    now: DateTime<Utc>,
    top_limit: usize,
) -> Result<ShopAnalytics, QueryError> {
    let (since, until) = window.range(now);

    let (orders, store) = futures::try_join!(
        repo.orders_in_window(shop, since, until),
        repo.find_store(shop)
    )?;
    let store = store.ok_or_else(|| QueryError::NotFound(shop.to_string()))?;

    info!(
        "[analytics] {} orders for {} over the last {} days",
        orders.len(),
        shop,
        window.days()
    );
    let analytics = aggregate(&orders);
    let ranking = analytics.ranked_bundles(top_limit);

    Ok(ShopAnalytics {
        currency: store.currency_code.clone(),
        shop_info: store,
        period: window.days(),
        start_date: since,
        end_date: until,
        ranking,
        analytics,
    })
}

/// A store row with its bundle counts and human-readable ages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    #[serde(flatten)]
    pub store: StoreRecord,
    pub bundle_counts: BundleCounts,
    pub age: Option<String>,
    pub compact_age: Option<String>,
    pub installed_ago: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDirectory {
    pub shopify_stores: Vec<StoreSummary>,
    pub overview: StoreOverview,
}

pub async fn store_directory(
    repo: &dyn Repository,
    now: DateTime<Utc>,
    recent_days: i64,
) -> Result<StoreDirectory, QueryError> {
    let (stores, bundles, byobs) = futures::try_join!(
        repo.list_stores(),
        repo.list_bundles(None),
        repo.list_byobs(None)
    )?;

    let counts = bundle_counts(&bundles, &byobs);
    let overview = StoreOverview::compute(&stores, now, recent_days);
    let shopify_stores = stores
        .into_iter()
        .map(|store| StoreSummary {
            bundle_counts: counts
                .get(&store.myshopify_domain)
                .copied()
                .unwrap_or_default(),
            age: store.created_at.map(|at| store_age(at, now)),
            compact_age: store.created_at.map(|at| compact_age(at, now)),
            installed_ago: store.installed_at.map(|at| time_ago(at, now)),
            store,
        })
        .collect();

    Ok(StoreDirectory {
        shopify_stores,
        overview,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct BundleCatalog {
    pub bundles: Vec<BundleListing>,
    pub byobs: Vec<ByobListing>,
}

impl BundleCatalog {
    /// Regular bundles followed by BYOBs, the order the bundle table shows them in.
    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.bundles
            .into_iter()
            .map(CatalogEntry::Bundle)
            .chain(self.byobs.into_iter().map(CatalogEntry::Byob))
            .collect()
    }
}

/// Bundle and BYOB listings. Across all shops each row carries its shop's info.
pub async fn bundle_catalog(
    repo: &dyn Repository,
    shop: Option<&str>,
) -> Result<BundleCatalog, QueryError> {
    let (mut bundles, mut byobs) =
        futures::try_join!(repo.list_bundles(shop), repo.list_byobs(shop))?;

    if shop.is_none() {
        let stores = repo.list_stores().await?;
        let briefs: HashMap<&str, ShopBrief> = stores
            .iter()
            .map(|s| (s.myshopify_domain.as_str(), ShopBrief::from(s)))
            .collect();
        for bundle in &mut bundles {
            bundle.shop_info = briefs.get(bundle.shop.as_str()).cloned();
        }
        for byob in &mut byobs {
            byob.shop_info = briefs.get(byob.shop.as_str()).cloned();
        }
    }

    Ok(BundleCatalog { bundles, byobs })
}
