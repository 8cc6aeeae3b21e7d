use crate::model::{BundleListing, ByobListing, CatalogEntry, StoreRecord};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleCounts {
    pub regular_bundles: u64,
    pub byob_bundles: u64,
    pub total_bundles: u64,
}

/// Number of configured bundles per shop domain.
pub fn bundle_counts(bundles: &[BundleListing], byobs: &[ByobListing]) -> HashMap<String, BundleCounts> {
    let mut counts: HashMap<String, BundleCounts> = HashMap::new();

    for bundle in bundles {
        let entry = counts.entry(bundle.shop.clone()).or_default();
        entry.regular_bundles += 1;
        entry.total_bundles += 1;
    }
    for byob in byobs {
        let entry = counts.entry(byob.shop.clone()).or_default();
        entry.byob_bundles += 1;
        entry.total_bundles += 1;
    }

    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BundleStatusStats {
    pub total: u64,
    pub active: u64,
    pub draft: u64,
    pub archived: u64,
}

impl BundleStatusStats {
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        let mut stats = Self {
            total: entries.len() as u64,
            ..Self::default()
        };
        for entry in entries {
            match entry.status().as_str() {
                "active" => stats.active += 1,
                "draft" => stats.draft += 1,
                "archived" => stats.archived += 1,
                _ => {}
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOverview {
    pub total_stores: u64,
    pub countries: u64,
    pub plus_stores: u64,
    pub recent_installs: u64,
}

impl StoreOverview {
    /// `recent_installs` counts stores installed strictly after `now - recent_days`.
    pub fn compute(stores: &[StoreRecord], now: DateTime<Utc>, recent_days: i64) -> Self {
        let cutoff = now - Duration::days(recent_days);
        let countries: HashSet<&str> = stores
            .iter()
            .filter_map(|s| s.country.as_deref())
            .filter(|c| !c.trim().is_empty())
            .collect();

        Self {
            total_stores: stores.len() as u64,
            countries: countries.len() as u64,
            plus_stores: stores.iter().filter(|s| s.shopify_plus).count() as u64,
            recent_installs: stores
                .iter()
                .filter(|s| s.installed_at.is_some_and(|at| at > cutoff))
                .count() as u64,
        }
    }
}
