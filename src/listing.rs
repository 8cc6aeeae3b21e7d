// Server-side filtering, sorting and pagination for the store and bundle tables.
use crate::model::CatalogEntry;
use crate::query::StoreSummary;
use crate::utils::split_list;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    BundleType,
    Status,
    DiscountType,
    Plan,
    Country,
    StoreType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
    Time(DateTime<Utc>),
}

impl SortValue {
    fn text(value: &str) -> Self {
        SortValue::Text(value.to_lowercase())
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Time(a), SortValue::Time(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// A row the listing endpoints can search, filter and sort.
pub trait Listable {
    fn search_text(&self) -> String;
    fn facet(&self, facet: Facet) -> Option<String>;
    fn sort_value(&self, column: &str) -> Option<SortValue>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query-string options; list values are comma separated (`status=active,draft`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub bundle_type: Option<String>,
    pub status: Option<String>,
    pub discount_type: Option<String>,
    pub plan: Option<String>,
    pub country: Option<String>,
    pub store_type: Option<String>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub filtered_total: usize,
    pub total: usize,
}

impl ListingQuery {
    fn facet_filters(&self) -> Vec<(Facet, Vec<String>)> {
        [
            (Facet::BundleType, &self.bundle_type),
            (Facet::Status, &self.status),
            (Facet::DiscountType, &self.discount_type),
            (Facet::Plan, &self.plan),
            (Facet::Country, &self.country),
            (Facet::StoreType, &self.store_type),
        ]
        .into_iter()
        .map(|(facet, raw)| (facet, split_list(raw.as_deref())))
        .filter(|(_, allowed)| !allowed.is_empty())
        .collect()
    }

    /// Filters and sorts `items`; pagination is left to [`ListingQuery::paginate`].
    pub fn select<T: Listable>(&self, items: Vec<T>) -> Vec<T> {
        let needle = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let filters = self.facet_filters();

        let mut selected: Vec<T> = items
            .into_iter()
            .filter(|item| {
                needle
                    .as_ref()
                    .is_none_or(|n| item.search_text().to_lowercase().contains(n.as_str()))
            })
            .filter(|item| {
                filters.iter().all(|(facet, allowed)| {
                    item.facet(*facet)
                        .is_some_and(|value| allowed.contains(&value.trim().to_lowercase()))
                })
            })
            .collect();

        if let Some(column) = self.sort.as_deref() {
            let descending = self.order.unwrap_or_default() == SortOrder::Desc;
            selected.sort_by(|a, b| match (a.sort_value(column), b.sort_value(column)) {
                (Some(x), Some(y)) => {
                    let ordering = x.compare(&y);
                    if descending { ordering.reverse() } else { ordering }
                }
                // missing values always go last
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }

        selected
    }

    pub fn paginate<T>(&self, selected: Vec<T>, total: usize) -> Page<T> {
        let page_size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let filtered_total = selected.len();
        let page_count = filtered_total.div_ceil(page_size).max(1);
        let page = self.page.unwrap_or(1).clamp(1, page_count);

        Page {
            items: selected
                .into_iter()
                .skip((page - 1) * page_size)
                .take(page_size)
                .collect(),
            page,
            page_size,
            page_count,
            filtered_total,
            total,
        }
    }
}

impl Listable for CatalogEntry {
    fn search_text(&self) -> String {
        [
            self.bundle_name(),
            self.bundle_type(),
            self.discount_type().unwrap_or_default(),
            &self.status(),
            self.shop(),
            self.user_id(),
        ]
        .join(" ")
    }

    fn facet(&self, facet: Facet) -> Option<String> {
        match facet {
            Facet::BundleType => Some(self.bundle_type().to_string()),
            Facet::Status => Some(self.status()),
            Facet::DiscountType => self.discount_type().map(str::to_string),
            Facet::Plan | Facet::Country | Facet::StoreType => None,
        }
    }

    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "bundleName" => Some(SortValue::text(self.bundle_name())),
            "bundleType" => Some(SortValue::text(self.bundle_type())),
            "discountType" => self.discount_type().map(SortValue::text),
            "discountValue" => self.discount_value().map(SortValue::Number),
            "status" => Some(SortValue::text(&self.status())),
            "products" => Some(SortValue::Number(self.product_count() as f64)),
            "userId" => Some(SortValue::text(self.user_id())),
            "shop" => Some(SortValue::text(self.shop())),
            "createdAt" => Some(SortValue::Time(self.created_at())),
            _ => None,
        }
    }
}

impl Listable for StoreSummary {
    fn search_text(&self) -> String {
        let store = &self.store;
        [
            Some(store.name.as_str()),
            Some(store.shop.as_str()),
            Some(store.myshopify_domain.as_str()),
            store.email.as_deref(),
            store.contact_email.as_deref(),
            store.country.as_deref(),
            store.plan_display_name.as_deref(),
            Some(store.currency_code.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }

    fn facet(&self, facet: Facet) -> Option<String> {
        match facet {
            Facet::Plan => self.store.plan_display_name.clone(),
            Facet::Country => self.store.country.clone(),
            Facet::StoreType => Some(if self.store.shopify_plus { "plus" } else { "regular" }.to_string()),
            Facet::BundleType | Facet::Status | Facet::DiscountType => None,
        }
    }

    fn sort_value(&self, column: &str) -> Option<SortValue> {
        let store = &self.store;
        match column {
            "name" => Some(SortValue::text(&store.name)),
            "myshopifyDomain" => Some(SortValue::text(&store.myshopify_domain)),
            "installedAt" => store.installed_at.map(SortValue::Time),
            "createdAt" => store.created_at.map(SortValue::Time),
            "planDisplayName" => store.plan_display_name.as_deref().map(SortValue::text),
            "country" => store.country.as_deref().map(SortValue::text),
            "currencyCode" => Some(SortValue::text(&store.currency_code)),
            "totalBundles" => Some(SortValue::Number(self.bundle_counts.total_bundles as f64)),
            "byobBundles" => Some(SortValue::Number(self.bundle_counts.byob_bundles as f64)),
            "regularBundles" => Some(SortValue::Number(self.bundle_counts.regular_bundles as f64)),
            _ => None,
        }
    }
}
