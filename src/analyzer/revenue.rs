use crate::model::{BundleType, OrderRecord, OrderStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_revenue: f64,
    pub total_orders: u64,
    /// Distinct bundles that sold at least once in the window.
    pub total_bundles: u64,
    pub average_order_value: f64,
    pub total_discounts: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeTotals {
    pub count: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleTotals {
    pub name: String,
    pub orders: u64,
    pub revenue: f64,
    pub quantity: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMetrics {
    pub new_customers: u64,
    pub returning_customers: u64,
    pub total_customers: u64,
}

/// Per-store analytics for one lookback window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub overview: Overview,
    /// Always holds `fixed`, `infinite` and `byob`, even when nothing sold.
    pub bundle_types: BTreeMap<BundleType, TypeTotals>,
    /// Revenue per UTC calendar day.
    pub daily_revenue: BTreeMap<NaiveDate, f64>,
    /// Keyed by bundle id.
    pub top_bundles: BTreeMap<String, BundleTotals>,
    pub customer_metrics: CustomerMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedBundle {
    pub bundle_id: String,
    #[serde(flatten)]
    pub totals: BundleTotals,
}

impl AnalyticsSummary {
    pub fn empty() -> Self {
        Self {
            overview: Overview::default(),
            bundle_types: BundleType::ALL
                .iter()
                .map(|kind| (*kind, TypeTotals::default()))
                .collect(),
            daily_revenue: BTreeMap::new(),
            top_bundles: BTreeMap::new(),
            customer_metrics: CustomerMetrics::default(),
        }
    }

    /// Bundles by revenue (then orders, then id), at most `limit` of them.
    pub fn ranked_bundles(&self, limit: usize) -> Vec<RankedBundle> {
        let mut ranked: Vec<RankedBundle> = self
            .top_bundles
            .iter()
            .map(|(id, totals)| RankedBundle {
                bundle_id: id.clone(),
                totals: totals.clone(),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.totals
                .revenue
                .total_cmp(&a.totals.revenue)
                .then_with(|| b.totals.orders.cmp(&a.totals.orders))
                .then_with(|| a.bundle_id.cmp(&b.bundle_id))
        });
        ranked.truncate(limit);
        ranked
    }
}

/// Folds the orders of one store into an [`AnalyticsSummary`] in a single pass.
///
/// Cancelled orders are skipped entirely. Orders with an unrecognised bundle type
/// still count everywhere except the per-type breakdown.
pub fn aggregate(records: &[OrderRecord]) -> AnalyticsSummary {
    let mut summary = AnalyticsSummary::empty();
    let mut customers: HashSet<&str> = HashSet::new();

    for order in records {
        if order.status == OrderStatus::Cancelled {
            continue;
        }

        let overview = &mut summary.overview;
        overview.total_revenue += order.revenue;
        overview.total_discounts += order.discount_amount;
        overview.total_orders += 1;

        if let Some(totals) = order
            .bundle_type
            .and_then(|kind| summary.bundle_types.get_mut(&kind))
        {
            totals.count += 1;
            totals.revenue += order.revenue;
        }

        *summary
            .daily_revenue
            .entry(order.created_at.date_naive())
            .or_insert(0.0) += order.revenue;

        let bundle = summary
            .top_bundles
            .entry(order.bundle_id.clone())
            .or_insert_with(|| BundleTotals {
                name: order.bundle_name.clone(),
                orders: 0,
                revenue: 0.0,
                quantity: 0,
            });
        bundle.orders += 1;
        bundle.revenue += order.revenue;
        bundle.quantity += u64::from(order.quantity);

        if let Some(customer) = order.customer_id.as_deref() {
            customers.insert(customer);
            if order.first_purchase == Some(true) {
                summary.customer_metrics.new_customers += 1;
            } else {
                summary.customer_metrics.returning_customers += 1;
            }
        }
    }

    summary.overview.total_bundles = summary.top_bundles.len() as u64;
    summary.customer_metrics.total_customers = customers.len() as u64;
    summary.overview.average_order_value = if summary.overview.total_orders > 0 {
        summary.overview.total_revenue / summary.overview.total_orders as f64
    } else {
        0.0
    };

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn order(id: &str, bundle_id: &str, revenue: f64, status: OrderStatus, day: u32) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            bundle_id: bundle_id.to_string(),
            bundle_name: format!("Bundle {bundle_id}"),
            bundle_type: Some(BundleType::Fixed),
            revenue,
            discount_amount: 0.0,
            quantity: 1,
            status,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            customer_id: None,
            first_purchase: None,
        }
    }

    #[test]
    fn cancelled_orders_are_excluded() {
        let records = vec![
            order("1", "b1", 100.0, OrderStatus::Completed, 1),
            order("2", "b1", 50.0, OrderStatus::Cancelled, 1),
        ];

        let summary = aggregate(&records);

        assert_eq!(summary.overview.total_revenue, 100.0);
        assert_eq!(summary.overview.total_orders, 1);
        assert_eq!(
            summary.bundle_types[&BundleType::Fixed],
            TypeTotals { count: 1, revenue: 100.0 }
        );
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(summary.daily_revenue.len(), 1);
        assert_eq!(summary.daily_revenue[&day], 100.0);
    }

    #[test]
    fn empty_input_yields_zeroed_summary() {
        let summary = aggregate(&[]);

        assert_eq!(summary.overview, Overview::default());
        assert_eq!(summary.overview.average_order_value, 0.0);
        assert_eq!(summary.bundle_types.len(), 3);
        assert!(summary.bundle_types.values().all(|t| *t == TypeTotals::default()));
        assert!(summary.daily_revenue.is_empty());
        assert!(summary.top_bundles.is_empty());
    }

    #[test]
    fn bundle_totals_accumulate_per_id() {
        let mut first = order("1", "b1", 30.0, OrderStatus::Completed, 1);
        let mut second = order("2", "b1", 70.0, OrderStatus::Completed, 2);
        first.quantity = 1;
        second.quantity = 2;

        let summary = aggregate(&[first, second]);

        let totals = &summary.top_bundles["b1"];
        assert_eq!(totals.orders, 2);
        assert_eq!(totals.revenue, 100.0);
        assert_eq!(totals.quantity, 3);
        assert_eq!(totals.name, "Bundle b1");
        assert_eq!(summary.overview.total_bundles, 1);
    }

    #[test]
    fn average_order_value_divides_revenue_by_orders() {
        let records = vec![
            order("1", "b1", 10.0, OrderStatus::Completed, 1),
            order("2", "b2", 20.0, OrderStatus::Other, 2),
            order("3", "b3", 60.0, OrderStatus::Completed, 3),
        ];

        let summary = aggregate(&records);

        assert_eq!(summary.overview.total_orders, 3);
        assert_eq!(summary.overview.average_order_value, 30.0);
    }

    #[test]
    fn unknown_bundle_types_skip_only_the_type_breakdown() {
        let mut mystery = order("1", "b1", 40.0, OrderStatus::Completed, 1);
        mystery.bundle_type = None;
        let mut byob = order("2", "b2", 10.0, OrderStatus::Completed, 1);
        byob.bundle_type = Some(BundleType::Byob);

        let summary = aggregate(&[mystery, byob]);

        assert_eq!(summary.overview.total_revenue, 50.0);
        let typed: f64 = summary.bundle_types.values().map(|t| t.revenue).sum();
        assert_eq!(typed, 10.0);
        assert_eq!(summary.bundle_types[&BundleType::Byob].count, 1);
    }

    #[test]
    fn daily_revenue_buckets_by_utc_date() {
        let mut late = order("1", "b1", 5.0, OrderStatus::Completed, 1);
        late.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap();
        let mut early = order("2", "b1", 7.0, OrderStatus::Completed, 2);
        early.created_at = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let same_day = order("3", "b2", 3.0, OrderStatus::Completed, 2);

        let summary = aggregate(&[late, early, same_day]);

        let keys: Vec<String> = summary.daily_revenue.keys().map(|d| d.to_string()).collect();
        assert_eq!(keys, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(summary.daily_revenue.values().copied().collect::<Vec<_>>(), vec![5.0, 10.0]);
    }

    #[test]
    fn discounts_and_customers_are_tracked() {
        let mut a = order("1", "b1", 10.0, OrderStatus::Completed, 1);
        a.discount_amount = 1.5;
        a.customer_id = Some("ann@example.com".into());
        a.first_purchase = Some(true);
        let mut b = order("2", "b1", 10.0, OrderStatus::Completed, 2);
        b.discount_amount = 0.5;
        b.customer_id = Some("ann@example.com".into());
        b.first_purchase = Some(false);
        let mut c = order("3", "b1", 10.0, OrderStatus::Completed, 3);
        c.customer_id = Some("bob@example.com".into());
        let mut cancelled = order("4", "b1", 10.0, OrderStatus::Cancelled, 3);
        cancelled.customer_id = Some("eve@example.com".into());
        cancelled.discount_amount = 9.0;

        let summary = aggregate(&[a, b, c, cancelled]);

        assert_eq!(summary.overview.total_discounts, 2.0);
        assert_eq!(
            summary.customer_metrics,
            CustomerMetrics {
                new_customers: 1,
                returning_customers: 2,
                total_customers: 2,
            }
        );
    }

    #[test]
    fn ranking_orders_by_revenue_then_orders_then_id() {
        let records = vec![
            order("1", "small", 5.0, OrderStatus::Completed, 1),
            order("2", "big", 50.0, OrderStatus::Completed, 1),
            order("3", "tie-b", 20.0, OrderStatus::Completed, 1),
            order("4", "tie-a", 20.0, OrderStatus::Completed, 1),
        ];

        let ranked = aggregate(&records).ranked_bundles(3);

        let ids: Vec<&str> = ranked.iter().map(|r| r.bundle_id.as_str()).collect();
        assert_eq!(ids, vec!["big", "tie-a", "tie-b"]);
    }

    #[test]
    fn summary_serializes_with_camel_case_keys() {
        let summary = aggregate(&[order("1", "b1", 100.0, OrderStatus::Completed, 1)]);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["overview"]["totalRevenue"], 100.0);
        assert_eq!(json["bundleTypes"]["fixed"]["count"], 1);
        assert_eq!(json["bundleTypes"]["infinite"]["revenue"], 0.0);
        assert_eq!(json["dailyRevenue"]["2024-01-01"], 100.0);
        assert_eq!(json["topBundles"]["b1"]["orders"], 1);
    }
}
