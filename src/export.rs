// CSV exports of the store and bundle tables.
use crate::analyzer::store_age::compact_age;
use crate::model::CatalogEntry;
use crate::query::StoreSummary;
use chrono::{DateTime, Utc};
use csv::{QuoteStyle, WriterBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("export is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

const STORE_HEADERS: [&str; 11] = [
    "Store Name",
    "Shop URL",
    "Myshopify Domain",
    "Installed At",
    "Email",
    "Contact Email",
    "Currency",
    "Plan",
    "Shopify Plus",
    "Store Age",
    "Country",
];

const BUNDLE_HEADERS: [&str; 8] = [
    "Bundle Name",
    "Type",
    "Discount Type",
    "Discount Value",
    "Status",
    "Products",
    "Shop",
    "Created At",
];

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn write_rows<I>(headers: &[&str], rows: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

pub fn stores_csv(stores: &[StoreSummary], now: DateTime<Utc>) -> Result<String, ExportError> {
    let rows = stores.iter().map(|summary| {
        let store = &summary.store;
        vec![
            store.name.clone(),
            store.shop.clone(),
            store.myshopify_domain.clone(),
            store.installed_at.as_ref().map(format_datetime).unwrap_or_default(),
            store.email.clone().unwrap_or_default(),
            store.contact_email.clone().unwrap_or_default(),
            store.currency_code.clone(),
            store.plan_display_name.clone().unwrap_or_default(),
            if store.shopify_plus { "Yes" } else { "No" }.to_string(),
            store
                .created_at
                .map(|at| compact_age(at, now))
                .unwrap_or_else(|| "-".to_string()),
            store
                .country
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "-".to_string()),
        ]
    });
    write_rows(&STORE_HEADERS, rows)
}

pub fn bundles_csv(entries: &[CatalogEntry]) -> Result<String, ExportError> {
    let rows = entries.iter().map(|entry| {
        vec![
            entry.bundle_name().to_string(),
            entry.bundle_type().to_string(),
            entry.discount_type().unwrap_or("No discount").to_string(),
            entry
                .discount_value()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
            entry.status(),
            entry.product_count().to_string(),
            entry.shop().to_string(),
            format_datetime(&entry.created_at()),
        ]
    });
    write_rows(&BUNDLE_HEADERS, rows)
}
