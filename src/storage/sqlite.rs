use crate::model::{BundleListing, ByobListing, OrderRecord, StorageError, StoreInfo, StoreRecord};
use crate::normalizer::{coerce_optional_amount, normalize_orders, parse_json_column, RawOrderRow};
use crate::utils::{format_timestamp, parse_datetime};
use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

pub struct SqliteStorage {
    conn: Connection,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS shopify_stores (
        myshopify_domain TEXT PRIMARY KEY,
        shop TEXT NOT NULL,
        name TEXT NOT NULL,
        url TEXT,
        currency_code TEXT NOT NULL DEFAULT 'USD',
        plan_display_name TEXT,
        shopify_plus INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        contact_email TEXT,
        email TEXT,
        country TEXT,
        installed_at TEXT
    );

    CREATE TABLE IF NOT EXISTS bundles (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        shop TEXT NOT NULL,
        bundle_name TEXT NOT NULL,
        bundle_type TEXT NOT NULL,
        discount_type TEXT,
        discount_value,
        product_handle TEXT,
        products TEXT,
        status TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS byobs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        shop TEXT NOT NULL,
        bundle_name TEXT NOT NULL,
        discount_type TEXT,
        discount_value,
        products TEXT,
        product_status TEXT,
        conditions TEXT,
        tiers TEXT,
        media TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS bundle_revenue (
        id TEXT PRIMARY KEY,
        shop TEXT NOT NULL,
        bundle_id TEXT NOT NULL,
        bundle_name TEXT,
        bundle_type TEXT,
        revenue,
        discount_amount,
        quantity,
        order_status TEXT,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_bundle_revenue_shop_created
        ON bundle_revenue (shop, created_at);
";

const STORE_COLUMNS: &str = "myshopify_domain, shop, name, url, currency_code, plan_display_name,
     shopify_plus, created_at, contact_email, email, country, installed_at";

const BUNDLE_COLUMNS: &str = "id, user_id, shop, bundle_name, bundle_type, discount_type,
     discount_value, product_handle, products, status, created_at";

const BYOB_COLUMNS: &str = "id, user_id, shop, bundle_name, discount_type, discount_value,
     products, product_status, conditions, tiers, media, created_at";

impl SqliteStorage {
    /// Opens (or creates) the database file and brings the schema up to date.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::from_connection(Connection::open(db_path)?)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;

        // Customer columns arrived after the first revenue imports
        Self::migrate_add_column_if_missing(&conn, "bundle_revenue", "customer_email", "TEXT")?;
        Self::migrate_add_column_if_missing(&conn, "bundle_revenue", "first_purchase", "INTEGER")?;

        Ok(Self { conn })
    }

    fn migrate_add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        column_def: &str,
    ) -> Result<(), StorageError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let existing_columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if !existing_columns.iter().any(|c| c == column) {
            let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
            conn.execute(&alter_sql, [])?;
        }

        Ok(())
    }

    pub fn save_store(&self, store: &StoreRecord) -> Result<(), StorageError> {
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO shopify_stores ({STORE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                &store.myshopify_domain,
                &store.shop,
                &store.name,
                &store.url,
                &store.currency_code,
                &store.plan_display_name,
                store.shopify_plus,
                store.created_at.as_ref().map(format_timestamp),
                &store.contact_email,
                &store.email,
                &store.country,
                store.installed_at.as_ref().map(format_timestamp),
            ],
        )?;
        Ok(())
    }

    pub fn save_bundle(&self, bundle: &BundleListing) -> Result<(), StorageError> {
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO bundles ({BUNDLE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                &bundle.id,
                &bundle.user_id,
                &bundle.shop,
                &bundle.bundle_name,
                &bundle.bundle_type,
                &bundle.discount_type,
                bundle.discount_value,
                &bundle.product_handle,
                serde_json::to_string(&bundle.products)?,
                &bundle.status,
                format_timestamp(&bundle.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn save_byob(&self, byob: &ByobListing) -> Result<(), StorageError> {
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO byobs ({BYOB_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                &byob.id,
                &byob.user_id,
                &byob.shop,
                &byob.bundle_name,
                &byob.discount_type,
                byob.discount_value,
                serde_json::to_string(&byob.products)?,
                &byob.product_status,
                serde_json::to_string(&byob.conditions)?,
                serde_json::to_string(&byob.tiers)?,
                serde_json::to_string(&byob.media)?,
                format_timestamp(&byob.created_at),
            ],
        )?;
        Ok(())
    }

    /// Records one purchase for `shop`.
    pub fn save_order(&self, shop: &str, order: &OrderRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO bundle_revenue (
                id, shop, bundle_id, bundle_name, bundle_type, revenue, discount_amount,
                quantity, order_status, created_at, customer_email, first_purchase
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                &order.id,
                shop,
                &order.bundle_id,
                &order.bundle_name,
                order.bundle_type.map(|t| t.as_str()),
                order.revenue,
                order.discount_amount,
                order.quantity,
                order.status.as_str(),
                format_timestamp(&order.created_at),
                &order.customer_id,
                order.first_purchase,
            ],
        )?;
        Ok(())
    }

    /// Orders of one shop created within `[since, until]`, newest first.
    pub fn orders_in_window(
        &self,
        shop: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<OrderRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, bundle_id, bundle_name, bundle_type, revenue, discount_amount, quantity,
                    order_status, created_at, customer_email, first_purchase
             FROM bundle_revenue
             WHERE shop = ?1
               AND julianday(created_at) BETWEEN julianday(?2) AND julianday(?3)
             ORDER BY julianday(created_at) DESC",
        )?;

        let rows = stmt.query_map(
            params![shop, format_timestamp(&since), format_timestamp(&until)],
            |row| {
                Ok(RawOrderRow {
                    id: row.get(0)?,
                    bundle_id: row.get(1)?,
                    bundle_name: row.get(2)?,
                    bundle_type: row.get(3)?,
                    revenue: row.get::<_, Value>(4)?,
                    discount_amount: row.get::<_, Value>(5)?,
                    quantity: row.get::<_, Value>(6)?,
                    order_status: row.get(7)?,
                    created_at: Self::timestamp(row, 8)?,
                    customer_email: row.get(9)?,
                    first_purchase: row.get(10)?,
                })
            },
        )?;

        let raw = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(normalize_orders(raw))
    }

    pub fn find_store(&self, shop: &str) -> Result<Option<StoreInfo>, StorageError> {
        let info = self
            .conn
            .query_row(
                "SELECT name, currency_code, plan_display_name, shopify_plus
                 FROM shopify_stores WHERE myshopify_domain = ?1",
                params![shop],
                |row| {
                    Ok(StoreInfo {
                        name: row.get(0)?,
                        currency_code: row.get(1)?,
                        plan_display_name: row.get(2)?,
                        shopify_plus: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }

    /// All stores, most recently installed first.
    pub fn list_stores(&self) -> Result<Vec<StoreRecord>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {STORE_COLUMNS} FROM shopify_stores ORDER BY julianday(installed_at) DESC"
        ))?;
        let rows = stmt.query_map([], Self::map_store)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Regular bundles, newest first; `None` lists every shop.
    pub fn list_bundles(&self, shop: Option<&str>) -> Result<Vec<BundleListing>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BUNDLE_COLUMNS} FROM bundles
             WHERE ?1 IS NULL OR shop = ?1
             ORDER BY julianday(created_at) DESC"
        ))?;
        let rows = stmt.query_map(params![shop], Self::map_bundle)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_byobs(&self, shop: Option<&str>) -> Result<Vec<ByobListing>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BYOB_COLUMNS} FROM byobs
             WHERE ?1 IS NULL OR shop = ?1
             ORDER BY julianday(created_at) DESC"
        ))?;
        let rows = stmt.query_map(params![shop], Self::map_byob)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn ping(&self) -> Result<(), StorageError> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn timestamp(row: &Row, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
        let raw: String = row.get(idx)?;
        parse_datetime(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn optional_timestamp(row: &Row, idx: usize) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
        let raw: Option<String> = row.get(idx)?;
        raw.map(|value| {
            parse_datetime(&value)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
        })
        .transpose()
    }

    fn map_store(row: &Row) -> Result<StoreRecord, rusqlite::Error> {
        Ok(StoreRecord {
            myshopify_domain: row.get(0)?,
            shop: row.get(1)?,
            name: row.get(2)?,
            url: row.get(3)?,
            currency_code: row.get(4)?,
            plan_display_name: row.get(5)?,
            shopify_plus: row.get(6)?,
            created_at: Self::optional_timestamp(row, 7)?,
            contact_email: row.get(8)?,
            email: row.get(9)?,
            country: row.get(10)?,
            installed_at: Self::optional_timestamp(row, 11)?,
        })
    }

    fn map_bundle(row: &Row) -> Result<BundleListing, rusqlite::Error> {
        let bundle_type: String = row.get(4)?;
        Ok(BundleListing {
            id: row.get(0)?,
            user_id: row.get(1)?,
            shop: row.get(2)?,
            bundle_name: row.get(3)?,
            bundle_type: bundle_type.to_lowercase(),
            discount_type: row.get(5)?,
            discount_value: coerce_optional_amount(&row.get::<_, Value>(6)?),
            product_handle: row.get(7)?,
            products: parse_json_column(row.get(8)?),
            status: row.get(9)?,
            created_at: Self::timestamp(row, 10)?,
            shop_info: None,
        })
    }

    fn map_byob(row: &Row) -> Result<ByobListing, rusqlite::Error> {
        Ok(ByobListing {
            id: row.get(0)?,
            user_id: row.get(1)?,
            shop: row.get(2)?,
            bundle_name: row.get(3)?,
            bundle_type: "byob".to_string(),
            discount_type: row.get(4)?,
            discount_value: coerce_optional_amount(&row.get::<_, Value>(5)?),
            products: parse_json_column(row.get(6)?),
            product_status: row.get(7)?,
            conditions: parse_json_column(row.get(8)?),
            tiers: parse_json_column(row.get(9)?),
            media: parse_json_column(row.get(10)?),
            created_at: Self::timestamp(row, 11)?,
            shop_info: None,
        })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}
