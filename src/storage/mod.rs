pub mod sqlite;

pub use sqlite::SqliteStorage;

use crate::model::{BundleListing, ByobListing, OrderRecord, StorageError, StoreInfo, StoreRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// Read side of the data store, as the query layer sees it.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn orders_in_window(
        &self,
        shop: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<OrderRecord>, StorageError>;

    async fn find_store(&self, shop: &str) -> Result<Option<StoreInfo>, StorageError>;

    async fn list_stores(&self) -> Result<Vec<StoreRecord>, StorageError>;

    async fn list_bundles(&self, shop: Option<&str>) -> Result<Vec<BundleListing>, StorageError>;

    async fn list_byobs(&self, shop: Option<&str>) -> Result<Vec<ByobListing>, StorageError>;

    async fn ping(&self) -> Result<(), StorageError>;
}

#[async_trait]
impl Repository for Mutex<SqliteStorage> {
    async fn orders_in_window(
        &self,
        shop: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<OrderRecord>, StorageError> {
        self.lock().await.orders_in_window(shop, since, until)
    }

    async fn find_store(&self, shop: &str) -> Result<Option<StoreInfo>, StorageError> {
        self.lock().await.find_store(shop)
    }

    async fn list_stores(&self) -> Result<Vec<StoreRecord>, StorageError> {
        self.lock().await.list_stores()
    }

    async fn list_bundles(&self, shop: Option<&str>) -> Result<Vec<BundleListing>, StorageError> {
        self.lock().await.list_bundles(shop)
    }

    async fn list_byobs(&self, shop: Option<&str>) -> Result<Vec<ByobListing>, StorageError> {
        self.lock().await.list_byobs(shop)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.lock().await.ping()
    }
}
