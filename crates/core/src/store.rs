use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::sale::{NewSale, SaleRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Invalid(#[from] crate::errors::DomainError),
}

/// Record-store port consumed by the wizard engine, the quick-entry path
/// and the stats reporting surfaces. Implementations live in `propfair-db`.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Persist a validated sale in one atomic create call.
    async fn create(&self, sale: NewSale) -> Result<SaleRecord, StoreError>;

    /// Distinct agent names previously recorded for `company`, sorted.
    async fn list_agents(&self, company: &str) -> Result<Vec<String>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn total_price(&self) -> Result<Decimal, StoreError>;

    async fn total_commission(&self) -> Result<Decimal, StoreError>;

    /// All records in insertion order.
    async fn all(&self) -> Result<Vec<SaleRecord>, StoreError>;
}
