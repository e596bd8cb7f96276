use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use propfair_core::domain::sale::{NewSale, SaleId, SaleRecord};
use propfair_core::store::{SaleStore, StoreError};

/// Process-local store used by tests, fixtures and the CLI smoke paths.
/// Records keep insertion order, matching the SQL store's `all()`.
#[derive(Default)]
pub struct InMemorySaleStore {
    records: RwLock<Vec<SaleRecord>>,
}

impl InMemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaleStore for InMemorySaleStore {
    async fn create(&self, sale: NewSale) -> Result<SaleRecord, StoreError> {
        sale.validate()?;

        let mut records = self.records.write().await;
        let created_at = Utc::now();
        let record = SaleRecord {
            id: SaleId(records.len() as i64 + 1),
            agent_name: sale.agent_name,
            company: sale.company,
            property_type: sale.property_type,
            location: sale.location,
            price: sale.price,
            commission: sale.commission,
            client_name: sale.client_name,
            notes: sale.notes,
            sale_date: created_at.date_naive(),
            created_at,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list_agents(&self, company: &str) -> Result<Vec<String>, StoreError> {
        let records = self.records.read().await;
        let mut agents: Vec<String> = records
            .iter()
            .filter(|record| record.company == company)
            .map(|record| record.agent_name.clone())
            .collect();
        agents.sort();
        agents.dedup();
        Ok(agents)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn total_price(&self) -> Result<Decimal, StoreError> {
        Ok(self.records.read().await.iter().map(|record| record.price).sum())
    }

    async fn total_commission(&self) -> Result<Decimal, StoreError> {
        Ok(self.records.read().await.iter().map(|record| record.commission).sum())
    }

    async fn all(&self) -> Result<Vec<SaleRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}

/// Every call fails. Exercises the persistence-failure paths.
#[derive(Default)]
pub struct FailingSaleStore;

#[async_trait]
impl SaleStore for FailingSaleStore {
    async fn create(&self, _sale: NewSale) -> Result<SaleRecord, StoreError> {
        Err(StoreError::Database("injected create failure".to_string()))
    }

    async fn list_agents(&self, _company: &str) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Database("injected list failure".to_string()))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Err(StoreError::Database("injected count failure".to_string()))
    }

    async fn total_price(&self) -> Result<Decimal, StoreError> {
        Err(StoreError::Database("injected sum failure".to_string()))
    }

    async fn total_commission(&self) -> Result<Decimal, StoreError> {
        Err(StoreError::Database("injected sum failure".to_string()))
    }

    async fn all(&self) -> Result<Vec<SaleRecord>, StoreError> {
        Err(StoreError::Database("injected read failure".to_string()))
    }
}
