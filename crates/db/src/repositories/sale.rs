use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use propfair_core::domain::sale::{NewSale, SaleId, SaleRecord};
use propfair_core::store::{SaleStore, StoreError};

use crate::DbPool;

pub struct SqlSaleStore {
    pool: DbPool,
}

impl SqlSaleStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(error: sqlx::Error) -> StoreError {
    StoreError::Database(error.to_string())
}

fn decode_decimal(raw: &str, column: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(raw)
        .map_err(|_| StoreError::Decode(format!("column `{column}` holds non-decimal `{raw}`")))
}

fn row_to_record(row: &SqliteRow) -> Result<SaleRecord, StoreError> {
    let price_raw: String =
        row.try_get("price").map_err(|error| StoreError::Decode(error.to_string()))?;
    let commission_raw: String =
        row.try_get("commission").map_err(|error| StoreError::Decode(error.to_string()))?;

    Ok(SaleRecord {
        id: SaleId(row.try_get::<i64, _>("id").map_err(db_error)?),
        agent_name: row.try_get("agent_name").map_err(db_error)?,
        company: row.try_get("company").map_err(db_error)?,
        property_type: row.try_get("property_type").map_err(db_error)?,
        location: row.try_get("location").map_err(db_error)?,
        price: decode_decimal(&price_raw, "price")?,
        commission: decode_decimal(&commission_raw, "commission")?,
        client_name: row.try_get("client_name").map_err(db_error)?,
        notes: row.try_get("notes").map_err(db_error)?,
        sale_date: row.try_get::<NaiveDate, _>("sale_date").map_err(db_error)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(db_error)?,
    })
}

#[async_trait]
impl SaleStore for SqlSaleStore {
    async fn create(&self, sale: NewSale) -> Result<SaleRecord, StoreError> {
        sale.validate()?;

        let created_at = Utc::now();
        let sale_date = created_at.date_naive();

        let result = sqlx::query(
            "INSERT INTO sale \
             (agent_name, company, property_type, location, price, commission, \
              client_name, notes, sale_date, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&sale.agent_name)
        .bind(&sale.company)
        .bind(&sale.property_type)
        .bind(&sale.location)
        .bind(sale.price.to_string())
        .bind(sale.commission.to_string())
        .bind(&sale.client_name)
        .bind(&sale.notes)
        .bind(sale_date)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(SaleRecord {
            id: SaleId(result.last_insert_rowid()),
            agent_name: sale.agent_name,
            company: sale.company,
            property_type: sale.property_type,
            location: sale.location,
            price: sale.price,
            commission: sale.commission,
            client_name: sale.client_name,
            notes: sale.notes,
            sale_date,
            created_at,
        })
    }

    async fn list_agents(&self, company: &str) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT agent_name FROM sale WHERE company = ? ORDER BY agent_name",
        )
        .bind(company)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("agent_name").map_err(db_error))
            .collect()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(count as u64)
    }

    async fn total_price(&self) -> Result<Decimal, StoreError> {
        self.sum_column("price").await
    }

    async fn total_commission(&self) -> Result<Decimal, StoreError> {
        self.sum_column("commission").await
    }

    async fn all(&self) -> Result<Vec<SaleRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM sale ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(row_to_record).collect()
    }
}

impl SqlSaleStore {
    /// Amounts live in TEXT columns, so summing happens on decoded decimals
    /// rather than relying on sqlite's numeric coercion.
    async fn sum_column(&self, column: &str) -> Result<Decimal, StoreError> {
        let query = match column {
            "price" => "SELECT price AS amount FROM sale",
            "commission" => "SELECT commission AS amount FROM sale",
            _ => return Err(StoreError::Decode(format!("unknown amount column `{column}`"))),
        };

        let rows = sqlx::query(query).fetch_all(&self.pool).await.map_err(db_error)?;

        let mut total = Decimal::ZERO;
        for row in &rows {
            let raw: String =
                row.try_get("amount").map_err(|error| StoreError::Decode(error.to_string()))?;
            total += decode_decimal(&raw, column)?;
        }
        Ok(total)
    }
}
