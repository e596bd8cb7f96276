use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaleId(pub i64);

/// A confirmed sale as persisted by the record store. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: SaleId,
    pub agent_name: String,
    pub company: String,
    pub property_type: String,
    pub location: String,
    pub price: Decimal,
    pub commission: Decimal,
    pub client_name: Option<String>,
    pub notes: Option<String>,
    pub sale_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Input for a single atomic create call against the record store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewSale {
    pub agent_name: String,
    pub company: String,
    pub property_type: String,
    pub location: String,
    pub price: Decimal,
    pub commission: Decimal,
    pub client_name: Option<String>,
    pub notes: Option<String>,
}

impl NewSale {
    /// Invariant: all required fields present, price > 0, commission >= 0.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("agent_name", &self.agent_name),
            ("company", &self.company),
            ("property_type", &self.property_type),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::MissingField { field });
            }
        }

        if self.price <= Decimal::ZERO {
            return Err(DomainError::NonPositivePrice { price: self.price });
        }
        if self.commission < Decimal::ZERO {
            return Err(DomainError::NegativeCommission { commission: self.commission });
        }

        Ok(())
    }
}
