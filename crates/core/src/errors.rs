use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::UserId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("required sale field `{field}` is missing")]
    MissingField { field: &'static str },
    #[error("sale price must be positive, got {price}")]
    NonPositivePrice { price: Decimal },
    #[error("sale commission may not be negative, got {commission}")]
    NegativeCommission { commission: Decimal },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("user {user_id} is not permitted to record sales")]
    Unauthorized { user_id: UserId },
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Text safe to show in chat. Internal detail stays in logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "The sale data is invalid. Check the values and try again.",
            Self::Unauthorized { .. } => "Only the administrator can record sales.",
            Self::Persistence(_) => "The sale could not be saved. Please try again later.",
            Self::Configuration(_) => "The service is misconfigured. Contact the operator.",
        }
    }
}
