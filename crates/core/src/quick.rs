use thiserror::Error;

use crate::amount::{parse_commission, parse_price, AmountError};
use crate::domain::sale::NewSale;

pub const QUICK_ENTRY_USAGE: &str = "Format: /sale agent,company,type,location,price[,commission]\n\n\
     Example:\n/sale María García,InmoPlus,Apartment,Miraflores,180000,9000";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QuickEntryError {
    #[error("expected at least 5 comma-separated fields, got {0}")]
    TooFewFields(usize),
    #[error("invalid price: {0}")]
    Price(AmountError),
    #[error("invalid commission: {0}")]
    Commission(AmountError),
}

/// Single-shot entry: one delimited line parsed into a complete sale, the
/// whole tuple validated at once. Commission is optional and defaults to 0.
pub fn parse_quick_entry(input: &str, client_name: &str) -> Result<NewSale, QuickEntryError> {
    let fields: Vec<&str> = input.split(',').map(str::trim).collect();
    let present = fields.iter().filter(|field| !field.is_empty()).count();
    if fields.len() < 5 || present < 5 {
        return Err(QuickEntryError::TooFewFields(present));
    }

    let price = parse_price(fields[4]).map_err(QuickEntryError::Price)?;
    let commission = match fields.get(5) {
        Some(raw) if !raw.is_empty() => {
            parse_commission(raw).map_err(QuickEntryError::Commission)?
        }
        _ => rust_decimal::Decimal::ZERO,
    };

    Ok(NewSale {
        agent_name: fields[0].to_string(),
        company: fields[1].to_string(),
        property_type: fields[2].to_string(),
        location: fields[3].to_string(),
        price,
        commission,
        client_name: Some(client_name.to_string()),
        notes: None,
    })
}
