use rust_decimal::Decimal;

use propfair_core::domain::sale::NewSale;
use propfair_core::store::{SaleStore, StoreError};

/// Demo dataset used by `propfair seed` and integration tests.
pub fn demo_sales() -> Vec<NewSale> {
    let entries = [
        ("María García", "InmoPlus", "Apartment", "Miraflores", 180_000i64, 9_000i64),
        ("María García", "InmoPlus", "Office", "San Isidro", 250_000, 12_500),
        ("Luis Soto", "VentaMax", "House", "Surco", 320_000, 16_000),
        ("Ana Torres", "CasaFácil", "Apartment", "Barranco", 145_000, 7_250),
        ("Luis Soto", "VentaMax", "Land", "La Molina", 98_000, 0),
        ("Rosa Díaz", "InmoPlus", "Commercial unit", "Chorrillos", 210_000, 10_500),
    ];

    entries
        .into_iter()
        .map(|(agent, company, property_type, district, price, commission)| NewSale {
            agent_name: agent.to_string(),
            company: company.to_string(),
            property_type: property_type.to_string(),
            location: district.to_string(),
            price: Decimal::new(price, 0),
            commission: Decimal::new(commission, 0),
            client_name: Some("Seed dataset".to_string()),
            notes: None,
        })
        .collect()
}

pub async fn seed(store: &dyn SaleStore) -> Result<usize, StoreError> {
    let sales = demo_sales();
    let count = sales.len();
    for sale in sales {
        store.create(sale).await?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use propfair_core::store::SaleStore;

    use super::{demo_sales, seed};
    use crate::repositories::InMemorySaleStore;

    #[test]
    fn demo_dataset_is_valid() {
        for sale in demo_sales() {
            sale.validate().expect("seed sales must pass validation");
        }
    }

    #[tokio::test]
    async fn seed_inserts_every_demo_sale() {
        let store = InMemorySaleStore::new();
        let inserted = seed(&store).await.expect("seed");

        assert_eq!(inserted, demo_sales().len());
        assert_eq!(store.count().await.expect("count"), inserted as u64);
    }
}
