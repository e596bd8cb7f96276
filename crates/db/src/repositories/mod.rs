pub mod memory;
pub mod sale;

pub use memory::{FailingSaleStore, InMemorySaleStore};
pub use sale::SqlSaleStore;
