pub mod amount;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod quick;
pub mod stats;
pub mod store;
pub mod wizard;

pub use amount::{format_amount, parse_amount, parse_commission, parse_price, AmountError};
pub use catalog::Catalog;
pub use domain::sale::{NewSale, SaleId, SaleRecord};
pub use domain::UserId;
pub use errors::{ApplicationError, DomainError};
pub use quick::{parse_quick_entry, QuickEntryError, QUICK_ENTRY_USAGE};
pub use stats::{summarize, top_agents, top_companies, AgentRanking, CompanyRanking, SalesSummary};
pub use store::{SaleStore, StoreError};
pub use wizard::{
    ButtonSpec, InMemorySessionStore, ReplyMode, SaleDraft, SessionStore, WizardButton,
    WizardEngine, WizardReply, WizardSession, WizardStage,
};
