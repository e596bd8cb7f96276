use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::sale::SaleRecord;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SalesSummary {
    pub count: u64,
    pub total_price: Decimal,
    pub total_commission: Decimal,
    pub average_price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentRanking {
    pub agent_name: String,
    /// Company the agent was first recorded under.
    pub company: String,
    pub sales: u64,
    pub total_price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompanyRanking {
    pub company: String,
    pub sales: u64,
    pub total_price: Decimal,
}

/// Totals over the whole store. Empty input degrades to all-zero.
pub fn summarize(records: &[SaleRecord]) -> SalesSummary {
    let count = records.len() as u64;
    let total_price: Decimal = records.iter().map(|record| record.price).sum();
    let total_commission: Decimal = records.iter().map(|record| record.commission).sum();
    let average_price = if count == 0 {
        Decimal::ZERO
    } else {
        total_price / Decimal::from(count)
    };

    SalesSummary { count, total_price, total_commission, average_price }
}

/// Agents by sale count, descending. Entries are accumulated in first-seen
/// order and sorted stably, so equal counts keep their original relative
/// order rather than being re-sorted by a secondary key.
pub fn top_agents(records: &[SaleRecord], limit: usize) -> Vec<AgentRanking> {
    let mut rankings: Vec<AgentRanking> = Vec::new();
    for record in records {
        match rankings.iter_mut().find(|entry| entry.agent_name == record.agent_name) {
            Some(entry) => {
                entry.sales += 1;
                entry.total_price += record.price;
            }
            None => rankings.push(AgentRanking {
                agent_name: record.agent_name.clone(),
                company: record.company.clone(),
                sales: 1,
                total_price: record.price,
            }),
        }
    }

    rankings.sort_by(|a, b| b.sales.cmp(&a.sales));
    rankings.truncate(limit);
    rankings
}

/// Companies by sale count, same stable ordering rules as `top_agents`.
pub fn top_companies(records: &[SaleRecord], limit: usize) -> Vec<CompanyRanking> {
    let mut rankings: Vec<CompanyRanking> = Vec::new();
    for record in records {
        match rankings.iter_mut().find(|entry| entry.company == record.company) {
            Some(entry) => {
                entry.sales += 1;
                entry.total_price += record.price;
            }
            None => rankings.push(CompanyRanking {
                company: record.company.clone(),
                sales: 1,
                total_price: record.price,
            }),
        }
    }

    rankings.sort_by(|a, b| b.sales.cmp(&a.sales));
    rankings.truncate(limit);
    rankings
}
