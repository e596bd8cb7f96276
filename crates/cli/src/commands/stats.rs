use crate::commands::CommandResult;
use propfair_core::config::{AppConfig, LoadOptions};
use propfair_core::stats::{summarize, top_agents, top_companies};
use propfair_core::store::SaleStore;
use propfair_core::{format_amount, SaleRecord};
use propfair_db::{connect_with_settings, migrations, SqlSaleStore};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "stats",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match crate::commands::runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "stats",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let store = SqlSaleStore::new(pool.clone());
        let records =
            store.all().await.map_err(|error| ("records_read", error.to_string(), 6u8))?;
        pool.close().await;
        Ok::<Vec<SaleRecord>, (&'static str, String, u8)>(records)
    });

    let records = match result {
        Ok(records) => records,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("stats", error_class, message, exit_code);
        }
    };

    CommandResult {
        exit_code: 0,
        output: render_report(&records, config.stats.top_agents, config.stats.top_companies),
    }
}

fn render_report(records: &[SaleRecord], agent_limit: usize, company_limit: usize) -> String {
    let summary = summarize(records);
    let mut lines = vec![
        "SALES REPORT".to_string(),
        String::new(),
        format!("total sales:      {}", summary.count),
        format!("total volume:     ${}", format_amount(&summary.total_price)),
        format!("total commission: ${}", format_amount(&summary.total_commission)),
        format!("average sale:     ${}", format_amount(&summary.average_price)),
    ];

    let agents = top_agents(records, agent_limit);
    if !agents.is_empty() {
        lines.push(String::new());
        lines.push("top agents:".to_string());
        for (position, entry) in agents.iter().enumerate() {
            lines.push(format!(
                "  {}. {} ({}) - {} sales, ${}",
                position + 1,
                entry.agent_name,
                entry.company,
                entry.sales,
                format_amount(&entry.total_price),
            ));
        }
    }

    let companies = top_companies(records, company_limit);
    if !companies.is_empty() {
        lines.push(String::new());
        lines.push("top companies:".to_string());
        for (position, entry) in companies.iter().enumerate() {
            lines.push(format!(
                "  {}. {} - {} sales, ${}",
                position + 1,
                entry.company,
                entry.sales,
                format_amount(&entry.total_price),
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use propfair_core::domain::sale::{SaleId, SaleRecord};

    use super::render_report;

    fn record(agent: &str, company: &str, price: i64) -> SaleRecord {
        let now = Utc::now();
        SaleRecord {
            id: SaleId(1),
            agent_name: agent.to_string(),
            company: company.to_string(),
            property_type: "House".to_string(),
            location: "Surco".to_string(),
            price: Decimal::new(price, 0),
            commission: Decimal::ZERO,
            client_name: None,
            notes: None,
            sale_date: now.date_naive(),
            created_at: now,
        }
    }

    #[test]
    fn empty_report_has_zero_totals_and_no_rankings() {
        let report = render_report(&[], 10, 5);
        assert!(report.contains("total sales:      0"));
        assert!(report.contains("average sale:     $0"));
        assert!(!report.contains("top agents:"));
    }

    #[test]
    fn report_lists_agents_and_companies() {
        let records =
            vec![record("Ana", "InmoPlus", 100_000), record("Luis", "VentaMax", 200_000)];
        let report = render_report(&records, 10, 5);
        assert!(report.contains("top agents:"));
        assert!(report.contains("1. Ana (InmoPlus) - 1 sales, $100,000"));
        assert!(report.contains("top companies:"));
    }
}
