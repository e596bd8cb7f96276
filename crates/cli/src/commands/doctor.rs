use serde::Serialize;

use propfair_core::config::{AppConfig, LoadOptions};
use propfair_core::store::SaleStore;
use propfair_db::{connect_with_settings, ping, SqlSaleStore};

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: &'static str,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    status: &'static str,
    checks: Vec<DoctorCheck>,
}

pub fn run(json: bool) -> String {
    let report = build_report();
    if json {
        serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("{{\"status\":\"error\",\"message\":\"{error}\"}}"))
    } else {
        render_text(&report)
    }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config",
                status: "ok",
                detail: "configuration loaded and validated".to_string(),
            });
            config
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config",
                status: "error",
                detail: error.to_string(),
            });
            return DoctorReport { status: "error", checks };
        }
    };

    match crate::commands::runtime() {
        Ok(runtime) => runtime.block_on(async {
            match connect_with_settings(
                &config.database.url,
                config.database.max_connections,
                config.database.timeout_secs,
            )
            .await
            {
                Ok(pool) => {
                    match ping(&pool).await {
                        Ok(()) => checks.push(DoctorCheck {
                            name: "database",
                            status: "ok",
                            detail: format!("connected to {}", config.database.url),
                        }),
                        Err(error) => checks.push(DoctorCheck {
                            name: "database",
                            status: "error",
                            detail: format!("ping failed: {error}"),
                        }),
                    }

                    let store = SqlSaleStore::new(pool.clone());
                    match store.count().await {
                        Ok(count) => checks.push(DoctorCheck {
                            name: "records",
                            status: "ok",
                            detail: format!("{count} sales recorded"),
                        }),
                        Err(error) => checks.push(DoctorCheck {
                            name: "records",
                            status: "error",
                            detail: format!("count failed (run `propfair migrate`?): {error}"),
                        }),
                    }
                    pool.close().await;
                }
                Err(error) => checks.push(DoctorCheck {
                    name: "database",
                    status: "error",
                    detail: format!("connect failed: {error}"),
                }),
            }
        }),
        Err(error) => checks.push(DoctorCheck {
            name: "runtime",
            status: "error",
            detail: format!("failed to initialize async runtime: {error}"),
        }),
    }

    let healthy = checks.iter().all(|check| check.status == "ok");
    DoctorReport { status: if healthy { "ok" } else { "error" }, checks }
}

fn render_text(report: &DoctorReport) -> String {
    let mut lines = vec![format!("doctor: {}", report.status)];
    for check in &report.checks {
        lines.push(format!("  [{}] {} - {}", check.status, check.name, check.detail));
    }
    lines.join("\n")
}
