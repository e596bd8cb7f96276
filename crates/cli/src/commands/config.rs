use propfair_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let mut lines =
        vec!["effective config (source precedence: overrides > env > file > default):".to_string()];

    lines.push(render("database.url", &config.database.url));
    lines.push(render(
        "database.max_connections",
        &config.database.max_connections.to_string(),
    ));
    lines.push(render("database.timeout_secs", &config.database.timeout_secs.to_string()));

    lines.push(render("chat.bot_token", &redact_token(config.chat.bot_token.expose_secret())));
    lines.push(render("chat.api_base_url", &config.chat.api_base_url));
    lines.push(render("chat.admin_user_id", &config.chat.admin_user_id.to_string()));
    lines.push(render("chat.poll_timeout_secs", &config.chat.poll_timeout_secs.to_string()));

    lines.push(render("wizard.session_ttl_secs", &config.wizard.session_ttl_secs.to_string()));
    lines.push(render("stats.top_agents", &config.stats.top_agents.to_string()));
    lines.push(render("stats.top_companies", &config.stats.top_companies.to_string()));

    lines.push(render("catalog.companies", &config.catalog.companies.join(", ")));
    lines.push(render("catalog.districts", &config.catalog.districts.join(", ")));
    lines.push(render("catalog.property_types", &config.catalog.property_types.join(", ")));

    lines.push(render("server.bind_address", &config.server.bind_address));
    lines.push(render("server.health_check_port", &config.server.health_check_port.to_string()));
    lines.push(render("logging.level", &config.logging.level));
    lines.push(render("logging.format", &format!("{:?}", config.logging.format)));

    lines.join("\n")
}

fn render(key: &str, value: &str) -> String {
    format!("  {key} = {value}")
}

fn redact_token(token: &str) -> String {
    match token.split_once(':') {
        Some((bot_id, _)) => format!("{bot_id}:***"),
        None if token.is_empty() => "<unset>".to_string(),
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::redact_token;

    #[test]
    fn redaction_keeps_only_the_bot_id() {
        assert_eq!(redact_token("12345:secret-part"), "12345:***");
        assert_eq!(redact_token(""), "<unset>");
        assert_eq!(redact_token("opaque"), "***");
    }
}
