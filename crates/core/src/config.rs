use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub chat: ChatConfig,
    pub wizard: WizardConfig,
    pub stats: StatsConfig,
    pub catalog: Catalog,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub bot_token: SecretString,
    pub api_base_url: String,
    /// The single identity permitted to record sales.
    pub admin_user_id: i64,
    pub poll_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct WizardConfig {
    /// Lazy session expiry. Zero retains abandoned sessions forever.
    pub session_ttl_secs: u64,
}

#[derive(Clone, Debug)]
pub struct StatsConfig {
    pub top_agents: usize,
    pub top_companies: usize,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub bot_token: Option<String>,
    pub admin_user_id: Option<i64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://propfair.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            chat: ChatConfig {
                bot_token: String::new().into(),
                api_base_url: "https://api.telegram.org".to_string(),
                admin_user_id: 0,
                poll_timeout_secs: 30,
            },
            wizard: WizardConfig { session_ttl_secs: 1800 },
            stats: StatsConfig { top_agents: 10, top_companies: 5 },
            catalog: Catalog::default(),
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                health_check_port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("propfair.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(chat) = patch.chat {
            if let Some(bot_token_value) = chat.bot_token {
                self.chat.bot_token = bot_token_value.into();
            }
            if let Some(api_base_url) = chat.api_base_url {
                self.chat.api_base_url = api_base_url;
            }
            if let Some(admin_user_id) = chat.admin_user_id {
                self.chat.admin_user_id = admin_user_id;
            }
            if let Some(poll_timeout_secs) = chat.poll_timeout_secs {
                self.chat.poll_timeout_secs = poll_timeout_secs;
            }
        }

        if let Some(wizard) = patch.wizard {
            if let Some(session_ttl_secs) = wizard.session_ttl_secs {
                self.wizard.session_ttl_secs = session_ttl_secs;
            }
        }

        if let Some(stats) = patch.stats {
            if let Some(top_agents) = stats.top_agents {
                self.stats.top_agents = top_agents;
            }
            if let Some(top_companies) = stats.top_companies {
                self.stats.top_companies = top_companies;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(companies) = catalog.companies {
                self.catalog.companies = companies;
            }
            if let Some(districts) = catalog.districts {
                self.catalog.districts = districts;
            }
            if let Some(property_types) = catalog.property_types {
                self.catalog.property_types = property_types;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PROPFAIR_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("PROPFAIR_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("PROPFAIR_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("PROPFAIR_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("PROPFAIR_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PROPFAIR_CHAT_BOT_TOKEN") {
            self.chat.bot_token = value.into();
        }
        if let Some(value) = read_env("PROPFAIR_CHAT_API_BASE_URL") {
            self.chat.api_base_url = value;
        }
        if let Some(value) = read_env("PROPFAIR_CHAT_ADMIN_USER_ID") {
            self.chat.admin_user_id = parse_i64("PROPFAIR_CHAT_ADMIN_USER_ID", &value)?;
        }
        if let Some(value) = read_env("PROPFAIR_CHAT_POLL_TIMEOUT_SECS") {
            self.chat.poll_timeout_secs = parse_u64("PROPFAIR_CHAT_POLL_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PROPFAIR_WIZARD_SESSION_TTL_SECS") {
            self.wizard.session_ttl_secs = parse_u64("PROPFAIR_WIZARD_SESSION_TTL_SECS", &value)?;
        }

        if let Some(value) = read_env("PROPFAIR_STATS_TOP_AGENTS") {
            self.stats.top_agents = parse_u32("PROPFAIR_STATS_TOP_AGENTS", &value)? as usize;
        }
        if let Some(value) = read_env("PROPFAIR_STATS_TOP_COMPANIES") {
            self.stats.top_companies = parse_u32("PROPFAIR_STATS_TOP_COMPANIES", &value)? as usize;
        }

        if let Some(value) = read_env("PROPFAIR_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("PROPFAIR_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("PROPFAIR_SERVER_HEALTH_CHECK_PORT", &value)?;
        }
        if let Some(value) = read_env("PROPFAIR_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("PROPFAIR_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("PROPFAIR_LOGGING_LEVEL").or_else(|| read_env("PROPFAIR_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PROPFAIR_LOGGING_FORMAT").or_else(|| read_env("PROPFAIR_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(bot_token) = overrides.bot_token {
            self.chat.bot_token = bot_token.into();
        }
        if let Some(admin_user_id) = overrides.admin_user_id {
            self.chat.admin_user_id = admin_user_id;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_chat(&self.chat)?;
        validate_stats(&self.stats)?;
        validate_catalog(&self.catalog)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("propfair.toml"), PathBuf::from("config/propfair.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_chat(chat: &ChatConfig) -> Result<(), ConfigError> {
    let token = chat.bot_token.expose_secret();
    if token.is_empty() {
        return Err(ConfigError::Validation(
            "chat.bot_token is required. Create a bot with the platform's bot registrar \
             and copy its token"
                .to_string(),
        ));
    }
    if !token.contains(':') {
        return Err(ConfigError::Validation(
            "chat.bot_token looks malformed (expected `<bot-id>:<secret>`)".to_string(),
        ));
    }

    if !chat.api_base_url.starts_with("http://") && !chat.api_base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "chat.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    if chat.admin_user_id <= 0 {
        return Err(ConfigError::Validation(
            "chat.admin_user_id is required and must be a positive user id".to_string(),
        ));
    }

    if chat.poll_timeout_secs == 0 || chat.poll_timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "chat.poll_timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    Ok(())
}

fn validate_stats(stats: &StatsConfig) -> Result<(), ConfigError> {
    if stats.top_agents == 0 || stats.top_companies == 0 {
        return Err(ConfigError::Validation(
            "stats.top_agents and stats.top_companies must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_catalog(catalog: &Catalog) -> Result<(), ConfigError> {
    if catalog.companies.is_empty()
        || catalog.districts.is_empty()
        || catalog.property_types.is_empty()
    {
        return Err(ConfigError::Validation(
            "catalog.companies, catalog.districts and catalog.property_types must each \
             list at least one entry"
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    chat: Option<ChatPatch>,
    wizard: Option<WizardPatch>,
    stats: Option<StatsPatch>,
    catalog: Option<CatalogPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatPatch {
    bot_token: Option<String>,
    api_base_url: Option<String>,
    admin_user_id: Option<i64>,
    poll_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct WizardPatch {
    session_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct StatsPatch {
    top_agents: Option<usize>,
    top_companies: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    companies: Option<Vec<String>>,
    districts: Option<Vec<String>>,
    property_types: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
