use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub mattermost: MattermostConfig,
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
pub struct MattermostConfig {
    /// Base URL of the Mattermost instance, e.g. `https://chat.example.com`.
    pub url: String,
    /// Personal-access token used for user-directory lookups.
    pub pa_token: SecretString,
    /// Upper bound on a single directory request.
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Externally reachable base URL of this service. Callback actions and
    /// the bar image are addressed relative to it.
    pub public_url: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub mattermost_url: Option<String>,
    pub mattermost_pa_token: Option<String>,
    pub public_url: Option<String>,
    pub log_level: Option<String>,
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
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://pollbot.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            mattermost: MattermostConfig {
                url: String::new(),
                pa_token: String::new().into(),
                request_timeout_secs: 10,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                public_url: "http://127.0.0.1:5000".to_string(),
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

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    mattermost: Option<MattermostPatch>,
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
struct MattermostPatch {
    url: Option<String>,
    pa_token: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    public_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    /// Loads the effective configuration: defaults, then the TOML file (if
    /// any), then `POLLBOT_*` environment overrides, then programmatic
    /// overrides, then validation.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("pollbot.toml"));
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

        if let Some(mattermost) = patch.mattermost {
            if let Some(url) = mattermost.url {
                self.mattermost.url = url;
            }
            if let Some(pa_token_value) = mattermost.pa_token {
                self.mattermost.pa_token = pa_token_value.into();
            }
            if let Some(request_timeout_secs) = mattermost.request_timeout_secs {
                self.mattermost.request_timeout_secs = request_timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(public_url) = server.public_url {
                self.server.public_url = public_url;
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
        if let Some(url) = non_empty_env("POLLBOT_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(url) = non_empty_env("POLLBOT_MATTERMOST_URL") {
            self.mattermost.url = url;
        }
        if let Some(token) = non_empty_env("POLLBOT_MATTERMOST_PA_TOKEN") {
            self.mattermost.pa_token = token.into();
        }
        if let Some(public_url) = non_empty_env("POLLBOT_PUBLIC_URL") {
            self.server.public_url = public_url;
        }
        if let Some(port) = non_empty_env("POLLBOT_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "POLLBOT_PORT".to_string(),
                value: port,
            })?;
        }
        if let Some(level) = non_empty_env("POLLBOT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = non_empty_env("POLLBOT_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(mattermost_url) = overrides.mattermost_url {
            self.mattermost.url = mattermost_url;
        }
        if let Some(pa_token_value) = overrides.mattermost_pa_token {
            self.mattermost.pa_token = pa_token_value.into();
        }
        if let Some(public_url) = overrides.public_url {
            self.server.public_url = public_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be non-zero".to_string()));
        }
        if !has_http_scheme(&self.server.public_url) {
            return Err(ConfigError::Validation(format!(
                "server.public_url must be an http(s) URL, got `{}`",
                self.server.public_url
            )));
        }
        if !self.mattermost.url.is_empty() && !has_http_scheme(&self.mattermost.url) {
            return Err(ConfigError::Validation(format!(
                "mattermost.url must be an http(s) URL, got `{}`",
                self.mattermost.url
            )));
        }
        if self.database.url.is_empty() {
            return Err(ConfigError::Validation("database.url must not be empty".to_string()));
        }

        Ok(())
    }
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) if path.exists() => Some(path.to_path_buf()),
        Some(_) => None,
        None => {
            let fallback = Path::new("pollbot.toml");
            fallback.exists().then(|| fallback.to_path_buf())
        }
    }
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}
