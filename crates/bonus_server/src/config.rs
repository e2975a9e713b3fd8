//! Server configuration: TOML file, then environment, then CLI flags.

use bonus_tictactoe::{PolicyKind, ThinkingDelay};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration for the relay server and hosted games.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Chat platform bot token (env `BOT_TOKEN`).
    bot_token: Option<String>,

    /// Address to bind.
    host: String,

    /// Port to bind (env `PORT`).
    port: u16,

    /// Mini-app origin allowed by CORS (env `WEBAPP_URL`).
    webapp_url: Option<String>,

    /// Chat platform API root.
    api_base: String,

    /// Pause before the computer moves in hosted games.
    thinking_delay: ThinkingDelay,

    /// Computer opponent for hosted games.
    policy: PolicyKind,

    /// Reply to the `/start` bot command.
    greeting: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            host: "127.0.0.1".to_string(),
            port: 3001,
            webapp_url: None,
            api_base: "https://api.telegram.org".to_string(),
            thinking_delay: ThinkingDelay::default(),
            policy: PolicyKind::default(),
            greeting: concat!(
                "Hi! I'm here to help you play. ",
                "Open the app to get bonuses and a little happiness 🌸"
            )
            .to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.thinking_delay =
            ThinkingDelay::new(config.thinking_delay.min_ms, config.thinking_delay.max_ms);

        info!(port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file if given and present, then applies process environment.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                info!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Applies `BOT_TOKEN`, `PORT`, `WEBAPP_URL` from `lookup`.
    #[instrument(skip_all)]
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(token) = lookup("BOT_TOKEN").filter(|t| !t.is_empty()) {
            self.bot_token = Some(token);
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::new(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Some(url) = lookup("WEBAPP_URL").filter(|u| !u.is_empty()) {
            self.webapp_url = Some(url);
        }
        Ok(self)
    }

    /// Overrides the bind host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Overrides the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Overrides the chat platform API root.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Returns the bot token or fails if none was configured.
    pub fn require_bot_token(&self) -> Result<&str, ConfigError> {
        self.bot_token.as_deref().ok_or_else(|| {
            ConfigError::new("BOT_TOKEN not set in environment or config".to_string())
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
