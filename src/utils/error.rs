use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Discord client error: {0}")]
    DiscordError(#[from] serenity::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to forward {event} to engine after {attempts} attempts")]
    DeliveryFailed { event: String, attempts: u32 },

    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Discord,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GatewayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::ConfigError { .. }
            | GatewayError::ConfigValidationError { .. }
            | GatewayError::MissingConfigError { .. }
            | GatewayError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            GatewayError::HttpError(_) | GatewayError::DeliveryFailed { .. } => {
                ErrorCategory::Network
            }
            GatewayError::DiscordError(_) | GatewayError::UnknownCommand { .. } => {
                ErrorCategory::Discord
            }
            GatewayError::SerializationError(_) => ErrorCategory::Data,
            GatewayError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GatewayError::UnknownCommand { .. } => ErrorSeverity::Low,
            GatewayError::HttpError(_) | GatewayError::DeliveryFailed { .. } => {
                ErrorSeverity::Medium
            }
            GatewayError::ConfigError { .. }
            | GatewayError::ConfigValidationError { .. }
            | GatewayError::MissingConfigError { .. }
            | GatewayError::InvalidConfigValueError { .. }
            | GatewayError::SerializationError(_) => ErrorSeverity::High,
            GatewayError::DiscordError(_) | GatewayError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Whether a failed delivery attempt is worth repeating. Only transport
    /// failures qualify; the engine's own error statuses never do.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::HttpError(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GatewayError::MissingConfigError { .. } => {
                "Set the missing value via CLI flag, environment variable or the TOML config file"
            }
            GatewayError::InvalidConfigValueError { .. }
            | GatewayError::ConfigValidationError { .. }
            | GatewayError::ConfigError { .. } => "Check the configuration values and restart",
            GatewayError::HttpError(_) | GatewayError::DeliveryFailed { .. } => {
                "Check that the engine is reachable from the gateway (ENGINE_URL)"
            }
            GatewayError::DiscordError(_) => {
                "Verify DISCORD_TOKEN and that the bot has the privileged intents enabled"
            }
            GatewayError::UnknownCommand { .. } => {
                "Restart the gateway so the command tree is synced again"
            }
            GatewayError::SerializationError(_) => "Report this payload shape as a bug",
            GatewayError::IoError(_) => "Check that the listen address is free and permitted",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Network => format!("Engine communication problem: {}", self),
            ErrorCategory::Discord => format!("Discord problem: {}", self),
            ErrorCategory::Data => format!("Could not encode event: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
