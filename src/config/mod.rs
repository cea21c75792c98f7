pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "discord-gateway")]
#[command(about = "Relays Discord gateway events to the game engine")]
pub struct CliArgs {
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: Option<String>,

    /// Base URL of the engine receiving forwarded events
    #[arg(long, env = "ENGINE_URL")]
    pub engine_url: Option<String>,

    /// Shared secret sent to the engine as X-Internal-Auth
    #[arg(long, env = "INTERNAL_API_KEY", hide_env_values = true)]
    pub internal_api_key: Option<String>,

    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Optional TOML configuration file
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordSettings {
    pub token: Option<String>,
    pub clear_guild_commands: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub url: String,
    pub internal_api_key: Option<String>,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub discord: DiscordSettings,
    pub engine: EngineSettings,
    pub server: ServerSettings,
}

/// Blank values and `${VAR}` placeholders left unresolved by the TOML loader count as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        let v = v.trim();
        !v.is_empty() && !(v.starts_with("${") && v.ends_with('}'))
    })
}

impl GatewayConfig {
    /// 載入配置：先讀 TOML 檔案 (若有)，再套用 CLI / 環境變數覆蓋
    pub fn load(args: &CliArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        Self::resolve(args, file)
    }

    pub fn resolve(args: &CliArgs, file: TomlConfig) -> Result<Self> {
        let engine_url = non_empty(args.engine_url.clone()).or(non_empty(file.engine.url));
        let engine_url = validation::validate_required_field("engine.url", &engine_url)?;

        Ok(Self {
            discord: DiscordSettings {
                token: non_empty(args.discord_token.clone()).or(non_empty(file.discord.token)),
                clear_guild_commands: file.discord.clear_guild_commands,
            },
            engine: EngineSettings {
                url: engine_url.trim_end_matches('/').to_string(),
                internal_api_key: non_empty(args.internal_api_key.clone())
                    .or(non_empty(file.engine.internal_api_key)),
                max_retries: file.engine.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
                backoff_base_ms: file.engine.backoff_base_ms.unwrap_or(DEFAULT_BACKOFF_BASE_MS),
                request_timeout_seconds: file
                    .engine
                    .request_timeout_seconds
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            },
            server: ServerSettings {
                host: non_empty(args.host.clone())
                    .or(non_empty(file.server.host))
                    .unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: args.port.or(file.server.port).unwrap_or(DEFAULT_PORT),
            },
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ConfigProvider for GatewayConfig {
    fn engine_url(&self) -> &str {
        &self.engine.url
    }

    fn internal_api_key(&self) -> Option<&str> {
        self.engine.internal_api_key.as_deref()
    }

    fn max_retries(&self) -> u32 {
        self.engine.max_retries
    }

    fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.engine.backoff_base_ms)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.engine.request_timeout_seconds)
    }
}

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("engine.url", &self.engine.url)?;
        validation::validate_range("engine.max_retries", self.engine.max_retries, 1, 10)?;
        validation::validate_positive_number(
            "engine.request_timeout_seconds",
            self.engine.request_timeout_seconds,
            1,
        )?;
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_positive_number("server.port", u64::from(self.server.port), 1)?;
        for guild in &self.discord.clear_guild_commands {
            validation::validate_positive_number("discord.clear_guild_commands", *guild, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::GatewayError;

    fn args_with_engine(url: &str) -> CliArgs {
        CliArgs {
            engine_url: Some(url.to_string()),
            ..CliArgs::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let config =
            GatewayConfig::resolve(&args_with_engine("http://engine:8000/"), TomlConfig::default())
                .unwrap();

        assert_eq!(config.engine.url, "http://engine:8000");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
        assert_eq!(config.max_retries(), 3);
        assert_eq!(config.backoff_base(), Duration::from_secs(1));
        assert!(config.discord.token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = TomlConfig::from_toml_str(
            r#"
[discord]
token = "file-token"

[engine]
url = "http://file-engine"
internal_api_key = "file-key"
max_retries = 4

[server]
port = 9000
"#,
        )
        .unwrap();

        let args = CliArgs {
            discord_token: Some("cli-token".to_string()),
            port: Some(8080),
            ..CliArgs::default()
        };

        let config = GatewayConfig::resolve(&args, file).unwrap();
        assert_eq!(config.discord.token.as_deref(), Some("cli-token"));
        assert_eq!(config.engine.url, "http://file-engine");
        assert_eq!(config.internal_api_key(), Some("file-key"));
        assert_eq!(config.engine.max_retries, 4);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_missing_engine_url_is_reported() {
        let err = GatewayConfig::resolve(&CliArgs::default(), TomlConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::MissingConfigError { ref field } if field == "engine.url"
        ));
    }

    #[test]
    fn test_blank_values_treated_as_missing() {
        let args = CliArgs {
            discord_token: Some("   ".to_string()),
            internal_api_key: Some(String::new()),
            ..args_with_engine("http://engine")
        };
        let config = GatewayConfig::resolve(&args, TomlConfig::default()).unwrap();
        assert!(config.discord.token.is_none());
        assert!(config.internal_api_key().is_none());
    }

    #[test]
    fn test_unresolved_placeholders_treated_as_missing() {
        let file = TomlConfig::from_toml_str(
            r#"
[discord]
token = "${GATEWAY_TEST_UNSET_TOKEN}"

[engine]
url = "http://engine"
"#,
        )
        .unwrap();
        let config = GatewayConfig::resolve(&CliArgs::default(), file).unwrap();
        assert!(config.discord.token.is_none());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config =
            GatewayConfig::resolve(&args_with_engine("ftp://engine"), TomlConfig::default())
                .unwrap();
        assert!(config.validate().is_err());

        config.engine.url = "http://engine".to_string();
        config.engine.max_retries = 0;
        assert!(config.validate().is_err());

        config.engine.max_retries = 3;
        config.server.port = 0;
        assert!(config.validate().is_err());

        config.server.port = 8080;
        config.discord.clear_guild_commands = vec![0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::try_parse_from([
            "discord-gateway",
            "--engine-url",
            "http://engine",
            "--port",
            "9999",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(args.engine_url.as_deref(), Some("http://engine"));
        assert_eq!(args.port, Some(9999));
        assert!(args.verbose);
    }
}
