use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::ServerError;

#[derive(Parser, Debug, Default)]
#[command(name = "frontpage-server", about = "Cover page generator with an admin API")]
pub struct Cli {
    /// Optional TOML settings file. CLI flags and env vars override it.
    #[arg(long, env = "FRONTPAGE_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// HTTP port (default 5000).
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Listen address (default 0.0.0.0).
    #[arg(long, env = "BIND_ADDR")]
    pub bind: Option<IpAddr>,

    /// Shared secret for the admin API. Unset disables it.
    #[arg(long, env = "ADMIN_API_KEY", hide_env_values = true)]
    pub admin_key: Option<String>,

    /// Admin config JSON file.
    #[arg(long, env = "ADMIN_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// Generation log (JSON lines).
    #[arg(long, env = "FRONTPAGE_LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// Cover page template image.
    #[arg(long, env = "FRONTPAGE_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// TrueType font for the cover text. Built-in bitmap font when unset.
    #[arg(long, env = "FRONTPAGE_FONT")]
    pub font: Option<PathBuf>,
}

// ---- TOML Settings ----

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub port: Option<u16>,
    pub bind: Option<IpAddr>,
    pub admin_key: Option<String>,
    pub config_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub font: Option<PathBuf>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path).map_err(|e| ServerError::Config {
            context: "read",
            detail: format!("'{}': {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| ServerError::Config {
            context: "parse",
            detail: format!("'{}': {e}", path.display()),
        })
    }
}

fn default_port() -> u16 {
    5000
}
fn default_config_path() -> PathBuf {
    PathBuf::from("admin_config.json")
}
fn default_log_path() -> PathBuf {
    PathBuf::from("frontpage_logs.jsonl")
}
fn default_template() -> PathBuf {
    PathBuf::from("static/template.png")
}

/// Effective runtime configuration.
#[derive(Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub admin_key: Option<String>,
    pub config_path: PathBuf,
    pub log_path: PathBuf,
    pub template: PathBuf,
    pub font: Option<PathBuf>,
}

impl ServerConfig {
    pub fn resolve(cli: Cli) -> Result<Self, ServerError> {
        let settings = match &cli.settings {
            Some(path) => {
                tracing::info!(settings = %path.display(), "loading settings file");
                Settings::load(path)?
            }
            None => Settings::default(),
        };
        Ok(Self::merge(cli, settings))
    }

    fn merge(cli: Cli, settings: Settings) -> Self {
        let port = cli.port.or(settings.port).unwrap_or_else(default_port);
        let bind = cli
            .bind
            .or(settings.bind)
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        Self {
            addr: SocketAddr::new(bind, port),
            admin_key: cli.admin_key.or(settings.admin_key),
            config_path: cli
                .config_path
                .or(settings.config_path)
                .unwrap_or_else(default_config_path),
            log_path: cli
                .log_path
                .or(settings.log_path)
                .unwrap_or_else(default_log_path),
            template: cli
                .template
                .or(settings.template)
                .unwrap_or_else(default_template),
            font: cli.font.or(settings.font),
        }
    }
}
