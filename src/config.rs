use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Default)]
#[command(name = "neon-genesis", about = "Community board for sustainable innovation ideas")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Base URL of the backend gateway
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Serve from an in-process backend instead of the gateway
    #[arg(long)]
    pub memory_backend: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Http,
    Memory,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    pub request_timeout_secs: u64,
    pub mode: BackendMode,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub session_hours: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub stale_after_secs: u64,
    /// Upper bound on resident query entries.
    pub max_entries: u64,
    pub idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:4943/api".to_string(),
            request_timeout_secs: 30,
            mode: BackendMode::Http,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "ng_session".to_string(),
            session_hours: 720,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 30,
            max_entries: 10_000,
            idle_secs: 600,
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_hours * 3600)
    }
}

impl CacheConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn time_to_idle(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = cli.config.clone().or_else(Self::default_path);

        let mut config = match config_path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                tracing::info!("Loaded config from {}", path.display());
                toml::from_str(&content)?
            }
            _ => Config::default(),
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref url) = cli.backend_url {
            config.backend.url = url.clone();
        }
        if cli.memory_backend {
            config.backend.mode = BackendMode::Memory;
        }

        Ok(config)
    }

    /// `<config dir>/neon-genesis/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("neon-genesis").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with(config: PathBuf) -> Cli {
        Cli {
            config: Some(config),
            ..Default::default()
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.mode, BackendMode::Http);
        assert_eq!(config.backend.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.auth.cookie_name, "ng_session");
        assert_eq!(config.auth.session_ttl(), Duration::from_secs(720 * 3600));
        assert_eq!(config.cache.stale_after_secs, 30);
        assert_eq!(config.cache.max_entries, 10_000);
        assert_eq!(config.cache.time_to_idle(), Duration::from_secs(600));
    }

    #[test]
    fn default_path_is_under_config_dir() {
        if let Some(path) = Config::default_path() {
            assert!(path.ends_with("neon-genesis/config.toml"));
        }
    }

    #[test]
    fn load_with_missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&cli_with(tmp.path().join("absent.toml"))).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.url, "http://127.0.0.1:4943/api");
    }

    #[test]
    fn load_reads_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "0.0.0.0"
port = 9000

[backend]
url = "https://gateway.example.com/api"
mode = "memory"

[auth]
cookie_name = "my_cookie"
session_hours = 24

[cache]
stale_after_secs = 5
max_entries = 500
"#,
        )
        .unwrap();

        let config = Config::load(&cli_with(config_path)).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.backend.url, "https://gateway.example.com/api");
        assert_eq!(config.backend.mode, BackendMode::Memory);
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert_eq!(config.auth.cookie_name, "my_cookie");
        assert_eq!(config.auth.session_hours, 24);
        assert_eq!(config.cache.stale_after(), Duration::from_secs(5));
        assert_eq!(config.cache.max_entries, 500);
        assert_eq!(config.cache.idle_secs, 600);
    }

    #[test]
    fn cli_overrides_beat_toml_values() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000

[backend]
url = "http://from-file"
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            host: Some("10.0.0.1".to_string()),
            port: Some(4000),
            backend_url: Some("http://from-cli".to_string()),
            memory_backend: true,
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.backend.url, "http://from-cli");
        assert_eq!(config.backend.mode, BackendMode::Memory);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[server\nport = ").unwrap();
        assert!(Config::load(&cli_with(config_path)).is_err());
    }
}
