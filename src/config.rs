use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

/// Config format understood by this build.
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub http: HttpConfig,
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub sessions: SessionsConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        let mut config = Self::parse(&contents)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        let config: Config =
            toml::from_str(contents).with_context(|| "Failed to parse config TOML")?;
        anyhow::ensure!(
            config.version == CONFIG_VERSION,
            "Unsupported config version {}, expected {CONFIG_VERSION}",
            config.version
        );
        Ok(config)
    }

    /// Credentials may come from the environment instead of the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let overrides = [
            ("SPOTIFY_CLIENT_ID", &mut self.oauth.client_id),
            ("SPOTIFY_CLIENT_SECRET", &mut self.oauth.client_secret),
            ("SPOTIFY_REDIRECT_URI", &mut self.oauth.redirect_uri),
        ];
        for (key, field) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OAuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uri: String,
    /// keys the sign-in `state` parameter
    pub state_secret: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

fn default_scope() -> String {
    "playlist-modify-public playlist-modify-private playlist-read-private".to_string()
}

fn default_authorize_url() -> String {
    "https://accounts.spotify.com/authorize".to_string()
}

fn default_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// per call, a call running longer fails
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// extra attempts for reads that failed transiently; moves are never retried
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,
}

fn default_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_read_retries() -> u32 {
    2
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            read_retries: default_read_retries(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionsConfig {
    pub in_memory: bool,
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_config_toml() -> anyhow::Result<()> {
        let toml_str = r#"
version = 1

[http]
bind_addr = "127.0.0.1"
port = 8080

[oauth]
client_id = "abc"
client_secret = "def"
redirect_uri = "http://127.0.0.1:8080/"
state_secret = "long random string"

[api]
timeout_secs = 5

[sessions]
in_memory = true
"#;

        let cfg = Config::parse(toml_str)?;

        assert_eq!(cfg.version, CONFIG_VERSION);
        assert_eq!(cfg.http.port, 8080);
        assert_eq!(cfg.oauth.client_id, "abc");
        assert_eq!(cfg.oauth.scope, default_scope());
        assert_eq!(cfg.oauth.token_url, "https://accounts.spotify.com/api/token");
        assert_eq!(cfg.api.timeout_secs, 5);
        assert_eq!(cfg.api.read_retries, 2);
        assert_eq!(cfg.api.base_url, "https://api.spotify.com/v1");
        assert!(cfg.sessions.in_memory);

        Ok(())
    }

    #[test]
    fn test_parse_minimal_config_with_file_sessions() -> anyhow::Result<()> {
        let toml_str = r#"
version = 1

[http]
bind_addr = "0.0.0.0"
port = 80

[oauth]
state_secret = "s"

[sessions]
in_memory = false
path = "/var/lib/sortify/sessions.db"
"#;

        let cfg: Config = toml::from_str(toml_str)?;

        assert!(cfg.oauth.client_id.is_empty());
        assert_eq!(cfg.api.timeout_secs, 15);
        assert!(!cfg.sessions.in_memory);
        assert_eq!(
            cfg.sessions.path,
            Some(PathBuf::from("/var/lib/sortify/sessions.db"))
        );

        Ok(())
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let toml_str = r#"
version = 2

[http]
bind_addr = "127.0.0.1"
port = 8080

[oauth]
state_secret = "s"

[sessions]
in_memory = true
"#;

        let err = Config::parse(toml_str).unwrap_err();

        assert!(err.to_string().contains("Unsupported config version 2"));
    }

    #[test]
    fn test_env_overrides_credentials() -> anyhow::Result<()> {
        let toml_str = r#"
version = 1

[http]
bind_addr = "127.0.0.1"
port = 8080

[oauth]
client_id = "from-file"
client_secret = "from-file"
state_secret = "s"

[sessions]
in_memory = true
"#;

        let mut cfg: Config = toml::from_str(toml_str)?;
        cfg.apply_env(|key| match key {
            "SPOTIFY_CLIENT_ID" => Some("from-env".to_string()),
            "SPOTIFY_CLIENT_SECRET" => Some(String::new()),
            _ => None,
        });

        assert_eq!(cfg.oauth.client_id, "from-env");
        // empty variables do not wipe the file value
        assert_eq!(cfg.oauth.client_secret, "from-file");
        assert!(cfg.oauth.redirect_uri.is_empty());

        Ok(())
    }
}
