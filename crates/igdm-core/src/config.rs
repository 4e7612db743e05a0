//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. igdm.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。
//! Instagram の認証情報はここでは扱いません（`credentials` モジュールを参照）。

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::credentials::DEFAULT_COOKIES_FILE;
use crate::Error;

/// Default config file looked up by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "igdm.toml";

/// How the RPC front-end receives requests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON-RPC over HTTP POST
    #[default]
    Http,
    /// Newline-delimited JSON-RPC over stdin/stdout
    Stdio,
}

impl FromStr for Transport {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "stdio" => Ok(Self::Stdio),
            other => Err(Error::Config(format!("Unknown transport: {}", other))),
        }
    }
}

/// RPC server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind the HTTP transport to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the HTTP transport
    #[serde(default = "default_port")]
    pub port: u16,

    /// Transport used by the front-end
    #[serde(default)]
    pub transport: Transport,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            transport: Transport::default(),
        }
    }
}

/// Instagram client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    /// Base URL of the private API (overridable for testing)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Cookie file consulted as the last credential source
    #[serde(default = "default_cookies_file")]
    pub cookies_file: String,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            cookies_file: default_cookies_file(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Main configuration for the Instagram DM server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// RPC server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Instagram client configuration
    #[serde(default)]
    pub instagram: InstagramConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_base_url() -> String {
    "https://i.instagram.com/api/v1".to_string()
}

fn default_cookies_file() -> String {
    DEFAULT_COOKIES_FILE.to_string()
}

fn default_user_agent() -> String {
    "Instagram 269.0.0.18.75 Android (26/8.0.0; 480dpi; 1080x1920; OnePlus; 6T Dev; devitron; qcom; en_US; 314665256)"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// 設定ファイル内の `${VAR_NAME}` は環境変数の値に置換され、
    /// その後に環境変数による上書きが適用されます。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&Self::expand_env_vars(&toml_content))?;
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    fn from_toml_str(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// `./igdm.toml` があればそれを使い、なければ環境変数のみを使います。
    pub fn load() -> crate::Result<Self> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        Ok(Self::from_env())
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    /// 環境変数で設定を上書きする
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // サーバー設定の上書き
        if let Some(host) = lookup("IGDM_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("IGDM_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("Ignoring invalid IGDM_PORT: {}", port),
            }
        }
        if let Some(transport) = lookup("IGDM_TRANSPORT") {
            match transport.parse() {
                Ok(t) => self.server.transport = t,
                Err(e) => tracing::warn!("Ignoring IGDM_TRANSPORT: {}", e),
            }
        }

        // Instagram 設定の上書き
        if let Some(url) = lookup("INSTAGRAM_API_BASE_URL") {
            self.instagram.api_base_url = url;
        }
        if let Some(path) = lookup("INSTAGRAM_COOKIES_FILE") {
            self.instagram.cookies_file = path;
        }
        if let Some(agent) = lookup("INSTAGRAM_USER_AGENT") {
            self.instagram.user_agent = agent;
        }
        if let Some(secs) = lookup("INSTAGRAM_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse() {
                self.instagram.timeout_secs = s;
            }
        }
    }

    /// Address string the HTTP transport binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.transport, Transport::Http);
        assert_eq!(config.instagram.cookies_file, "instagram_cookies.json");
        assert_eq!(config.instagram.api_base_url, "https://i.instagram.com/api/v1");
        assert_eq!(config.instagram.timeout_secs, 30);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_transport_from_str() {
        assert_eq!("stdio".parse::<Transport>().unwrap(), Transport::Stdio);
        assert_eq!(" HTTP ".parse::<Transport>().unwrap(), Transport::Http);
        assert!("websocket".parse::<Transport>().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup_from(&[
            ("IGDM_HOST", "127.0.0.1"),
            ("IGDM_PORT", "9090"),
            ("IGDM_TRANSPORT", "stdio"),
            ("INSTAGRAM_COOKIES_FILE", "/tmp/cookies.json"),
            ("INSTAGRAM_TIMEOUT_SECS", "5"),
        ]));

        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.server.transport, Transport::Stdio);
        assert_eq!(config.instagram.cookies_file, "/tmp/cookies.json");
        assert_eq!(config.instagram.timeout_secs, 5);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup_from(&[
            ("IGDM_PORT", "not-a-port"),
            ("IGDM_TRANSPORT", "carrier-pigeon"),
            ("IGDM_HOST", "   "),
        ]));

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.transport, Transport::Http);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 3001
transport = "stdio"

[instagram]
api_base_url = "http://localhost:9999/api/v1"
cookies_file = "/etc/igdm/cookies.json"
"#;

        let config = Config::from_toml_str(toml_content).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.transport, Transport::Stdio);
        assert_eq!(config.instagram.api_base_url, "http://localhost:9999/api/v1");
        assert_eq!(config.instagram.cookies_file, "/etc/igdm/cookies.json");
        // 未指定の項目はデフォルト値
        assert_eq!(config.instagram.timeout_secs, 30);
    }

    #[test]
    fn test_toml_partial_sections() {
        let config = Config::from_toml_str("[server]\nport = 1234\n").unwrap();
        assert_eq!(config.server.port, 1234);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.instagram.cookies_file, "instagram_cookies.json");
    }

    #[test]
    fn test_toml_invalid() {
        let err = Config::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("IGDM_CONFIG_TEST_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${IGDM_CONFIG_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${IGDM_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("IGDM_CONFIG_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        assert_eq!(Config::expand_env_vars("no_vars_here $HOME"), "no_vars_here $HOME");
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("igdm.toml");
        std::fs::write(&path, "[instagram]\nuser_agent = \"igdm-test\"\n").unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.instagram.user_agent, "igdm-test");
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = Config::from_toml_file("/nonexistent/igdm.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
