//! Registration in the desktop MCP client
//!
//! Adds (or replaces) an entry under `mcpServers` in
//! `claude_desktop_config.json` that launches this binary in stdio mode.
//! Other entries and top-level keys in the file are left untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use igdm_core::credentials::{ENV_CSRF_TOKEN, ENV_DS_USER_ID, ENV_SESSION_ID};
use igdm_core::Credential;

/// Key of the server entry under `mcpServers`
pub const DEFAULT_SERVER_NAME: &str = "InstagramDM";

const DESKTOP_CONFIG_FILE: &str = "claude_desktop_config.json";

/// `~/Library/Application Support/Claude/...` on macOS, `%APPDATA%\Claude\...`
/// on Windows and `~/.config/Claude/...` elsewhere
pub fn default_desktop_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("Claude").join(DESKTOP_CONFIG_FILE))
}

/// One entry of `mcpServers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerEntry {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl ServerEntry {
    /// Launch `command --stdio`, passing the credential through the
    /// environment when all three parts are known
    pub fn new(command: impl Into<String>, credential: Option<&Credential>) -> Self {
        let mut env = BTreeMap::new();

        if let Some(credential) = credential {
            if let (Some(csrf_token), Some(user_id)) = (&credential.csrf_token, &credential.user_id) {
                env.insert(ENV_SESSION_ID.to_string(), credential.session_id.clone());
                env.insert(ENV_CSRF_TOKEN.to_string(), csrf_token.clone());
                env.insert(ENV_DS_USER_ID.to_string(), user_id.clone());
            }
        }

        Self {
            command: command.into(),
            args: vec!["--stdio".to_string()],
            env,
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.env.is_empty()
    }
}

/// Write `entry` as `mcpServers.<name>` into the config file at `path`
///
/// A missing file (and its directory) is created.
pub fn register_server(path: &Path, name: &str, entry: &ServerEntry) -> anyhow::Result<()> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            JsonValue::Object(Map::new())
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("{} is not valid JSON", path.display()))?
        }
    } else {
        JsonValue::Object(Map::new())
    };

    let Some(root) = config.as_object_mut() else {
        bail!("{} does not contain a JSON object", path.display());
    };

    let servers = root
        .entry("mcpServers")
        .or_insert_with(|| JsonValue::Object(Map::new()));
    let Some(servers) = servers.as_object_mut() else {
        bail!("mcpServers in {} is not a JSON object", path.display());
    };
    servers.insert(name.to_string(), serde_json::to_value(entry)?);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn credential() -> Credential {
        Credential::new("sid").with_csrf_token("csrf").with_user_id("42")
    }

    fn read(path: &Path) -> JsonValue {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_entry_carries_complete_credential() {
        let entry = ServerEntry::new("/usr/local/bin/igdm-server", Some(&credential()));

        assert!(entry.has_credentials());
        assert_eq!(entry.args, vec!["--stdio"]);
        assert_eq!(entry.env[ENV_SESSION_ID], "sid");
        assert_eq!(entry.env[ENV_CSRF_TOKEN], "csrf");
        assert_eq!(entry.env[ENV_DS_USER_ID], "42");
    }

    #[test]
    fn test_entry_without_complete_credential_has_empty_env() {
        assert!(!ServerEntry::new("igdm-server", None).has_credentials());

        let partial = Credential::new("sid");
        assert!(!ServerEntry::new("igdm-server", Some(&partial)).has_credentials());
    }

    #[test]
    fn test_register_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Claude").join(DESKTOP_CONFIG_FILE);

        let entry = ServerEntry::new("igdm-server", Some(&credential()));
        register_server(&path, DEFAULT_SERVER_NAME, &entry).unwrap();

        let config = read(&path);
        assert_eq!(
            config["mcpServers"]["InstagramDM"],
            json!({
                "command": "igdm-server",
                "args": ["--stdio"],
                "env": {
                    "INSTAGRAM_CSRF_TOKEN": "csrf",
                    "INSTAGRAM_DS_USER_ID": "42",
                    "INSTAGRAM_SESSION_ID": "sid"
                }
            })
        );
    }

    #[test]
    fn test_register_keeps_other_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DESKTOP_CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{"theme": "dark", "mcpServers": {
                "other": {"command": "other"},
                "InstagramDM": {"command": "old", "env": {"INSTAGRAM_SESSION_ID": "stale"}}
            }}"#,
        )
        .unwrap();

        register_server(&path, DEFAULT_SERVER_NAME, &ServerEntry::new("igdm-server", None)).unwrap();

        let config = read(&path);
        assert_eq!(config["theme"], "dark");
        assert_eq!(config["mcpServers"]["other"], json!({"command": "other"}));
        assert_eq!(config["mcpServers"]["InstagramDM"]["command"], "igdm-server");
        assert_eq!(config["mcpServers"]["InstagramDM"]["env"], json!({}));
    }

    #[test]
    fn test_register_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DESKTOP_CONFIG_FILE);
        let entry = ServerEntry::new("igdm-server", None);

        std::fs::write(&path, "{broken").unwrap();
        assert!(register_server(&path, DEFAULT_SERVER_NAME, &entry).is_err());

        std::fs::write(&path, r#"{"mcpServers": []}"#).unwrap();
        assert!(register_server(&path, DEFAULT_SERVER_NAME, &entry).is_err());
        assert_eq!(read(&path), json!({"mcpServers": []}));
    }
}
