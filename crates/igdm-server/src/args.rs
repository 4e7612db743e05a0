//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use igdm_core::{Config, Credential, Transport};

use crate::install::DEFAULT_SERVER_NAME;

#[derive(Debug, Parser)]
#[command(
    name = "igdm-server",
    version,
    about = "Instagram DM tool server speaking JSON-RPC over HTTP or stdio"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (default: ./igdm.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP transport to
    #[arg(long)]
    pub host: Option<String>,

    /// Port for the HTTP transport
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Serve newline-delimited JSON-RPC on stdin/stdout instead of HTTP
    #[arg(long)]
    pub stdio: bool,

    /// Cookie file consulted when no credential is set in the environment
    #[arg(long, global = true)]
    pub cookies_file: Option<PathBuf>,

    /// Instagram session id
    #[arg(short = 's', long, global = true)]
    pub session_id: Option<String>,

    /// Instagram csrf token
    #[arg(long, global = true)]
    pub csrf_token: Option<String>,

    /// Instagram user id
    #[arg(short = 'd', long, global = true)]
    pub ds_user_id: Option<String>,

    /// Write the resolved credential to the cookie file
    #[arg(long)]
    pub save_cookies: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register this server in the desktop MCP client configuration
    Install {
        /// Desktop client config file (default: the platform's claude_desktop_config.json)
        #[arg(long)]
        desktop_config: Option<PathBuf>,

        /// Key of the entry under `mcpServers`
        #[arg(long, default_value = DEFAULT_SERVER_NAME)]
        name: String,
    },
}

impl Args {
    /// Apply flag overrides on top of the loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.stdio {
            config.server.transport = Transport::Stdio;
        }
        if let Some(path) = &self.cookies_file {
            config.instagram.cookies_file = path.display().to_string();
        }
    }

    /// Credential given as flags; only a complete triple counts
    pub fn command_line_credential(&self) -> Option<Credential> {
        let given = [&self.session_id, &self.csrf_token, &self.ds_user_id]
            .iter()
            .filter(|v| v.is_some())
            .count();

        let credential = Credential::from_parts(
            self.session_id.clone(),
            self.csrf_token.clone(),
            self.ds_user_id.clone(),
        );
        if credential.is_none() && given > 0 {
            tracing::warn!(
                "Ignoring incomplete credential flags: --session-id, --csrf-token and --ds-user-id must all be given"
            );
        }
        credential
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_config_alone() {
        let args = Args::try_parse_from(["igdm-server"]).unwrap();
        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.server.transport, Transport::Http);
        assert!(!args.save_cookies);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "igdm-server",
            "--host",
            "127.0.0.1",
            "-p",
            "9000",
            "--stdio",
            "--cookies-file",
            "/tmp/cookies.json",
        ])
        .unwrap();
        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.server.transport, Transport::Stdio);
        assert_eq!(config.instagram.cookies_file, "/tmp/cookies.json");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Args::try_parse_from(["igdm-server", "--port", "http"]).is_err());
    }

    #[test]
    fn test_complete_credential_flags() {
        let args = Args::try_parse_from([
            "igdm-server",
            "-s",
            "sid",
            "--csrf-token",
            "csrf",
            "-d",
            "42",
        ])
        .unwrap();

        assert_eq!(
            args.command_line_credential(),
            Some(Credential::new("sid").with_csrf_token("csrf").with_user_id("42"))
        );
    }

    #[test]
    fn test_partial_credential_flags_are_ignored() {
        let args = Args::try_parse_from(["igdm-server", "--session-id", "sid"]).unwrap();
        assert_eq!(args.command_line_credential(), None);
    }

    #[test]
    fn test_install_subcommand_accepts_credential_flags() {
        let args = Args::try_parse_from([
            "igdm-server",
            "install",
            "--desktop-config",
            "/tmp/claude.json",
            "--session-id",
            "sid",
            "--csrf-token",
            "csrf",
            "--ds-user-id",
            "42",
        ])
        .unwrap();

        match &args.command {
            Some(Commands::Install {
                desktop_config,
                name,
            }) => {
                assert_eq!(desktop_config.as_deref(), Some(std::path::Path::new("/tmp/claude.json")));
                assert_eq!(name, DEFAULT_SERVER_NAME);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(args.command_line_credential().is_some());
    }
}
