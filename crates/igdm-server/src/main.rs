//! igdm-server: Instagram DM tool server
//!
//! Usage:
//!   igdm-server            - Serve JSON-RPC over HTTP (default 0.0.0.0:8080)
//!   igdm-server --stdio    - Serve JSON-RPC on stdin/stdout
//!   igdm-server install    - Register in the desktop MCP client config
//!   igdm-server --help     - Show all options

mod args;
mod install;
mod prompt;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use igdm_api::{serve_stdio, start_server, RpcDispatcher};
use igdm_core::{
    Config, Credential, CredentialResolver, CredentialSource, ResolvedCredential, ToolManager,
    Transport,
};
use igdm_instagram::{InstagramApi, InstagramSession};
use igdm_tools::{register_default_tools, SERVICE_NAME, VERSION};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, Commands};
use crate::install::ServerEntry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize logging; stdout is reserved for the stdio transport
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::load()?,
    };
    args.apply_to(&mut config);

    tracing::info!("Starting {} v{}", SERVICE_NAME, VERSION);

    let resolver = CredentialResolver::new(&config.instagram.cookies_file)
        .with_command_line(args.command_line_credential());
    let mut resolved = resolver.resolve();

    // Prompting would interleave with the protocol on stdio
    let may_prompt = args.command.is_some() || config.server.transport == Transport::Http;
    if resolved.is_none() && may_prompt && prompt::is_interactive() {
        resolved = prompt_credential(&resolver);
    }

    if let Some(resolved) = &resolved {
        tracing::info!("Instagram credential loaded from {}", resolved.source);
    }

    if args.save_cookies {
        save_cookies(&resolver, resolved.as_ref().map(|r| &r.credential));
    }

    if let Some(Commands::Install {
        desktop_config,
        name,
    }) = &args.command
    {
        let path = desktop_config
            .clone()
            .or_else(install::default_desktop_config_path)
            .context("Cannot locate the desktop client config; pass --desktop-config")?;
        let command = std::env::current_exe()
            .context("Cannot determine the path of this executable")?
            .display()
            .to_string();

        let entry = ServerEntry::new(command, resolved.as_ref().map(|r| &r.credential));
        install::register_server(&path, name, &entry)?;

        tracing::info!("Registered {} in {}", name, path.display());
        if !entry.has_credentials() {
            tracing::warn!(
                "No credential was stored in the entry; the server will read the cookies file at startup"
            );
        }
        return Ok(());
    }

    let api = InstagramApi::new(&config.instagram)?;
    let session = InstagramSession::establish(
        Arc::new(api),
        resolved.as_ref().map(|r| &r.credential),
    )
    .await;

    let mut tool_manager = ToolManager::new();
    register_default_tools(&mut tool_manager, Arc::new(session));
    tracing::info!(
        "Registered {} tools: {:?}",
        tool_manager.len(),
        tool_manager.tool_names()
    );

    let dispatcher = RpcDispatcher::new(tool_manager).with_server_info(SERVICE_NAME, VERSION);

    match config.server.transport {
        Transport::Http => {
            tracing::info!("Press Ctrl+C to exit");
            start_server(&config.bind_addr(), dispatcher, shutdown_signal()).await?;
        }
        Transport::Stdio => serve_stdio(&dispatcher).await?,
    }

    tracing::info!("{} stopped", SERVICE_NAME);
    Ok(())
}

/// Persist the resolved credential; failures are logged, never fatal
fn save_cookies(resolver: &CredentialResolver, credential: Option<&Credential>) {
    let path = resolver.cookie_file();

    let Some(credential) = credential else {
        tracing::warn!("--save-cookies given but no credential was resolved");
        return;
    };

    match credential.save_to_file(path) {
        Ok(()) => tracing::info!("Saved Instagram credential to {}", path.display()),
        Err(e) => tracing::error!("Failed to save credential to {}: {}", path.display(), e),
    }
}

/// Ask at the terminal; failures are logged, never fatal
fn prompt_credential(resolver: &CredentialResolver) -> Option<ResolvedCredential> {
    let cookie_file = resolver.cookie_file().display().to_string();

    let prompted = match prompt::prompt_on_terminal(&cookie_file) {
        Ok(prompted) => prompted?,
        Err(e) => {
            tracing::error!("Failed to read credentials from the terminal: {}", e);
            return None;
        }
    };

    if prompted.save {
        save_cookies(resolver, Some(&prompted.credential));
    }

    Some(ResolvedCredential {
        credential: prompted.credential,
        source: CredentialSource::Prompt,
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
