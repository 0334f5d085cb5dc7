use anyhow::Context;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, time::Duration};

use crate::auth::OAuthClient;
use crate::config;
use crate::http::server::HttpServer;
use crate::remote::client::SpotifyConnector;
use crate::session::db::i64_seconds_to_local_time;
use crate::session::{self, TokenStore};

#[derive(Parser)]
#[command(name = "sortify")]
#[command(version = "0.1")]
#[command(about = "Reorder the tracks of your Spotify playlists by drag and drop")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run http server
    Serve,
    /// List visitors with a cached token
    Sessions,
    /// Drop the cached token of one visitor
    Forget {
        /// Session id, as printed by `sessions`
        session: String,
    },
    /// Drop every expired token
    Purge,
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config_path = cli.config.to_string_lossy();
    let cfg = config::Config::load(&config_path)?;
    let tokens = TokenStore::new(&cfg.sessions).context("Failed to open session store")?;

    match &cli.command {
        Commands::Serve => {
            let timeout = Duration::from_secs(cfg.api.timeout_secs);
            let oauth = OAuthClient::new(cfg.oauth, timeout);
            let connector = SpotifyConnector::new(cfg.api);

            let http_server = HttpServer::new(tokens, oauth, connector, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }

        Commands::Sessions => {
            let now = session::now();
            let sessions = tokens.list()?;
            if sessions.is_empty() {
                println!("No cached tokens");
            }
            for (id, token) in sessions {
                let state = if token.is_valid(now) { "valid" } else { "expired" };
                println!(
                    "{id}  [{state}] until {}  scope: {}",
                    i64_seconds_to_local_time(token.expires_at)?,
                    token.scope
                );
            }
        }

        Commands::Forget { session } => {
            if tokens.forget(session)? {
                println!("Token of {session} dropped");
            } else {
                println!("No token cached for {session}");
            }
        }

        Commands::Purge => {
            let removed = tokens.purge_expired(session::now())?;
            println!("Dropped {removed} expired tokens");
        }
    }
    Ok(())
}
