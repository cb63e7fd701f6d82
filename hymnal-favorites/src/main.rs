//! hymnal-fav - command-line favorites client
//!
//! Runs anonymously against local storage unless a session token is given,
//! in which case it talks to the favorites service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hymnal_common::config::TomlConfig;
use hymnal_common::HymnId;
use hymnal_favorites::{
    merge_local_into_remote, ClientConfig, ClientOverrides, FavoritePresenter, FavoriteReconciler,
    HymnClient, IdentityMode, RemoteFavoriteStore, ToggleOutcome,
};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "hymnal-fav")]
#[command(about = "Manage hymn favorites")]
#[command(version)]
struct Args {
    /// Favorites service base URL
    #[arg(long, env = "HYMNAL_SERVER_URL")]
    server_url: Option<String>,

    /// Session token issued at login; omit to work anonymously
    #[arg(long, env = "HYMNAL_SESSION_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Root folder holding local storage
    #[arg(short, long, env = "HYMNAL_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List favorites with titles
    List,
    /// Flip the favorite flag of a hymn
    Toggle { hymn_id: String },
    /// Favorite a hymn
    Add { hymn_id: String },
    /// Unfavorite a hymn
    Remove { hymn_id: String },
    /// Remove every favorite
    Clear,
    /// Copy anonymous favorites into the account (requires a token)
    Merge,
    /// Favorite records across all accounts
    Count,
    /// Most favorited hymn across all accounts
    Popular,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = TomlConfig::load_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("warn,hymnal_favorites={}", toml_config.logging.level).into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::resolve(
        ClientOverrides {
            server_url: args.server_url,
            session_token: args.token,
            root_folder: args.root_folder,
            request_timeout_secs: args.timeout,
        },
        &toml_config,
    );
    debug!(?config, "Resolved client configuration");

    let identity = config.identity();
    let reconciler = FavoriteReconciler::for_identity(identity.clone(), config.local_store(), &config)
        .context("Failed to create favorites client")?;

    let cancel = reconciler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match args.command {
        Command::List => {
            let ids = reconciler.refresh().await.map_err(user_error)?;
            if ids.is_empty() {
                println!("No favorites yet.");
                return Ok(());
            }
            let lookup = HymnClient::new(config.server_url.clone(), config.request_timeout)?;
            let presenter = FavoritePresenter::new(Arc::new(lookup));
            let entries = presenter
                .resolve_all_cancellable(&ids, &reconciler.cancellation_token())
                .await
                .map_err(user_error)?;
            for entry in entries {
                let marker = if entry.is_error() { " (unavailable)" } else { "" };
                println!("{}  {} - {}{}", entry.id(), entry.title(), entry.author(), marker);
            }
        }
        Command::Toggle { hymn_id } => {
            let hymn_id = parse_id(hymn_id)?;
            reconciler.refresh().await.map_err(user_error)?;
            let current = reconciler.is_favorited(&hymn_id);
            report(reconciler.toggle_favorite(&hymn_id, current).await.map_err(user_error)?.outcome, &hymn_id);
        }
        Command::Add { hymn_id } => {
            let hymn_id = parse_id(hymn_id)?;
            let result = reconciler.toggle_favorite(&hymn_id, false).await.map_err(user_error)?;
            report(result.outcome, &hymn_id);
        }
        Command::Remove { hymn_id } => {
            let hymn_id = parse_id(hymn_id)?;
            let result = reconciler.toggle_favorite(&hymn_id, true).await.map_err(user_error)?;
            report(result.outcome, &hymn_id);
        }
        Command::Clear => {
            let kept = reconciler.clear_all().await.map_err(user_error)?;
            if kept.is_empty() {
                println!("All favorites cleared.");
            } else {
                println!("Cleared favorites; {} could not be removed.", kept.len());
            }
        }
        Command::Merge => {
            let IdentityMode::Authenticated { session_token } = &identity else {
                bail!("Merging needs a session token (--token or HYMNAL_SESSION_TOKEN)");
            };
            let remote = RemoteFavoriteStore::new(
                config.server_url.clone(),
                session_token.clone(),
                config.request_timeout,
            )?;
            let report = merge_local_into_remote(&config.local_store(), &remote).await?;
            println!(
                "Merged: {} added, {} already present, {} failed.",
                report.added.len(),
                report.already_present.len(),
                report.failed.len()
            );
        }
        Command::Count => {
            let count = public_client(&config)?.global_count().await?;
            println!("{}", count);
        }
        Command::Popular => match public_client(&config)?.most_popular().await? {
            Some(popular) => println!(
                "{} - {} ({} favorites)",
                popular.title, popular.author, popular.count
            ),
            None => println!("No favorites yet."),
        },
    }

    Ok(())
}

fn parse_id(raw: String) -> Result<HymnId> {
    HymnId::new(raw).context("Invalid hymn id")
}

fn user_error(err: hymnal_favorites::ReconcileError) -> anyhow::Error {
    anyhow::anyhow!("{} ({})", err.user_message(), err)
}

/// Client for the public aggregate reads, which ignore the session
fn public_client(config: &ClientConfig) -> Result<RemoteFavoriteStore> {
    let token = config.session_token.clone().unwrap_or_default();
    Ok(RemoteFavoriteStore::new(
        config.server_url.clone(),
        token,
        config.request_timeout,
    )?)
}

fn report(outcome: ToggleOutcome, hymn_id: &HymnId) {
    match outcome {
        ToggleOutcome::Added => println!("Added {} to favorites.", hymn_id),
        ToggleOutcome::Removed => println!("Removed {} from favorites.", hymn_id),
        ToggleOutcome::AlreadyFavorited => println!("{} was already a favorite.", hymn_id),
        ToggleOutcome::NotFavorited => println!("{} was not a favorite.", hymn_id),
    }
}
