//! patrimoni-admin - operator CLI for the Patrimoni backend
//!
//! Prints canonical entities as pretty JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use patrimoni_admin::api::{ApiClient, DictionaryQuery};
use patrimoni_admin::{LoginLockout, SessionContext};
use patrimoni_common::config::ConfigResolver;
use patrimoni_common::models::{Article, Carte, Credentials, Histoire, Mot};
use patrimoni_common::pagination::PageCursor;

const DEFAULT_LOG_FILTER: &str = "patrimoni_admin=info,patrimoni_common=info";

#[derive(Parser, Debug)]
#[command(name = "patrimoni-admin", version, about = "Patrimoni content administration")]
struct Cli {
    /// Backend base URL (overrides PATRIMONI_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Configuration file (default: ~/.config/patrimoni/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token for authenticated commands
    #[arg(long, global = true, env = "PATRIMONI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print the bearer token
    Login {
        username: String,
        #[arg(long, env = "PATRIMONI_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the user owning the token
    Me,
    /// List one page of articles
    Articles {
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Search the dictionary
    Dictionary {
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        letter: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Histoires
    Histoires {
        #[command(subcommand)]
        action: HistoiresCommand,
    },
    /// List cartes
    Cartes,
    /// Delete an entity (requires --yes)
    Delete {
        kind: KindArg,
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Print the stored-image URL of an entity
    ImageUrl {
        kind: ImageKindArg,
        id: i64,
        #[arg(long, default_value_t = 0)]
        rev: u64,
    },
}

#[derive(Subcommand, Debug)]
enum HistoiresCommand {
    /// Histoires grouped by typology and period
    Menu,
    /// One page of histoires
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Find a histoire by title
    Find { title: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Article,
    Mot,
    Histoire,
    Carte,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ImageKindArg {
    Article,
    Carte,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ConfigResolver::new()
        .with_cli_api_url(cli.api_url.clone())
        .with_config_path(cli.config.clone())
        .resolve()
        .context("Failed to resolve configuration")?;
    info!(
        "patrimoni-admin v{} using {}",
        env!("CARGO_PKG_VERSION"),
        config.api_base
    );

    let page_limit = config.default_page_limit;
    let client = ApiClient::new(config)?;
    if let Some(token) = cli.token {
        client.set_token(Some(token));
    }
    let session = SessionContext::new(client.clone());

    match cli.command {
        Command::Login { username, password } => {
            let mut lockout = LoginLockout::new();
            let credentials = Credentials::new(username, password);
            match session.sign_in(&credentials, &mut lockout).await {
                Ok(token) => println!("{}", token.access_token),
                Err(err) => {
                    if let Some(secs) = lockout.remaining_secs() {
                        warn!(seconds = secs, "Login locked");
                    }
                    bail!(err.user_message());
                }
            }
        }
        Command::Me => {
            if !client.has_token() {
                bail!("No token: pass --token or set PATRIMONI_TOKEN");
            }
            let user = session
                .current_user_once()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print_json(&user)?;
        }
        Command::Articles { page, limit } => {
            let limit = limit.unwrap_or(page_limit);
            let start = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
            let mut cursor = PageCursor::at(page, start, limit);
            let fetched = client.list_articles_overfetch(&mut cursor).await?;
            print_json(&json!({
                "page": cursor.page(),
                "hasNext": fetched.has_next,
                "items": fetched.items,
            }))?;
        }
        Command::Dictionary {
            theme,
            category,
            letter,
            search,
            page,
            limit,
        } => {
            let query = DictionaryQuery {
                theme,
                category,
                letter,
                search,
                page,
                limit,
                ..Default::default()
            };
            print_json(&client.list_dictionary(&query).await?)?;
        }
        Command::Histoires { action } => match action {
            HistoiresCommand::Menu => print_json(&client.histoires_menu().await?)?,
            HistoiresCommand::List { page, limit } => {
                let items = client
                    .list_histoires_page(page, limit.unwrap_or(page_limit))
                    .await?;
                print_json(&items)?;
            }
            HistoiresCommand::Find { title } => print_json(&client.find_histoire(&title).await?)?,
        },
        Command::Cartes => print_json(&client.list::<Carte>().await?)?,
        Command::Delete { kind, id, yes } => {
            if !yes {
                bail!("Refusing to delete {kind:?} {id} without --yes");
            }
            let result = match kind {
                KindArg::Article => client.delete::<Article>(id).await,
                KindArg::Mot => client.delete::<Mot>(id).await,
                KindArg::Histoire => client.delete::<Histoire>(id).await,
                KindArg::Carte => client.delete::<Carte>(id).await,
            };
            result.map_err(|e| anyhow::anyhow!(e.user_message()))?;
            info!(?kind, id, "Deleted");
        }
        Command::ImageUrl { kind, id, rev } => {
            let url = match kind {
                ImageKindArg::Article => client.image_url::<Article>(id, rev),
                ImageKindArg::Carte => client.image_url::<Carte>(id, rev),
            };
            println!("{url}");
        }
    }

    Ok(())
}
