use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    DurableSessionStore, FeedResolver, FeedStatus, FeedView, HttpApi, NavigationGate, Navigator,
    Notifier, Route,
};
use shared::{domain::Article, error::ApiError};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_api_base_url, normalize_database_url};

#[derive(Parser, Debug)]
#[command(name = "reader", about = "Read the articles of the topics you follow")]
struct Args {
    /// Overrides the configured API base url.
    #[arg(long)]
    api_url: Option<String>,
    /// Overrides the configured session database.
    #[arg(long)]
    session_db: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session token.
    Logout,
    /// Show the articles of subscribed topics.
    Feed {
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        info!(route = %route, "navigate");
        if route == Route::Login {
            eprintln!("Run `reader login --email <email> --password <password>` to sign in.");
        }
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_base_url = api_url;
    }
    if let Some(session_db) = args.session_db {
        settings.session_database_url = session_db;
    }
    let api_base_url = normalize_api_base_url(&settings.api_base_url)?;
    let session_database_url = normalize_database_url(&settings.session_database_url);

    let session = DurableSessionStore::initialize(&session_database_url).await?;
    let api = Arc::new(HttpApi::new(&api_base_url, session.clone())?);

    match args.command {
        Command::Login { email, password } => {
            let token = match api.login(&email, &password).await {
                Ok(token) => token,
                Err(err)
                    if err
                        .downcast_ref::<ApiError>()
                        .is_some_and(ApiError::is_auth_failure) =>
                {
                    bail!("login rejected: check the email and password for {email}");
                }
                Err(err) => return Err(err.context("login failed")),
            };
            session.store_token(&token).await?;
            println!("Signed in as {email}.");
        }
        Command::Logout => {
            if session.clear_token().await? {
                println!("Signed out.");
            } else {
                println!("No stored session.");
            }
        }
        Command::Feed { sort, json } => {
            let gate = NavigationGate::new(
                session.clone(),
                Arc::new(ConsoleNavigator),
                Arc::new(ConsoleNotifier),
            );
            let view = FeedView::new(gate, FeedResolver::new(api.clone(), api));
            show_feed(&view, sort, json).await?;
        }
    }

    Ok(())
}

async fn show_feed(view: &FeedView, sort: Option<SortArg>, json: bool) -> Result<()> {
    view.activate()
        .await
        .context("the feed requires a signed-in session")?;

    let status = view.settled().await;
    let result = match status {
        FeedStatus::Ready => {
            let toggles = match sort {
                None => 0,
                Some(SortArg::Asc) => 1,
                Some(SortArg::Desc) => 2,
            };
            for _ in 0..toggles {
                view.toggle_sort().await;
            }
            let snapshot = view.snapshot().await;
            print_articles(&snapshot.articles, json)
        }
        FeedStatus::Unavailable(err) => Err(anyhow!(err)).context("feed unavailable"),
        other => Err(anyhow!("feed not loaded: {other:?}")),
    };

    view.deactivate().await;
    result
}

fn print_articles(articles: &[Article], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(articles)?);
        return Ok(());
    }

    if articles.is_empty() {
        println!("No articles in your subscribed topics yet.");
        return Ok(());
    }

    for article in articles {
        let id = article
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let created = article
            .created_at
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        println!(
            "#{id:<5} {created}  [{}]  {} (by {}, {} comments)",
            article.topic_name().unwrap_or_default(),
            article.title,
            article.author_username,
            article.comments.len()
        );
    }
    Ok(())
}
