use anyhow::{Context, Result};
use clap::Parser;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::{fmt::Debug, path::PathBuf};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod postal;
use postal::{HttpPostalClient, NoOpPostalLookup, PostalLookup, DEFAULT_POSTAL_API_URL};

mod server;
use server::{run_server, RequestsLoggingLevel};

mod social;
use social::{SocialStore, SqliteSocialStore};

mod sqlite_persistence;

mod user;
use user::{FullUserStore, SqliteUserStore, UserManager};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite database file to use for user storage.
    #[clap(value_parser = parse_path)]
    pub user_db: PathBuf,

    /// Path to the SQLite database file to use for posts, likes and follows.
    #[clap(value_parser = parse_path)]
    pub social_db: PathBuf,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Maximum number of posts returned by the home feed.
    #[clap(long, default_value_t = 50)]
    pub feed_page_size: usize,

    /// Base URL of the postal code lookup service. Lookups are disabled when unset.
    #[clap(long)]
    pub postal_api_url: Option<String>,

    /// Timeout in seconds for postal lookup requests.
    #[clap(long, default_value_t = 10)]
    pub postal_timeout_sec: u64,

    /// Number of days to retain unused auth tokens before pruning. Set to 0 to disable pruning.
    #[clap(long, default_value_t = 30)]
    pub token_retention_days: u64,

    /// Interval in hours between pruning runs. Only used if token_retention_days > 0.
    #[clap(long, default_value_t = 24)]
    pub prune_interval_hours: u64,

    /// Disable postal code lookups entirely.
    #[clap(long, default_value_t = false)]
    pub no_postal_lookup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    info!("Opening SQLite user database at {:?}...", cli_args.user_db);
    let user_store: Arc<dyn FullUserStore> = Arc::new(SqliteUserStore::new(&cli_args.user_db)?);

    info!(
        "Opening SQLite social database at {:?}...",
        cli_args.social_db
    );
    let social_store: Arc<dyn SocialStore> = Arc::new(SqliteSocialStore::new(&cli_args.social_db)?);

    let user_manager = Arc::new(Mutex::new(UserManager::new(user_store.clone())));

    // Spawn background task for auth token pruning if enabled
    if cli_args.token_retention_days > 0 {
        let retention_days = cli_args.token_retention_days;
        let interval_hours = cli_args.prune_interval_hours;
        let pruning_user_manager = user_manager.clone();

        info!(
            "Auth token pruning enabled: retaining {} days, pruning every {} hours",
            retention_days, interval_hours
        );

        tokio::spawn(async move {
            let interval = Duration::from_secs(interval_hours * 60 * 60);
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick, wait for the first interval
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let pruned = pruning_user_manager
                    .lock()
                    .unwrap()
                    .prune_unused_auth_tokens(retention_days);
                match pruned {
                    Ok(count) => {
                        if count > 0 {
                            info!("Pruned {} unused auth tokens", count);
                        }
                    }
                    Err(e) => {
                        error!("Failed to prune auth tokens: {}", e);
                    }
                }
            }
        });
    }

    let postal: Arc<dyn PostalLookup> = if cli_args.no_postal_lookup {
        info!("Postal code lookups disabled");
        Arc::new(NoOpPostalLookup)
    } else {
        let url = cli_args
            .postal_api_url
            .unwrap_or_else(|| DEFAULT_POSTAL_API_URL.to_string());
        info!("Postal lookup service configured at {}", url);
        Arc::new(HttpPostalClient::new(url, cli_args.postal_timeout_sec)?)
    };

    info!("Ready to serve at port {}!", cli_args.port);
    info!("Metrics available at port {}!", cli_args.metrics_port);
    run_server(
        user_store,
        user_manager,
        social_store,
        postal,
        cli_args.logging_level,
        cli_args.port,
        cli_args.metrics_port,
        cli_args.feed_page_size,
        cli_args.frontend_dir_path,
    )
    .await
}
