use std::path::PathBuf;

use clap::Parser;
use database::{DatabaseConfig, GameRepository, LocalStore};
use top_games::{AppConfig, SyncError, TopGamesSync};

const DEFAULT_CACHE_FILE: &str = "top_games.db";

#[derive(Parser, Debug)]
struct Params {
    /// YAML file with `database_url` and `service` settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    database_url: Option<String>,

    #[arg(short, long)]
    limit: Option<u32>,

    #[arg(short, long, default_value_t = 0)]
    offset: u32,

    #[arg(long)]
    favorite: Vec<i64>,

    #[arg(long)]
    unfavorite: Vec<i64>,

    /// Empty the cache before anything else
    #[arg(long)]
    clear: bool,

    /// Print the cache without fetching
    #[arg(long)]
    cached: bool,

    /// Print only favorited games
    #[arg(long)]
    favorites_only: bool,
}

async fn run(args: Params, sync: &TopGamesSync<GameRepository>) -> Result<(), SyncError> {
    if args.clear {
        sync.clear_cache().await?;
    }

    if !args.cached {
        let limit = args.limit.unwrap_or_else(|| sync.page_size());
        sync.fetch_and_sync(limit, args.offset).await?;
    }

    for id in &args.favorite {
        sync.set_favorite_by_id(*id, true).await?;
    }
    for id in &args.unfavorite {
        sync.set_favorite_by_id(*id, false).await?;
    }

    let games = if args.favorites_only {
        sync.favorite_games().await?
    } else {
        sync.cached_top_games().await?
    };
    for game in games {
        println!("{game}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let app_config = AppConfig::load(args.config.as_deref())?;
    let db_config = DatabaseConfig::from_cli_or_env_or_yaml(
        args.database_url.clone(),
        app_config
            .database_url
            .or_else(|| Some(DEFAULT_CACHE_FILE.to_string())),
    );
    let store = LocalStore::connect(&db_config).await?;

    let sync = TopGamesSync::with_default_client(
        GameRepository::new(store.clone()),
        app_config.service.with_env_overrides(),
    );
    let result = run(args, &sync).await;
    store.close().await;

    if let Err(e) = &result {
        log::error!("{e}");
    }
    Ok(result?)
}
