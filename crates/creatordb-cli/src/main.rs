use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use creatordb_core::{AppConfig, Platform, SearchFilters, SearchOutcome};
use creatordb_modash::ModashClient;
use creatordb_search::{
    CoordinatorConfig, PgCooldownStore, PgCreatorStore, RateLimitSentinel, SearchCoordinator,
    SearchRequest,
};

type CliCoordinator = SearchCoordinator<PgCreatorStore, ModashClient, PgCooldownStore>;

#[derive(Debug, Parser)]
#[command(name = "creatordb-cli")]
#[command(about = "creatordb command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run an orchestrated creator search (local cache first, remote fallback).
    Search(SearchArgs),
    /// Look up an exact handle via the profile fast path.
    Lookup {
        platform: String,
        handle: String,
    },
    /// Apply pending database migrations.
    Migrate,
}

#[derive(Debug, Args)]
struct SearchArgs {
    platform: String,
    /// Free-text query; `@handle` and `#hashtag` are routed specially.
    query: Option<String>,
    #[arg(long, default_value_t = 15)]
    limit: u32,
    #[arg(long)]
    force_remote: bool,
    #[arg(long)]
    followers_min: Option<i64>,
    #[arg(long)]
    followers_max: Option<i64>,
    #[arg(long)]
    engagement_min: Option<f64>,
    #[arg(long)]
    engagement_max: Option<f64>,
    #[arg(long)]
    verified: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = creatordb_core::load_app_config()?;

    match cli.command {
        Commands::Search(args) => run_search(&config, args).await,
        Commands::Lookup { platform, handle } => run_lookup(&config, &platform, &handle).await,
        Commands::Migrate => run_migrate(&config).await,
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = creatordb_db::PoolConfig::from_app_config(config);
    Ok(creatordb_db::connect_pool(&config.database_url, pool_config).await?)
}

async fn build_coordinator(config: &AppConfig) -> anyhow::Result<Arc<CliCoordinator>> {
    let pool = connect(config).await?;

    let token = config.modash_api_token.clone().unwrap_or_default();
    let provider = match &config.modash_base_url {
        Some(base) => {
            ModashClient::with_base_url(&token, config.provider_request_timeout_secs, base)?
        }
        None => ModashClient::new(&token, config.provider_request_timeout_secs)?,
    };

    let sentinel = RateLimitSentinel::new(
        PgCooldownStore::new(pool.clone()),
        creatordb_modash::PROVIDER_NAME,
        config.provider_cooldown_secs,
    );
    Ok(Arc::new(SearchCoordinator::new(
        PgCreatorStore::new(pool),
        provider,
        sentinel,
        CoordinatorConfig::from_app_config(config),
    )))
}

async fn run_search(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let platform: Platform = args.platform.parse()?;
    let coordinator = build_coordinator(config).await?;

    let request = SearchRequest {
        platform,
        query: args.query,
        filters: SearchFilters {
            followers_min: args.followers_min,
            followers_max: args.followers_max,
            engagement_min: args.engagement_min,
            engagement_max: args.engagement_max,
            verified: args.verified,
            ..SearchFilters::default()
        },
        limit: args.limit,
        offset: 0,
        force_remote: args.force_remote,
    };

    let outcome = coordinator.search(&request).await;
    print_outcome(&outcome);
    Ok(())
}

async fn run_lookup(config: &AppConfig, platform: &str, handle: &str) -> anyhow::Result<()> {
    let platform: Platform = platform.parse()?;
    let coordinator = build_coordinator(config).await?;

    match coordinator.lookup_profile(platform, handle).await {
        Ok(Some(creator)) => {
            println!("{}", serde_json::to_string_pretty(&creator)?);
        }
        Ok(None) => println!("no {platform} profile found for '{handle}'"),
        Err(e) => anyhow::bail!("lookup failed: {e}"),
    }
    Ok(())
}

async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let applied = creatordb_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

fn print_outcome(outcome: &SearchOutcome) {
    println!(
        "{} creator(s), total {}, source: {:?}",
        outcome.creators.len(),
        outcome.total,
        outcome.provenance
    );
    if let Some(error) = &outcome.error {
        println!("warning: {error}");
    }
    for creator in &outcome.creators {
        let engagement = creator
            .engagement_rate
            .map_or_else(|| "-".to_string(), |r| format!("{:.2}%", r * 100.0));
        println!(
            "  @{:<24} {:>12} followers  {:>8} engagement  {}",
            creator.username,
            creator.followers,
            engagement,
            creator.display_name.as_deref().unwrap_or("")
        );
    }
}
