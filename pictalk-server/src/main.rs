use clap::Parser;
use pictalk_core::utils::{clean_old_uploads, create_required_directories, format_file_size};
use pictalk_core::{Database, PictalkConfig, Profile};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use pictalk_server::http;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "pictalk.toml")]
    config: String,

    /// development, production or testing
    #[arg(long, env = "PICTALK_PROFILE", default_value = "development")]
    profile: String,

    /// Print database status and exit
    #[arg(long)]
    health: bool,

    /// Delete chat/query rows and uploads older than DAYS, then exit
    #[arg(long, value_name = "DAYS")]
    sweep: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present; production uses real env vars
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let profile: Profile = match args.profile.parse() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Invalid profile {}: {}", args.profile, e);
            std::process::exit(1);
        }
    };

    // Load config
    let config = match PictalkConfig::load(&args.config, profile) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    tracing::info!(
        "Starting pictalk ({:?}, debug={}, testing={})",
        profile,
        config.service.debug,
        config.service.testing
    );

    create_required_directories(&[&config.upload.folder, &config.model.path])?;

    // Open DB
    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open database {}: {}", config.database.path.display(), e);
            std::process::exit(1);
        }
    };

    if args.health {
        match db.health_check().await {
            Ok(v) => println!("✅ SQLite {} at {}", v, db.path().display()),
            Err(e) => {
                println!("❌ SQLite check failed: {}", e);
                std::process::exit(1);
            }
        }

        if let Ok(meta) = std::fs::metadata(db.path()) {
            println!("   Database size: {}", format_file_size(meta.len()));
        }

        match db.get_statistics().await {
            Ok(stats) => println!(
                "✅ Messages: {} (today: {}), images: {}, queries: {}",
                stats.total_messages, stats.today_messages, stats.total_images, stats.total_queries
            ),
            Err(e) => {
                println!("❌ Statistics query failed: {}", e);
                std::process::exit(1);
            }
        }

        return Ok(());
    }

    if let Some(days) = args.sweep {
        let messages = db.clear_old_data(days).await?;
        let files = clean_old_uploads(&config.upload.folder, u64::from(days));
        tracing::info!(
            "Sweep done: {} chat messages and {} uploaded files older than {} days removed",
            messages,
            files,
            days
        );
        return Ok(());
    }

    match db.get_statistics().await {
        Ok(stats) => tracing::info!(
            "Database ready (messages: {}, images: {})",
            stats.total_messages,
            stats.total_images
        ),
        Err(e) => tracing::warn!("Database issue: {}", e),
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    http::start_http_server(db, config, tx.subscribe()).await?;

    Ok(())
}
