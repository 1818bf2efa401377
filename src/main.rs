mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use hr_core::config::Config;
use hr_engine::RowItemsRequest;
use hr_server::context::AppContext;
use hr_server::dto::{RowDto, RowItemsResponse};
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "homerows=debug,hr_engine=debug,hr_db=debug,hr_server=debug,tower_http=debug".to_string()
        } else {
            "homerows=info,hr_engine=info,hr_db=info,hr_server=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Rows { user, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(print_rows(cli.config.as_deref(), &user, json))
        }
        Commands::RowItems {
            user,
            kind,
            genre,
            start,
            limit,
            seed,
        } => {
            let request = RowItemsRequest {
                user_id: user,
                row_kind: kind,
                genre,
                start_index: start,
                limit,
                seed,
            };
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(print_row_items(cli.config.as_deref(), &request))
        }
    }
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = Config::load_or_default(config_path.as_deref());
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting homerows {}", env!("CARGO_PKG_VERSION"));
    hr_server::start(config, config_path).await?;
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            Config::load(p).with_context(|| format!("failed to load {}", p.display()))?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let rows = &config.rows;
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!("  Max rows: {}", rows.max_rows);
    println!(
        "  Items per row: {}..{}",
        rows.min_items_per_row, rows.max_items_per_row
    );
    println!("  Genres: {}", rows.enabled_genres.join(", "));
    if !rows.blacklisted_genres.is_empty() {
        let blacklisted: Vec<&str> = rows.blacklisted_genres.iter().map(String::as_str).collect();
        println!("  Blacklisted: {}", blacklisted.join(", "));
    }

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        println!("Configuration has {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    Ok(())
}

/// Open the configured library and build the same context the server uses.
fn open_context(config_path: Option<&Path>) -> Result<(AppContext, Config)> {
    let config = Config::load_or_default(config_path);
    let db_path = &config.server.db_path;
    if !db_path.exists() {
        anyhow::bail!("Library database not found at {}", db_path.display());
    }
    let db = hr_db::init_pool(db_path)?;
    let ctx = AppContext::new(db, &config, config_path.map(Path::to_path_buf));
    Ok((ctx, config))
}

async fn print_rows(config_path: Option<&Path>, user: &str, json: bool) -> Result<()> {
    let (ctx, config) = open_context(config_path)?;
    let rows = ctx
        .engine
        .list_rows(user, &config.rows, &CancellationToken::new())
        .await;
    let rows: Vec<RowDto> = rows.into_iter().map(RowDto::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No rows for user {user}");
        return Ok(());
    }
    for row in &rows {
        println!("{} [{}] ({} items)", row.title, row.id, row.total_item_count);
        for item in &row.preview_items {
            match item.production_year {
                Some(year) => println!("  - {} ({year})", item.name),
                None => println!("  - {}", item.name),
            }
        }
        if let Some(seed) = row.shuffle_seed {
            println!("  seed: {seed}");
        }
    }
    Ok(())
}

async fn print_row_items(config_path: Option<&Path>, request: &RowItemsRequest) -> Result<()> {
    let (ctx, config) = open_context(config_path)?;
    let page = ctx
        .engine
        .get_row_items(request, &config.rows, &CancellationToken::new())
        .await;
    let response = RowItemsResponse::from(page);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
