use anyhow::{anyhow, Context, Result};
use api_ingress::{shutdown, ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use db::{ConnectOpts, DbHandle};
use recipes::config::RecipesConfig;
use recipes::RecipesModule;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use url::Url;

const MEMORY_DSN: &str = "sqlite::memory:";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if DbHandle::is_memory_dsn(dsn) {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Only SQLite is wired up in this server.
fn check_dsn(cfg: &DatabaseConfig) -> Result<()> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
    match url.scheme() {
        "sqlite" => Ok(()),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// DSN to open: in-memory under `--mock`, otherwise the configured one with
/// relative paths anchored at `home_dir`.
fn resolve_dsn(config: &AppConfig, mock: bool) -> Result<String> {
    if mock {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("Database configuration is required (or pass --mock)"))?;
    check_dsn(db_config)?;
    absolutize_sqlite_dsn(db_config.url.trim(), Path::new(&config.server.home_dir), true)
}

/// Recipes Server - recipes JSON API and HTML pages
#[derive(Parser)]
#[command(name = "recipes-server")]
#[command(about = "Recipes Server - recipes JSON API and HTML pages")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Recipes Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
    }
}

struct Settings {
    recipes: RecipesConfig,
    ingress: ApiIngressConfig,
    addr: std::net::SocketAddr,
}

/// Module sections and the bind address, validated up front.
fn settings(config: &AppConfig) -> Result<Settings> {
    let recipes: RecipesConfig = config.module_config("recipes")?;
    let ingress: ApiIngressConfig = config.module_config("api_ingress")?;
    let addr = ingress.resolve_bind_addr(&config.server.host, config.server.port)?;
    Ok(Settings {
        recipes,
        ingress,
        addr,
    })
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let Settings {
        recipes: recipes_cfg,
        ingress: ingress_cfg,
        addr,
    } = settings(&config)?;

    let dsn = resolve_dsn(&config, args.mock)?;
    let db_config = config.database.clone();
    let connect_opts = ConnectOpts {
        max_conns: db_config.as_ref().and_then(|c| c.max_conns),
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .as_ref()
            .and_then(|c| c.busy_timeout_ms)
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
        ..Default::default()
    };

    tracing::info!("Connecting to database: {}", dsn);
    let db = DbHandle::connect(&dsn, connect_opts)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Initializing modules...");
    let module = RecipesModule::new();
    module.migrate(&db).await?;
    module.init(&db, recipes_cfg).await?;

    let ingress = ApiIngress::new(ingress_cfg);
    let router = ingress.build_router(module.register_rest(axum::Router::new())?);

    let cancel = CancellationToken::new();
    let mut server = {
        let cancel = cancel.clone();
        tokio::spawn(async move { ingress.serve(addr, router, cancel).await })
    };

    let exit = tokio::select! {
        res = &mut server => Exit::Server(joined(res)),
        res = shutdown::wait_for_shutdown() => Exit::Signal(res),
    };

    let outcome = match exit {
        Exit::Server(res) => res,
        Exit::Signal(signal) => {
            cancel.cancel();
            let stopped = stop_server(server, config.server.timeout_sec).await;
            signal.and(stopped)
        }
    };

    close_db(db, outcome).await
}

enum Exit {
    /// The HTTP task finished on its own, e.g. a bind failure.
    Server(Result<()>),
    Signal(Result<()>),
}

fn joined(res: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    res.context("HTTP server task failed")?
}

/// Wait up to `grace` seconds for a cancelled server to drain, then abort it.
async fn stop_server(mut server: JoinHandle<Result<()>>, grace: u64) -> Result<()> {
    if grace == 0 {
        return joined(server.await);
    }
    match tokio::time::timeout(Duration::from_secs(grace), &mut server).await {
        Ok(res) => joined(res),
        Err(_) => {
            tracing::warn!("Graceful shutdown exceeded {}s, aborting", grace);
            server.abort();
            Ok(())
        }
    }
}

/// Close the pool whatever the server outcome was, then report it.
async fn close_db(db: DbHandle, outcome: Result<()>) -> Result<()> {
    db.close().await;
    match &outcome {
        Ok(()) => tracing::info!("Recipes Server stopped"),
        Err(e) => tracing::error!("Recipes Server stopped with error: {:#}", e),
    }
    outcome
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let settings = settings(&config)?;
    if !args.mock {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| anyhow!("Database configuration is required (or pass --mock)"))?;
        check_dsn(db_config)?;
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Bind address: {}", settings.addr);
    println!("{}", config.to_yaml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_dsn_is_kept() {
        let base = Path::new("/srv");
        assert_eq!(absolutize_sqlite_dsn("sqlite::memory:", base, false).unwrap(), MEMORY_DSN);
        assert_eq!(absolutize_sqlite_dsn("sqlite://:memory:", base, false).unwrap(), MEMORY_DSN);
    }

    #[test]
    fn relative_path_is_anchored_and_query_kept() {
        let tmp = TempDir::new().unwrap();
        let dsn = absolutize_sqlite_dsn("sqlite://database/recipes.db?mode=rwc", tmp.path(), true)
            .unwrap();
        let expected = tmp.path().join("database").join("recipes.db");
        assert_eq!(
            dsn,
            format!("sqlite://{}?mode=rwc", expected.to_string_lossy().replace('\\', "/"))
        );
        assert!(tmp.path().join("database").is_dir());
    }

    #[tokio::test]
    async fn failed_server_still_closes_the_pool() {
        let db = DbHandle::connect(MEMORY_DSN, ConnectOpts::default()).await.unwrap();
        let pool = db.sqlx_sqlite().clone();

        let server = tokio::spawn(async { Err::<(), _>(anyhow!("Failed to bind 127.0.0.1:1")) });
        let outcome = close_db(db, joined(server.await)).await;

        assert!(outcome.unwrap_err().to_string().contains("Failed to bind"));
        assert!(pool.is_closed());
    }

    #[tokio::test]
    async fn stop_server_aborts_after_grace_period() {
        let server = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<(), anyhow::Error>(())
        });
        assert!(stop_server(server, 1).await.is_ok());
    }

    #[test]
    fn non_sqlite_dsns_are_rejected() {
        let cfg = DatabaseConfig {
            url: "postgresql://localhost/recipes".into(),
            max_conns: None,
            busy_timeout_ms: None,
        };
        assert!(check_dsn(&cfg).is_err());
        assert!(absolutize_sqlite_dsn("postgres://x", Path::new("/"), false).is_err());
    }
}
