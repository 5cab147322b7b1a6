use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use synthd::config::SynthdConfig;
use synthd::{rest, AppContext};

#[derive(Parser)]
#[command(
    name = "synthd",
    about = "synthd — prompt-driven synthetic tabular data service",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// REST API port
    #[arg(long, env = "SYNTHD_PORT")]
    port: Option<u16>,

    /// Data directory for the config file and SQLite database
    #[arg(long, env = "SYNTHD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SYNTHD_LOG")]
    log: Option<String>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "SYNTHD_BIND")]
    bind_address: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "SYNTHD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the API server (default when no subcommand given).
    ///
    /// Examples:
    ///   synthd serve
    ///   synthd
    Serve,
}

fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("synthd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().compact().with_writer(non_blocking))
                .init();
        }
        Some(guard)
    } else {
        if use_json {
            tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        } else {
            tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        }
        None
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Args::parse();
    match args.command.take().unwrap_or(Command::Serve) {
        Command::Serve => serve(args).await,
    }
}

async fn serve(args: Args) -> Result<()> {
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from(".synthd"));

    let mut config = SynthdConfig::load(&data_dir);
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind_address {
        config.bind_address = bind;
    }
    if let Some(log) = args.log {
        config.log = log;
    }
    if let Some(log_file) = args.log_file {
        config.log_file = Some(log_file);
    }

    // Logging first, then sanitize, so config warnings are not dropped.
    let _guard = setup_logging(&config.log, config.log_file.as_deref(), &config.log_format);
    config.sanitize();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = ?config.provider.kind,
        data_dir = %config.data_dir.display(),
        "starting synthd"
    );

    let ctx = Arc::new(AppContext::new(config).await?);
    rest::start_rest_server(ctx).await
}
