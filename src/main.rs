use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wolkenlift::native::Client;
use wolkenlift::types::LogLevel;
use wolkenlift::upload::UploadOptions;

#[derive(Parser)]
#[command(name = "wolkenlift", version, about = "Upload .mcap logs to cloud storage")]
enum Cli {
    /// List a folder and scan it for files not yet uploaded
    Browse {
        /// Folder to open (default: last used folder)
        path: Option<String>,
    },
    /// Scan a folder, analyze the new files and upload them
    Upload(UploadArgs),
    /// Show and change upload settings
    Settings(SettingsArgs),
    /// Show server log entries
    Logs(LogsArgs),
    /// Reconnect to a job still running on the server
    Resume {
        /// Write the completion table as CSV (file or directory)
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct UploadArgs {
    /// Folder to upload from (default: last used folder)
    path: Option<String>,
    /// Upload right after analysis
    #[arg(long)]
    auto_upload: bool,
    /// Skip files already present in the bucket
    #[arg(long)]
    skip_duplicates: bool,
    /// Only compute new/duplicate statistics
    #[arg(long)]
    pre_filter_only: bool,
    /// Also select files already uploaded
    #[arg(long)]
    all: bool,
    /// Write the completion table as CSV (file or directory)
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(clap::Args)]
struct SettingsArgs {
    /// Change a setting, e.g. --set upload_concurrency=8 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    sets: Vec<String>,
    /// Ask the server whether a newer version exists
    #[arg(long)]
    check_update: bool,
    /// Re-sync the upload cache with the bucket
    #[arg(long)]
    sync_cache: bool,
    /// Drop the upload cache
    #[arg(long)]
    invalidate_cache: bool,
}

#[derive(clap::Args)]
struct LogsArgs {
    /// debug, info, warning, error or critical
    #[arg(long, value_parser = parse_level)]
    level: Option<LogLevel>,
    /// Text to search for in message and source
    #[arg(long)]
    search: Option<String>,
    /// Also list the server's log files
    #[arg(long)]
    files: bool,
}

fn parse_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::parse(s).ok_or_else(|| format!("unknown log level '{}'", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging (stderr + tägliche Datei-Rotation unter ./logs)
    std::fs::create_dir_all("logs").ok();
    let (stderr_nb, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
    let file_appender = tracing_appender::rolling::daily("logs", "wolkenlift.log");
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,wolkenlift=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stderr_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Guards am Leben halten, damit die Non-Blocking Writer beim Beenden flushen
    let _log_guards = (stderr_guard, file_guard);

    // Konfiguration: eingebettete Defaults -> wolkenlift.toml -> env/.env
    let cfg = Arc::new(wolkenlift::config::load()?);
    let mut client = Client::new(cfg)?;

    match cli {
        Cli::Browse { path } => client.browse(path.as_deref()).await,
        Cli::Upload(args) => {
            let opts = UploadOptions {
                auto_upload: args.auto_upload,
                skip_duplicates: args.skip_duplicates,
                pre_filter_only: args.pre_filter_only,
            };
            client.upload(args.path.as_deref(), opts, args.all, args.export).await
        }
        Cli::Settings(args) => {
            client.settings(&args.sets, args.check_update, args.sync_cache, args.invalidate_cache).await
        }
        Cli::Logs(args) => client.logs(args.level, args.search.as_deref(), args.files).await,
        Cli::Resume { export } => client.resume(export).await,
    }
}
