use anyhow::{Context, Result};
use clap::Parser;
use hot100::config::{AppConfig, DataSource, SessionConfig};
use hot100::shell::Shell;
use hot100::table::TableStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hot100",
    version,
    about = "Analyze a dataset from Spotify's Billboard Hot 100"
)]
struct Cli {
    /// Path to a previously exported CSV file (skips fetching from Spotify)
    #[arg(short, long)]
    path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go through RUST_LOG; the menu itself is plain stdout.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let session = SessionConfig::resolve(AppConfig::load(), cli.path);

    let table = match &session.source {
        DataSource::Fetch => {
            let rows = hot100::fetch::fetch_playlist(&session.spotify)
                .context("Failed to fetch playlist from Spotify")?;
            TableStore::fetched(rows)
        }
        DataSource::File(path) => TableStore::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
    };
    log::info!("Session ready with {} tracks", table.len());

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut shell = Shell::new(table, &session.charts, stdin.lock(), stdout.lock());
    shell.run().context("Console I/O failed")?;

    Ok(())
}
