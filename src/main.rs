use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use duty_board::board::{Board, TableId};
use duty_board::config::{load_settings_from, Settings, CONFIG_FILE};
use duty_board::display::{print_board, write_board_to_file};
use duty_board::export::export_table_to_path;
use duty_board::store::{load_initial, Autosave, LocalStore, RemoteStore, SnapshotStore};
use duty_board::web::{start_server, AppState};

#[derive(Parser)]
#[command(name = "duty-board", version, about = "Personnel scheduling board")]
struct Cli {
    /// Config file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the board over HTTP (default)
    Serve {
        /// Address to bind, overrides the config
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the board as text
    Show {
        /// Only rows and entries whose surname contains this
        #[arg(short, long, default_value = "")]
        query: String,

        /// Also write the board to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Write one schedule table as CSV
    Export {
        /// table1 or table2
        table: String,

        /// Output file
        path: PathBuf,
    },
}

/// Every store configured in the settings, remote first
fn configured_stores(settings: &Settings) -> (Option<Arc<dyn SnapshotStore>>, Option<Arc<dyn SnapshotStore>>) {
    let remote = settings
        .remote_url
        .as_ref()
        .map(|url| Arc::new(RemoteStore::new(url.clone())) as Arc<dyn SnapshotStore>);
    let local = settings
        .local_store_dir
        .as_ref()
        .map(|dir| Arc::new(LocalStore::new(dir.clone())) as Arc<dyn SnapshotStore>);
    (remote, local)
}

/// A seeded board overlaid with whatever the stores hold
async fn load_board(
    settings: &Settings,
    remote: Option<&dyn SnapshotStore>,
    local: Option<&dyn SnapshotStore>,
) -> Board {
    let today = chrono::Local::now().date_naive();
    let mut board = Board::seeded(today, settings.policy());
    let snapshot = load_initial(remote, local).await;
    board.apply_snapshot(snapshot);
    board
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "duty_board=debug,actix_web=info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let mut settings = load_settings_from(&cli.config, |key| std::env::var(key).ok());
    let (remote, local) = configured_stores(&settings);
    let board = load_board(&settings, remote.as_deref(), local.as_deref()).await;

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                settings.bind_addr = bind;
            }
            let stores: Vec<Arc<dyn SnapshotStore>> = remote.into_iter().chain(local).collect();
            if stores.is_empty() {
                tracing::warn!("no store configured, changes will not be saved");
            }
            let (autosave, saver) = Autosave::spawn(stores, settings.save_debounce());

            let app_state = web::Data::new(AppState::new(board, Some(autosave)));
            println!("Access the board at http://{}", settings.bind_addr);
            start_server(&settings, app_state.clone())
                .await
                .context("web server failed")?;

            // last handle gone: the saver flushes and exits
            drop(app_state);
            match tokio::time::timeout(Duration::from_secs(5), saver).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "autosave task ended abnormally"),
                Err(_) => tracing::warn!("autosave did not flush before shutdown"),
            }
        }
        Commands::Show { query, out } => {
            print_board(&board, &query);
            if let Some(path) = out {
                write_board_to_file(&board, &path)
                    .with_context(|| format!("failed to write '{}'", path.display()))?;
                println!("Board saved to {}", path.display());
            }
        }
        Commands::Export { table, path } => {
            let table = TableId::parse(&table).with_context(|| format!("unknown table '{table}'"))?;
            export_table_to_path(&board, table, &path)
                .with_context(|| format!("failed to export to '{}'", path.display()))?;
            println!("{} exported to {}", table.title(), path.display());
        }
    }

    Ok(())
}
