use anyhow::Result;
use dotenvy::dotenv;
use std::fs;
use std::sync::Arc;
use tokio::time::sleep;

use wbstickers::api::{Marketplace, WbClient};
use wbstickers::cli::{Cli, Commands};
use wbstickers::core::{config, init_logger, log_configuration};
use wbstickers::labels::{cleanup_temp_artifacts, prepare_labels, LabelWorkspace};
use wbstickers::storage::db::{self, DbPool};
use wbstickers::storage::{create_pool, get_connection};
use wbstickers::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up global panic handler to catch panics in dispatcher
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // .env first: the logger reads LOG_FILE_PATH
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;
    log_configuration();

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::Prepare { supply_id, keep_files }) => run_prepare(&supply_id, keep_files).await,
        Some(Commands::Cleanup) => run_cleanup(),
    }
}

/// Opens the database and makes the configured owner its only administrator.
fn open_database() -> Result<Arc<DbPool>> {
    let pool = create_pool(&config::DATABASE_PATH)?;

    match *config::OWNER_ID {
        Some(owner_id) => {
            let conn = get_connection(&pool)?;
            db::prepare_db(&conn, owner_id, &config::OWNER_NAME)?;
            log::info!("Owner {} registered as administrator", owner_id);
        }
        None => log::warn!("OWNER_ID is not set, registration requests cannot be approved"),
    }

    Ok(Arc::new(pool))
}

/// Builds the label archive of one supply from the command line.
async fn run_prepare(supply_id: &str, keep_files: bool) -> Result<()> {
    let pool = open_database()?;
    let api = WbClient::from_env()?;
    let workspace = LabelWorkspace::from_config();
    fs::create_dir_all(workspace.root())?;

    let orders = api.fetch_orders(supply_id).await?;
    {
        let conn = get_connection(&pool)?;
        db::upsert_orders(&conn, Some(supply_id), &orders)?;
    }

    let prepared = prepare_labels(&pool, &api, &workspace, supply_id).await?;

    if !keep_files {
        for dir in [workspace.stickers_dir(), workspace.supply_dir(supply_id)] {
            if dir.exists() {
                fs::remove_dir_all(dir)?;
            }
        }
    }

    println!("{}", prepared.archive_path.display());
    println!("{}", serde_json::to_string_pretty(&prepared.report)?);
    Ok(())
}

fn run_cleanup() -> Result<()> {
    let workspace = LabelWorkspace::from_config();
    cleanup_temp_artifacts(&workspace)?;
    log::info!("Label artifacts removed from {}", workspace.root().display());
    Ok(())
}

async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    let db_pool = open_database()?;
    let api: Arc<dyn Marketplace> = Arc::new(WbClient::from_env()?);
    let workspace = Arc::new(LabelWorkspace::from_config());
    fs::create_dir_all(workspace.root())?;

    // Leftovers of a run interrupted by a restart
    cleanup_temp_artifacts(&workspace)?;

    let bot = create_bot()?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let handler = schema(HandlerDeps::new(db_pool, api, workspace));

    log::info!("Starting bot in long polling mode");

    // Run the dispatcher with retry logic
    let max_restarts = config::dispatcher::MAX_RESTARTS;
    let mut restarts = 0;
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // Create a new dispatcher in a separate task to isolate panics
        let handle = tokio::spawn(async move {
            use teloxide::prelude::*;
            use teloxide::update_listeners::Polling;

            // Create polling listener that drops pending updates on start
            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() => {
                log::error!("Dispatcher panicked: {}", join_err);
                if restarts >= max_restarts {
                    log::error!("Max restarts reached after panic. Exiting...");
                    break;
                }
                restarts += 1;
                log::info!("Restarting dispatcher (attempt {}/{})...", restarts, max_restarts);
                sleep(config::dispatcher::restart_delay()).await;
            }
            Err(join_err) => {
                log::warn!("Dispatcher task was cancelled: {}", join_err);
                break;
            }
        }
    }

    Ok(())
}
