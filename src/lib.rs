mod app;
pub mod aggregation;
pub mod autosave;
pub mod console;
pub mod dialog;
mod event_loop;
pub mod models;
pub mod settings;
pub mod store;
pub mod tasks;
pub mod timeline;
pub mod timer;
pub mod utils;

pub use app::AppState;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use dialog::ConsoleDialog;
use settings::SettingsStore;
use store::JsonTaskPersistence;
use utils::{logging::init_logging, time::now_local};

pub fn run() -> Result<()> {
    init_logging();
    log::info!("daytrack starting up...");

    let settings = SettingsStore::from_env()?;
    let mut state = AppState::bootstrap(
        settings,
        Box::new(JsonTaskPersistence),
        Box::new(ConsoleDialog),
        now_local(),
    )?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build the tokio runtime")?;

    println!("{}", console::HELP);

    let result = runtime.block_on(async {
        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("received Ctrl+C, shutting down");
                token_clone.cancel();
            }
        });

        event_loop::session_loop(&mut state, cancel_token).await
    });

    // Stdin is read on a blocking thread that would otherwise hold the
    // runtime open until the next line arrives.
    runtime.shutdown_background();

    // A broken store is never written back.
    result?;
    state.shutdown(now_local());
    Ok(())
}
