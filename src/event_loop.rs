use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::autosave::AUTOSAVE_PERIOD;
use crate::console::{self, Flow};
use crate::utils::time::now_local;
use crate::AppState;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Drives the app until `cancel_token` fires, stdin closes or the user quits.
/// Every tick and command runs to completion before the next one starts.
pub async fn session_loop(state: &mut AppState, cancel_token: CancellationToken) -> Result<()> {
    let mut refresh_ticker = tokio::time::interval(state.refresh_interval());
    refresh_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut autosave_ticker = tokio::time::interval(AUTOSAVE_PERIOD);
    autosave_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = refresh_ticker.tick() => {
                state
                    .on_refresh(now_local())
                    .context("Task records became inconsistent")?;
            }
            _ = autosave_ticker.tick() => {
                state.on_autosave();
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if console::handle_line(state, &line, now_local()) == Flow::Quit {
                            log_info!("quit requested");
                            break;
                        }
                    }
                    Ok(None) => {
                        log_info!("input closed");
                        break;
                    }
                    Err(err) => {
                        log_warn!("failed to read input: {err}");
                        break;
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("session loop shutting down");
                break;
            }
        }
    }

    Ok(())
}
