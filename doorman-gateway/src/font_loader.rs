//! Background task that loads the overlay font into the shared
//! [`FontStore`](doorman_core::render::FontStore), retrying with a bounded
//! backoff until it succeeds or shutdown is requested.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use doorman_core::render::BitmapFont;
use tracing::{info, warn};

use crate::state::AppState;

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

/// Load the font at `path`, retrying until it succeeds.
///
/// Parsing and page decoding run on a blocking thread so renders and event
/// handling never stall the runtime. Each retry waits one backoff step, and
/// every wait races the shutdown signal: once shutdown is requested the task
/// gives up without installing anything.
pub async fn run(path: PathBuf, state: Arc<AppState>) {
    let mut shutdown = state.lifecycle.shutdown_signal();
    let mut backoff = INITIAL_BACKOFF;

    loop {
        if state.lifecycle.is_shutting_down() {
            return;
        }

        let load_path = path.clone();
        match tokio::task::spawn_blocking(move || BitmapFont::load(&load_path)).await {
            Ok(Ok(font)) => {
                state.fonts.install(font);
                info!("Overlay font loaded from {}", path.display());
                return;
            }
            Ok(Err(e)) => {
                warn!(
                    "Failed to load overlay font from {}, retrying in {:?}: {e}",
                    path.display(),
                    backoff
                );
            }
            Err(e) => {
                warn!("Font load task failed, retrying in {backoff:?}: {e}");
            }
        }

        tokio::select! {
            _ = shutdown.changed() => return,
            _ = tokio::time::sleep(backoff) => {}
        }
        backoff = next_backoff(backoff);
    }
}
