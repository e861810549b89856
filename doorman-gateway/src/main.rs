use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doorman_core::config::Config;
use doorman_gateway::discord;
use doorman_gateway::lifecycle::ExitAction;
use doorman_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded (greetings channel: #{}, prefix: {})",
        config.greetings_channel, config.command_prefix
    );

    let state = Arc::new(AppState::new(config));

    // A panic maps to the fatal path when configured (the default); failed
    // background tasks are logged where they are awaited and are never fatal.
    let hook_state = Arc::clone(&state);
    std::panic::set_hook(Box::new(move |panic_info| {
        error!("Panic: {panic_info}");
        if hook_state.config.exit_on_panic {
            let _ = hook_state.lifecycle.request_exit(1);
        }
    }));

    let mut client = discord::start(&state.config.discord_token, Arc::clone(&state)).await?;
    let shard_manager = client.shard_manager.clone();

    // Run the client in the background so termination signals, transport
    // failures, and lifecycle requests can all be raced below.
    let mut client_task = tokio::spawn(async move { client.start().await });
    let mut shutdown_rx = state.lifecycle.shutdown_signal();

    let action = tokio::select! {
        result = &mut client_task => match result {
            Ok(Ok(())) => {
                info!("Discord client stopped");
                state.lifecycle.request_exit(0)
            }
            Ok(Err(e)) => {
                error!("Discord connection error: {e}");
                state.lifecycle.mark_transport_failed();
                state.lifecycle.request_exit(1)
            }
            Err(e) => {
                error!("Discord client task failed: {e}");
                state.lifecycle.request_exit(1)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down");
            state.lifecycle.request_exit(0)
        }
        _ = wait_for_sigterm() => {
            info!("Received SIGTERM, shutting down");
            state.lifecycle.request_exit(0)
        }
        _ = shutdown_rx.changed() => {
            ExitAction::Graceful { code: state.lifecycle.exit_code() }
        }
    };

    let code = match action {
        ExitAction::Immediate { code } => {
            // The transport cannot be trusted for a goodbye
            warn!("Terminating without a graceful disconnect");
            std::process::exit(code);
        }
        ExitAction::Graceful { code } => code,
        ExitAction::AlreadyExiting => {
            info!("Shutdown already in progress");
            state.lifecycle.exit_code()
        }
    };

    shard_manager.shutdown_all().await;
    client_task.abort();
    info!("Disconnected from Discord, exiting with code {code}");
    std::process::exit(code);
}

async fn wait_for_sigterm() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    std::future::pending::<()>().await;
}
