//! Homework sentinel - review status monitoring and notification service
//!
//! Polls the homework status API, detects review status changes, and sends
//! them to a Telegram chat.

pub mod config;
pub mod error;
pub mod io;
pub mod notifier;
pub mod poll_loop;
pub mod status_client;
pub mod telegram;
pub mod tracker;
pub mod verdict;

pub use config::{load_config, Config, ResolvedCredentials};
pub use error::{Result, SentinelError};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::io::ReqwestHttpClient;
use crate::notifier::Notifier;
use crate::poll_loop::PollLoop;
use crate::status_client::StatusClient;
use crate::telegram::TelegramTransport;
use crate::verdict::VerdictMap;

/// Wire the service together from configuration
pub fn build_poll_loop(
    config: &Config,
    credentials: &ResolvedCredentials,
    http: Arc<dyn io::HttpClient>,
    cancel: CancellationToken,
) -> PollLoop {
    let client = StatusClient::new(
        &config.endpoint,
        &config.auth_scheme,
        &credentials.practicum_token,
        Arc::clone(&http),
    );
    let transport = Arc::new(TelegramTransport::new(
        &config.telegram_api_base,
        &credentials.telegram_token,
        http,
    ));
    let notifier = Notifier::new(transport, &credentials.telegram_chat_id);

    PollLoop::new(
        client,
        VerdictMap::new(config.verdicts.clone()),
        notifier,
        config.retry_period(),
        cancel,
    )
}

/// Resolves when the process is asked to stop: Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Run the service with the given configuration until a shutdown signal
pub async fn run(config: Config, credentials: ResolvedCredentials) -> Result<()> {
    let http: Arc<dyn io::HttpClient> =
        Arc::new(ReqwestHttpClient::new(config.request_timeout())?);
    let cancel = CancellationToken::new();

    let mut poll_loop = build_poll_loop(&config, &credentials, http, cancel.clone());

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            tracing::error!("Failed to listen for shutdown signals: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    tracing::info!("Homework sentinel started");

    // Blocks until cancelled
    poll_loop.run().await;

    tracing::info!("Homework sentinel stopped");
    Ok(())
}
