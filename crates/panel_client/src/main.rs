// Panel Client
//
// Command-line front end for the bookings admin panel API.
// Keeps the session on disk between runs and refreshes it transparently.

mod commands;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Cli;
use panel_client::{
    ApiError, Authenticator, ClientConfig, FileSessionStore, Gateway, GatewayError, PanelApi,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.api_url {
        Some(url) => ClientConfig::new(url)?,
        None => ClientConfig::from_env()?,
    };
    let store = match &cli.session_file {
        Some(path) => FileSessionStore::open(path)?,
        None => FileSessionStore::default_location()?,
    };
    tracing::debug!("Using session file {}", store.path().display());

    let gateway = Gateway::new(config, Arc::new(store));
    let mut events = gateway.subscribe();
    let auth = Authenticator::new(gateway.clone());
    let api = PanelApi::new(gateway);

    let result = commands::run(cli.command, &auth, &api, cli.json).await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    if commands::session_expired(&seen) {
        eprintln!("[WARN] Session expired. Run `panel login` to sign in again.");
    }

    if let Err(e) = &result {
        let expired = e
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_session_expired)
            || matches!(
                e.downcast_ref::<GatewayError>(),
                Some(GatewayError::SessionExpired)
            );
        if expired {
            std::process::exit(2);
        }
    }

    result
}
