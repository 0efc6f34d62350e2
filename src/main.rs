//! RankAndPlay Server entry point.

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use rankandplay_server::AppState;
use rankandplay_server::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::new(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?config.mode,
        bot_check = config.turnstile_secret.is_some(),
        "RankAndPlay Server starting",
    );

    if config.mode.is_production() && config.turnstile_secret.is_none() {
        tracing::warn!(
            "production mode without a Turnstile secret; all gated mutations will be rejected"
        );
    }

    let app = rankandplay_server::router(state.clone());

    let addr = SocketAddr::new(config.host.parse().expect("invalid host"), config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    // Spawn session + rate-limiter cleanup task
    let cleanup_state = state.clone();
    let session_ttl = state.session_ttl();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            let removed = cleanup_state.sessions().cleanup_expired(session_ttl);
            if removed > 0 {
                tracing::info!(removed, "Cleaned up expired sessions");
            }
            cleanup_state.rate_limiter().cleanup();
        }
    });

    tracing::info!(address = %addr, "Listening for connections");

    axum::serve(listener, app).await.expect("server error");
}
