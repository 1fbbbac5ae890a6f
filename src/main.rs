// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{env, path::PathBuf};

use tracing_subscriber::EnvFilter;

use storefront_server::{
    api::router,
    config::{DATA_DIR_ENV, DEFAULT_DATA_DIR, LOG_FORMAT_ENV, OPERATOR_TOKEN_ENV},
    state::AppState,
    storage::StoragePaths,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

async fn shutdown_signal() {
    // Ignore signal registration failures; worst case we only stop on SIGKILL.
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(_) => return ctrl_c.await.unwrap_or(()),
        };
        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let data_dir: PathBuf = env::var(DATA_DIR_ENV)
        .unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
        .into();
    let operator_token = env::var(OPERATOR_TOKEN_ENV).ok();
    if operator_token.is_none() {
        tracing::warn!("OPERATOR_TOKEN unset; operator endpoints are disabled");
    }

    // A corrupt store document is fatal: starting fresh over damaged data
    // would silently discard orders.
    let state = match AppState::initialize(StoragePaths::new(&data_dir), operator_token) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(error = %err, data_dir = %data_dir.display(), "startup failed");
            std::process::exit(1);
        }
    };

    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let listener = match tokio::net::TcpListener::bind((host.as_str(), port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %host, port, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!("storefront server listening on http://{host}:{port} (docs at /docs)");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server failed");
        std::process::exit(1);
    }
}
