mod api;
mod middleware;

use std::sync::Arc;

use econsult_analysis::StopWords;
use econsult_store::CommentStore;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(econsult_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = match &config.journal_path {
        Some(path) => CommentStore::open(path)?,
        None => {
            tracing::warn!("ECONSULT_JOURNAL_PATH not set; comments are kept in memory only");
            CommentStore::in_memory()
        }
    };
    let stopwords = match &config.stopwords_path {
        Some(path) => StopWords::builtin_with_file(path)?,
        None => StopWords::builtin(),
    };

    let comments = store.count()?;
    let state = AppState::new(Arc::new(store), stopwords, Arc::clone(&config));
    let app = build_app(state, rate_limit_state(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        env = %config.env,
        comments,
        "econsult server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
