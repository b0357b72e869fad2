use std::process::ExitCode;

use salvo::prelude::*;
use tracing_subscriber::EnvFilter;
use yatube_store::Store;
use yatube_web::{AppError, AppState, Config, SessionIdentity, router, service, session_handler};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "yatube stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    tracing::info!(?config, "starting yatube");

    tokio::fs::create_dir_all(&config.media_root).await?;
    let store = Store::connect(&config.database_url).await?;
    let state = AppState::new(store, config.media_root.clone(), config.page_cache_ttl)?;
    let templates = state.templates.clone();

    let router = Router::new()
        .hoop(session_handler(&config.session_secret)?)
        .push(router(state, SessionIdentity));

    let acceptor = TcpListener::new(config.listen.clone()).bind().await;
    Server::new(acceptor).serve(service(router, templates)).await;
    Ok(())
}
