mod auth;
mod config;
mod error;
mod routes;
mod state;
mod store;
mod tasks;
mod validation;


use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth::password::Passwords;
use store::{CredentialStore, MemoryStore, PgStore, TaskStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,task_tracker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (accounts, task_store, persistent) = match config.database_url.as_deref() {
        Some(url) => {
            let (accounts, tasks) = share(Arc::new(PgStore::connect(url).await?));
            (accounts, tasks, true)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; nothing will persist");
            let (accounts, tasks) = share(Arc::new(MemoryStore::new()));
            (accounts, tasks, false)
        }
    };

    let passwords = Passwords::default();
    passwords.warm_up().await?;

    let state = state::AppState::new(
        &config.jwt_secret,
        accounts,
        task_store,
        passwords,
        persistent,
    );

    let app = routes::create_app(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!("listening on http://{}", config.addr());

    axum::serve(listener, app).await?;

    Ok(())
}

/// One backend serves both store roles.
fn share<S>(store: Arc<S>) -> (Arc<dyn CredentialStore>, Arc<dyn TaskStore>)
where
    S: CredentialStore + TaskStore + 'static,
{
    let accounts: Arc<dyn CredentialStore> = store.clone();
    let tasks: Arc<dyn TaskStore> = store;
    (accounts, tasks)
}
