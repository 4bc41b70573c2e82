//! authcore server
//!
//! Serves the authentication routes. Uses Postgres when `DATABASE_URL` is
//! set and in-memory stores otherwise.

use authcore::store::{
    migrate, MemoryRevocationStore, MemoryUserStore, PgRevocationStore, PgUserStore,
    RevocationStore, UserStore,
};
use authcore::{create_routes, AuthConfig, AuthService};

use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn stores() -> Result<(Arc<dyn UserStore>, Arc<dyn RevocationStore>), BoxError> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        tracing::warn!("DATABASE_URL not set, using in-memory stores");
        return Ok((
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryRevocationStore::new()),
        ));
    };

    let pool = PgPool::connect(&database_url).await?;
    migrate(&pool).await?;

    let revocations = PgRevocationStore::new(pool.clone());
    let purged = revocations.purge_expired().await?;
    tracing::info!(purged, "Dropped expired revocation entries");

    Ok((Arc::new(PgUserStore::new(pool)), Arc::new(revocations)))
}

async fn run() -> Result<(), BoxError> {
    let config = AuthConfig::from_env()?;
    let (users, revocations) = stores().await?;
    let auth = AuthService::new(&config, users, revocations)?;

    let app = create_routes(Arc::new(auth)).layer(TraceLayer::new_for_http());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "authcore listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "authcore failed to start");
        std::process::exit(1);
    }
}
