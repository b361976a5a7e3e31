use permission_gate::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    directory::{DirectoryState, InMemoryUserDirectory, PostgresUserDirectory},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, picks the user directory and serves the gated
/// site.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise debug for the gate itself.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "permission_gate=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Permission gate starting in {:?} mode", config.env);

    // 3. User directory: Postgres when configured, in-memory otherwise.
    let directory: DirectoryState = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");
            Arc::new(PostgresUserDirectory::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using an in-memory user directory");
            Arc::new(InMemoryUserDirectory::new())
        }
    };

    // 4. State, gate and router
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(directory, config);
    let rules = state.permissions.rules();
    tracing::info!(
        admin = ?rules.admin_prefixes(),
        user = ?rules.user_prefixes(),
        public = ?rules.public_prefixes(),
        root_is_public = rules.root_is_public(),
        "path policy loaded"
    );
    let app = create_router(state);

    // 5. Serve
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the listen address. Check BIND_ADDR.");
    tracing::info!("Listening on {}", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
    }
}
