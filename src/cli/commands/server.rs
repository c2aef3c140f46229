use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;

use crate::config::{config, AppConfig, MAX_JWT_EXPIRY_HOURS};
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};
use crate::events::{AuditLogHandler, InMemoryEventBus};
use crate::routes;
use crate::state::AppState;

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Keep data in memory instead of PostgreSQL")]
    pub memory: bool,

    #[arg(long, help = "Bind address (defaults to HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Port (defaults to PORT)")]
    pub port: Option<u16>,

    #[arg(long, env = "ADMIN_EMAIL", requires = "admin_password", help = "Seed an approved admin at startup")]
    pub admin_email: Option<String>,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true, requires = "admin_email")]
    pub admin_password: Option<String>,
}

pub async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config: AppConfig = config().clone();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set in {:?} mode", config.environment);
    }
    if config.security.token_lifetime().is_none() {
        anyhow::bail!(
            "SECURITY_JWT_EXPIRY_HOURS must be between 1 and {}, got {}",
            MAX_JWT_EXPIRY_HOURS,
            config.security.jwt_expiry_hours
        );
    }

    tracing::info!(environment = ?config.environment, "Starting boarding API");

    let store: Arc<dyn Store> = if args.memory {
        tracing::warn!("Using the in-memory store; data is lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to the database")?;
        if config.database.run_migrations {
            DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
        }
        Arc::new(PgStore::new(pool))
    };

    let events = InMemoryEventBus::new();
    events.subscribe_all(Arc::new(AuditLogHandler)).await;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.server.host, config.server.port))?;

    let state = AppState::new(store, Arc::new(events), Arc::new(config));
    match (&args.admin_email, &args.admin_password) {
        (Some(email), Some(password)) => seed_admin(&state, email, password).await?,
        _ if args.memory => {
            tracing::warn!("No admin seeded; pass --admin-email and --admin-password to approve accounts")
        }
        _ => {}
    }
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "Boarding API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

/// Create the admin account unless the email is already registered.
pub async fn seed_admin(state: &AppState, email: &str, password: &str) -> anyhow::Result<()> {
    match state.users().create_admin(email, password).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Seeded admin account");
            Ok(())
        }
        Err(e) if e.kind() == "CONFLICT" => {
            tracing::info!(email, "Admin account already exists");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("failed to seed admin {}: {}", email, e)),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingEventBus;
    use crate::types::Role;

    fn state() -> AppState {
        AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingEventBus::new()),
            Arc::new(AppConfig::development()),
        )
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let state = state();
        seed_admin(&state, "root@example.com", "admin-pass-1").await.unwrap();
        seed_admin(&state, "root@example.com", "admin-pass-1").await.unwrap();

        let admin = state.store().find_user_by_email("root@example.com").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn invalid_seed_fails_startup() {
        assert!(seed_admin(&state(), "root@example.com", "short").await.is_err());
    }
}
