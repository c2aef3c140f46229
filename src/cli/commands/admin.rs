use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::{DatabaseManager, PgStore};
use crate::events::{AuditLogHandler, InMemoryEventBus};
use crate::services::{ServiceContext, UserService};

pub async fn create_admin(email: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database)
        .await
        .context("failed to connect to the database")?;

    let events = InMemoryEventBus::new();
    events.subscribe_all(Arc::new(AuditLogHandler)).await;
    let users = UserService::new(ServiceContext::new(Arc::new(PgStore::new(pool)), Arc::new(events)));

    match users.create_admin(email, password).await {
        Ok(user) => output_success(
            &output_format,
            "Admin account created",
            Some(json!({ "id": user.id, "email": user.email })),
        ),
        Err(e) => {
            output_error(&output_format, e.message(), Some(e.kind()))?;
            anyhow::bail!("{}", e)
        }
    }
}

pub fn hash_password(password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let hash = crate::auth::hash_password(password).context("failed to hash password")?;
    match output_format {
        OutputFormat::Json => output_success(&output_format, "Password hashed", Some(json!({ "hash": hash }))),
        OutputFormat::Text => {
            println!("{}", hash);
            Ok(())
        }
    }
}
