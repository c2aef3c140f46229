use boarding_api::cli::{self, commands::server::ServeArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();
    cli::init_tracing();

    let args = ServeArgs {
        admin_email: std::env::var("ADMIN_EMAIL").ok(),
        admin_password: std::env::var("ADMIN_PASSWORD").ok(),
        ..ServeArgs::default()
    };
    cli::commands::server::serve(args).await
}
