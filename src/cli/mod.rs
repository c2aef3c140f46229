pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boarding")]
#[command(about = "Boarding CLI - run and administer the boarding-house API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server")]
    Serve(commands::server::ServeArgs),

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create an approved admin account")]
    CreateAdmin {
        #[arg(help = "Admin email address")]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD", help = "Password (at least 8 characters)")]
        password: String,
    },

    #[command(about = "Print the argon2 hash of a password")]
    HashPassword {
        #[arg(help = "Password to hash")]
        password: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// `RUST_LOG` wins; otherwise info, with debug for this crate.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,boarding_api=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve(args) => commands::server::serve(args).await,
        Commands::Migrate => commands::database::migrate(output_format).await,
        Commands::CreateAdmin { email, password } => {
            commands::admin::create_admin(&email, &password, output_format).await
        }
        Commands::HashPassword { password } => commands::admin::hash_password(&password, output_format),
    }
}
