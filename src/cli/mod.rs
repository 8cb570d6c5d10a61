pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "recipe-api")]
#[command(about = "Recipe API - per-user recipes, tags and ingredients over REST")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, env = "API_PORT", help = "Port to listen on")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,

    #[command(about = "Create a staff superuser account")]
    CreateSuperuser {
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, env = "SUPERUSER_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Migrate => commands::migrate::handle().await,
        Commands::CreateSuperuser { email, password } => commands::superuser::handle(&email, &password).await,
    }
}
