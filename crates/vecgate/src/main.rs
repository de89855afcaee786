use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vecgate_common::{logger, AppConfig};

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    match find_project_root().map(|root| root.join(".env")) {
        Some(env_path) if env_path.exists() => {
            dotenv::from_path(&env_path).ok();
        }
        _ => {
            dotenv::dotenv().ok();
        }
    }
}

#[derive(Parser)]
#[command(name = "vecgate")]
#[command(about = "vecgate - request normalization gateway for Upstash Vector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print which integrations are configured and exit
    Check,
}

fn configured(flag: bool) -> &'static str {
    if flag {
        "configured"
    } else {
        "missing"
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    logger::setup_logging(config.log_dir.as_deref(), &config.log_level)?;

    tracing::info!("vecgate starting...");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  Vector: {}", configured(config.vector.is_some()));
    tracing::info!("  Cache: {}", configured(config.redis.is_some()));
    tracing::info!("  Weather: {}", configured(config.weather_api_key.is_some()));

    println!("Server listening on http://{}", config.server_bind_address());

    vecgate_server::start_server(config).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // AppConfig::from_env() also loads .env, but the project root one has to win
    load_dotenv_from_project_root();

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = &host {
                std::env::set_var("SERVER_HOST", host);
            }
            if let Some(port) = port {
                std::env::set_var("SERVER_PORT", port.to_string());
            }

            serve(AppConfig::from_env()?).await?;
        }
        Some(Commands::Check) => {
            let config = AppConfig::from_env()?;
            println!("bind:    {}", config.server_bind_address());
            println!("vector:  {}", configured(config.vector.is_some()));
            println!("cache:   {}", configured(config.redis.is_some()));
            println!("weather: {}", configured(config.weather_api_key.is_some()));
            println!("topK:    {} (threshold {})", config.default_top_k, config.default_threshold);
        }
        None => {
            serve(AppConfig::from_env()?).await?;
        }
    }

    Ok(())
}
