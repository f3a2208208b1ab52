use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ventura::config::settings::ServerSettings;
use ventura::config::settings_io::{load_settings, save_settings, settings_path};
use ventura::engine::game_service::{GameRules, GameService};
use ventura::engine::llm_client::GeminiClient;
use ventura::server::ApiServer;

#[derive(Parser)]
#[command(name = "ventura")]
#[command(about = "Story server for the VENTURA text adventure")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// The single origin allowed by CORS
    #[arg(long)]
    origin: Option<String>,

    /// Model name passed to the provider
    #[arg(long)]
    model: Option<String>,

    /// Verbose logging (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write a default settings file and exit
    #[arg(long)]
    write_default_config: bool,

    /// Check the provider credentials and exit
    #[arg(long)]
    check_provider: bool,
}

impl Cli {
    fn apply(&self, settings: &mut ServerSettings) {
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(origin) = &self.origin {
            settings.allowed_origin = origin.clone();
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "ventura=info,tower_http=info",
        1 => "ventura=debug,tower_http=debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let path = cli.config.clone().unwrap_or_else(settings_path);

    if cli.write_default_config {
        save_settings(&path, &ServerSettings::default())?;
        println!("Wrote default settings to {}", path.display());
        return Ok(());
    }

    let mut settings = load_settings(&path)?;
    settings.apply_env(|key| std::env::var(key).ok())?;
    cli.apply(&mut settings);
    settings.validate().context("invalid settings")?;

    let client = GeminiClient::from_settings(&settings).with_context(|| {
        format!(
            "cannot create provider client; set {} or api_key in {}",
            ventura::config::settings::ENV_API_KEY,
            path.display()
        )
    })?;

    if cli.check_provider {
        let status = client.check_connection().await?;
        println!("{}", status);
        return Ok(());
    }

    info!(model = %client.model(), max_turns = settings.max_turns, "starting story server");

    let service = Arc::new(GameService::new(
        Arc::new(client),
        GameRules::from(&settings),
    ));

    ApiServer::new(settings, service).start().await
}
