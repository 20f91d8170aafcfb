//! ogdrb - build OpenGD77 codeplugs from RepeaterBook repeaters inside
//! circular zones.

mod commands;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use ogdrb_core::{ApiClient, Config, Country, ExportQuery, Exporter, RepeaterFetcher, RepeaterStore};

use commands::Selection;

#[derive(Parser, Debug)]
#[command(name = "ogdrb")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Country to include: US, CA, MX or CODE:Name (e.g. BR:Brazil)
    #[arg(short, long = "country", global = true, value_parser = parse_country)]
    countries: Vec<Country>,

    /// US state id to include (e.g. 06); required when US is selected
    #[arg(short, long = "state", global = true)]
    states: Vec<String>,

    /// More logging (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Download the selected countries and states into the local store
    Fetch,
    /// List stored repeaters the radio can use
    List,
    /// Build a codeplug for the zones in a file
    Export {
        /// JSON array of {"name", "lat", "lng", "radius"} (radius in km)
        #[arg(short, long)]
        zones: PathBuf,
        /// Write the codeplug here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Use only what is already stored
        #[arg(long)]
        offline: bool,
    },
    /// Show where things are stored and how fresh the store is
    Status,
}

fn parse_country(s: &str) -> Result<Country, String> {
    Country::parse(s).ok_or_else(|| format!("unknown country '{}': use US, CA, MX or CODE:Name", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load()?;

    let log_dir = if config.log_to_file {
        Some(config.cache_dir()?.join("logs"))
    } else {
        None
    };
    let _log_guard = logging::init_tracing(cli.verbose, log_dir);
    info!("ogdrb starting");

    if let Err(e) = run(cli, config).await {
        if let Some(core) = e.downcast_ref::<ogdrb_core::Error>() {
            if core.is_user_correctable() {
                eprintln!("hint: check the --country, --state and zone file arguments");
            } else if core.is_retryable() {
                eprintln!("hint: this may be temporary; running the command again is safe");
            }
        }
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let selection = Selection {
        query: ExportQuery::new(cli.countries),
        us_state_ids: cli.states.into_iter().collect(),
    };

    let store = Arc::new(RepeaterStore::open(config.store_path()?)?);

    match cli.command {
        Command::Status => commands::status(&config, &store),
        Command::List => commands::list(store, &selection),
        Command::Fetch => {
            let fetcher = fetcher(&config, store)?;
            commands::fetch(&fetcher, &selection).await
        }
        Command::Export {
            zones,
            output,
            offline,
        } => {
            let exporter = Exporter::new(fetcher(&config, store)?);
            commands::export(&exporter, &selection, &zones, output.as_deref(), offline).await
        }
    }
}

fn fetcher(config: &Config, store: Arc<RepeaterStore>) -> Result<RepeaterFetcher> {
    let client = Arc::new(ApiClient::new(config)?);
    Ok(RepeaterFetcher::from_config(client, store, config))
}
