use aloom_import::app::ports::EventSource;
use aloom_import::infra::http_client::{AloomHttpClient, FileEventSource};
use aloom_import::output::persist_feed;
use aloom_import::pipeline::processing::GroupCatalogExtractor;
use aloom_import::types::Track;
use aloom_import::{logging, Config, FeedAssembler};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "aloom-import")]
#[command(about = "Build bulk user-import CSV feeds from Aloom event registrations")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file; defaults apply when it does not exist
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Directory for rotated JSON logs
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the event payload and save it unchanged
    Fetch {
        #[arg(long)]
        output: PathBuf,
    },
    /// Convert a saved payload into the import CSV
    Feed {
        #[arg(long)]
        input: PathBuf,
        /// Write the CSV here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fetch, convert and write CSV plus run manifest
    Run {
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Print the group catalog found in a saved payload
    Catalog {
        #[arg(long)]
        input: PathBuf,
    },
}

fn api_client(config: &Config) -> Result<AloomHttpClient> {
    config.validate_api()?;
    Ok(AloomHttpClient::new(&config.api)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.log_dir.as_deref());

    let config = Config::load(&cli.config).with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Commands::Fetch { output } => {
            let fetched = api_client(&config)?.fetch_event().await?;
            fs::write(&output, &fetched.raw).with_context(|| format!("writing {}", output.display()))?;
            info!("Saved payload to {}", output.display());
        }
        Commands::Feed { input, output } => {
            let fetched = FileEventSource::new(input).fetch_event().await?;
            let feed = FeedAssembler::assemble(&fetched.payload, &config, None)?;
            match output {
                Some(path) => {
                    fs::write(&path, &feed.csv).with_context(|| format!("writing {}", path.display()))?;
                    info!("Wrote {} rows to {}", feed.rows.len(), path.display());
                }
                None => print!("{}", feed.csv),
            }
            if feed.skip_count() > 0 {
                warn!("{} of {} attendees skipped", feed.skip_count(), feed.total_attendees);
            }
        }
        Commands::Run { output_dir } => {
            if config.feed.update_existing_profiles {
                warn!("No user directory is attached to this binary; profile updates are skipped");
            }
            let fetched = api_client(&config)?.fetch_event().await?;
            let feed = FeedAssembler::assemble(&fetched.payload, &config, None)?;
            let persisted = persist_feed(&feed, &fetched.raw, &config, &output_dir)?;

            println!("📊 Feed results for event {}:", config.api.event_id);
            println!("   Attendees: {}", feed.total_attendees);
            println!("   Rows: {}", feed.rows.len());
            println!("   Skipped: {}", feed.skip_count());
            println!("   CSV: {}", persisted.csv_path.display());
            println!("   Manifest: {}", persisted.manifest_path.display());
        }
        Commands::Catalog { input } => {
            let fetched = FileEventSource::new(input).fetch_event().await?;
            let catalog = GroupCatalogExtractor::extract(&fetched.payload, &config)?;
            for track in Track::ALL {
                let track_config = config.track(track);
                println!("{} ({})", track, track_config.catalog_label_marker);
                for entry in catalog.entries(track) {
                    println!("   {:>8}  {:<14} {:?}", entry.option_id, entry.name, entry.language);
                }
            }
            if catalog.skipped_options() > 0 {
                println!("⚠️  {} malformed options skipped", catalog.skipped_options());
            }
        }
    }
    Ok(())
}
