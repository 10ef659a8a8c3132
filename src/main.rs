use std::error::Error;
use std::path::PathBuf;

use chaos_compute::config::{default_settings_path, DEFAULT_SECTION};
use chaos_compute::ec2::Ec2ClientProvider;
use chaos_compute::error::FilterError;
use chaos_compute::logging::{self, LogFormat};
use chaos_compute::{start_instances, stop_instances, Filters, Settings};
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "chaos-compute",
    version,
    about = "Stop or start EC2 instances selected by filters"
)]
struct Cli {
    /// Settings file (defaults to ~/.chaos-compute/config when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Settings section to read configuration and secrets from
    #[arg(long, global = true, default_value = DEFAULT_SECTION)]
    cloud: String,

    /// AWS region, overrides the region of the settings section
    #[arg(long, global = true)]
    region: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stop ACTIVE (running) instances matching the filters
    Stop(FilterArgs),
    /// Start SHUTOFF (stopped) instances matching the filters
    Start(FilterArgs),
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Filter as key=value, e.g. name=staging-bastion-* (repeatable, one per key)
    #[arg(short, long = "filter", required = true, value_parser = Filters::parse_entry)]
    filters: Vec<(String, String)>,
}

impl FilterArgs {
    fn to_filters(&self) -> Result<Filters, FilterError> {
        Filters::try_from_entries(self.filters.iter().cloned())
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn Error>> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path, &cli.cloud)?,
        None => {
            let path = default_settings_path()?;
            if path.exists() {
                Settings::load(&path, &cli.cloud)?
            } else {
                Settings::default()
            }
        }
    };

    if let Some(region) = &cli.region {
        settings.configuration.region = Some(region.clone());
    }

    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init(cli.log_format, &cli.log_level);

    let settings = load_settings(&cli)?;
    let configuration = Some(&settings.configuration);
    let secrets = settings.secrets.as_ref();
    let provider = Ec2ClientProvider;

    let snapshots = match &cli.command {
        Command::Stop(args) => {
            stop_instances(&provider, &args.to_filters()?, configuration, secrets).await?
        }
        Command::Start(args) => {
            start_instances(&provider, &args.to_filters()?, configuration, secrets).await?
        }
    };

    info!(affected_instances = snapshots.len(), "Action completed");
    println!("{}", serde_json::to_string_pretty(&snapshots)?);

    Ok(())
}
