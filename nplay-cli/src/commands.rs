use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use nplay_config::{ConfigOverrides, NplayConfig};
use nplay_protocols::AddressFormat;
use nplay_telemetry::logging::EventLogger;

use crate::error::CliError;

#[derive(Parser)]
#[command(version, about = "Replays network packets as OSC events")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture (live or from a trace) and send /gotpacket events
    Run(ConfigArgs),
    /// Print the effective configuration as YAML and exit
    ShowConfig(ConfigArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AddressFormatArg {
    HighOctet,
    Literal,
}

impl From<AddressFormatArg> for AddressFormat {
    fn from(arg: AddressFormatArg) -> Self {
        match arg {
            AddressFormatArg::HighOctet => AddressFormat::HighOctet,
            AddressFormatArg::Literal => AddressFormat::Literal,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// YAML configuration file (default: config/nplay.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// OSC server as host:port
    #[arg(long)]
    pub osc_server: Option<String>,

    /// Interface for live capture
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Trace file to replay; wins over --interface
    #[arg(short = 'r', long = "pcap")]
    pub trace: Option<PathBuf>,

    /// Address of this host, used to classify direction
    #[arg(long = "my-ip")]
    pub local_addr: Option<IpAddr>,

    /// Playback stretch factor (> 0)
    #[arg(short = 'w', long)]
    pub time_warp: Option<f64>,

    /// Seconds added per event to the bundle time-tag
    #[arg(long)]
    pub guard_interval: Option<f64>,

    /// Always send time-tagged bundles
    #[arg(long, conflicts_with = "no_bundle")]
    pub bundle: bool,

    /// Always send bare messages
    #[arg(long)]
    pub no_bundle: bool,

    /// Sleep between sends to reproduce capture gaps (trace replay)
    #[arg(long)]
    pub realtime: bool,

    #[arg(long, value_enum)]
    pub address_format: Option<AddressFormatArg>,

    /// Also send /type/* trigger messages
    #[arg(long)]
    pub triggers: bool,

    #[arg(long)]
    pub log_level: Option<String>,
}

impl ConfigArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        let bundle_timing = match (self.bundle, self.no_bundle) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        ConfigOverrides {
            osc_server: self.osc_server.clone(),
            interface: self.interface.clone(),
            trace: self.trace.clone(),
            local_addr: self.local_addr,
            time_warp: self.time_warp,
            guard_interval: self.guard_interval,
            bundle_timing,
            realtime_pacing: self.realtime.then_some(true),
            address_format: self.address_format.map(AddressFormat::from),
            triggers: self.triggers.then_some(true),
            log_level: self.log_level.clone(),
        }
    }

    pub fn load(&self) -> Result<NplayConfig, CliError> {
        let overrides = self.overrides();
        let config = match &self.config {
            Some(path) => NplayConfig::load_from_path(path, &overrides)?,
            None => NplayConfig::load(&overrides)?,
        };
        Ok(config)
    }
}

pub async fn run_command(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Run(args) => {
            let config = args.load()?;
            EventLogger::init(&config.telemetry.log_level)?;
            let settings = config.resolve()?;
            let stats = nplay_engine::run(settings).await?;
            info!(?stats, "Done");
            Ok(())
        }
        Commands::ShowConfig(args) => {
            let config = args.load()?;
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}
