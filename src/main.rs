//! Command-line front end for bulk-controlling LIFX devices over the LAN.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lifxctl::sim::SimLan;
use lifxctl::{
    ColorName, Command, CommandRequest, DispatchOutcome, Error, PowerLevel, SelectionIntent,
    dispatch, resolve,
};

#[derive(Debug, Parser)]
#[command(name = "lifxctl", about = "Control LIFX devices over the LAN", version)]
struct Cli {
    /// Only devices whose label matches PATTERN
    #[arg(short = 'n', long = "name", value_name = "PATTERN", group = "selector")]
    name: Option<String>,

    /// Only devices belonging to groups matching PATTERN
    #[arg(short = 'g', long = "group", value_name = "PATTERN", group = "selector")]
    group: Option<String>,

    /// Only devices in locations matching PATTERN
    #[arg(
        short = 'l',
        long = "location",
        value_name = "PATTERN",
        group = "selector"
    )]
    location: Option<String>,

    /// Only the device with the given MAC address, e.g. d0:73:d5:00:00:01;
    /// may be repeated
    #[arg(
        short = 'm',
        long = "mac",
        value_name = "MAC_ADDR",
        action = clap::ArgAction::Append,
        group = "selector"
    )]
    mac: Vec<String>,

    /// Make set operations fire-and-forget
    #[arg(short, long)]
    rapid: bool,

    /// Be verbose
    #[arg(short, long)]
    verbose: bool,

    /// JSON device roster for the simulated LAN backend
    #[arg(long, value_name = "PATH")]
    roster: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List devices
    List,
    /// Turn devices on
    On,
    /// Turn devices off
    Off,
    /// Set light color
    Color {
        #[arg(value_enum)]
        color: ColorName,
    },
}

impl Cli {
    fn intent(&self) -> Result<SelectionIntent, Error> {
        let mac = if self.mac.is_empty() {
            None
        } else {
            Some(self.mac.clone())
        };
        SelectionIntent::from_options(
            self.name.clone(),
            self.group.clone(),
            self.location.clone(),
            mac,
        )
    }

    fn request(&self) -> CommandRequest {
        let command = match &self.command {
            Commands::List => Command::List,
            Commands::On => Command::Power(PowerLevel::On),
            Commands::Off => Command::Power(PowerLevel::Off),
            Commands::Color { color } => Command::Color(*color),
        };
        CommandRequest {
            command,
            rapid: self.rapid,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let intent = cli.intent()?;

    let lan = match &cli.roster {
        Some(path) => SimLan::from_path(path)
            .with_context(|| format!("loading roster {}", path.display()))?,
        None => SimLan::demo(),
    };

    let targets = resolve(&intent, &lan).await?;
    let outcome = dispatch(&cli.request(), &targets).await;

    Ok(report(outcome))
}

fn report(outcome: DispatchOutcome) -> ExitCode {
    match outcome {
        DispatchOutcome::Listing(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        DispatchOutcome::Applied(report) => {
            for failure in &report.failures {
                eprintln!("{}", failure.error);
            }
            println!("{} of {} devices updated", report.succeeded(), report.attempted);
            if report.all_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}
