//! Mechanism for loading and sharing the simulation configuration

use crate::{
    channel::{Channel, ChannelKind},
    resacc::MissingSpecies,
    Result,
};

use clap::Parser;
use eyre::{ensure, eyre, WrapErr};
use log::info;

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Command-line interface
#[derive(Parser, Debug)]
#[command(name = "resoreco")]
#[command(about = "Reconstruct resonances from simulated proton-proton collisions")]
pub struct Args {
    /// Physics channel to simulate
    #[arg(value_enum)]
    pub channel: ChannelKind,

    /// Run file providing the run parameters (overridden by the flags below)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Number of events to be simulated
    #[arg(short = 'n', long)]
    pub events: Option<usize>,

    /// Number of leading events whose full record is printed
    #[arg(short = 'l', long)]
    pub list: Option<usize>,

    /// Seed of the random number generators
    #[arg(short = 's', long)]
    pub seed: Option<u64>,

    /// What to do with events where a decay product is missing
    #[arg(short = 'm', long, value_enum)]
    pub missing: Option<MissingSpecies>,

    /// Directory where output files are written
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,
}

/// Simulation configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Physics channel
    pub channel: Channel,

    /// Number of events to be simulated
    pub num_events: usize,

    /// Number of leading events whose full record is printed
    pub num_listed: usize,

    /// Seed of the random number generators
    pub seed: u64,

    /// What to do with events where a decay product is missing
    pub missing: MissingSpecies,

    /// Directory where output files are written
    pub output_dir: PathBuf,
}
//
impl Configuration {
    /// Default number of listed events
    pub const DEFAULT_LISTED: usize = 1;

    /// Default seed
    pub const DEFAULT_SEED: u64 = 42;

    /// Default parameters of a channel
    pub fn new(kind: ChannelKind) -> Self {
        let channel = kind.channel();
        Self {
            num_events: channel.default_events,
            channel,
            num_listed: Self::DEFAULT_LISTED,
            seed: Self::DEFAULT_SEED,
            missing: MissingSpecies::default(),
            output_dir: PathBuf::from("."),
        }
    }

    /// Build the configuration from command-line arguments, check it, and
    /// print it out
    pub fn from_args(args: Args) -> Result<Self> {
        let mut config = Self::new(args.channel);
        if let Some(path) = &args.config {
            config.load_run_file(path)?;
        }
        config.num_events = args.events.unwrap_or(config.num_events);
        config.num_listed = args.list.unwrap_or(config.num_listed);
        config.seed = args.seed.unwrap_or(config.seed);
        config.missing = args.missing.unwrap_or(config.missing);
        config.output_dir = args.output_dir;

        // A sensible simulation must run for at least one event
        ensure!(config.num_events > 0, "Please simulate at least one event");

        config.print();
        Ok(config)
    }

    /// Override the run parameters with the contents of a run file
    ///
    /// The first non-whitespace chunk of text of each line is a value, in the
    /// order of the fields below. Blank lines are ignored, anything after the
    /// value is a comment.
    ///
    pub fn load_run_file(&mut self, path: &Path) -> Result<()> {
        let run_str = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read run file {}", path.display()))?;
        self.apply_run_file(&run_str)
            .wrap_err_with(|| format!("Invalid run file {}", path.display()))
    }

    /// Decode the contents of a run file
    fn apply_run_file(&mut self, run_str: &str) -> Result<()> {
        let mut config_iter = run_str
            .lines()
            .filter_map(|line| line.split_whitespace().next());

        // This closure fetches the next configuration item, tagging it with
        // the name of the configuration field which it is supposed to fill to
        // ease error reporting, and handling unexpected end-of-file too.
        let mut next_item = |name: &'static str| -> Result<ConfigItem> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or_else(|| eyre!("Missing configuration of {}", name))
        };

        self.num_events = next_item("num_events")?.parse::<usize>()?;
        self.num_listed = next_item("num_listed")?.parse::<usize>()?;
        self.seed = next_item("seed")?.parse::<u64>()?;
        self.missing = next_item("missing")?.parse_policy()?;
        Ok(())
    }

    /// Display the configuration
    pub fn print(&self) {
        info!("Channel        : {:?}", self.channel.kind);
        info!("Events         : {}", self.num_events);
        info!("Listed events  : {}", self.num_listed);
        info!("Seed           : {}", self.seed);
        info!("Missing species: {}", self.missing);
        info!("Output dir     : {}", self.output_dir.display());
    }
}

/// A value from the run file, tagged with the struct field which it is
/// supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Parse a missing species policy, whose parser reports errors via eyre
    fn parse_policy(self) -> Result<MissingSpecies> {
        self.data
            .parse::<MissingSpecies>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }
}
