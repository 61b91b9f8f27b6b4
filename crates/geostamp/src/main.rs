//! Geostamp CLI - crop a photo and stamp it with its capture time and place.
//!
//! Reads the EXIF capture time and GPS position, looks the position up in
//! Chinese and English, and writes a cropped copy with the text drawn in the
//! bottom-right corner.
//!
//! # Usage
//!
//! ```bash
//! # Stamp a photo, writing IMG_0001-P.JPG next to it
//! geostamp IMG_0001.HEIC
//!
//! # Custom size and explicit place, no lookup
//! geostamp -i IMG_0001.jpg -w 1800 -h 1200 -p "Lake Tahoe"
//!
//! # Geocode through a local proxy
//! geostamp IMG_0001.jpg --proxy http://127.0.0.1:7890
//!
//! # View configuration
//! geostamp config show
//! ```

use clap::{ArgAction, Parser, Subcommand};

mod cli;
mod logging;

/// Geostamp - crop a photo and stamp it with its capture time and place name.
#[derive(Parser, Debug)]
#[command(name = "geostamp")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Print help (`-h` is the crop height)
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    stamp: cli::stamp::StampArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands. Without one, the photo is stamped.
#[derive(Subcommand, Debug)]
enum Commands {
    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match geostamp_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `geostamp config path`."
            );
            geostamp_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Geostamp v{}", geostamp_core::VERSION);

    match cli.command {
        Some(Commands::Config(args)) => cli::config::execute(args, &config).await,
        None => cli::stamp::execute(cli.stamp, config).await,
    }
}
