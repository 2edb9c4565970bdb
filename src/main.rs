use clap::Parser;
use mango::core::config::{self, CliOverrides, MangoConfig};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mango", about = "MangoOS, a cosmetic terminal with a Python mode")]
struct Args {
    /// Python executable used by `py` mode
    #[arg(long, value_name = "PROGRAM")]
    python: Option<String>,

    /// Disable `py` mode entirely
    #[arg(long, conflicts_with = "python")]
    no_python: bool,

    /// Turn off the matrix rain background
    #[arg(long)]
    no_rain: bool,

    /// Read config from this file instead of ~/.mango/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Logger isn't up yet and the TUI owns stdout once it starts, so stderr it is
    let file_config = match config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("mango: {e}; falling back to defaults");
            MangoConfig::default()
        }
    };

    let overrides = CliOverrides {
        python: args.python,
        no_python: args.no_python,
        no_rain: args.no_rain,
    };
    let resolved = config::resolve(&file_config, &overrides);

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    log::info!(
        "Mango starting up (python: {:?}, rain: {})",
        resolved.python_program,
        resolved.rain.enabled
    );

    mango::tui::run(resolved)
}
