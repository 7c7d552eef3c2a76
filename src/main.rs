use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use moodle_refresh::{info_time, process, Result};

/// Refresh Moodle quiz statistics by visiting the stats page for each quiz
/// CMID using settings from a config file.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the text file containing Moodle quiz CMIDs, one per line.
    /// Overrides 'quiz_id_file' in the config file.
    #[arg(short, long, value_name = "QUIZ_ID_FILE")]
    quiz_file: Option<PathBuf>,

    /// Path to the configuration file.
    #[arg(short = 'C', long, value_name = "CONFIG_FILE", default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let start_time = Local::now();

    process::run(&cli.config, cli.quiz_file.as_deref()).await?;
    info_time!(start_time, "Full program time:");

    Ok(())
}
