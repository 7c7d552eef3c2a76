//! Run orchestration: config, CMID list, login, batch visit, summary.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::Config;
use crate::ids::read_quiz_ids;
use crate::session::Session;
use crate::visit::{visit_all, RunStats};
use crate::{info_time, Result};

/// Drives one full run. Configuration problems, a missing CMID file and a
/// failed login abort before the batch; once the batch starts the summary is
/// always printed, whatever the individual visits did.
pub async fn run(config_path: &Path, quiz_file: Option<&Path>) -> Result<RunStats> {
    info_time!("Using configuration file: {}", config_path.display());
    let config = Config::load(config_path)?;
    info_time!("Loaded Moodle base URL: {}", config.moodle.base_url);
    info_time!("Loaded Moodle username: {}", config.moodle.username);
    info_time!("Login URL: {}", config.login_url());
    info_time!("Post-login check URL: {}", config.post_login_check_url());

    // Command-line override takes precedence over the config file.
    let quiz_file = match quiz_file {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(&config.paths.quiz_id_file),
    };
    info_time!("Reading quiz CMIDs from: {}", quiz_file.display());
    let quiz_ids = read_quiz_ids(&quiz_file)?;
    if quiz_ids.is_empty() {
        info_time!("No quiz CMIDs to process. Exiting.");
        return Ok(RunStats::default());
    }

    let session = Session::new(&config)?;
    session
        .login(&config.moodle.username, config.moodle.password())
        .await?;

    let stats = visit_all(
        &session,
        &config.moodle.base_url,
        &quiz_ids,
        config.settings.request_delay(),
    )
    .await;

    print_summary(&stats);
    Ok(stats)
}

fn print_summary(stats: &RunStats) {
    println!("\n--- Processing Summary ---");
    println!("Total Quiz CMIDs read: {}", stats.total);
    println!("Attempted to process:  {}", stats.attempted);
    println!("Successfully visited:  {}", stats.succeeded);
    println!("Failed/Skipped:        {}", stats.failed);
}
