//! TOML configuration: Moodle credentials, paths and request settings.
//!
//! Mirrors the layout of the deployment's `config.toml`:
//!
//! ```toml
//! [moodle]
//! base_url = "https://moodle.example.org"
//! username = "teacher"
//! password = "s3cret"
//!
//! [paths]                          # optional
//! login_path = "/login/index.php"
//! post_login_check_path = "/my/"
//! quiz_id_file = "quiz_ids.txt"
//!
//! [settings]                       # optional
//! request_delay_seconds = 0.5
//! request_timeout_seconds = 30
//! verify_ssl = false
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{
    Error, Result, DEFAULT_LOGIN_PATH, DEFAULT_POST_LOGIN_CHECK_PATH, DEFAULT_QUIZ_ID_FILE,
    DEFAULT_REQUEST_DELAY_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Upper bound for the delay and timeout settings, in seconds.
const MAX_DURATION_SECS: f64 = 3600.0;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub moodle: MoodleSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub settings: SettingsSection,
}

#[derive(Debug, Deserialize)]
pub struct MoodleSection {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    /// Must be present; an empty string is a valid password.
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub login_path: String,
    pub post_login_check_path: String,
    pub quiz_id_file: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SettingsSection {
    pub request_delay_seconds: f64,
    pub request_timeout_seconds: f64,
    pub verify_ssl: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "couldn't read configuration file '{}': {e}",
                path.display()
            ))
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(raw).map_err(|e| Error::Config(e.message().to_owned()))?;
        config.validate()?;
        config.normalize();
        Ok(config)
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.moodle.base_url, self.paths.login_path)
    }

    pub fn post_login_check_url(&self) -> String {
        format!("{}{}", self.moodle.base_url, self.paths.post_login_check_path)
    }

    fn validate(&self) -> Result<()> {
        if self.moodle.base_url.trim().is_empty() {
            return Err(Error::Config(
                "'base_url' missing or empty in [moodle] section".into(),
            ));
        }
        if self.moodle.username.trim().is_empty() {
            return Err(Error::Config(
                "'username' missing or empty in [moodle] section".into(),
            ));
        }
        if self.moodle.password.is_none() {
            return Err(Error::Config("'password' missing in [moodle] section".into()));
        }
        // TOML accepts `nan`/`inf` floats; both would panic later in
        // Duration::from_secs_f64, so bounds-check here.
        let delay = self.settings.request_delay_seconds;
        if !delay.is_finite() || delay < 0.0 || delay > MAX_DURATION_SECS {
            return Err(Error::Config(format!(
                "'request_delay_seconds' must be a finite number between 0 and {MAX_DURATION_SECS}"
            )));
        }
        let timeout = self.settings.request_timeout_seconds;
        if !timeout.is_finite() || timeout <= 0.0 || timeout > MAX_DURATION_SECS {
            return Err(Error::Config(format!(
                "'request_timeout_seconds' must be a finite number above 0 and at most {MAX_DURATION_SECS}"
            )));
        }
        Ok(())
    }

    /// Base URL loses its trailing slash, paths gain a leading one, so the
    /// two always join cleanly.
    fn normalize(&mut self) {
        self.moodle.base_url = self.moodle.base_url.trim().trim_end_matches('/').to_owned();
        self.paths.login_path = lead_slash(&self.paths.login_path);
        self.paths.post_login_check_path = lead_slash(&self.paths.post_login_check_path);
    }
}

impl MoodleSection {
    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            post_login_check_path: DEFAULT_POST_LOGIN_CHECK_PATH.to_owned(),
            quiz_id_file: DEFAULT_QUIZ_ID_FILE.to_owned(),
        }
    }
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            request_delay_seconds: DEFAULT_REQUEST_DELAY_SECS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
            verify_ssl: false,
        }
    }
}

impl SettingsSection {
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.request_delay_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_seconds)
    }
}

fn lead_slash(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}
