//! Moodle quiz statistics refresher.
//!
//! Logs into a Moodle instance with a regular user session and visits the
//! statistics report page of every quiz CMID in a list, so that Moodle
//! recomputes its cached statistics. The pages themselves are never stored.

mod macros;

pub mod config;
pub mod error;
pub mod ids;
pub mod process;
pub mod quirks;
pub mod session;
pub mod visit;

pub use error::{Error, Result};

pub(crate) const DEFAULT_LOGIN_PATH: &str = "/login/index.php";
pub(crate) const DEFAULT_POST_LOGIN_CHECK_PATH: &str = "/my/";
pub(crate) const DEFAULT_QUIZ_ID_FILE: &str = "quiz_ids.txt";
pub(crate) const DEFAULT_REQUEST_DELAY_SECS: f64 = 0.5;
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: f64 = 30.0;

/// Some Moodle themes serve a reduced login form to clients they don't
/// recognize as browsers.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";
