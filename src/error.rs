use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Login failed: {0}")]
    Auth(String),

    #[error("Could not find a Moodle session cookie after login.")]
    SessionCookieMissing,

    #[error("The selector you are trying to match is invalid. Selector: {0}")]
    Selector(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
