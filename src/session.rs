//! Authenticated Moodle session: cookie-tracking HTTP client plus the
//! two-step form login handshake.

use std::sync::{Arc, Mutex};

use chrono::Local;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use reqwest::{Client, Response, Url};

use crate::config::Config;
use crate::{info_time, quirks, warn_time, Error, Result, USER_AGENT};

/// Cookie jar that remembers the name of every cookie it has stored.
///
/// `reqwest` follows redirects internally, so the `Set-Cookie` headers of the
/// intermediate login responses are never surfaced to the caller. Recording
/// names as they pass through the store lets the post-login session cookie
/// check run without re-parsing any headers.
#[derive(Default)]
struct RecordingJar {
    inner: Jar,
    names: Mutex<Vec<String>>,
}

impl RecordingJar {
    fn cookie_names(&self) -> Vec<String> {
        self.names
            .lock()
            .map(|names| names.clone())
            .unwrap_or_default()
    }
}

impl CookieStore for RecordingJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let headers: Vec<&HeaderValue> = cookie_headers.collect();

        if let Ok(mut names) = self.names.lock() {
            for header in &headers {
                let Ok(raw) = header.to_str() else { continue };
                // "Name=value; Path=/; ..." - everything before the first '='.
                let name = raw.split('=').next().unwrap_or_default().trim();
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_owned());
                }
            }
        }

        self.inner.set_cookies(&mut headers.into_iter(), url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.inner.cookies(url)
    }
}

/// An HTTP session scoped to one run. Cookie state lives and dies with it.
pub struct Session {
    client: Client,
    jar: Arc<RecordingJar>,
    login_url: String,
    login_path: String,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self> {
        let jar = Arc::new(RecordingJar::default());

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.settings.request_timeout());

        if !config.settings.verify_ssl {
            warn_time!("Disabling SSL certificate verification based on config. Use only if necessary.");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let login_url = config.login_url();
        // Resolve the full path once, so subdirectory installs
        // (base_url = "https://host/moodle") classify correctly.
        let login_path = Url::parse(&login_url)
            .map_err(|e| Error::Config(format!("invalid login URL '{login_url}': {e}")))?
            .path()
            .to_owned();

        Ok(Self {
            client: builder.build()?,
            jar,
            login_url,
            login_path,
        })
    }

    /// Performs the Moodle login handshake: fetch the login form, lift the
    /// `logintoken` out of it if present, submit the credentials following
    /// redirects, then double-check a session cookie actually landed.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        info_time!("Attempting to access login page: {}", self.login_url);
        let login_page = self
            .client
            .get(&self.login_url)
            .send()
            .await?
            .error_for_status()?;
        let body = login_page.text().await?;

        let logintoken = quirks::find_logintoken(&body)?;
        match &logintoken {
            Some(token) => info_time!("Found logintoken: {token}"),
            None => info_time!("No logintoken found on login page (this might be okay)."),
        }

        let mut form = vec![
            ("username", username.to_owned()),
            ("password", password.to_owned()),
        ];
        if let Some(token) = logintoken {
            form.push(("logintoken", token));
        }

        info_time!("Submitting login credentials for user: {username}");
        let response = self
            .client
            .post(&self.login_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        // Moodle bounces a successful login away from the login page; still
        // being there means the credentials were rejected.
        if self.is_login_url(response.url()) {
            let body = response.text().await?;
            return Err(Error::Auth(quirks::login_error_message(&body)?));
        }
        info_time!("Login successful! Current URL: {}", response.url());

        let cookie_name = self
            .jar
            .cookie_names()
            .into_iter()
            .find(|name| quirks::is_session_cookie(name))
            .ok_or(Error::SessionCookieMissing)?;
        info_time!("Found session cookie name: {cookie_name}");

        Ok(())
    }

    /// Whether `url` resolves to the configured login page, which after a
    /// redirect chain signals either a rejected login or an expired session.
    pub(crate) fn is_login_url(&self, url: &Url) -> bool {
        url.path() == self.login_path
    }

    pub(crate) async fn get(&self, url: &str) -> reqwest::Result<Response> {
        self.client.get(url).send().await
    }
}
