//! Moodle markup and cookie heuristics.
//!
//! Everything coupled to Moodle's current page structure lives here: the
//! logintoken field, the places login errors show up, the markers that hint a
//! statistics page rendered an error instead, and the session cookie naming
//! convention. When a Moodle upgrade moves things around, only this module
//! should need touching.

use scraper::{Html, Selector};

use crate::{Error, Result};

const LOGINTOKEN_SELECTOR: &str = r#"input[name="logintoken"]"#;

/// Checked in order, first match wins.
const LOGIN_ERROR_SELECTORS: &[&str] = &[
    "div#loginerrormessage",
    "div.loginerrors",
    "div.alert-danger",
];

const SOFT_ERROR_SELECTORS: &[&str] = &[".errorbox", "#page-login-index", ".errormessage"];
const SOFT_ERROR_TITLE_MARKERS: &[&str] = &["error", "notice"];
const SOFT_ERROR_BODY_MARKERS: &[&str] = &[
    "invalid course module id",
    "you do not have permission",
];

const SESSION_COOKIE_MARKER: &str = "moodlesession";

const GENERIC_LOGIN_ERROR: &str = "Unknown reason (check credentials/URL in config)";

/// Extracts the anti-forgery `logintoken` value from the login page, if the
/// form carries one. Some deployments omit it, so `None` is not an error.
pub fn find_logintoken(html: &str) -> Result<Option<String>> {
    let doc = Html::parse_document(html);
    let selector = create_selector(LOGINTOKEN_SELECTOR)?;

    Ok(doc
        .select(&selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_owned))
}

/// Pulls a human-readable failure reason out of a rejected login page, or
/// falls back to a generic message when the markup holds no clue.
pub fn login_error_message(html: &str) -> Result<String> {
    let doc = Html::parse_document(html);

    for sel_str in LOGIN_ERROR_SELECTORS {
        let selector = create_selector(sel_str)?;
        if let Some(element) = doc.select(&selector).next() {
            let text = element.text().collect::<String>().trim().to_owned();
            if !text.is_empty() {
                return Ok(text);
            }
        }
    }

    Ok(GENERIC_LOGIN_ERROR.to_owned())
}

/// Whether a 2xx statistics page still looks like an error or permission
/// problem. This is a soft signal only, the visit itself still counts.
pub fn has_soft_error(html: &str) -> Result<bool> {
    let doc = Html::parse_document(html);

    for sel_str in SOFT_ERROR_SELECTORS {
        let selector = create_selector(sel_str)?;
        if doc.select(&selector).next().is_some() {
            return Ok(true);
        }
    }

    let title_selector = create_selector("title")?;
    if let Some(title) = doc.select(&title_selector).next() {
        let title = title.text().collect::<String>().to_lowercase();
        if SOFT_ERROR_TITLE_MARKERS.iter().any(|m| title.contains(m)) {
            return Ok(true);
        }
    }

    let lower = html.to_lowercase();
    Ok(SOFT_ERROR_BODY_MARKERS.iter().any(|m| lower.contains(m)))
}

/// Moodle names its session cookie `MoodleSession`, with deployment-specific
/// prefixes/suffixes, so match on a case-insensitive substring.
pub fn is_session_cookie(name: &str) -> bool {
    name.to_lowercase().contains(SESSION_COOKIE_MARKER)
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::Selector(sel_str.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_logintoken_value() {
        let html = r#"<html><body><form>
            <input type="hidden" name="logintoken" value="abc123">
        </form></body></html>"#;
        assert_eq!(find_logintoken(html).unwrap(), Some("abc123".to_owned()));
    }

    #[test]
    fn missing_logintoken_is_none() {
        let html = "<html><body><form></form></body></html>";
        assert_eq!(find_logintoken(html).unwrap(), None);
    }

    #[test]
    fn login_error_prefers_loginerrormessage_div() {
        let html = r#"<html><body>
            <div id="loginerrormessage">Invalid login, please try again</div>
            <div class="alert-danger">something else</div>
        </body></html>"#;
        assert_eq!(
            login_error_message(html).unwrap(),
            "Invalid login, please try again"
        );
    }

    #[test]
    fn login_error_falls_back_to_alert_danger() {
        let html = r#"<html><body><div class="alert-danger">Session timed out</div></body></html>"#;
        assert_eq!(login_error_message(html).unwrap(), "Session timed out");
    }

    #[test]
    fn login_error_falls_back_to_generic_message() {
        let html = "<html><body><p>nothing useful</p></body></html>";
        assert_eq!(login_error_message(html).unwrap(), GENERIC_LOGIN_ERROR);
    }

    #[test]
    fn errorbox_is_a_soft_error() {
        let html = r#"<html><body><div class="errorbox">Course not found</div></body></html>"#;
        assert!(has_soft_error(html).unwrap());
    }

    #[test]
    fn error_title_is_a_soft_error() {
        let html = "<html><head><title>Error</title></head><body>ok</body></html>";
        assert!(has_soft_error(html).unwrap());
    }

    #[test]
    fn permission_text_is_a_soft_error() {
        let html =
            "<html><head><title>Quiz</title></head><body>You do not have permission to view this report.</body></html>";
        assert!(has_soft_error(html).unwrap());
    }

    #[test]
    fn regular_statistics_page_is_clean() {
        let html =
            "<html><head><title>Quiz statistics</title></head><body><table>stats</table></body></html>";
        assert!(!has_soft_error(html).unwrap());
    }

    #[test]
    fn session_cookie_match_is_case_insensitive() {
        assert!(is_session_cookie("MoodleSession"));
        assert!(is_session_cookie("MOODLESESSIONprod"));
        assert!(is_session_cookie("x_moodlesession"));
        assert!(!is_session_cookie("SESSID"));
    }
}
