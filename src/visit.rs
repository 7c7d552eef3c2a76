//! Batch visitor: walks the CMID list in order, one paced request per quiz,
//! classifying every outcome and short-circuiting once the session is gone.

use chrono::Local;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::sleep;

use crate::session::Session;
use crate::{info_time, quirks, warn_time};

/// Classification of a single statistics page visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// Page came back 2xx (possibly with a soft error marker, which only
    /// warrants a warning - the cache refresh presumably still happened).
    Visited,
    /// Timeout, network error or non-auth HTTP error; the run continues.
    Failed,
    /// Redirected back to the login page, or rejected with 401/403. No
    /// further requests will be issued.
    SessionExpired,
}

/// Counters for the closing summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// CMIDs read from the list file.
    pub total: usize,
    /// Requests actually issued.
    pub attempted: usize,
    pub succeeded: usize,
    /// Failed visits plus everything skipped after a session expiry.
    pub failed: usize,
}

/// Visits every quiz's statistics page in list order with a fixed delay in
/// between. Never fails as a whole: per-item problems are folded into the
/// returned counters, and once the session is detected as expired all
/// remaining CMIDs are counted as failed without any further network I/O.
pub async fn visit_all(
    session: &Session,
    base_url: &str,
    quiz_ids: &[u64],
    delay: Duration,
) -> RunStats {
    let mut stats = RunStats {
        total: quiz_ids.len(),
        ..Default::default()
    };
    let mut expired_at = None;

    println!("\n--- Processing {} Quiz CMIDs ---", quiz_ids.len());
    for (i, &quiz_id) in quiz_ids.iter().enumerate() {
        let stats_url = format!("{base_url}/mod/quiz/report.php?id={quiz_id}&mode=statistics");
        info_time!(
            "Processing CMID: {} ({}/{}) - Visiting: {}",
            quiz_id,
            i + 1,
            quiz_ids.len(),
            stats_url
        );

        stats.attempted += 1;
        match visit_one(session, quiz_id, &stats_url).await {
            VisitOutcome::Visited => stats.succeeded += 1,
            VisitOutcome::Failed => stats.failed += 1,
            VisitOutcome::SessionExpired => {
                expired_at = Some(i);
                break;
            }
        }

        // No point sleeping after the last one.
        if i < quiz_ids.len() - 1 {
            sleep(delay).await;
        }
    }

    if let Some(i) = expired_at {
        warn_time!("Skipping remaining quizzes due to detected session expiry.");
        // The expired item itself plus everything after it.
        stats.failed += stats.total - i;
    }

    stats
}

async fn visit_one(session: &Session, quiz_id: u64, stats_url: &str) -> VisitOutcome {
    let response = match session.get(stats_url).await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            warn_time!("Request timed out for CMID {quiz_id}.");
            return VisitOutcome::Failed;
        }
        Err(e) => {
            warn_time!("Network Error for CMID {quiz_id}: {e}");
            return VisitOutcome::Failed;
        }
    };

    if session.is_login_url(response.url()) {
        warn_time!("Session likely expired. Redirected to login page for CMID {quiz_id}.");
        return VisitOutcome::SessionExpired;
    }

    let status = response.status();
    if !status.is_success() {
        warn_time!("HTTP Error for CMID {quiz_id}: {status}");
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn_time!("Authentication error detected, assuming session expired.");
            return VisitOutcome::SessionExpired;
        }
        return VisitOutcome::Failed;
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn_time!("Network Error for CMID {quiz_id}: {e}");
            return VisitOutcome::Failed;
        }
    };

    match quirks::has_soft_error(&body) {
        Ok(true) => {
            warn_time!("Potential error/permission issue detected on statistics page for CMID {quiz_id}.");
        }
        Ok(false) => {}
        Err(e) => warn_time!("Couldn't inspect statistics page for CMID {quiz_id}: {e}"),
    }

    info_time!("Successfully visited stats page for CMID: {quiz_id}");
    VisitOutcome::Visited
}
