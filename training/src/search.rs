//! Text search over the in-memory session catalog.
//!
//! Matching runs against the lowercased combination of session title and
//! video channel. Two modes compose with OR:
//!
//! - **character match**: the whole query appears verbatim as a substring
//! - **keyword match**: for queries containing whitespace, every
//!   space-delimited token appears somewhere, in any order (AND across
//!   tokens)
//!
//! An empty query is the identity; an empty catalog yields an empty result.

use crate::model::TrainingSession;

/// Filter sessions by free-text query.
///
/// # Examples
///
/// ```ignore
/// let hits = search_sessions(&sessions, "leg fit");
/// // matches a session titled "Leg Day" on channel "FitChan"
/// ```
#[must_use]
pub fn search_sessions(sessions: &[TrainingSession], query: &str) -> Vec<TrainingSession> {
    if query.is_empty() {
        return sessions.to_vec();
    }

    let needle = query.to_lowercase();
    sessions
        .iter()
        .filter(|session| matches_query(session, &needle))
        .cloned()
        .collect()
}

/// Whether one session matches the lowercased query.
fn matches_query(session: &TrainingSession, needle: &str) -> bool {
    let haystack = format!("{} {}", session.title, session.video.channel).to_lowercase();

    if haystack.contains(needle) {
        return true;
    }

    if needle.contains(char::is_whitespace) {
        return needle
            .split_whitespace()
            .all(|token| haystack.contains(token));
    }

    false
}
