//! Query parameters understood by an exercise page.
//!
//! - `mode=soft|hard` selects the strictness and whether the session runs.
//! - `attemptId=<id>&view=1` opens a saved attempt read-only.

use url::form_urlencoded;

use crate::model::{AttemptId, Mode};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Valid `mode` parameter, if present.
    pub mode: Option<Mode>,
    /// Attempt to replay; only set together with `view=1`.
    pub replay: Option<AttemptId>,
}

impl PageRequest {
    /// Parse a query string, with or without the leading `?`.
    ///
    /// Invalid values are ignored rather than rejected.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut mode = None;
        let mut attempt = None;
        let mut view = false;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "mode" => mode = value.parse::<Mode>().ok(),
                "attemptId" => attempt = value.parse::<AttemptId>().ok(),
                "view" => view = value == "1",
                _ => {}
            }
        }
        Self {
            mode,
            replay: attempt.filter(|_| view),
        }
    }
}

/// Link that opens a saved attempt in replay mode.
#[must_use]
pub fn replay_link(path: &str, id: AttemptId) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("attemptId", &id.to_string())
        .append_pair("view", "1")
        .finish();
    format!("{path}?{query}")
}
