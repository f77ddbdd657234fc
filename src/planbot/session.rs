//! PlanBot session state
//!
//! Per-group, in-process state for the command flow: the latest search
//! results and the currently selected candidate. Sessions are ephemeral —
//! they are not persisted, expire after an idle TTL, and losing one only
//! loses an in-progress command flow, never records.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::Candidate;

/// Search/selection state of one group's command flow
#[derive(Debug, Clone)]
pub struct PlanbotSession {
    pub results: Vec<Candidate>,
    pub selected: Option<Candidate>,
    pub updated_at: DateTime<Utc>,
}

impl Default for PlanbotSession {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            selected: None,
            updated_at: Utc::now(),
        }
    }
}

impl PlanbotSession {
    /// The current selection.
    ///
    /// A selection without stored results is invalid state and reads as
    /// "nothing selected".
    pub fn selection(&self) -> Option<&Candidate> {
        if self.results.is_empty() {
            return None;
        }
        self.selected.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.selected.is_none()
    }
}

/// Keyed store of per-group sessions, owned by the command interpreter.
///
/// Commands take a snapshot, work without holding any lock across await
/// points, and write the result back last-write-wins.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<Uuid, PlanbotSession>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::seconds(ttl_seconds as i64),
        }
    }

    /// Clone the group's session; an expired or missing session reads as a
    /// fresh one
    pub fn snapshot(&self, group_id: Uuid) -> PlanbotSession {
        match self.sessions.get(&group_id) {
            Some(session) if Utc::now() - session.updated_at <= self.ttl => session.clone(),
            _ => PlanbotSession::default(),
        }
    }

    /// Write a group's session back, refreshing its idle timestamp
    pub fn put(&self, group_id: Uuid, mut session: PlanbotSession) {
        session.updated_at = Utc::now();
        self.sessions.insert(group_id, session);
    }

    pub fn clear(&self, group_id: Uuid) {
        self.sessions.remove(&group_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateExtra, PollKind};

    fn candidate(title: &str) -> Candidate {
        Candidate {
            id: title.to_lowercase(),
            title: title.to_string(),
            description: String::new(),
            image: None,
            rating: None,
            extra: CandidateExtra::empty(PollKind::Place),
        }
    }

    #[test]
    fn test_snapshot_of_missing_session_is_empty() {
        let store = SessionStore::new(60);
        assert!(store.snapshot(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_put_and_snapshot_round_trip() {
        let store = SessionStore::new(60);
        let group_id = Uuid::new_v4();

        let mut session = PlanbotSession::default();
        session.results = vec![candidate("Cafe A"), candidate("Cafe B")];
        store.put(group_id, session);

        let snapshot = store.snapshot(group_id);
        assert_eq!(snapshot.results.len(), 2);
        assert!(snapshot.selection().is_none());
    }

    #[test]
    fn test_expired_session_reads_as_fresh() {
        let store = SessionStore::new(0);
        let group_id = Uuid::new_v4();

        let mut session = PlanbotSession::default();
        session.results = vec![candidate("Cafe A")];
        store.put(group_id, session);

        // TTL of zero: anything older than "now" is gone.
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(store.snapshot(group_id).is_empty());
    }

    #[test]
    fn test_selection_without_results_is_invalid() {
        let mut session = PlanbotSession::default();
        session.selected = Some(candidate("Cafe A"));
        assert!(session.selection().is_none());

        session.results = vec![candidate("Cafe A")];
        assert!(session.selection().is_some());
    }

    #[test]
    fn test_clear_resets_group_state() {
        let store = SessionStore::new(60);
        let group_id = Uuid::new_v4();

        let mut session = PlanbotSession::default();
        session.results = vec![candidate("Cafe A")];
        store.put(group_id, session);
        store.clear(group_id);

        assert!(store.snapshot(group_id).is_empty());
    }
}
