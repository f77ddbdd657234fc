//! Normalized lookup candidates

use serde::{Deserialize, Serialize};

use crate::models::poll::PollKind;

/// A normalized search result (place or movie) held in PlanBot session
/// state pending selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Provider-assigned identifier.
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub rating: Option<f64>,
    pub extra: CandidateExtra,
}

/// Provider-specific fields carried along until the candidate is scheduled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateExtra {
    pub release_date: Option<String>,
    pub genres: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source: PollKind,
}

impl CandidateExtra {
    pub fn empty(source: PollKind) -> Self {
        Self {
            release_date: None,
            genres: None,
            latitude: None,
            longitude: None,
            source,
        }
    }
}

impl Candidate {
    /// Case-insensitive substring match used by the `select` command
    pub fn matches(&self, fragment: &str) -> bool {
        self.title.to_lowercase().contains(&fragment.to_lowercase())
    }
}
