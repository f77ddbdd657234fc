//! Vote model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::poll::Choice;

/// A single member's vote on a poll.
///
/// Invariant: at most one vote per (poll, voter) pair — re-casting
/// overwrites the choice rather than inserting a second record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub voter_id: Uuid,
    pub choice: Choice,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(poll_id: Uuid, voter_id: Uuid, choice: Choice) -> Self {
        Self {
            id: Uuid::new_v4(),
            poll_id,
            voter_id,
            choice,
            created_at: Utc::now(),
        }
    }
}

/// Per-choice vote counts for a poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub join: usize,
    pub maybe: usize,
    pub no: usize,
}

impl Tally {
    pub fn count(&mut self, choice: Choice) {
        match choice {
            Choice::Join => self.join += 1,
            Choice::Maybe => self.maybe += 1,
            Choice::No => self.no += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.join + self.maybe + self.no
    }
}
