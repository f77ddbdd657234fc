//! Poll and vote-choice models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::models::candidate::Candidate;
use crate::utils::errors::PlanBuddyError;

/// What kind of plan a poll proposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollKind {
    Movie,
    Place,
}

impl PollKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollKind::Movie => "movie",
            PollKind::Place => "place",
        }
    }

    /// Parse a stored or user-supplied kind string
    pub fn parse(s: &str) -> Option<PollKind> {
        match s {
            "movie" => Some(PollKind::Movie),
            "place" => Some(PollKind::Place),
            _ => None,
        }
    }
}

impl std::str::FromStr for PollKind {
    type Err = PlanBuddyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PollKind::parse(s)
            .ok_or_else(|| PlanBuddyError::InvalidInput(format!("invalid poll kind: {}", s)))
    }
}

/// The fixed vote choice set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Join,
    Maybe,
    No,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Join => "join",
            Choice::Maybe => "maybe",
            Choice::No => "no",
        }
    }

    pub fn parse(s: &str) -> Option<Choice> {
        match s {
            "join" => Some(Choice::Join),
            "maybe" => Some(Choice::Maybe),
            "no" => Some(Choice::No),
            _ => None,
        }
    }
}

impl std::str::FromStr for Choice {
    type Err = PlanBuddyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Choice::parse(s)
            .ok_or_else(|| PlanBuddyError::InvalidInput(format!("invalid vote choice: {}", s)))
    }
}

/// Provider-specific poll metadata, parsed once at the persistence boundary.
///
/// Stored as a single typed structure; raw encoded text never crosses the
/// persistence gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub rating: Option<f64>,
    pub release_date: Option<String>,
    pub genres: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source: PollKind,
}

impl Metadata {
    pub fn empty(source: PollKind) -> Self {
        Self {
            date: None,
            time: None,
            rating: None,
            release_date: None,
            genres: None,
            latitude: None,
            longitude: None,
            source,
        }
    }

    /// Fold a lookup candidate and the scheduled date/time into poll metadata
    pub fn from_candidate(candidate: &Candidate, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date: Some(date),
            time: Some(time),
            rating: candidate.rating,
            release_date: candidate.extra.release_date.clone(),
            genres: candidate.extra.genres.clone(),
            latitude: candidate.extra.latitude,
            longitude: candidate.extra.longitude,
            source: candidate.extra.source,
        }
    }
}

/// A poll within a group.
///
/// Core invariant: at most one poll with `active = true` per group at any
/// time. Deleting a poll cascades to its votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: Uuid,
    pub group_id: Uuid,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub kind: PollKind,
    /// Identifier assigned by the external lookup provider.
    pub provider_id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub active: bool,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by a caller when creating a poll
#[derive(Debug, Clone)]
pub struct PollDraft {
    pub kind: PollKind,
    pub provider_id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub metadata: Metadata,
}

impl PollDraft {
    /// Build a draft from a selected lookup candidate and scheduled date/time
    pub fn from_candidate(candidate: &Candidate, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            kind: candidate.extra.source,
            provider_id: candidate.id.clone(),
            title: candidate.title.clone(),
            description: candidate.description.clone(),
            image_url: candidate.image.clone(),
            metadata: Metadata::from_candidate(candidate, date, time),
        }
    }
}
