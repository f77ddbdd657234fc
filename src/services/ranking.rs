//! Optional candidate re-ranking
//!
//! Search results can be re-ordered by an external ranking endpoint before
//! they are shown to the group. Ranking is an enrichment step: any failure
//! falls back to the provider's original order, and the default
//! implementation does nothing at all.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Settings;
use crate::models::Candidate;
use crate::utils::errors::{PlanBuddyError, Result};

/// Candidate ordering enrichment
#[async_trait]
pub trait Ranker: Send + Sync {
    /// Reorder candidates for the given query. Must not fail: fall back to
    /// the input order instead.
    async fn rank(&self, query: &str, candidates: Vec<Candidate>) -> Vec<Candidate>;
}

/// Ranker that keeps the provider's order
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRanker;

#[async_trait]
impl Ranker for NoopRanker {
    async fn rank(&self, _query: &str, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates
    }
}

#[derive(Debug, Serialize)]
struct RankRequest<'a> {
    query: &'a str,
    candidates: Vec<RankCandidate<'a>>,
}

#[derive(Debug, Serialize)]
struct RankCandidate<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct RankResponse {
    order: Vec<String>,
}

/// Ranker backed by an LLM re-ranking endpoint
#[derive(Debug, Clone)]
pub struct LlmRanker {
    client: Client,
    api_url: String,
}

impl LlmRanker {
    pub fn new(api_url: String, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent("PlanBuddy/1.0")
            .build()
            .map_err(PlanBuddyError::Http)?;

        Ok(Self { client, api_url })
    }

    async fn request_order(&self, query: &str, candidates: &[Candidate]) -> Result<Vec<String>> {
        let request = RankRequest {
            query,
            candidates: candidates
                .iter()
                .map(|c| RankCandidate {
                    id: &c.id,
                    title: &c.title,
                    description: &c.description,
                })
                .collect(),
        };

        let response: RankResponse = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.order)
    }
}

/// Apply a ranked id order to a candidate list. Candidates the order does
/// not mention keep their relative position after the ranked ones.
fn apply_order(candidates: Vec<Candidate>, order: &[String]) -> Vec<Candidate> {
    let mut remaining = candidates;
    let mut ranked = Vec::with_capacity(remaining.len());

    for id in order {
        if let Some(pos) = remaining.iter().position(|c| &c.id == id) {
            ranked.push(remaining.remove(pos));
        }
    }

    ranked.extend(remaining);
    ranked
}

#[async_trait]
impl Ranker for LlmRanker {
    async fn rank(&self, query: &str, candidates: Vec<Candidate>) -> Vec<Candidate> {
        if candidates.len() < 2 {
            return candidates;
        }

        match self.request_order(query, &candidates).await {
            Ok(order) => apply_order(candidates, &order),
            Err(e) => {
                warn!(error = %e, "Ranking request failed, keeping provider order");
                candidates
            }
        }
    }
}

/// Build the ranker selected by configuration
pub fn ranker_from_settings(settings: &Settings) -> Result<Arc<dyn Ranker>> {
    if settings.features.llm_ranking {
        if let Some(api_url) = &settings.ranking.api_url {
            let ranker = LlmRanker::new(api_url.clone(), settings.ranking.timeout_seconds)?;
            return Ok(Arc::new(ranker));
        }
    }

    Ok(Arc::new(NoopRanker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateExtra, PollKind};

    fn candidate(id: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: String::new(),
            image: None,
            rating: None,
            extra: CandidateExtra::empty(PollKind::Place),
        }
    }

    #[tokio::test]
    async fn test_noop_ranker_keeps_order() {
        let candidates = vec![candidate("a"), candidate("b"), candidate("c")];
        let ranked = NoopRanker.rank("query", candidates.clone()).await;
        assert_eq!(ranked, candidates);
    }

    #[test]
    fn test_apply_order_reorders_by_id() {
        let candidates = vec![candidate("a"), candidate("b"), candidate("c")];
        let ranked = apply_order(candidates, &["c".to_string(), "a".to_string()]);
        let ids: Vec<&str> = ranked.iter().map(|c| c.id.as_str()).collect();
        // Unranked candidates keep their relative position at the end.
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_apply_order_ignores_unknown_ids() {
        let candidates = vec![candidate("a"), candidate("b")];
        let ranked = apply_order(candidates, &["zzz".to_string(), "b".to_string()]);
        let ids: Vec<&str> = ranked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
