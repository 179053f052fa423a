//! Concurrent deep-dive searches, one per angle

use crate::models::SearchAngles;
use crate::search::{SearchHit, SearchProvider};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

/// Result of one angle's search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchOutcome {
    Hits(Vec<SearchHit>),
    /// The search failed; carries the error text
    Failed(String),
}

/// One angle and what its search produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeepDive {
    pub angle: String,
    pub outcome: BranchOutcome,
}

impl DeepDive {
    /// Hits for this angle; empty when the search failed
    pub fn hits(&self) -> &[SearchHit] {
        match &self.outcome {
            BranchOutcome::Hits(hits) => hits,
            BranchOutcome::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, BranchOutcome::Failed(_))
    }
}

/// Search every angle concurrently and wait for all of them
///
/// A failing branch turns into [`BranchOutcome::Failed`] without touching its
/// siblings. Results come back in angle order.
pub async fn deep_dive(
    search: &dyn SearchProvider,
    angles: &SearchAngles,
    max_results: usize,
) -> Vec<DeepDive> {
    info!("Running {} parallel deep-dive searches", angles.len());

    let branches = angles.iter().map(|angle| async move {
        let outcome = match search.search(angle, max_results).await {
            Ok(hits) => {
                if hits.is_empty() {
                    warn!(angle, "Deep-dive search returned no results");
                }
                BranchOutcome::Hits(hits)
            }
            Err(e) => {
                warn!(angle, error = %e, "Deep-dive search failed");
                BranchOutcome::Failed(e.to_string())
            }
        };
        DeepDive {
            angle: angle.to_string(),
            outcome,
        }
    });

    let dives = join_all(branches).await;
    let failed = dives.iter().filter(|d| d.is_failed()).count();
    info!(
        "Deep-dive searches done ({} ok, {} failed)",
        dives.len() - failed,
        failed
    );
    dives
}
