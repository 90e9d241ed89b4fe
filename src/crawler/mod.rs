//! Crawler module: traversal state and orchestration
//!
//! This module contains the core crawling logic:
//! - The visited tracker (depth-aware cycle prevention)
//! - The link set accumulating results
//! - The orchestrator running the depth-bounded traversal

mod links;
mod orchestrator;
mod tracker;

pub use links::LinkSet;
pub use orchestrator::Orchestrator;
pub use tracker::VisitedTracker;

use crate::browser::PageSession;
use crate::config::Config;

/// Runs a complete crawl over every configured seed URL.
///
/// All seeds share one visited tracker and one result set. The collect
/// filters are applied once over the aggregated set; a URL can be excluded
/// from the result yet still have been followed, and vice versa.
pub async fn crawl<S: PageSession>(config: &Config, session: S) -> (LinkSet, S) {
    let mut orchestrator = Orchestrator::new(config, session);
    let mut results = LinkSet::new();

    for seed in &config.seeds {
        tracing::info!("Crawling seed {}", seed);
        orchestrator.crawl_seed(seed, &mut results).await;
    }

    results.retain(|link| config.include.is_match(link) && !config.exclude.is_match(link));

    tracing::info!("Crawl finished with {} collected links", results.len());
    (results, orchestrator.into_session())
}
