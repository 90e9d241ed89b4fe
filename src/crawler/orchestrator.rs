//! Crawl orchestration
//!
//! Traversal is single-threaded: one URL's link discovery completes before
//! its children begin. The frontier is an explicit work list of
//! `(url, depth)` pairs; the visited tracker provides cycle prevention and
//! allows re-expansion when a shorter path to a known URL is found.

use crate::browser::PageSession;
use crate::config::Config;
use crate::crawler::links::LinkSet;
use crate::crawler::tracker::VisitedTracker;
use std::collections::VecDeque;

/// Drives the depth-bounded traversal for one crawl run.
///
/// Owns the visited tracker and the page session; multiple seeds of the
/// same run share both.
pub struct Orchestrator<'a, S: PageSession> {
    config: &'a Config,
    session: S,
    tracker: VisitedTracker,
    reconnects_used: u32,
}

impl<'a, S: PageSession> Orchestrator<'a, S> {
    pub fn new(config: &'a Config, session: S) -> Self {
        Self {
            config,
            session,
            tracker: VisitedTracker::new(),
            reconnects_used: 0,
        }
    }

    /// Traverses from `seed`, adding every discovered link to `results`.
    ///
    /// The seed itself always enters the result set. Discovered links all
    /// enter the result set too; the follow filters only decide which of
    /// them are expanded at `depth + 1`. Collect filtering is the caller's
    /// concern and happens once over the aggregated set.
    pub async fn crawl_seed(&mut self, seed: &str, results: &mut LinkSet) {
        let mut frontier: VecDeque<(String, u32)> = VecDeque::new();
        results.add(seed);
        frontier.push_back((seed.to_string(), 0));

        while let Some((url, depth)) = frontier.pop_front() {
            if self.depth_exhausted(depth) {
                tracing::debug!("Depth limit reached at {} (depth {})", url, depth);
                continue;
            }
            if !self.tracker.should_visit(&url, depth) {
                tracing::debug!("Already visited: {}", url);
                continue;
            }

            tracing::info!("Expanding {} (depth {})", url, depth);
            let links = self.fetch_with_retry(&url).await;
            self.tracker.record(&url, depth);

            for link in links {
                results.add(link.clone());
                if self.should_follow(&link) {
                    frontier.push_back((link, depth + 1));
                }
            }
        }
    }

    /// Fetches one URL's links, retrying transient session loss with a
    /// reconnect between attempts. Exhausting the budget, or any
    /// non-transient failure, degrades to zero links; a single URL's
    /// failure never aborts the run.
    async fn fetch_with_retry(&mut self, url: &str) -> Vec<String> {
        let mut attempts = 0u32;
        loop {
            match self.session.fetch_links(url).await {
                Ok(links) => {
                    tracing::debug!("Found {} links on {}", links.len(), url);
                    return links;
                }
                Err(e) if e.is_transient() && attempts < self.config.reconnect_attempts => {
                    attempts += 1;
                    self.reconnects_used += 1;
                    tracing::warn!(
                        "Session lost while fetching {} (attempt {}/{}): {}",
                        url,
                        attempts,
                        self.config.reconnect_attempts,
                        e
                    );
                    if let Err(re) = self.session.reconnect().await {
                        tracing::error!("Reconnect failed: {}", re);
                    }
                }
                Err(e) => {
                    tracing::error!("Fetch failed for {}: {}", url, e);
                    return Vec::new();
                }
            }
        }
    }

    /// In download mode the last crawlable level is collected but not
    /// itself expanded, so the effective expansion budget is one shallower.
    fn depth_exhausted(&self, depth: u32) -> bool {
        let budget = if self.config.download {
            i64::from(self.config.max_depth) - 1
        } else {
            i64::from(self.config.max_depth)
        };
        i64::from(depth) > budget
    }

    fn should_follow(&self, link: &str) -> bool {
        self.config.follow_include.is_match(link) && !self.config.follow_exclude.is_match(link)
    }

    /// Total reconnect attempts consumed so far in this run.
    pub fn reconnects_used(&self) -> u32 {
        self.reconnects_used
    }

    /// Hands the session back, e.g. for a clean disconnect.
    pub fn into_session(self) -> S {
        self.session
    }
}
