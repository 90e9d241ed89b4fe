//! Browser collaborators: page sessions and the load-race primitive
//!
//! The crawl orchestrator only needs a capability to open a page, navigate
//! it, wait for it to finish loading, evaluate a script returning strings,
//! and close the page again. That capability is the [`PageSession`] trait;
//! [`BrowserSession`] implements it over headless Chrome.

mod race;
mod script;
mod session;

pub use race::{RaceCell, RaceSender};
pub use script::GET_LINKS;
pub use session::BrowserSession;

use crate::SessionError;
use async_trait::async_trait;

/// The page-rendering capability the orchestrator depends on.
#[async_trait]
pub trait PageSession {
    /// Opens a page, navigates to `url`, waits for it to load, and returns
    /// every link the rendered DOM exposes.
    async fn fetch_links(&mut self, url: &str) -> Result<Vec<String>, SessionError>;

    /// Tears down and re-establishes the underlying session after a
    /// transient loss. Sequential with the retry loop that triggered it.
    async fn reconnect(&mut self) -> Result<(), SessionError>;
}
