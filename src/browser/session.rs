//! Headless Chrome session driving page loads over CDP
//!
//! The browser is a single shared resource per crawl run. The session owns
//! the launched process and the handler task that pumps CDP events;
//! reconnecting tears the old browser down before launching a new one, and
//! is always sequential with the retry loop that triggered it.

use crate::browser::race::RaceCell;
use crate::browser::script::GET_LINKS;
use crate::browser::PageSession;
use crate::config::Config;
use crate::SessionError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, Headers, SetExtraHttpHeadersParams,
};
use chromiumoxide::cdp::browser_protocol::page::EventDomContentEventFired;
use chromiumoxide::Page;
use futures::StreamExt;
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A live headless-browser session.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    headers: HashMap<String, String>,
    timeout: Duration,
    extra_wait: Duration,
}

impl BrowserSession {
    /// Launches a headless browser and starts its CDP event pump.
    pub async fn connect(config: &Config) -> Result<Self, SessionError> {
        let (browser, handler_task) = launch().await?;
        tracing::debug!("Browser session connected");
        Ok(Self {
            browser,
            handler_task,
            headers: config.headers.clone(),
            timeout: config.timeout,
            extra_wait: config.extra_wait,
        })
    }

    /// Closes the browser and stops the event pump.
    pub async fn disconnect(mut self) {
        self.teardown().await;
        tracing::debug!("Browser session disconnected");
    }

    async fn teardown(&mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser wait failed: {}", e);
        }
        self.handler_task.abort();
    }

    /// Navigates the page and resolves the load race.
    ///
    /// Three tasks race to settle the outcome: a timer, the
    /// DOMContentLoaded listener, and the navigation call itself. The two
    /// losers settle into a consumed cell and exit silently.
    async fn navigate_and_wait(&self, page: &Page, url: &str) -> Result<(), SessionError> {
        let cell = RaceCell::new();

        let timer = cell.sender();
        let timeout = self.timeout;
        let timer_url = url.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            timer.settle(Err(SessionError::Timeout { url: timer_url }));
        });

        let mut events = page
            .event_listener::<EventDomContentEventFired>()
            .await
            .map_err(|e| SessionError::Disconnected(e.to_string()))?;
        let loaded = cell.sender();
        tokio::spawn(async move {
            if events.next().await.is_some() {
                loaded.settle(Ok(()));
            }
        });

        let navigated = cell.sender();
        let nav_page = page.clone();
        let nav_url = url.to_string();
        tokio::spawn(async move {
            if let Err(e) = nav_page.goto(nav_url.clone()).await {
                navigated.settle(Err(SessionError::Navigation {
                    url: nav_url,
                    message: e.to_string(),
                }));
            }
        });

        cell.outcome().await
    }

    async fn drive_page(&self, page: &Page, url: &str) -> Result<Vec<String>, SessionError> {
        if !self.headers.is_empty() {
            page.execute(EnableParams::default())
                .await
                .map_err(|e| SessionError::Disconnected(e.to_string()))?;
            let payload = serde_json::to_value(&self.headers)
                .map_err(|e| SessionError::Disconnected(e.to_string()))?;
            page.execute(SetExtraHttpHeadersParams::new(Headers::new(payload)))
                .await
                .map_err(|e| SessionError::Disconnected(e.to_string()))?;
        }

        self.navigate_and_wait(page, url).await?;

        if !self.extra_wait.is_zero() {
            tokio::time::sleep(self.extra_wait).await;
        }

        page.evaluate(GET_LINKS)
            .await
            .map_err(|e| SessionError::Evaluation {
                url: url.to_string(),
                message: e.to_string(),
            })?
            .into_value::<Vec<String>>()
            .map_err(|e| SessionError::Evaluation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl PageSession for BrowserSession {
    async fn fetch_links(&mut self, url: &str) -> Result<Vec<String>, SessionError> {
        // A failure to open a page means the browser itself is gone, which
        // is the reconnect-eligible case.
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Disconnected(e.to_string()))?;

        let result = self.drive_page(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Page close failed for {}: {}", url, e);
        }
        result
    }

    async fn reconnect(&mut self) -> Result<(), SessionError> {
        tracing::info!("Reconnecting browser session");
        self.teardown().await;
        let (browser, handler_task) = launch().await?;
        self.browser = browser;
        self.handler_task = handler_task;
        Ok(())
    }
}

async fn launch() -> Result<(Browser, JoinHandle<()>), SessionError> {
    let browser_config = BrowserConfig::builder()
        .build()
        .map_err(SessionError::Launch)?;
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| SessionError::Launch(e.to_string()))?;

    // The handler must be polled for the CDP connection to make progress.
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    Ok((browser, handler_task))
}
