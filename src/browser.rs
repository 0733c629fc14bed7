//! Browser session lifecycle and page rendering.
//!
//! One [`BrowserSession`] is launched per API request, owned by that request's
//! handler, and torn down when it goes out of scope (dropping the underlying
//! `Browser` kills the Chrome process on every exit path, including errors).

use anyhow::Result;
use headless_chrome::browser::tab::RequestPausedDecision;
use headless_chrome::protocol::cdp::Fetch::{
    events::RequestPausedEvent, FailRequest, RequestPattern, RequestStage,
};
use headless_chrome::protocol::cdp::Network;
use headless_chrome::{Browser, LaunchOptions, Tab};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;

static USER_AGENTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    ]
});

/// One headless Chrome process, exclusively owned by a single request flow.
pub struct BrowserSession {
    browser: Browser,
}

impl BrowserSession {
    /// Launch a fresh headless Chrome with the standard container-safe flags.
    pub fn launch() -> Result<Self> {
        use rand::seq::SliceRandom;
        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .unwrap_or(&"Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36");

        let ua_arg = format!("--user-agent={}", user_agent);
        let args = vec![
            std::ffi::OsStr::new("--no-sandbox"),
            std::ffi::OsStr::new("--disable-setuid-sandbox"),
            std::ffi::OsStr::new("--disable-dev-shm-usage"),
            std::ffi::OsStr::new("--headless=new"),
            std::ffi::OsStr::new(&ua_arg),
        ];

        let browser = Browser::new(LaunchOptions {
            headless: false, // new headless mode passed via args
            window_size: Some((1920, 1080)),
            args,
            ..Default::default()
        })?;

        Ok(Self { browser })
    }

    /// Open a plain tab with the given navigation timeout.
    pub fn open_tab(&self, nav_timeout: Duration) -> Result<Arc<Tab>> {
        let tab = self.browser.new_tab()?;
        tab.set_default_timeout(nav_timeout);
        Ok(tab)
    }

    /// Open a tab that aborts image and font requests. Detail pages and
    /// arbitrary websites are fetched many per request; skipping media keeps
    /// load times and memory bounded.
    pub fn open_tab_blocking_media(&self, nav_timeout: Duration) -> Result<Arc<Tab>> {
        let tab = self.open_tab(nav_timeout)?;

        let patterns = vec![
            RequestPattern {
                url_pattern: Some("*".to_string()),
                resource_Type: Some(Network::ResourceType::Image),
                request_stage: Some(RequestStage::Request),
            },
            RequestPattern {
                url_pattern: Some("*".to_string()),
                resource_Type: Some(Network::ResourceType::Font),
                request_stage: Some(RequestStage::Request),
            },
        ];
        tab.enable_fetch(Some(&patterns), None)?;

        tab.enable_request_interception(Arc::new(
            |_transport, _session_id, intercepted: RequestPausedEvent| {
                RequestPausedDecision::Fail(FailRequest {
                    request_id: intercepted.params.request_id,
                    error_reason: Network::ErrorReason::BlockedByClient,
                })
            },
        ))?;

        Ok(tab)
    }
}

/// Navigate the tab and wait for the load to finish, bounded by the tab's
/// navigation timeout. A timeout surfaces as an error, never an infinite wait.
pub fn navigate(tab: &Arc<Tab>, url: &str) -> Result<()> {
    tab.navigate_to(url)?;
    tab.wait_until_navigated()?;
    Ok(())
}
