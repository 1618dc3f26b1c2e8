//! Browser rendering through a WebDriver server

use crate::config::BrowserConfig;
use async_trait::async_trait;
use pillsquad_core::{Error, Result};
use std::time::Duration;
use thirtyfour::common::capabilities::chromium::ChromiumLikeCapabilities;
use thirtyfour::{DesiredCapabilities, WebDriver};
use tracing::{debug, warn};

/// Interval between `document.readyState` polls
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Renders pages that need a real browser (dynamic content, screenshots)
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// HTML source after the page finished loading
    async fn page_source(&self, url: &str) -> Result<String>;

    /// PNG screenshot of the browser window showing `url`
    async fn screenshot(&self, url: &str) -> Result<Vec<u8>>;
}

/// Headless Chrome driven over the WebDriver protocol, one session per call
pub struct WebDriverRenderer {
    config: BrowserConfig,
}

impl WebDriverRenderer {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    async fn open(&self) -> Result<WebDriver> {
        let mut caps = DesiredCapabilities::chrome();
        if self.config.headless {
            caps.set_headless().map_err(browser_err)?;
        }
        for arg in ["--disable-gpu", "--no-sandbox", "--window-size=1920,1080"] {
            caps.add_arg(arg).map_err(browser_err)?;
        }

        let driver = WebDriver::new(&self.config.webdriver_url, caps)
            .await
            .map_err(|e| {
                Error::browser(format!(
                    "failed to connect to WebDriver at {}: {}",
                    self.config.webdriver_url, e
                ))
            })?;

        driver
            .set_page_load_timeout(Duration::from_secs(self.config.page_load_timeout_secs))
            .await
            .map_err(browser_err)?;

        Ok(driver)
    }

    async fn load(&self, driver: &WebDriver, url: &str) -> Result<()> {
        driver.goto(url).await.map_err(browser_err)?;

        let ready_timeout = Duration::from_secs(self.config.ready_timeout_secs);
        tokio::time::timeout(ready_timeout, async {
            loop {
                if let Ok(ret) = driver.execute("return document.readyState", vec![]).await {
                    if ret.json().as_str() == Some("complete") {
                        return;
                    }
                }
                tokio::time::sleep(READY_POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| {
            Error::browser(format!(
                "{url} not ready after {}s",
                self.config.ready_timeout_secs
            ))
        })?;

        debug!(%url, "page ready");
        Ok(())
    }

    /// Open a session, run `f`, and always end the session
    async fn with_page<T, F, Fut>(&self, url: &str, f: F) -> Result<T>
    where
        F: FnOnce(WebDriver) -> Fut + Send,
        Fut: std::future::Future<Output = (WebDriver, Result<T>)> + Send,
        T: Send,
    {
        let driver = self.open().await?;

        let (driver, result) = match self.load(&driver, url).await {
            Ok(()) => f(driver).await,
            Err(e) => (driver, Err(e)),
        };

        if let Err(e) = driver.quit().await {
            warn!("failed to close browser session: {}", e);
        }
        result
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn page_source(&self, url: &str) -> Result<String> {
        self.with_page(url, |driver| async move {
            let source = driver.source().await.map_err(browser_err);
            (driver, source)
        })
        .await
    }

    async fn screenshot(&self, url: &str) -> Result<Vec<u8>> {
        self.with_page(url, |driver| async move {
            let png = driver.screenshot_as_png().await.map_err(browser_err);
            (driver, png)
        })
        .await
    }
}

fn browser_err(e: impl std::fmt::Display) -> Error {
    Error::browser(e.to_string())
}
