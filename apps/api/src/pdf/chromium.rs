//! Headless Chromium backend, driven over the DevTools protocol.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{mm_to_inches, BrowserLauncher, BrowserSession, PdfOptions, RenderError};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);
const READY_POLL_ATTEMPTS: u32 = 100;

/// Launches a fresh Chromium for every export.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
    no_sandbox: bool,
}

impl ChromiumLauncher {
    pub fn new(executable: Option<PathBuf>, no_sandbox: bool) -> Self {
        Self {
            executable,
            no_sandbox,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder().arg("--disable-dev-shm-usage");
        if self.no_sandbox {
            // Container hosts usually cannot provide the setuid sandbox.
            builder = builder.no_sandbox().arg("--disable-setuid-sandbox");
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(RenderError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, RenderError> {
        let (browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The CDP connection only makes progress while its handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler stopped: {e}");
                    break;
                }
            }
        });

        Ok(Box::new(ChromiumSession {
            browser,
            handler: Some(handler),
        }))
    }
}

pub struct ChromiumSession {
    browser: Browser,
    handler: Option<JoinHandle<()>>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn print(&mut self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Load(e.to_string()))?;

        page.set_content(html)
            .await
            .map_err(|e| RenderError::Load(e.to_string()))?;
        wait_until_settled(&page).await?;

        page.pdf(print_params(options))
            .await
            .map_err(|e| RenderError::Export(e.to_string()))
    }

    async fn close(mut self: Box<Self>) -> Result<(), RenderError> {
        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| RenderError::Close(e.to_string()));
        if closed.is_ok() {
            if let Err(e) = self.browser.wait().await {
                warn!("Waiting for browser exit failed: {e}");
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        closed.map(|_| ())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // Dropping `Browser` kills a still-running child; the handler task
        // would otherwise outlive it.
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

/// Waits for the document to finish loading and for web fonts to resolve.
/// The markup references no network assets, so this stands in for
/// "no pending network activity".
async fn wait_until_settled(page: &Page) -> Result<(), RenderError> {
    for _ in 0..READY_POLL_ATTEMPTS {
        let state: String = page
            .evaluate("document.readyState")
            .await
            .map_err(|e| RenderError::Load(e.to_string()))?
            .into_value()
            .map_err(|e| RenderError::Load(e.to_string()))?;
        if state == "complete" {
            page.evaluate("document.fonts.ready.then(() => true)")
                .await
                .map_err(|e| RenderError::Load(e.to_string()))?;
            return Ok(());
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
    Err(RenderError::Load("document never reached readyState=complete".to_string()))
}

fn print_params(options: &PdfOptions) -> PrintToPdfParams {
    PrintToPdfParams {
        print_background: Some(options.print_background),
        paper_width: Some(mm_to_inches(options.paper_width_mm)),
        paper_height: Some(mm_to_inches(options.paper_height_mm)),
        margin_top: Some(mm_to_inches(options.margin_top_mm)),
        margin_right: Some(mm_to_inches(options.margin_right_mm)),
        margin_bottom: Some(mm_to_inches(options.margin_bottom_mm)),
        margin_left: Some(mm_to_inches(options.margin_left_mm)),
        ..Default::default()
    }
}
