//! PDF export: plan → HTML → headless browser → PDF bytes.
//!
//! Every export launches its own browser process and tears it down before
//! returning. There is no pool and no queue, so concurrent exports each pay
//! full startup cost and hold a browser process apiece.

pub mod chromium;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::plan::html::render_plan_html;
use crate::plan::model::PlanDocument;

pub use chromium::ChromiumLauncher;

const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch headless browser: {0}")]
    Launch(String),

    #[error("failed to load plan HTML: {0}")]
    Load(String),

    #[error("failed to export PDF: {0}")]
    Export(String),

    #[error("failed to close headless browser: {0}")]
    Close(String),
}

/// Page geometry for the exported document. Lengths are in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub paper_width_mm: f64,
    pub paper_height_mm: f64,
    pub margin_top_mm: f64,
    pub margin_right_mm: f64,
    pub margin_bottom_mm: f64,
    pub margin_left_mm: f64,
    pub print_background: bool,
}

impl Default for PdfOptions {
    /// A4 with 14mm margins (16mm at the bottom) and backgrounds on.
    fn default() -> Self {
        Self {
            paper_width_mm: 210.0,
            paper_height_mm: 297.0,
            margin_top_mm: 14.0,
            margin_right_mm: 14.0,
            margin_bottom_mm: 16.0,
            margin_left_mm: 14.0,
            print_background: true,
        }
    }
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Starts a fresh browser instance.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, RenderError>;
}

/// One live browser instance, owned by a single export.
///
/// `close` must be called on every path. Implementations also kill the
/// process on drop so a cancelled request cannot leave one behind.
#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `html` into a fresh surface, waits for it to settle and prints it.
    async fn print(&mut self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RenderError>;

    async fn close(self: Box<Self>) -> Result<(), RenderError>;
}

#[derive(Clone)]
pub struct PdfExporter {
    launcher: Arc<dyn BrowserLauncher>,
    options: PdfOptions,
}

impl PdfExporter {
    pub fn new(launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            launcher,
            options: PdfOptions::default(),
        }
    }

    /// Renders the plan and prints it: acquire a browser, print, release.
    /// The browser is released on every path, including print failures.
    pub async fn render(&self, plan: &PlanDocument) -> Result<Vec<u8>, RenderError> {
        let html = render_plan_html(plan);

        let mut session = self.launcher.launch().await?;
        debug!("Headless browser launched");

        let printed = session.print(&html, &self.options).await;
        release(session).await;

        printed
    }
}

async fn release(session: Box<dyn BrowserSession>) {
    match session.close().await {
        Ok(()) => debug!("Headless browser closed"),
        Err(e) => warn!("Headless browser did not close cleanly: {e}"),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Behaviour, FakeLauncher};
    use super::*;
    use serde_json::json;

    fn exporter(launcher: &Arc<FakeLauncher>) -> PdfExporter {
        PdfExporter::new(launcher.clone())
    }

    fn plan() -> PlanDocument {
        PlanDocument::from_value(&json!({"summary": {"title": "Retire at 50", "corpus_inr": 20000000}}))
    }

    #[test]
    fn test_default_options_are_a4_with_fixed_margins() {
        let options = PdfOptions::default();
        assert_eq!(options.paper_width_mm, 210.0);
        assert_eq!(options.paper_height_mm, 297.0);
        assert_eq!(options.margin_top_mm, 14.0);
        assert_eq!(options.margin_left_mm, 14.0);
        assert_eq!(options.margin_right_mm, 14.0);
        assert_eq!(options.margin_bottom_mm, 16.0);
        assert!(options.print_background);
    }

    #[test]
    fn test_mm_to_inches() {
        assert!((mm_to_inches(25.4) - 1.0).abs() < f64::EPSILON);
        assert!((mm_to_inches(297.0) - 11.69).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_render_prints_plan_html_and_releases_browser() {
        let launcher = Arc::new(FakeLauncher::new(Behaviour::EchoHtml));

        let bytes = exporter(&launcher).render(&plan()).await.unwrap();
        let printed = String::from_utf8(bytes).unwrap();

        assert!(printed.contains("Retire at 50"));
        assert!(printed.contains("₹2,00,00,000"));
        assert_eq!(launcher.launches(), 1);
        assert_eq!(launcher.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_print_failure_still_releases_browser() {
        let launcher = Arc::new(FakeLauncher::new(Behaviour::FailPrint));

        let err = exporter(&launcher).render(&plan()).await.unwrap_err();

        assert!(matches!(err, RenderError::Export(_)));
        assert_eq!(launcher.launches(), 1);
        assert_eq!(launcher.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_launch_failure_is_render_error() {
        let launcher = Arc::new(FakeLauncher::new(Behaviour::FailLaunch));

        let err = exporter(&launcher).render(&plan()).await.unwrap_err();

        assert!(matches!(err, RenderError::Launch(_)));
        assert_eq!(launcher.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_close_failure_after_print_keeps_pdf() {
        let launcher = Arc::new(FakeLauncher::new(Behaviour::FailClose));

        let bytes = exporter(&launcher).render(&plan()).await.unwrap();

        assert!(!bytes.is_empty());
        assert_eq!(launcher.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_exports_each_get_their_own_browser() {
        let launcher = Arc::new(FakeLauncher::new(Behaviour::EchoHtml));
        let exporter = exporter(&launcher);
        let plan = plan();

        let (a, b) = tokio::join!(exporter.render(&plan), exporter.render(&plan));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(launcher.launches(), 2);
        assert_eq!(launcher.live_sessions(), 0);
    }
}
