use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::pdf::PdfExporter;
use crate::plan::PlanSource;
use crate::routes::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup apart from the rate limiter's bucket.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Where the current plan comes from. File-backed in production.
    pub plans: Arc<dyn PlanSource>,
    /// Launches one headless browser per export.
    pub pdf: PdfExporter,
    pub llm: LlmClient,
    pub rate_limiter: RateLimiter,
}
