//! Static site hosting: the root page and the file-system fallback.

use std::path::Path;

use anyhow::Context;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use crate::errors::AppError;
use crate::state::AppState;

/// Candidates for `/`, in order.
const ROOT_PAGES: [&str; 2] = ["index.html", "mutual-funds.html"];

/// GET /
/// The site's landing page, or a plain "OK" when none is deployed.
pub async fn root_page(State(state): State<AppState>) -> Result<Response, AppError> {
    for page in ROOT_PAGES {
        if let Some(html) = read_if_exists(&state.config.site_root.join(page)).await? {
            return Ok(Html(html).into_response());
        }
    }
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "OK").into_response())
}

async fn read_if_exists(path: &Path) -> anyhow::Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(html) => Ok(Some(html)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

/// Middleware for the static fallback: dot-files (`.env`, `.git/…`) are never served.
pub async fn hide_dotfiles(request: Request, next: Next) -> Response {
    let hidden = request
        .uri()
        .path()
        .split('/')
        .any(|segment| segment.starts_with('.'));
    if hidden {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}
