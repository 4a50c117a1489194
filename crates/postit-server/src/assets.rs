//! Static front-end files and the handful of fixed browser routes.

use std::io::ErrorKind;
use std::path::{Component, Path as FsPath, PathBuf};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use rust_embed::RustEmbed;

/// Landing page the root path redirects to.
pub const INDEX_PAGE: &str = "/static/boards.html";

/// Front end compiled into the binary.
#[derive(RustEmbed)]
#[folder = "static/"]
struct Bundled;

/// Front-end files, read from a directory on disk when one is configured
/// and from the copy compiled into the binary otherwise.
#[derive(Debug, Clone, Default)]
pub struct StaticAssets {
    root: Option<PathBuf>,
}

impl StaticAssets {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Answer with the bytes of `relative`, looked up under the asset root.
    pub async fn serve(&self, relative: &str) -> Response {
        if !is_clean(relative) {
            return StatusCode::NOT_FOUND.into_response();
        }
        match &self.root {
            Some(root) => serve_file(&root.join(relative)).await,
            None => serve_bundled(relative),
        }
    }
}

/// Only plain, non-empty relative paths; no `..`, `.` or absolute parts.
fn is_clean(relative: &str) -> bool {
    let path = FsPath::new(relative);
    path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
}

fn content_type(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

async fn serve_file(path: &FsPath) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let mime = content_type(&path.to_string_lossy());
            ([(header::CONTENT_TYPE, mime)], bytes).into_response()
        }
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Failed to read static file");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn serve_bundled(relative: &str) -> Response {
    match Bundled::get(relative) {
        Some(file) => (
            [(header::CONTENT_TYPE, content_type(relative))],
            file.data.into_owned(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn router(assets: StaticAssets) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/favicon.ico", get(favicon))
        .route("/bundle.js", get(bundle))
        .route("/static/{*path}", get(static_file))
        .with_state(assets)
}

async fn index() -> Redirect {
    Redirect::temporary(INDEX_PAGE)
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn bundle(State(assets): State<StaticAssets>) -> Response {
    assets.serve("bundle.js").await
}

async fn static_file(State(assets): State<StaticAssets>, Path(path): Path<String>) -> Response {
    assets.serve(&path).await
}
