//! Static front-end assets.
//!
//! Files are served from the configured public directory, opened as a
//! capability so request paths cannot reach outside it. `/` and paths ending
//! in `/` resolve to `index.html`.

use std::io;

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::domain::DomainError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const INDEX: &str = "index.html";

/// Resolve a request tail to a relative file path inside the public
/// directory. Returns `None` for anything other than plain descending
/// components.
fn resolve(tail: &str) -> Option<Utf8PathBuf> {
    let mut resolved = Utf8PathBuf::new();
    for component in Utf8Path::new(tail).components() {
        match component {
            Utf8Component::Normal(part) => resolved.push(part),
            Utf8Component::CurDir => {}
            _ => return None,
        }
    }
    if tail.is_empty() || tail.ends_with('/') {
        resolved.push(INDEX);
    }
    Some(resolved)
}

fn content_type(path: &Utf8Path) -> &'static str {
    match path.extension().map(str::to_ascii_lowercase).as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Serve a file from the public directory.
#[get("/{tail:.*}")]
pub async fn serve_asset(
    state: web::Data<HttpState>,
    tail: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let requested = tail.into_inner();
    let Some(path) = resolve(&requested) else {
        warn!(path = %requested, "rejected asset path");
        return Err(DomainError::not_found("asset not found"));
    };

    let dir = state.public_dir.clone();
    let lookup = path.clone();
    let contents = web::block(move || dir.read(lookup.as_std_path()))
        .await
        .map_err(|err| DomainError::internal(format!("asset read task failed: {err}")))?;

    match contents {
        Ok(bytes) => Ok(HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, content_type(&path)))
            .body(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path, "asset not found");
            Err(DomainError::not_found("asset not found"))
        }
        Err(err) => {
            warn!(path = %path, error = %err, "asset read failed");
            Err(DomainError::not_found("asset not found"))
        }
    }
}
