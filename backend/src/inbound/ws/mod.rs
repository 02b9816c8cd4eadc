//! WebSocket inbound adapter for the live catalogue and chat.
//!
//! Responsibilities:
//! - validate upgrade requests against the configured origin allow-list
//! - spawn one session task per connection
//! - keep WebSocket framing at the edge; storage and broadcasting stay in
//!   the domain coordinator

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{error, warn};
use url::Url;

mod session;

pub mod connections;
pub mod messages;
pub mod state;

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(origin_header, &state.allowed_origins)?;

    let (response, session, msg_stream) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorInternalServerError("WebSocket upgrade failed")
    })?;

    let state = state.get_ref().clone();
    actix_web::rt::spawn(session::handle_ws_session(state, session, msg_stream));

    Ok(response)
}

fn validate_origin(origin_header: &HeaderValue, allowed: &[Url]) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if is_allowed_origin(&origin, allowed) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

/// Returns true when the Origin's scheme, host, and port match an entry in
/// the allow-list. Paths on allow-list entries are ignored.
fn is_allowed_origin(origin: &Url, allowed: &[Url]) -> bool {
    if origin.host_str().is_none() {
        return false;
    }
    let origin = origin.origin();
    allowed.iter().any(|candidate| candidate.origin() == origin)
}
