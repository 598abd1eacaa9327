use axum::extract::{Request, State};
use axum::http::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY};
use axum::middleware::Next;
use axum::response::Response;

use crate::state::SharedState;

/// Attach Access-Control-Allow-Origin from the configured origin list.
/// A `*` entry allows everyone; otherwise the request Origin is echoed
/// back only when it appears in the list, and the response varies on
/// Origin.
pub async fn allow_origin(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req.headers().get(ORIGIN).cloned();
    let wildcard = state.config.allowed_origins.iter().any(|o| o == "*");

    let mut resp = next.run(req).await;

    if wildcard {
        resp.headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        return resp;
    }

    resp.headers_mut()
        .append(VARY, HeaderValue::from_static("origin"));

    if let Some(origin) = origin {
        let allowed = origin
            .to_str()
            .map(|o| state.config.allowed_origins.iter().any(|a| a == o))
            .unwrap_or(false);
        if allowed {
            resp.headers_mut()
                .insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
    }

    resp
}
