use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::AppError;
use crate::models::ContactForm;
use crate::net;
use crate::spam;
use crate::state::SharedState;
use crate::writer::Destination;

pub async fn submit(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ip = net::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies);

    if let Err(retry_after) = state.limiter.check(
        ip,
        state.config.rate_limit,
        state.config.rate_limit_window_secs,
    ) {
        return Err(AppError::RateLimited(format!(
            "Rate limited. Retry after {retry_after}s"
        )));
    }

    if spam::is_spam(&form.extras, state.config.honeypot_field.as_deref()) {
        // Silent success for bots
        tracing::debug!("Honeypot tripped from {ip}, discarding submission");
        return Ok(Json(success_body()));
    }

    let record = form.validate().map_err(|msg| {
        tracing::debug!("Rejected submission from {ip}: {msg}");
        AppError::BadRequest(msg.to_string())
    })?;

    match state.writer.persist(record).await? {
        Destination::Remote => tracing::info!("Contact submission stored in Drive workbook"),
        Destination::Local => tracing::info!("Contact submission stored in local workbook"),
    }

    Ok(Json(success_body()))
}

// Allow-Origin itself is attached by the cors middleware
pub async fn preflight() -> Response {
    (
        [
            ("Access-Control-Allow-Methods", "POST, OPTIONS"),
            ("Access-Control-Allow-Headers", "Content-Type"),
            ("Access-Control-Max-Age", "86400"),
        ],
        StatusCode::NO_CONTENT,
    )
        .into_response()
}

fn success_body() -> serde_json::Value {
    json!({ "success": true, "message": "Form submitted successfully" })
}
