use crate::sanity::QueryFailure;
use crate::state::AppState;
use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Forwards one GROQ query to the configured dataset and relays the result.
///
/// The `query` key of the query string holds the query expression; every
/// other key is passed through as a bind variable. All failures from the
/// remote call are converted to a structured JSON response here, so the
/// caller always gets a well-formed body with the JSON content type.
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Response {
    // Lenient parse of the raw query string: malformed percent-encoding
    // degrades to literal text instead of an extractor rejection, so every
    // inbound request gets a JSON response.
    let mut params: HashMap<String, String> =
        form_urlencoded::parse(raw.as_deref().unwrap_or("").as_bytes())
            .into_owned()
            .collect();
    let query = params.remove("query").unwrap_or_default();
    // The reserved key stays in the map as an absent marker so the query
    // text is never re-passed as a bind variable.
    let mut bind: BTreeMap<String, Option<String>> =
        params.into_iter().map(|(k, v)| (k, Some(v))).collect();
    bind.insert("query".to_string(), None);

    debug!(%query, "Received query request");

    // The query text is forwarded as-is; access control for this endpoint
    // belongs to whatever sits in front of the proxy.
    match state.sanity.fetch(&query, &bind).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(QueryFailure { status, body }) => {
            let status = status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body =
                body.unwrap_or_else(|| json!({ "error": "Unknown error occurred" }).to_string());
            warn!(%status, "Upstream query failed");
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
    }
}
