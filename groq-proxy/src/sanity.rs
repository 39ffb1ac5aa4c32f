use crate::config::Config;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Upstream query failure. Both fields are absent for transport-level
/// failures (connection refused, timeout, unparseable success body); both
/// are present when the API itself reported an error.
#[derive(Debug, Default)]
pub struct QueryFailure {
    pub status: Option<StatusCode>,
    pub body: Option<String>,
}

/// Client for the Sanity HTTP query API. Built once at startup and shared
/// read-only across invocations.
pub struct SanityClient {
    http: Client,
    endpoint: Url,
    token: Option<String>,
}

impl SanityClient {
    pub fn from_config(cfg: &Config, http: Client) -> anyhow::Result<Self> {
        // The CDN host cannot serve authenticated reads
        let use_cdn = cfg.use_cdn && cfg.token.is_none();
        let origin = match &cfg.base_url {
            Some(url) => Url::parse(url)
                .map_err(|e| anyhow::anyhow!("Invalid base URL '{}': {}", url, e))?,
            None => {
                let host = if use_cdn { "apicdn.sanity.io" } else { "api.sanity.io" };
                Url::parse(&format!("https://{}.{}", cfg.project_id, host))?
            }
        };
        let endpoint = origin.join(&format!(
            "{}/data/query/{}",
            cfg.api_version, cfg.dataset
        ))?;
        Ok(SanityClient {
            http,
            endpoint,
            token: cfg.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Evaluates one GROQ query against the dataset. Bind variables with an
    /// absent value are not sent; present values are JSON-encoded the way
    /// the hosted API expects (`$key=<json>`).
    pub async fn fetch(
        &self,
        query: &str,
        params: &BTreeMap<String, Option<String>>,
    ) -> Result<Value, QueryFailure> {
        let mut req = self
            .http
            .get(self.endpoint.clone())
            .query(&[("query", query)]);
        for (key, value) in bind_pairs(params) {
            req = req.query(&[(key, value)]);
        }
        if let Some(t) = &self.token {
            req = req.bearer_auth(t);
        }

        let resp = req.send().await.map_err(|e| {
            warn!("Upstream request failed: {}", e);
            QueryFailure::default()
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            warn!("Failed to read upstream response body: {}", e);
            QueryFailure::default()
        })?;

        if !status.is_success() {
            debug!(%status, "Upstream reported an error");
            return Err(QueryFailure {
                status: Some(status),
                body: Some(body),
            });
        }

        let envelope: Value = serde_json::from_str(&body).map_err(|e| {
            warn!("Upstream success body was not valid JSON: {}", e);
            QueryFailure::default()
        })?;
        Ok(envelope.get("result").cloned().unwrap_or(Value::Null))
    }
}

// Encodes bind variables for the query string. Values are JSON-encoded
// (strings arrive quoted at the evaluator); absent markers are dropped.
fn bind_pairs(params: &BTreeMap<String, Option<String>>) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(k, v)| {
            v.as_ref()
                .map(|v| (format!("${}", k), Value::String(v.clone()).to_string()))
        })
        .collect()
}
