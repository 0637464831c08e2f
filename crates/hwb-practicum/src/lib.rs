//! Practicum homework API adapter (reqwest).
//!
//! Implements the `hwb-core` `HomeworkApi` port over the homework-statuses
//! HTTP endpoint. Failures are classified before they leave this crate:
//! transport (including timeouts), non-200 status, undecodable body.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use hwb_core::{config::Config, errors::Error, ports::HomeworkApi, Result};

#[derive(Serialize)]
struct StatusQuery {
    from_date: i64,
}

#[derive(Clone)]
pub struct PracticumClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        // The timeout keeps a stalled poll from blocking the loop forever;
        // hitting it surfaces as Error::Transport like any other I/O failure.
        let http = reqwest::Client::builder()
            .timeout(cfg.http_timeout)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            token: cfg.practicum_token.clone(),
        })
    }
}

/// The API rejects `from_date=0`; fall back to the current time, matching
/// a fresh start.
fn effective_from_date(since: i64) -> i64 {
    if since > 0 {
        since
    } else {
        Utc::now().timestamp()
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, since: i64) -> Result<Value> {
        let query = StatusQuery {
            from_date: effective_from_date(since),
        };

        let response = self
            .http
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                let err = Error::Transport(e.to_string());
                error!("homework API request failed: {err}");
                err
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let err = Error::EndpointUnavailable {
                status: status.as_u16(),
            };
            error!("{err}");
            return Err(err);
        }

        response.json::<Value>().await.map_err(|e| {
            let err = Error::MalformedResponse(e.to_string());
            error!("{err}");
            err
        })
    }
}
