use crate::config::FetchConfig;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

const BODY_EXCERPT_CHARS: usize = 500;

/// Why a single window was abandoned. Never fatal to the run.
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// One page of hits plus the backend's total for the whole window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub total: u64,
    pub hits: Vec<Value>,
}

impl SearchPage {
    /// Read a response body in either the proxied (`rawResponse.hits`) or
    /// direct (`hits`) shape. `total` may be `{"value": n}` or a bare number.
    pub fn from_response(body: &Value) -> Result<Self, WindowError> {
        if !body.is_object() {
            return Err(WindowError::Malformed("response is not a JSON object".to_string()));
        }

        let hits = match body.get("rawResponse") {
            Some(raw) => raw
                .get("hits")
                .ok_or_else(|| WindowError::Malformed("rawResponse has no hits".to_string()))?,
            None => body.get("hits").unwrap_or(&Value::Null),
        };

        let total = match hits.get("total") {
            Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
            Some(other) => other.as_u64().unwrap_or(0),
            None => 0,
        };

        let hits = hits
            .get("hits")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(Self { total, hits })
    }
}

/// A search endpoint that answers one query at a time.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &Value) -> Result<SearchPage, WindowError>;
}

/// The proxied search endpoint, reached with basic auth.
#[derive(Debug)]
pub struct HttpSearchBackend {
    client: reqwest::Client,
    endpoint: String,
    username: String,
    password: String,
}

impl HttpSearchBackend {
    pub fn new(config: &FetchConfig, username: &str, password: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, query: &Value) -> Result<SearchPage, WindowError> {
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .header("kbn-xsrf", "true")
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WindowError::Status {
                status: status.as_u16(),
                body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| WindowError::Malformed(e.to_string()))?;
        SearchPage::from_response(&body)
    }
}
