//! Bearer-token-authenticated HTTP client for the external tweet
//! verification middleware.

use shared_types::errors::PocwError;
use std::time::Duration;

/// Thin wrapper over `reqwest::Client` carrying the middleware's base URL
/// and API key.
#[derive(Clone)]
pub struct MiddlewareClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MiddlewareClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builder should not fail on static config");
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn post_json<B: serde::Serialize, R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, PocwError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        handle_response(response).await
    }

    pub async fn get_json<R: serde::de::DeserializeOwned>(&self, path: &str) -> Result<R, PocwError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        handle_response(response).await
    }
}

async fn handle_response<R: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<R, PocwError> {
    let status = response.status();

    if status.is_success() {
        return response
            .json::<R>()
            .await
            .map_err(|e| PocwError::Internal(format!("malformed middleware response: {e}")));
    }

    if status.as_u16() == 429 {
        tracing::warn!(%status, "middleware rate limited, caller should back off and retry");
        return Err(PocwError::TransientUpstream("middleware rate limited (429)".into()));
    }

    if status.is_client_error() {
        tracing::warn!(%status, "middleware rejected request as malformed, not retrying");
        return Err(PocwError::PermanentUpstream(format!(
            "middleware returned {status}"
        )));
    }

    tracing::warn!(%status, "middleware returned a server error, caller may retry");
    Err(PocwError::TransientUpstream(format!(
        "middleware returned {status}"
    )))
}

fn classify_transport_error(error: &reqwest::Error) -> PocwError {
    if error.is_timeout() || error.is_connect() {
        tracing::debug!(error = %error, "middleware transport error, treating as transient");
        PocwError::TransientUpstream(error.to_string())
    } else {
        tracing::error!(error = %error, "unclassified middleware transport failure");
        PocwError::Internal(error.to_string())
    }
}
