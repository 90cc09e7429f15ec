use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{
    error::{AuditError, ErrorBody},
    protocol::{AuditRequest, AuditResult},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_FUNCTION_NAME: &str = "audit-design";

/// Invokes the remote audit function once per request.
#[async_trait]
pub trait AuditBackend: Send + Sync {
    async fn invoke(&self, request: &AuditRequest) -> Result<AuditResult, AuditError>;
}

#[async_trait]
impl<T: AuditBackend + ?Sized> AuditBackend for Arc<T> {
    async fn invoke(&self, request: &AuditRequest) -> Result<AuditResult, AuditError> {
        (**self).invoke(request).await
    }
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid functions url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("functions url '{0}' cannot carry a function path")]
    NotABase(String),
    #[error("function name must not be empty")]
    EmptyFunctionName,
}

pub struct HttpAuditBackend {
    http: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpAuditBackend {
    pub fn new(
        functions_url: &str,
        function_name: &str,
        api_key: Option<String>,
    ) -> Result<Self, EndpointError> {
        Ok(Self {
            http: Client::new(),
            endpoint: function_endpoint(functions_url, function_name)?,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

pub(crate) fn function_endpoint(
    functions_url: &str,
    function_name: &str,
) -> Result<Url, EndpointError> {
    let function_name = function_name.trim().trim_matches('/');
    if function_name.is_empty() {
        return Err(EndpointError::EmptyFunctionName);
    }

    let raw = functions_url.trim();
    let mut endpoint = Url::parse(raw).map_err(|source| EndpointError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    endpoint
        .path_segments_mut()
        .map_err(|_| EndpointError::NotABase(raw.to_string()))?
        .pop_if_empty()
        .push(function_name);
    Ok(endpoint)
}

#[async_trait]
impl AuditBackend for HttpAuditBackend {
    async fn invoke(&self, request: &AuditRequest) -> Result<AuditResult, AuditError> {
        let mut builder = self.http.post(self.endpoint.clone()).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key).header("apikey", key);
        }

        debug!(
            endpoint = %self.endpoint,
            persona = %request.persona_id(),
            screen = request.screen_name().unwrap_or("-"),
            "invoking audit function"
        );
        let response = builder
            .send()
            .await
            .map_err(|e| AuditError::transport(format!("failed to reach audit function: {e}")))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AuditError::transport(format!("failed to read audit response: {e}")))?;

        if !status.is_success() {
            if let Ok(ErrorBody { error }) = serde_json::from_slice::<ErrorBody>(&body) {
                return Err(AuditError::application(error));
            }
            return Err(AuditError::transport(format!(
                "audit function returned status {status}"
            )));
        }

        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            AuditError::transport(format!("audit function returned malformed JSON: {e}"))
        })?;
        Ok(AuditResult(value))
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
