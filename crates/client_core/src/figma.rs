use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use shared::domain::Frame;
use thiserror::Error;
use tracing::info;
use url::Url;

pub const DEFAULT_FIGMA_API_URL: &str = "https://api.figma.com";

#[derive(Debug, Error)]
pub enum FigmaError {
    #[error("figma request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid figma api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("figma export failed: {0}")]
    Api(String),
    #[error("figma returned no rendered image for node {0}")]
    MissingImage(String),
    #[error("no frame nodes requested")]
    NoNodes,
}

#[derive(Debug, Deserialize)]
struct NodesResponse {
    #[serde(default)]
    nodes: HashMap<String, Option<NodeEntry>>,
}

#[derive(Debug, Deserialize)]
struct NodeEntry {
    document: NodeDocument,
}

#[derive(Debug, Deserialize)]
struct NodeDocument {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    err: Option<String>,
    #[serde(default)]
    images: HashMap<String, Option<String>>,
}

/// Exports Figma frames as rendered PNG URLs ready for a multi-frame audit.
pub struct FigmaClient {
    http: Client,
    api_url: Url,
    token: String,
}

impl FigmaClient {
    pub fn new(api_url: &str, token: impl Into<String>) -> Result<Self, FigmaError> {
        let mut api_url = Url::parse(api_url.trim())?;
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            api_url,
            token: token.into(),
        })
    }

    pub async fn export_frames(
        &self,
        file_key: &str,
        node_ids: &[String],
    ) -> Result<Vec<Frame>, FigmaError> {
        if node_ids.is_empty() {
            return Err(FigmaError::NoNodes);
        }
        let ids = node_ids.join(",");

        let nodes: NodesResponse = self
            .http
            .get(self.api_url.join(&format!("v1/files/{file_key}/nodes"))?)
            .query(&[("ids", ids.as_str())])
            .header("X-Figma-Token", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let response = self
            .http
            .get(self.api_url.join(&format!("v1/images/{file_key}"))?)
            .query(&[("ids", ids.as_str()), ("format", "png")])
            .header("X-Figma-Token", &self.token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ImagesResponse>(&body)
                .ok()
                .and_then(|envelope| envelope.err)
                .filter(|err| !err.is_empty())
                .unwrap_or_else(|| format!("images endpoint returned status {status}"));
            return Err(FigmaError::Api(message));
        }
        let images: ImagesResponse = response.json().await?;
        if let Some(err) = images.err.filter(|err| !err.is_empty()) {
            return Err(FigmaError::Api(err));
        }

        let frames = node_ids
            .iter()
            .map(|id| {
                let image_url = images
                    .images
                    .get(id)
                    .cloned()
                    .flatten()
                    .ok_or_else(|| FigmaError::MissingImage(id.clone()))?;
                let name = nodes
                    .nodes
                    .get(id)
                    .and_then(Option::as_ref)
                    .map(|entry| entry.document.name.trim())
                    .filter(|name| !name.is_empty())
                    .unwrap_or(id)
                    .to_string();
                Ok(Frame::new(name, image_url))
            })
            .collect::<Result<Vec<_>, FigmaError>>()?;

        info!(file_key, frames = frames.len(), "exported figma frames");
        Ok(frames)
    }
}

#[cfg(test)]
#[path = "tests/figma_tests.rs"]
mod tests;
