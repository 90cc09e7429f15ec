use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{AuditConfig, Fidelity, Frame, PersonaId};

/// JSON body for a single `audit-design` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditRequest {
    Image(ImageAuditRequest),
    Frame(FrameAuditRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAuditRequest {
    pub image_base64: String,
    pub persona_id: PersonaId,
    pub fidelity: Fidelity,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAuditRequest {
    pub image_url: String,
    pub persona_id: PersonaId,
    pub fidelity: Fidelity,
    pub purpose: String,
    pub screen_name: String,
}

impl AuditRequest {
    pub fn image(
        image_base64: impl Into<String>,
        persona: &PersonaId,
        config: &AuditConfig,
    ) -> Self {
        Self::Image(ImageAuditRequest {
            image_base64: image_base64.into(),
            persona_id: persona.clone(),
            fidelity: config.fidelity,
            purpose: config.purpose.clone(),
        })
    }

    pub fn frame(frame: &Frame, persona: &PersonaId, config: &AuditConfig) -> Self {
        Self::Frame(FrameAuditRequest {
            image_url: frame.image_url.clone(),
            persona_id: persona.clone(),
            fidelity: config.fidelity,
            purpose: config.purpose.clone(),
            screen_name: frame.name.clone(),
        })
    }

    pub fn persona_id(&self) -> &PersonaId {
        match self {
            AuditRequest::Image(req) => &req.persona_id,
            AuditRequest::Frame(req) => &req.persona_id,
        }
    }

    pub fn screen_name(&self) -> Option<&str> {
        match self {
            AuditRequest::Image(_) => None,
            AuditRequest::Frame(req) => Some(&req.screen_name),
        }
    }
}

/// Backend findings for one image. Opaque apart from the embedded error check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditResult(pub Value);

impl AuditResult {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn embedded_error(&self) -> Option<String> {
        match self.0.get("error")? {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(message) if message.is_empty() => None,
            Value::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Per-frame slot of a multi-frame audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenAuditResult {
    pub screen_name: String,
    pub screen_image_url: String,
    pub result: Option<AuditResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub is_loading: bool,
}

impl ScreenAuditResult {
    pub fn pending(frame: &Frame) -> Self {
        Self {
            screen_name: frame.name.clone(),
            screen_image_url: frame.image_url.clone(),
            result: None,
            error: None,
            is_loading: true,
        }
    }

    pub fn completed(frame: &Frame, result: AuditResult) -> Self {
        Self {
            screen_name: frame.name.clone(),
            screen_image_url: frame.image_url.clone(),
            result: Some(result),
            error: None,
            is_loading: false,
        }
    }

    pub fn failed(frame: &Frame, error: impl Into<String>) -> Self {
        Self {
            screen_name: frame.name.clone(),
            screen_image_url: frame.image_url.clone(),
            result: None,
            error: Some(error.into()),
            is_loading: false,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.result.is_some() && self.error.is_none()
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
