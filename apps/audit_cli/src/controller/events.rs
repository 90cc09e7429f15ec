//! Events emitted by the wizard controller and user-facing failure modeling.

use shared::{
    domain::{AuditStep, PersonaId},
    protocol::{AuditResult, ScreenAuditResult},
};

#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    StepChanged(AuditStep),
    AuditStarted {
        persona: PersonaId,
        screens: usize,
    },
    ScreenCompleted {
        index: usize,
        screen: ScreenAuditResult,
        completed: usize,
        total: usize,
    },
    SingleResultReady(AuditResult),
    Notification(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Transient message shown to the user once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub detail: Option<String>,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
            detail: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: Option<&str>) -> Self {
        self.detail = detail.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Auth,
    Transport,
    Application,
}

/// An audit error message classified so the user can be pointed at a fix.
#[derive(Debug, Clone)]
pub struct AuditFailure {
    category: FailureCategory,
    message: String,
}

impl AuditFailure {
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("forbidden")
            || lower.contains("invalid jwt")
            || lower.contains("api key")
        {
            FailureCategory::Auth
        } else if lower.contains("failed to reach")
            || lower.contains("connection")
            || lower.contains("timed out")
            || lower.contains("dns")
            || lower.contains("returned status")
            || lower.contains("malformed json")
        {
            FailureCategory::Transport
        } else {
            FailureCategory::Application
        };

        Self { category, message }
    }

    pub fn category(&self) -> FailureCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hint(&self) -> &'static str {
        match self.category {
            FailureCategory::Auth => "Check the API key (AUDIT_API_KEY or --api-key).",
            FailureCategory::Transport => {
                "Audit service unreachable; check the functions URL and network, then retry."
            }
            FailureCategory::Application => "The audit service rejected this request.",
        }
    }
}
