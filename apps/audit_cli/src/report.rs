use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    domain::{AuditConfig, Frame, PersonaId},
    protocol::ScreenAuditResult,
};

use crate::controller::WizardState;

/// JSON report written by `--output`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub persona: PersonaId,
    pub config: AuditConfig,
    pub generated_at: DateTime<Utc>,
    pub screens: Vec<ScreenAuditResult>,
}

impl AuditReport {
    /// Builds a report from a wizard that reached the results step.
    pub fn from_state(state: &WizardState, config: &AuditConfig) -> Option<Self> {
        let persona = state.selected_persona.clone()?;
        let screens = if state.is_multi_screen {
            state.screen_results.clone()
        } else {
            let result = state.audit_result.clone()?;
            let preview = state.image_preview.clone().unwrap_or_default();
            let name = Path::new(&preview)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| preview.clone());
            vec![ScreenAuditResult::completed(&Frame::new(name, preview), result)]
        };

        Some(Self {
            persona,
            config: config.clone(),
            generated_at: Utc::now(),
            screens,
        })
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report '{}'", path.display()))
    }
}
