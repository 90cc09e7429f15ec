use std::fmt::Write as _;

use shared::{
    domain::{AuditConfig, AuditStep, Persona, PersonaId},
    protocol::{AuditResult, ScreenAuditResult},
};

use crate::controller::{AuditFailure, Notification, NotificationLevel, WizardEvent, WizardState};

pub fn render_personas(personas: &[Persona]) -> String {
    let mut out = String::from("Choose a persona:\n");
    for (i, persona) in personas.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} [{}] - {}",
            i + 1,
            persona.name,
            persona.id,
            persona.focus
        );
    }
    out
}

pub fn render_config(persona: &PersonaId, config: &AuditConfig) -> String {
    let purpose = if config.purpose.trim().is_empty() {
        "(not specified)"
    } else {
        config.purpose.as_str()
    };
    format!(
        "Persona: {persona}\nFidelity: {}\nPurpose: {purpose}",
        config.fidelity
    )
}

pub fn render_result(result: &AuditResult) -> String {
    serde_json::to_string_pretty(result.as_value())
        .unwrap_or_else(|_| result.as_value().to_string())
}

fn render_notification(notification: &Notification) -> String {
    let prefix = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Error => "error",
    };
    match &notification.detail {
        Some(detail) => {
            let failure = AuditFailure::from_message(detail.as_str());
            format!(
                "{prefix}: {} ({})\n  {}",
                notification.message,
                failure.message(),
                failure.hint()
            )
        }
        None => format!("{prefix}: {}", notification.message),
    }
}

pub fn render_screen_line(screen: &ScreenAuditResult) -> String {
    if screen.is_loading {
        format!("{}: pending", screen.screen_name)
    } else if let Some(error) = &screen.error {
        format!("{}: failed - {error}", screen.screen_name)
    } else {
        format!("{}: done", screen.screen_name)
    }
}

pub fn render_event(event: &WizardEvent) -> Option<String> {
    match event {
        WizardEvent::StepChanged(AuditStep::Running) => Some("Running audit...".to_string()),
        WizardEvent::StepChanged(_) => None,
        WizardEvent::AuditStarted { persona, screens } => Some(match screens {
            1 => format!("Auditing 1 screen as {persona}"),
            n => format!("Auditing {n} screens as {persona}, one at a time"),
        }),
        WizardEvent::ScreenCompleted {
            screen,
            completed,
            total,
            ..
        } => Some(format!("[{completed}/{total}] {}", render_screen_line(screen))),
        WizardEvent::SingleResultReady(result) => Some(render_result(result)),
        WizardEvent::Notification(notification) => Some(render_notification(notification)),
    }
}

/// Results view for a finished multi-screen audit.
pub fn render_multi_results(state: &WizardState) -> String {
    let (completed, total) = state.progress();
    let mut out = format!("Screens audited: {completed}/{total}\n");
    for (i, screen) in state.screen_results.iter().enumerate() {
        let _ = writeln!(out, "\n## {}. {}", i + 1, render_screen_line(screen));
        let _ = writeln!(out, "image: {}", screen.screen_image_url);
        if let Some(result) = &screen.result {
            let _ = writeln!(out, "{}", render_result(result));
        }
    }
    out
}
