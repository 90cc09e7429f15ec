//! Dispatches user actions to the wizard state and the audit session.

use client_core::{AuditBackend, AuditSession, EncodedImage};
use shared::{
    domain::{AuditConfig, AuditStep, Frame, PersonaId},
    protocol::AuditResult,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::{
    events::{Notification, WizardEvent},
    reducer::{TransitionError, WizardState},
};

pub struct WizardController<B> {
    state: WizardState,
    session: AuditSession<B>,
    events: UnboundedSender<WizardEvent>,
}

impl<B: AuditBackend> WizardController<B> {
    pub fn new(session: AuditSession<B>, events: UnboundedSender<WizardEvent>) -> Self {
        Self {
            state: WizardState::default(),
            session,
            events,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    fn emit(&self, event: WizardEvent) {
        emit(&self.events, event);
    }

    pub fn select_persona(&mut self, persona: PersonaId) -> Result<(), TransitionError> {
        self.state.select_persona(persona)?;
        self.emit(WizardEvent::StepChanged(AuditStep::Config));
        Ok(())
    }

    /// Runs a single-image audit. Returns the result, or `None` after
    /// falling back to the config step with a notification.
    pub async fn start_single(
        &mut self,
        config: &AuditConfig,
        image: &EncodedImage,
    ) -> Result<Option<AuditResult>, TransitionError> {
        let persona = self
            .state
            .selected_persona
            .clone()
            .ok_or(TransitionError::NoPersona)?;
        self.state.begin_single(image.preview.clone())?;
        self.emit(WizardEvent::StepChanged(AuditStep::Running));
        self.emit(WizardEvent::AuditStarted {
            persona: persona.clone(),
            screens: 1,
        });

        let result = self
            .session
            .run_audit(&image.data_url, &persona, config)
            .await;

        if let Some(notification) = self.state.finish_single(result.clone())? {
            self.emit(WizardEvent::Notification(
                notification.with_detail(self.session.error()),
            ));
        }
        if let Some(result) = &result {
            self.emit(WizardEvent::SingleResultReady(result.clone()));
        }
        self.emit(WizardEvent::StepChanged(self.state.step));
        Ok(result)
    }

    /// Runs a multi-frame audit, filling the pre-populated result slots one
    /// by one as each frame's call resolves.
    pub async fn start_frames(
        &mut self,
        config: &AuditConfig,
        frames: Vec<Frame>,
    ) -> Result<(), TransitionError> {
        let persona = self
            .state
            .selected_persona
            .clone()
            .ok_or(TransitionError::NoPersona)?;
        self.state.begin_multi(frames)?;
        self.emit(WizardEvent::StepChanged(AuditStep::Results));
        self.emit(WizardEvent::AuditStarted {
            persona: persona.clone(),
            screens: self.state.frames.len(),
        });

        let frames = self.state.frames.clone();
        let Self {
            state,
            session,
            events,
        } = self;
        session
            .run_multi_screen_audit(&frames, &persona, config, |index, screen| {
                match state.apply_screen_result(index, screen.clone()) {
                    Ok(()) => {
                        let (completed, total) = state.progress();
                        emit(
                            events,
                            WizardEvent::ScreenCompleted {
                                index,
                                screen,
                                completed,
                                total,
                            },
                        );
                    }
                    Err(err) => warn!(index, error = %err, "dropping screen result"),
                }
            })
            .await;

        let failed = self
            .state
            .screen_results
            .iter()
            .filter(|screen| screen.error.is_some())
            .count();
        let total = self.state.frames.len();
        let notification = if failed > 0 {
            Notification::error(format!("{failed} of {total} screens could not be audited"))
        } else {
            Notification::info(format!("All {total} screens audited"))
        };
        self.emit(WizardEvent::Notification(notification));
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), TransitionError> {
        self.state.back()?;
        self.emit(WizardEvent::StepChanged(AuditStep::Persona));
        Ok(())
    }

    pub fn restart(&mut self) {
        self.state.restart();
        self.emit(WizardEvent::StepChanged(AuditStep::Persona));
    }
}

fn emit(events: &UnboundedSender<WizardEvent>, event: WizardEvent) {
    if events.send(event).is_err() {
        debug!("wizard event receiver dropped");
    }
}

#[cfg(test)]
#[path = "../tests/orchestration_tests.rs"]
mod tests;
