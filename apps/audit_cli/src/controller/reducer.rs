//! Wizard state and its transitions.

use shared::{
    domain::{AuditStep, Frame, PersonaId},
    protocol::{AuditResult, ScreenAuditResult},
};
use thiserror::Error;

use super::events::Notification;

pub const SINGLE_AUDIT_FAILED: &str = "Audit failed. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("no persona selected")]
    NoPersona,
    #[error("cannot {action} during the {step:?} step")]
    WrongStep {
        action: &'static str,
        step: AuditStep,
    },
    #[error("a multi-screen audit needs at least one frame")]
    NoFrames,
    #[error("screen index {index} is out of range for {len} frames")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no multi-screen audit in progress")]
    NotMultiScreen,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub step: AuditStep,
    pub selected_persona: Option<PersonaId>,
    pub image_preview: Option<String>,
    pub audit_result: Option<AuditResult>,
    pub is_multi_screen: bool,
    pub frames: Vec<Frame>,
    pub screen_results: Vec<ScreenAuditResult>,
    pub completed_screens: usize,
}

impl WizardState {
    fn expect_step(
        &self,
        expected: AuditStep,
        action: &'static str,
    ) -> Result<(), TransitionError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(TransitionError::WrongStep {
                action,
                step: self.step,
            })
        }
    }

    pub fn select_persona(&mut self, persona: PersonaId) -> Result<(), TransitionError> {
        self.expect_step(AuditStep::Persona, "select a persona")?;
        self.selected_persona = Some(persona);
        self.step = AuditStep::Config;
        Ok(())
    }

    pub fn begin_single(&mut self, preview: impl Into<String>) -> Result<(), TransitionError> {
        self.expect_step(AuditStep::Config, "start an image audit")?;
        if self.selected_persona.is_none() {
            return Err(TransitionError::NoPersona);
        }
        self.is_multi_screen = false;
        self.image_preview = Some(preview.into());
        self.step = AuditStep::Running;
        Ok(())
    }

    /// Lands on results when the audit produced a result, otherwise returns
    /// to configuration with a notification for the user.
    pub fn finish_single(
        &mut self,
        result: Option<AuditResult>,
    ) -> Result<Option<Notification>, TransitionError> {
        self.expect_step(AuditStep::Running, "finish an image audit")?;
        match result {
            Some(result) => {
                self.audit_result = Some(result);
                self.step = AuditStep::Results;
                Ok(None)
            }
            None => {
                self.step = AuditStep::Config;
                Ok(Some(Notification::error(SINGLE_AUDIT_FAILED)))
            }
        }
    }

    /// Pre-populates one loading slot per frame and jumps straight to results.
    pub fn begin_multi(&mut self, frames: Vec<Frame>) -> Result<(), TransitionError> {
        self.expect_step(AuditStep::Config, "start a multi-screen audit")?;
        if self.selected_persona.is_none() {
            return Err(TransitionError::NoPersona);
        }
        if frames.is_empty() {
            return Err(TransitionError::NoFrames);
        }
        self.is_multi_screen = true;
        self.screen_results = frames.iter().map(ScreenAuditResult::pending).collect();
        self.frames = frames;
        self.completed_screens = 0;
        self.step = AuditStep::Results;
        Ok(())
    }

    pub fn apply_screen_result(
        &mut self,
        index: usize,
        result: ScreenAuditResult,
    ) -> Result<(), TransitionError> {
        if !self.is_multi_screen {
            return Err(TransitionError::NotMultiScreen);
        }
        let len = self.screen_results.len();
        let slot = self
            .screen_results
            .get_mut(index)
            .ok_or(TransitionError::IndexOutOfRange { index, len })?;
        *slot = ScreenAuditResult {
            is_loading: false,
            ..result
        };
        self.completed_screens += 1;
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), TransitionError> {
        self.expect_step(AuditStep::Config, "go back")?;
        self.selected_persona = None;
        self.step = AuditStep::Persona;
        Ok(())
    }

    pub fn restart(&mut self) {
        *self = Self::default();
    }

    pub fn progress(&self) -> (usize, usize) {
        (self.completed_screens, self.frames.len())
    }

    pub fn all_screens_done(&self) -> bool {
        self.is_multi_screen && self.screen_results.iter().all(|screen| !screen.is_loading)
    }
}

#[cfg(test)]
#[path = "../tests/reducer_tests.rs"]
mod tests;
