use shared::{
    domain::{AuditConfig, Frame, PersonaId},
    error::AuditError,
    protocol::{AuditRequest, AuditResult, ScreenAuditResult},
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::backend::AuditBackend;

/// Audit client state: the last single-image result and error, plus a
/// loading flag covering both single and multi-frame runs.
pub struct AuditSession<B> {
    backend: B,
    is_loading: bool,
    error: Option<String>,
    result: Option<AuditResult>,
}

impl<B: AuditBackend> AuditSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            is_loading: false,
            error: None,
            result: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&AuditResult> {
        self.result.as_ref()
    }

    /// Audits one image. Returns `None` and records the error message when
    /// the call fails or the backend answers with an `error` field.
    pub async fn run_audit(
        &mut self,
        image_base64: &str,
        persona: &PersonaId,
        config: &AuditConfig,
    ) -> Option<AuditResult> {
        self.is_loading = true;
        self.error = None;
        self.result = None;

        let request = AuditRequest::image(image_base64, persona, config);
        let outcome = invoke_checked(&self.backend, &request).await;
        self.is_loading = false;

        match outcome {
            Ok(result) => {
                info!(persona = %persona, fidelity = %config.fidelity, "audit completed");
                self.result = Some(result.clone());
                Some(result)
            }
            Err(err) => {
                error!(persona = %persona, error = %err, "audit failed");
                self.error = Some(err.message().to_string());
                None
            }
        }
    }

    /// Audits frames one at a time, reporting every frame's outcome through
    /// `on_screen_complete` as soon as its call resolves. A failed frame is
    /// reported and the run moves on to the next one.
    pub async fn run_multi_screen_audit<F>(
        &mut self,
        frames: &[Frame],
        persona: &PersonaId,
        config: &AuditConfig,
        mut on_screen_complete: F,
    ) where
        F: FnMut(usize, ScreenAuditResult),
    {
        self.is_loading = true;
        self.error = None;

        let run_id = Uuid::new_v4();
        info!(%run_id, persona = %persona, frames = frames.len(), "starting multi-screen audit");

        let mut failures = 0usize;
        for (index, frame) in frames.iter().enumerate() {
            let request = AuditRequest::frame(frame, persona, config);
            let screen = match invoke_checked(&self.backend, &request).await {
                Ok(result) => {
                    info!(%run_id, index, screen = %frame.name, "screen audit completed");
                    ScreenAuditResult::completed(frame, result)
                }
                Err(err) => {
                    failures += 1;
                    warn!(
                        %run_id,
                        index,
                        screen = %frame.name,
                        error = %err,
                        "screen audit failed"
                    );
                    ScreenAuditResult::failed(frame, err.message())
                }
            };
            on_screen_complete(index, screen);
        }

        self.is_loading = false;
        info!(%run_id, frames = frames.len(), failures, "multi-screen audit finished");
    }
}

async fn invoke_checked<B: AuditBackend + ?Sized>(
    backend: &B,
    request: &AuditRequest,
) -> Result<AuditResult, AuditError> {
    let result = backend.invoke(request).await?;
    match result.embedded_error() {
        Some(message) => Err(AuditError::embedded(message)),
        None => Ok(result),
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
