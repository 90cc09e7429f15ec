//! Terminal front end: event rendering and the interactive wizard.

pub mod interactive;
pub mod render;

use std::{future::Future, io::Write};

use tokio::sync::mpsc::UnboundedReceiver;

use crate::controller::WizardEvent;

/// Polls `action` to completion while writing wizard events as they arrive,
/// then flushes whatever the action emitted last.
pub async fn drive<F, W>(
    action: F,
    events: &mut UnboundedReceiver<WizardEvent>,
    out: &mut W,
) -> F::Output
where
    F: Future,
    W: Write,
{
    tokio::pin!(action);
    loop {
        tokio::select! {
            biased;
            Some(event) = events.recv() => write_event(out, &event),
            output = &mut action => {
                while let Ok(event) = events.try_recv() {
                    write_event(out, &event);
                }
                return output;
            }
        }
    }
}

fn write_event<W: Write>(out: &mut W, event: &WizardEvent) {
    if let Some(line) = render::render_event(event) {
        if let Err(err) = writeln!(out, "{line}") {
            tracing::warn!(error = %err, "failed to write wizard output");
        }
    }
}
