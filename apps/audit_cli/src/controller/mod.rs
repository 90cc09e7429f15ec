//! Controller layer: wizard state transitions, events for the renderer, and
//! orchestration of audit runs.

pub mod events;
pub mod orchestration;
pub mod reducer;

pub use events::{AuditFailure, Notification, NotificationLevel, WizardEvent};
pub use orchestration::WizardController;
pub use reducer::WizardState;
