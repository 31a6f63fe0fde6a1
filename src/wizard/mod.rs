//! The multi-step form wizard: navigation state, the step frame loader,
//! per-step validators and the host that ties them to the form model.

pub mod host;
pub mod loader;
pub mod state;
pub mod validation;

pub use host::WizardHost;
pub use loader::{FrameHost, FrameId, FrameSpec, LoadProgress, RecordingFrameHost, StepLoader};
pub use state::{StepIndicator, StepStatus, WizardState};
pub use validation::{StepValidation, StepValidator, ValidationContext, ValidatorRegistry};

/// Deferred work the wizard schedules on its timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardTimer {
    ContainerRetry { step: u8, retry_count: u32 },
    LoadRetry { step: u8, retry_count: u32 },
    /// Forced navigation armed by a step click during a load.
    PendingNavigation { step: u8 },
}
