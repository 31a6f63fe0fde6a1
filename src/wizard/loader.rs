//! Mounts the frame of the current step, with bounded retry.
//!
//! At most one frame is attached at any time. Every mount gets a fresh
//! [`FrameId`]; load and error callbacks for an id that is no longer current
//! are ignored, so a slow frame that was already replaced cannot clear the
//! loading flag of its successor.

use super::WizardTimer;
use super::state::WizardState;
use crate::config::DesignerConfig;
use crate::error::{LoadError, ProtocolError};
use crate::protocol::Message;
use crate::timers::{TimerId, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

/// What the host asks the page to mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub step: u8,
    pub src: String,
    pub height: u32,
}

/// The page-side capabilities the loader needs: a container element that
/// holds the step frame, and a way to talk to that frame.
pub trait FrameHost {
    fn has_container(&self) -> bool;
    fn viewport_height(&self) -> u32;
    /// Attaches a new frame. Load completion is reported later through
    /// [`StepLoader::on_frame_loaded`] or [`StepLoader::on_frame_error`].
    fn mount(&mut self, frame: FrameId, spec: &FrameSpec) -> Result<(), String>;
    fn remove(&mut self, frame: FrameId);
    fn post(&mut self, frame: FrameId, message: &Message) -> Result<(), ProtocolError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveFrame {
    id: FrameId,
    step: u8,
    retry_count: u32,
    loaded: bool,
}

/// Result of a loader call that did not fail terminally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadProgress {
    /// A new frame is attached and waiting for its load callback.
    Mounted(FrameId),
    /// The attempt failed and another one is scheduled.
    RetryScheduled { step: u8, retry_count: u32 },
    /// The current frame finished loading.
    Loaded { step: u8 },
    /// The callback belonged to a frame that is no longer current.
    Stale,
}

#[derive(Debug)]
pub struct StepLoader {
    config: DesignerConfig,
    current: Option<ActiveFrame>,
    next_frame: u64,
    retry_timer: Option<TimerId>,
}

impl StepLoader {
    pub fn new(config: &DesignerConfig) -> Self {
        Self {
            config: config.clone(),
            current: None,
            next_frame: 1,
            retry_timer: None,
        }
    }

    pub fn current_frame(&self) -> Option<FrameId> {
        self.current.map(|f| f.id)
    }

    /// Step of the attached frame, loaded or not.
    pub fn current_step(&self) -> Option<u8> {
        self.current.map(|f| f.step)
    }

    pub fn is_frame_loaded(&self) -> bool {
        self.current.is_some_and(|f| f.loaded)
    }

    /// Starts (or retries) loading `step`.
    ///
    /// Any retry still scheduled for an earlier load is dropped.
    pub fn load(
        &mut self,
        step: u8,
        retry_count: u32,
        host: &mut dyn FrameHost,
        timers: &mut TimerQueue<WizardTimer>,
        state: &mut WizardState,
    ) -> Result<LoadProgress, LoadError> {
        state.is_loading = true;
        if let Some(timer) = self.retry_timer.take() {
            timers.cancel(timer);
        }

        if !host.has_container() {
            if retry_count < self.config.timing.max_retries {
                tracing::debug!(step, retry_count, "step container missing, retrying");
                let next = retry_count + 1;
                self.retry_timer = Some(timers.schedule(
                    self.config.timing.container_retry_delay_ms,
                    WizardTimer::ContainerRetry { step, retry_count: next },
                ));
                return Ok(LoadProgress::RetryScheduled { step, retry_count: next });
            }
            tracing::warn!(step, "step container missing, giving up");
            state.is_loading = false;
            return Err(LoadError::ContainerMissing);
        }

        self.release(host);

        let id = FrameId(self.next_frame);
        self.next_frame += 1;
        let spec = FrameSpec {
            step,
            src: self.config.step_page(step),
            height: self.config.layout.frame_height(host.viewport_height()),
        };
        self.current = Some(ActiveFrame {
            id,
            step,
            retry_count,
            loaded: false,
        });

        match host.mount(id, &spec) {
            Ok(()) => {
                tracing::debug!(step, frame = id.0, src = %spec.src, "mounted step frame");
                Ok(LoadProgress::Mounted(id))
            }
            Err(message) => {
                tracing::debug!(step, frame = id.0, %message, "mounting step frame failed");
                self.fail_current(host, timers, state)
            }
        }
    }

    /// Sends `cleanup` to the attached frame and removes it.
    pub fn release(&mut self, host: &mut dyn FrameHost) {
        if let Some(frame) = self.current.take() {
            if let Err(e) = host.post(frame.id, &Message::Cleanup) {
                tracing::warn!(frame = frame.id.0, error = %e, "cleanup not delivered");
            }
            host.remove(frame.id);
        }
    }

    pub fn on_frame_loaded(&mut self, frame: FrameId, state: &mut WizardState) -> LoadProgress {
        match self.current.as_mut() {
            Some(active) if active.id == frame && !active.loaded => {
                active.loaded = true;
                state.is_loading = false;
                tracing::debug!(step = active.step, frame = frame.0, "step frame loaded");
                LoadProgress::Loaded { step: active.step }
            }
            _ => LoadProgress::Stale,
        }
    }

    pub fn on_frame_error(
        &mut self,
        frame: FrameId,
        host: &mut dyn FrameHost,
        timers: &mut TimerQueue<WizardTimer>,
        state: &mut WizardState,
    ) -> Result<LoadProgress, LoadError> {
        match self.current {
            Some(active) if active.id == frame && !active.loaded => {
                self.fail_current(host, timers, state)
            }
            _ => Ok(LoadProgress::Stale),
        }
    }

    fn fail_current(
        &mut self,
        host: &mut dyn FrameHost,
        timers: &mut TimerQueue<WizardTimer>,
        state: &mut WizardState,
    ) -> Result<LoadProgress, LoadError> {
        let Some(failed) = self.current.take() else {
            return Ok(LoadProgress::Stale);
        };
        host.remove(failed.id);

        if failed.retry_count < self.config.timing.max_retries {
            let next = failed.retry_count + 1;
            tracing::debug!(step = failed.step, retry_count = next, "step frame failed, retrying");
            self.retry_timer = Some(timers.schedule(
                self.config.timing.load_retry_delay_ms,
                WizardTimer::LoadRetry {
                    step: failed.step,
                    retry_count: next,
                },
            ));
            return Ok(LoadProgress::RetryScheduled {
                step: failed.step,
                retry_count: next,
            });
        }

        state.is_loading = false;
        let attempts = failed.retry_count + 1;
        tracing::warn!(step = failed.step, attempts, "step frame failed, retries exhausted");
        Err(LoadError::RetriesExhausted {
            step: failed.step,
            attempts,
        })
    }
}

/// A `FrameHost` that records what it was asked to do.
///
/// Mounts succeed unless failures were queued with
/// [`RecordingFrameHost::fail_next_mounts`]; load callbacks are driven by the
/// caller.
#[derive(Debug, Clone)]
pub struct RecordingFrameHost {
    container: bool,
    viewport_height: u32,
    attached: Vec<(FrameId, FrameSpec)>,
    mounted: Vec<FrameSpec>,
    removed: Vec<FrameId>,
    sent: Vec<(FrameId, Message)>,
    failing_mounts: u32,
}

impl Default for RecordingFrameHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingFrameHost {
    pub fn new() -> Self {
        Self {
            container: true,
            viewport_height: 900,
            attached: Vec::new(),
            mounted: Vec::new(),
            removed: Vec::new(),
            sent: Vec::new(),
            failing_mounts: 0,
        }
    }

    pub fn with_viewport_height(mut self, height: u32) -> Self {
        self.viewport_height = height;
        self
    }

    pub fn set_container(&mut self, present: bool) {
        self.container = present;
    }

    pub fn fail_next_mounts(&mut self, count: u32) {
        self.failing_mounts = count;
    }

    /// Frames currently in the container.
    pub fn attached(&self) -> &[(FrameId, FrameSpec)] {
        &self.attached
    }

    /// Every frame ever mounted, including failed ones.
    pub fn mounted(&self) -> &[FrameSpec] {
        &self.mounted
    }

    pub fn removed(&self) -> &[FrameId] {
        &self.removed
    }

    pub fn sent(&self) -> &[(FrameId, Message)] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<(FrameId, Message)> {
        std::mem::take(&mut self.sent)
    }
}

impl FrameHost for RecordingFrameHost {
    fn has_container(&self) -> bool {
        self.container
    }

    fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    fn mount(&mut self, frame: FrameId, spec: &FrameSpec) -> Result<(), String> {
        self.mounted.push(spec.clone());
        if self.failing_mounts > 0 {
            self.failing_mounts -= 1;
            return Err(format!("could not create frame for {}", spec.src));
        }
        self.attached.push((frame, spec.clone()));
        Ok(())
    }

    fn remove(&mut self, frame: FrameId) {
        self.attached.retain(|(id, _)| *id != frame);
        self.removed.push(frame);
    }

    fn post(&mut self, frame: FrameId, message: &Message) -> Result<(), ProtocolError> {
        if !self.attached.iter().any(|(id, _)| *id == frame) {
            return Err(ProtocolError::PortClosed(format!("frame {} is not attached", frame.0)));
        }
        self.sent.push((frame, message.clone()));
        Ok(())
    }
}
