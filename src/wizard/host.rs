use super::WizardTimer;
use super::loader::{FrameHost, FrameId, LoadProgress, StepLoader};
use super::state::WizardState;
use super::validation::{StepValidation, ValidationContext, ValidatorRegistry};
use crate::config::DesignerConfig;
use crate::error::{LoadError, WizardError};
use crate::model::FormModel;
use crate::notice::{NoticeBoard, NoticeKind};
use crate::protocol::Message;
use crate::timers::{TimerId, TimerQueue};
use ahash::AHashMap;
use serde_json::Value;

/// The parent page of the form wizard.
///
/// Owns the form model, the navigation state and the single step frame, and
/// dispatches every message the frame posts. All methods run to completion;
/// deferred work (retries, forced navigation) sits on an internal timer queue
/// that the embedder drives with [`WizardHost::advance`].
pub struct WizardHost<H: FrameHost> {
    config: DesignerConfig,
    state: WizardState,
    model: FormModel,
    loader: StepLoader,
    timers: TimerQueue<WizardTimer>,
    notices: NoticeBoard,
    validators: ValidatorRegistry,
    frames: H,
    pending_timer: Option<TimerId>,
    frame_reports: AHashMap<u8, StepValidation>,
    awaiting_report: Option<u8>,
    last_saved: Option<String>,
}

impl<H: FrameHost> WizardHost<H> {
    pub fn new(frames: H) -> Self {
        Self::with_config(DesignerConfig::default(), frames)
    }

    pub fn with_config(config: DesignerConfig, frames: H) -> Self {
        Self {
            state: WizardState::new(config.total_steps),
            model: FormModel::default(),
            loader: StepLoader::new(&config),
            timers: TimerQueue::new(),
            notices: NoticeBoard::new(config.timing.notice_duration_ms),
            validators: ValidatorRegistry::default(),
            frames,
            pending_timer: None,
            frame_reports: AHashMap::new(),
            awaiting_report: None,
            last_saved: None,
            config,
        }
    }

    pub fn with_validators(mut self, validators: ValidatorRegistry) -> Self {
        self.validators = validators;
        self
    }

    pub fn with_model(mut self, model: FormModel) -> Self {
        self.model = model;
        self
    }

    /// Loads the first step.
    pub fn start(&mut self) -> Result<(), WizardError> {
        self.go_to_step(1)
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> u8 {
        self.state.current_step()
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut FormModel {
        &mut self.model
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn frames(&self) -> &H {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut H {
        &mut self.frames
    }

    pub fn current_frame(&self) -> Option<FrameId> {
        self.loader.current_frame()
    }

    /// Virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    pub fn has_pending_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn last_saved(&self) -> Option<&str> {
        self.last_saved.as_deref()
    }

    fn show(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let now = self.timers.now();
        self.notices.show(kind, message, now);
    }

    fn post_to_frame(&mut self, message: &Message) -> bool {
        let Some(frame) = self.loader.current_frame() else {
            tracing::debug!(message_type = message.kind(), "no step frame to post to");
            return false;
        };
        match self.frames.post(frame, message) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(frame = frame.0, message_type = message.kind(), error = %e, "message not delivered");
                false
            }
        }
    }

    /// Posts `validate` to the step frame. Its `validation_result` is filed
    /// under that frame's step even if it arrives after the host moved on,
    /// as long as the next frame has not finished loading.
    pub fn request_frame_validation(&mut self) {
        let Some(step) = self.loader.current_step() else {
            return;
        };
        if self.post_to_frame(&Message::Validate) {
            self.awaiting_report = Some(step);
        }
    }

    /// Decodes and dispatches a raw message received from the step frame.
    /// Malformed or unknown messages are logged and dropped.
    pub fn handle_raw(&mut self, value: Value) {
        match Message::from_value(value) {
            Ok(message) => self.handle_message(message),
            Err(e) => tracing::debug!(error = %e, "ignoring frame message"),
        }
    }

    pub fn handle_message(&mut self, message: Message) {
        tracing::debug!(message_type = message.kind(), "frame message received");
        match message {
            Message::GetData => {
                if self.model.style.template.is_empty() {
                    self.model.style.template = "default".to_string();
                }
                let reply = Message::form_data(&self.model);
                self.post_to_frame(&reply);
            }
            Message::UpdateData { section, data } => {
                match self.model.apply_section(&section, data) {
                    Ok(()) => tracing::debug!(%section, "model section updated"),
                    Err(e) => tracing::warn!(%section, error = %e, "rejected section update"),
                }
            }
            Message::ValidationResult { is_valid, message } => {
                let step = self
                    .awaiting_report
                    .take()
                    .or(self.loader.current_step())
                    .unwrap_or(self.state.current_step());
                let report = if is_valid {
                    StepValidation::valid()
                } else {
                    StepValidation::invalid(message.unwrap_or_default())
                };
                self.state.mark_validity(step, is_valid);
                self.frame_reports.insert(step, report);
            }
            Message::NextStep => {
                let step = self.state.current_step();
                if step < self.state.total_steps() {
                    self.navigate(step + 1);
                }
            }
            Message::PrevStep => {
                let step = self.state.current_step();
                if step > 1 {
                    self.navigate(step - 1);
                }
            }
            Message::Validate => self.request_frame_validation(),
            Message::FormData { .. } | Message::Cleanup => {
                tracing::debug!("ignoring host-bound message sent by a frame");
            }
        }
    }

    // Range is checked by the callers.
    fn navigate(&mut self, step: u8) {
        if let Err(e) = self.go_to_step(step) {
            tracing::warn!(error = %e, "navigation rejected");
        }
    }

    /// A click on the step indicator bar.
    ///
    /// While a load is in flight the click is queued: the latest click wins
    /// and fires after the pending-navigation timeout unless the load
    /// finishes first.
    pub fn on_step_click(&mut self, step: u8) -> Result<(), WizardError> {
        self.state.check_step(step)?;
        if step == self.state.current_step() {
            return Ok(());
        }
        if !self.state.is_loading {
            return self.go_to_step(step);
        }

        if let Some(timer) = self.pending_timer.take() {
            self.timers.cancel(timer);
        }
        self.state.pending_step_request = Some(step);
        self.pending_timer = Some(self.timers.schedule(
            self.config.timing.pending_navigation_timeout_ms,
            WizardTimer::PendingNavigation { step },
        ));
        tracing::debug!(step, "step click queued behind in-flight load");
        Ok(())
    }

    /// Switches to `step` unconditionally: updates indicators, releases the
    /// old frame and loads the new one.
    pub fn go_to_step(&mut self, step: u8) -> Result<(), WizardError> {
        self.state.check_step(step)?;
        if let Some(timer) = self.pending_timer.take() {
            self.timers.cancel(timer);
        }
        self.state.pending_step_request = None;

        // The leaving frame answers before its cleanup.
        if let Some(leaving) = self.loader.current_step() {
            if leaving != step && self.validators.asks_frame(leaving) {
                self.request_frame_validation();
            }
        }
        let previous = self.state.set_current(step)?;
        tracing::debug!(from = previous, to = step, "switching step");
        self.loader.release(&mut self.frames);
        let result = self
            .loader
            .load(step, 0, &mut self.frames, &mut self.timers, &mut self.state);
        self.after_load(result);
        Ok(())
    }

    fn after_load(&mut self, result: Result<LoadProgress, LoadError>) {
        match result {
            Ok(LoadProgress::Loaded { .. }) => self.resolve_pending(),
            Ok(_) => {}
            Err(e) => {
                self.show(NoticeKind::Error, e.to_string());
                self.resolve_pending();
            }
        }
    }

    // Once loading is over, a queued click does not need to wait for its timer.
    fn resolve_pending(&mut self) {
        let Some(step) = self.state.pending_step_request.take() else {
            return;
        };
        if let Some(timer) = self.pending_timer.take() {
            self.timers.cancel(timer);
        }
        if step != self.state.current_step() {
            self.navigate(step);
        }
    }

    pub fn on_frame_loaded(&mut self, frame: FrameId) {
        let progress = self.loader.on_frame_loaded(frame, &mut self.state);
        if matches!(progress, LoadProgress::Loaded { .. }) {
            self.awaiting_report = None;
        }
        self.after_load(Ok(progress));
    }

    pub fn on_frame_error(&mut self, frame: FrameId) {
        let result =
            self.loader
                .on_frame_error(frame, &mut self.frames, &mut self.timers, &mut self.state);
        self.after_load(result);
    }

    /// Moves the virtual clock forward and runs whatever became due.
    pub fn advance(&mut self, elapsed_ms: u64) {
        let target = self.timers.now() + elapsed_ms;
        // One at a time: a handler may cancel or schedule other timers.
        while self
            .timers
            .next_deadline()
            .is_some_and(|delay| self.timers.now() + delay <= target)
        {
            let Some(event) = self.timers.pop_next() else {
                break;
            };
            self.run_timer(event);
        }
        let remaining = target.saturating_sub(self.timers.now());
        self.timers.advance(remaining);
        self.notices.expire(self.timers.now());
    }

    fn run_timer(&mut self, event: WizardTimer) {
        match event {
            WizardTimer::ContainerRetry { step, retry_count }
            | WizardTimer::LoadRetry { step, retry_count } => {
                let result = self.loader.load(
                    step,
                    retry_count,
                    &mut self.frames,
                    &mut self.timers,
                    &mut self.state,
                );
                self.after_load(result);
            }
            WizardTimer::PendingNavigation { step } => {
                self.pending_timer = None;
                self.state.pending_step_request = None;
                tracing::debug!(step, "forcing queued navigation");
                self.navigate(step);
            }
        }
    }

    /// The forward button: advances, or saves on the last step.
    /// Returns the saved JSON when a save happened.
    pub fn on_next_button(&mut self) -> Result<Option<String>, WizardError> {
        if self.state.is_last() {
            return Ok(self.save_form());
        }
        self.go_to_step(self.state.current_step() + 1)?;
        Ok(None)
    }

    pub fn on_prev_button(&mut self) -> Result<(), WizardError> {
        if self.state.is_first() {
            return Ok(());
        }
        self.go_to_step(self.state.current_step() - 1)
    }

    fn run_validator(&self, step: u8) -> StepValidation {
        let ctx = ValidationContext {
            model: &self.model,
            frame_report: self.frame_reports.get(&step),
        };
        self.validators.validate(step, &ctx)
    }

    /// Runs the current step's validator. Steps whose verdict comes from the
    /// frame also get a fresh `validate`; its answer counts from then on.
    pub fn validate_current_step(&mut self) -> StepValidation {
        let step = self.state.current_step();
        if self.validators.asks_frame(step) {
            self.request_frame_validation();
        }
        let result = self.run_validator(step);
        if let Some(message) = result.error_message.clone().filter(|_| !result.is_valid) {
            self.show(NoticeKind::Error, message);
        }
        result
    }

    /// Runs every step's validator in order. On the first failure shows its
    /// error, navigates to that step and returns `false`.
    pub fn validate_all_steps(&mut self) -> bool {
        for step in 1..=self.state.total_steps() {
            let result = self.run_validator(step);
            if result.is_valid {
                continue;
            }
            tracing::debug!(step, "step failed validation");
            let message = result
                .error_message
                .unwrap_or_else(|| format!("step {} is incomplete", step));
            self.show(NoticeKind::Error, message);
            // A failing current step keeps its frame mounted.
            if step != self.state.current_step() {
                self.navigate(step);
            }
            return false;
        }
        true
    }

    /// Validates all steps and, if they pass, stamps and serializes the model.
    pub fn save_form(&mut self) -> Option<String> {
        if !self.validate_all_steps() {
            return None;
        }
        self.model.update_time = Some(chrono::Utc::now().to_rfc3339());
        let json = self.model.to_json_pretty();
        tracing::info!(title = %self.model.title, fields = self.model.fields.len(), "form saved");
        tracing::debug!(form = %json, "saved form data");
        self.show(NoticeKind::Success, "form saved");
        self.last_saved = Some(json.clone());
        Some(json)
    }
}
