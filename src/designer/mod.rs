//! The control designer that runs inside the step-3 frame.
//!
//! It keeps its own copy of the canvas controls, seeds it from the host's
//! `form_data`, pushes every change back with `update_data { section:
//! "controls" }` and mirrors the controls into the session store so a reload
//! can recover them.

use crate::config::DesignerConfig;
use crate::error::ModelError;
use crate::model::{Field, FieldKind, FieldPatch, IdGenerator};
use crate::protocol::{FramePort, Message, send_best_effort};
use crate::render::{CanvasView, RendererRegistry};
use crate::storage::{KeyValueStore, load_json, save_json};
use serde_json::Value;

pub const CONTROLS_SECTION: &str = "controls";

pub struct FieldDesigner<P: FramePort, S: KeyValueStore> {
    parent: P,
    session: S,
    session_key: String,
    controls: Vec<Field>,
    selected: Option<String>,
    ids: IdGenerator,
    renderers: RendererRegistry,
    released: bool,
}

impl<P: FramePort, S: KeyValueStore> FieldDesigner<P, S> {
    pub fn new(parent: P, session: S) -> Self {
        Self::with_config(&DesignerConfig::default(), parent, session)
    }

    pub fn with_config(config: &DesignerConfig, parent: P, session: S) -> Self {
        Self {
            parent,
            session,
            session_key: config.session_key.clone(),
            controls: Vec::new(),
            selected: None,
            ids: IdGenerator::new(),
            renderers: RendererRegistry::default(),
            released: false,
        }
    }

    pub fn with_renderers(mut self, renderers: RendererRegistry) -> Self {
        self.renderers = renderers;
        self
    }

    /// Restores the session cache and asks the host for the model.
    pub fn init(&mut self) {
        match load_json::<Vec<Field>>(&self.session, &self.session_key) {
            Ok(Some(cached)) => {
                tracing::debug!(controls = cached.len(), "restored controls from session");
                self.controls = cached;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable session cache"),
        }
        send_best_effort(&mut self.parent, &Message::GetData);
    }

    pub fn controls(&self) -> &[Field] {
        &self.controls
    }

    pub fn control(&self, control_id: &str) -> Option<&Field> {
        self.controls.iter().find(|c| c.id == control_id)
    }

    pub fn selected(&self) -> Option<&Field> {
        self.selected.as_deref().and_then(|id| self.control(id))
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn parent(&self) -> &P {
        &self.parent
    }

    pub fn parent_mut(&mut self) -> &mut P {
        &mut self.parent
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn handle_raw(&mut self, value: Value) {
        match Message::from_value(value) {
            Ok(message) => self.handle_message(message),
            Err(e) => tracing::debug!(error = %e, "ignoring parent message"),
        }
    }

    pub fn handle_message(&mut self, message: Message) {
        match message {
            Message::FormData { data } => {
                // An empty host copy must not wipe controls recovered from the session.
                if !data.controls.is_empty() {
                    self.controls = data.controls;
                    self.persist();
                }
            }
            Message::Validate => {
                self.validate_step();
            }
            Message::Cleanup => {
                self.selected = None;
                self.released = true;
                tracing::debug!("designer released");
            }
            other => tracing::debug!(message_type = other.kind(), "ignoring parent message"),
        }
    }

    /// Posts `validation_result` followed by the current controls.
    pub fn validate_step(&mut self) -> bool {
        let is_valid = !self.controls.is_empty();
        let message = (!is_valid).then(|| "please add at least one form control".to_string());
        send_best_effort(
            &mut self.parent,
            &Message::validation_result(is_valid, message),
        );
        self.push_controls();
        is_valid
    }

    fn push_controls(&mut self) {
        match serde_json::to_value(&self.controls) {
            Ok(data) => {
                send_best_effort(&mut self.parent, &Message::update_data(CONTROLS_SECTION, data));
            }
            Err(e) => tracing::warn!(error = %e, "could not encode controls"),
        }
    }

    fn persist(&mut self) {
        if let Err(e) = save_json(&mut self.session, &self.session_key, &self.controls) {
            tracing::warn!(error = %e, "session cache not updated");
        }
    }

    fn commit(&mut self) {
        self.persist();
        self.push_controls();
    }

    fn next_control_id(&mut self) -> String {
        let controls = &self.controls;
        self.ids
            .next_id("control", '_', |id| controls.iter().any(|c| c.id == id))
    }

    fn position(&self, control_id: &str) -> Result<usize, ModelError> {
        self.controls
            .iter()
            .position(|c| c.id == control_id)
            .ok_or_else(|| ModelError::FieldNotFound(control_id.to_string()))
    }

    /// Drops a control of `kind` at the end of the canvas and selects it.
    pub fn add_control(&mut self, kind: FieldKind, name: Option<&str>) -> String {
        let id = self.next_control_id();
        let mut control = Field::new(id.clone(), kind);
        let name = name.unwrap_or_else(|| control.kind.default_label()).to_string();
        control.field = format!("{}_{}", control.kind, self.controls.len() + 1);
        control.label = name.clone();
        control.name = name;
        control.order = self.controls.len() as i32;
        self.controls.push(control);
        self.selected = Some(id.clone());
        self.commit();
        id
    }

    pub fn select_control(&mut self, control_id: &str) -> Result<&Field, ModelError> {
        let index = self.position(control_id)?;
        self.selected = Some(control_id.to_string());
        Ok(&self.controls[index])
    }

    pub fn update_control(&mut self, control_id: &str, patch: FieldPatch) -> Result<(), ModelError> {
        let index = self.position(control_id)?;
        patch.apply_to(&mut self.controls[index]);
        self.commit();
        Ok(())
    }

    /// Duplicates a control right at the end of the canvas and selects the copy.
    pub fn copy_control(&mut self, control_id: &str) -> Result<String, ModelError> {
        let index = self.position(control_id)?;
        let id = self.next_control_id();
        let mut copy = self.controls[index].clone();
        copy.id = id.clone();
        copy.field = format!("{}_copy", copy.field);
        copy.label = format!("{} (副本)", copy.label);
        copy.order = self.controls.len() as i32;
        self.controls.push(copy);
        self.selected = Some(id.clone());
        self.commit();
        Ok(id)
    }

    pub fn delete_control(&mut self, control_id: &str) -> Result<Field, ModelError> {
        let index = self.position(control_id)?;
        let removed = self.controls.remove(index);
        if self.selected.as_deref() == Some(control_id) {
            self.selected = None;
        }
        self.renumber();
        self.commit();
        Ok(removed)
    }

    /// Moves a control to `target` (clamped to the canvas), as a drag-and-drop would.
    pub fn move_control(&mut self, control_id: &str, target: usize) -> Result<(), ModelError> {
        let index = self.position(control_id)?;
        let control = self.controls.remove(index);
        let target = target.min(self.controls.len());
        self.controls.insert(target, control);
        self.renumber();
        self.commit();
        Ok(())
    }

    fn renumber(&mut self) {
        for (index, control) in self.controls.iter_mut().enumerate() {
            control.order = index as i32;
        }
    }

    pub fn render(&self) -> CanvasView {
        self.renderers
            .render_canvas(&self.controls, self.selected.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MessageChannel;
    use crate::storage::MemoryStore;

    #[test]
    fn add_control_names_data_key_after_position() {
        let mut designer = FieldDesigner::new(MessageChannel::new(), MemoryStore::new());
        designer.add_control(FieldKind::Text, None);
        let id = designer.add_control(FieldKind::Radio, Some("性别"));
        let control = designer.control(&id).unwrap();
        assert_eq!(control.field, "radio_2");
        assert_eq!(control.label, "性别");
        assert_eq!(control.options.len(), 3);
        assert_eq!(designer.selected().map(|c| c.id.as_str()), Some(id.as_str()));
    }

    #[test]
    fn move_control_clamps_target() {
        let mut designer = FieldDesigner::new(MessageChannel::new(), MemoryStore::new());
        let a = designer.add_control(FieldKind::Text, None);
        let b = designer.add_control(FieldKind::Number, None);
        designer.move_control(&a, 99).unwrap();
        let ids: Vec<_> = designer.controls().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![b, a]);
        assert_eq!(designer.controls()[1].order, 1);
    }
}
