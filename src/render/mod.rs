//! Turns model data into view trees.
//!
//! Rendering is a pure function of the model: the canvas is rebuilt from
//! scratch after every mutation. Each control type is drawn by a
//! [`ControlRenderer`] looked up by its wire tag, so embedders can replace a
//! built-in renderer or add one for a custom type.

use crate::model::Field;
use ahash::AHashMap;
use std::fmt;

mod controls;
pub mod workflow;

use controls::register_default_renderers;
pub use workflow::render_workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceStyle {
    Select,
    Radio,
    Checkbox,
}

/// The interactive part of a rendered control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    Input {
        input_type: &'static str,
        placeholder: String,
    },
    TextArea {
        placeholder: String,
        rows: u8,
    },
    Choice {
        style: ChoiceStyle,
        options: Vec<String>,
    },
    Switch {
        on: bool,
    },
    Upload {
        accept: &'static str,
        caption: String,
    },
    Divider {
        text: String,
    },
    /// A preview area with action buttons (camera, signature pad, ...).
    Device {
        caption: String,
        actions: Vec<String>,
    },
    /// A multi-section business template.
    Sections {
        sections: Vec<String>,
    },
    /// No renderer knows this type.
    Unsupported {
        kind: String,
    },
}

/// A control as it appears on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub id: String,
    pub kind: String,
    pub label: String,
    pub required: bool,
    pub width: u8,
    pub help_text: String,
    pub selected: bool,
    pub widget: Widget,
}

/// Draws the body of one control type.
pub trait ControlRenderer {
    fn kind(&self) -> &str;
    fn render(&self, field: &Field) -> Widget;
}

pub struct RendererRegistry {
    renderers: AHashMap<String, Box<dyn ControlRenderer>>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        let mut renderers: AHashMap<String, Box<dyn ControlRenderer>> = AHashMap::new();
        register_default_renderers(&mut renderers);
        Self { renderers }
    }
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_renderer(mut self, renderer: Box<dyn ControlRenderer>) -> Self {
        self.renderers.insert(renderer.kind().to_string(), renderer);
        self
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.renderers.contains_key(kind)
    }

    pub fn render_field(&self, field: &Field) -> ControlView {
        let kind = field.kind.as_str();
        let widget = match self.renderers.get(kind) {
            Some(renderer) => renderer.render(field),
            None => Widget::Unsupported {
                kind: kind.to_string(),
            },
        };
        ControlView {
            id: field.id.clone(),
            kind: kind.to_string(),
            label: field.label.clone(),
            required: field.required,
            width: field.width,
            help_text: field.help_text.clone(),
            selected: false,
            widget,
        }
    }

    /// Renders `fields` in the given order, marking `selected` if present.
    pub fn render_canvas<'a>(
        &self,
        fields: impl IntoIterator<Item = &'a Field>,
        selected: Option<&str>,
    ) -> CanvasView {
        let controls = fields
            .into_iter()
            .map(|field| {
                let mut view = self.render_field(field);
                view.selected = selected == Some(field.id.as_str());
                view
            })
            .collect();
        CanvasView { controls }
    }
}

/// The whole design canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanvasView {
    pub controls: Vec<ControlView>,
}

impl CanvasView {
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.controls.iter().map(|c| c.id.as_str()).collect()
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Widget::Input {
                input_type,
                placeholder,
            } => write!(f, "<{}> {}", input_type, placeholder),
            Widget::TextArea { placeholder, rows } => write!(f, "<textarea x{}> {}", rows, placeholder),
            Widget::Choice { style, options } => {
                let mark = match style {
                    ChoiceStyle::Select => "▾",
                    ChoiceStyle::Radio => "○",
                    ChoiceStyle::Checkbox => "☐",
                };
                let items: Vec<_> = options.iter().map(|o| format!("{} {}", mark, o)).collect();
                write!(f, "{}", items.join("  "))
            }
            Widget::Switch { on } => write!(f, "[{}]", if *on { "on" } else { "off" }),
            Widget::Upload { accept, caption } => write!(f, "[upload {}] {}", accept, caption),
            Widget::Divider { text } => write!(f, "──── {} ────", text),
            Widget::Device { caption, actions } => {
                write!(f, "[{}]", caption)?;
                for action in actions {
                    write!(f, " ({})", action)?;
                }
                Ok(())
            }
            Widget::Sections { sections } => write!(f, "§ {}", sections.join(" § ")),
            Widget::Unsupported { kind } => write!(f, "[unsupported control '{}']", kind),
        }
    }
}

impl fmt::Display for CanvasView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.controls.is_empty() {
            return writeln!(f, "(empty canvas, add a control to start)");
        }
        for control in &self.controls {
            let cursor = if control.selected { ">" } else { " " };
            let required = if control.required { " *" } else { "" };
            writeln!(
                f,
                "{} {:<12} {}{} ({}%)",
                cursor, control.kind, control.label, required, control.width
            )?;
            writeln!(f, "    {}", control.widget)?;
            if !control.help_text.is_empty() {
                writeln!(f, "    ? {}", control.help_text)?;
            }
        }
        Ok(())
    }
}
