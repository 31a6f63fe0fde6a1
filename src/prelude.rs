//! Prelude module for convenient imports
//!
//! Re-exports the types most embedders touch: the wizard host, the two
//! designers, the form model and the message contract.
//!
//! # Example
//!
//! ```rust,no_run
//! use sekkei::prelude::*;
//!
//! let mut model = FormModel::new();
//! let id = model.add_field(FieldKind::Text);
//! let reply = Message::form_data(&model);
//! assert_eq!(reply.kind(), "form_data");
//! # let _ = id;
//! ```

// Wizard
pub use crate::config::DesignerConfig;
pub use crate::wizard::{
    FrameHost, FrameId, RecordingFrameHost, StepValidation, StepValidator, ValidatorRegistry,
    WizardHost, WizardState,
};

// Model
pub use crate::model::{Field, FieldKind, FieldPatch, FormModel, LogicRule, RuleDraft};

// Protocol
pub use crate::protocol::{FramePort, Message, MessageChannel};

// Designers
pub use crate::designer::FieldDesigner;
pub use crate::workflow::{NodeKind, NodeProperties, WorkflowDesigner, WorkflowGraph};

// Rendering
pub use crate::render::{RendererRegistry, render_workflow};

// Storage
pub use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};

// Error types
pub use crate::error::{GraphError, LoadError, ModelError, ProtocolError, WizardError};
