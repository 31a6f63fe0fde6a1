//! # Sekkei - Form Wizard and Workflow Designer Core
//!
//! **Sekkei** is the headless core of a low-code form builder. It covers the
//! five-step form creation wizard, the field designer that runs inside the
//! wizard's step frame, and an approval workflow designer. Every piece is
//! plain state plus explicit events: no browser, no threads, no wall clock.
//!
//! ## Architecture
//!
//! 1.  **Form model** ([`model`]): the `FormModel` the wizard owns, with fields,
//!     logic rules, style and publish settings.
//! 2.  **Protocol** ([`protocol`]): the typed `Message` contract spoken between
//!     the wizard host and a step frame, tagged by its `type` key.
//! 3.  **Wizard** ([`wizard`]): navigation state, a step loader with retry and
//!     a single active frame, and a validator per step.
//! 4.  **Designers** ([`designer`], [`workflow`]): the control canvas and the
//!     workflow node graph.
//! 5.  **Rendering** ([`render`]): pure functions from model to view trees.
//!
//! Deferred work is queued on a virtual clock ([`timers`]); the embedder
//! drives it with `advance`, which makes every retry and timeout testable.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sekkei::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut wizard = WizardHost::new(RecordingFrameHost::new());
//!     wizard.start()?;
//!
//!     // The step frame finished loading and asks for the model.
//!     let frame = wizard.current_frame().expect("step 1 is mounted");
//!     wizard.on_frame_loaded(frame);
//!     wizard.handle_message(Message::GetData);
//!
//!     // It reports its edits section by section.
//!     wizard.handle_raw(serde_json::json!({
//!         "type": "update_data",
//!         "section": "basicInfo",
//!         "data": { "formName": "请假申请", "formType": "approval" }
//!     }));
//!
//!     wizard.on_next_button()?;
//!     println!("{}", wizard.state().render_indicators());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod designer;
pub mod error;
pub mod model;
pub mod notice;
pub mod prelude;
pub mod protocol;
pub mod render;
pub mod storage;
pub mod timers;
pub mod wizard;
pub mod workflow;
