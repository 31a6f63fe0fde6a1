use thiserror::Error;

/// Errors raised while encoding, decoding or delivering cross-frame messages.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Failed to decode message: {0}")]
    Decode(String),

    #[error("Unknown message type '{0}'")]
    UnknownType(String),

    #[error("Message has no 'type' field")]
    MissingType,

    #[error("Target frame is not available: {0}")]
    PortClosed(String),
}

/// Errors that can occur while mounting a step frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Step content container is missing, the page structure may be damaged")]
    ContainerMissing,

    #[error("Loading step {step} failed after {attempts} attempts")]
    RetriesExhausted { step: u8, attempts: u32 },
}

/// Errors raised by the wizard state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Step {step} is outside the valid range 1..={total}")]
    StepOutOfRange { step: u8, total: u8 },
}

/// Errors raised while mutating a `FormModel`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Field '{0}' not found")]
    FieldNotFound(String),

    #[error("Logic rule '{0}' not found")]
    RuleNotFound(String),

    #[error("Invalid logic rule: {0}")]
    InvalidRule(String),

    #[error("Section '{section}' has an invalid payload: {message}")]
    InvalidSection { section: String, message: String },
}

/// Errors raised by the workflow node graph editor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node '{0}' not found on the canvas")]
    NodeNotFound(String),

    #[error("{kind} nodes cannot be deleted individually, delete the whole branch instead")]
    ProtectedNode { node_id: String, kind: String },

    #[error("{0} nodes are created together with their branch and cannot be added on their own")]
    StructuralKind(String),

    #[error("Node '{0}' is not a branch node")]
    NotABranch(String),

    #[error("Branch '{branch_id}' has no lane {lane}")]
    LaneOutOfRange { branch_id: String, lane: usize },

    #[error("Node name cannot be empty")]
    EmptyName,

    #[error("Workflow name is required")]
    MissingWorkflowName,

    #[error("Cannot publish workflow: {0}")]
    PublishRejected(String),

    #[error("Invalid node properties for '{node_id}': {message}")]
    InvalidProperties { node_id: String, message: String },

    #[error("Failed to persist node properties: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from a `KeyValueStore` backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(String),

    #[error("Stored value under '{key}' is not valid JSON: {message}")]
    Json { key: String, message: String },
}

/// Errors while loading a `DesignerConfig`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config JSON: {0}")]
    Json(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
