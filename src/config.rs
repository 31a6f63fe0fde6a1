use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;

/// Timing contract of the step loader and the notice banners, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingConfig {
    /// Number of retries after the first attempt, for both missing containers and load errors.
    pub max_retries: u32,
    pub container_retry_delay_ms: u64,
    pub load_retry_delay_ms: u64,
    /// How long a step click waits for an in-flight load before forcing navigation.
    pub pending_navigation_timeout_ms: u64,
    pub notice_duration_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            container_retry_delay_ms: 200,
            load_retry_delay_ms: 500,
            pending_navigation_timeout_ms: 2000,
            notice_duration_ms: 3000,
        }
    }
}

/// Frame geometry used when mounting a step page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameLayout {
    pub min_frame_height: u32,
    /// Vertical space taken by the title bar and the step indicator.
    pub frame_chrome_offset: u32,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            min_frame_height: 600,
            frame_chrome_offset: 380,
        }
    }
}

impl FrameLayout {
    pub fn frame_height(&self, viewport_height: u32) -> u32 {
        viewport_height
            .saturating_sub(self.frame_chrome_offset)
            .max(self.min_frame_height)
    }
}

/// Top-level configuration shared by the wizard host and the designers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignerConfig {
    pub total_steps: u8,
    pub timing: TimingConfig,
    pub layout: FrameLayout,
    /// Step page address; `{}` is replaced with the step number.
    pub step_page_template: String,
    pub session_key: String,
    pub node_key_prefix: String,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            total_steps: 5,
            timing: TimingConfig::default(),
            layout: FrameLayout::default(),
            step_page_template: "form_step{}.html".to_string(),
            session_key: "formData".to_string(),
            node_key_prefix: "workflow_node_".to_string(),
        }
    }
}

impl DesignerConfig {
    /// Parses a configuration from JSON. Missing keys fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_steps == 0 {
            return Err(ConfigError::Invalid(
                "totalSteps must be at least 1".to_string(),
            ));
        }
        if !self.step_page_template.contains("{}") {
            return Err(ConfigError::Invalid(format!(
                "stepPageTemplate '{}' has no '{{}}' placeholder",
                self.step_page_template
            )));
        }
        if self.session_key.is_empty() || self.node_key_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "storage keys must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn step_page(&self, step: u8) -> String {
        self.step_page_template.replace("{}", &step.to_string())
    }

    pub fn node_key(&self, node_id: &str) -> String {
        format!("{}{}", self.node_key_prefix, node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_height_has_a_floor() {
        let layout = FrameLayout::default();
        assert_eq!(layout.frame_height(700), 600);
        assert_eq!(layout.frame_height(1200), 820);
        assert_eq!(layout.frame_height(100), 600);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DesignerConfig::from_json(r#"{"timing": {"maxRetries": 5}}"#).unwrap();
        assert_eq!(config.timing.max_retries, 5);
        assert_eq!(config.timing.load_retry_delay_ms, 500);
        assert_eq!(config.total_steps, 5);
        assert_eq!(config.step_page(3), "form_step3.html");
        assert_eq!(config.node_key("node-4"), "workflow_node_node-4");
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let err = DesignerConfig::from_json(r#"{"stepPageTemplate": "step.html"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
