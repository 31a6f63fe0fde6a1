use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormScope {
    #[default]
    All,
    Department,
    User,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidityType {
    #[default]
    Forever,
    Range,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfterSubmitAction {
    #[default]
    Message,
    Redirect,
}

/// Who can see the form, when it is open, and what happens after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishSettings {
    pub form_status: FormStatus,
    pub form_scope: FormScope,
    pub departments: Vec<String>,
    pub users: Vec<String>,
    pub validity_type: ValidityType,
    pub start_time: String,
    pub end_time: String,
    pub after_submit_action: AfterSubmitAction,
    pub submit_message: String,
    pub redirect_url: String,
    pub enable_notification: bool,
    pub notification_recipients: Vec<String>,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            form_status: FormStatus::Draft,
            form_scope: FormScope::All,
            departments: Vec::new(),
            users: Vec::new(),
            validity_type: ValidityType::Forever,
            start_time: String::new(),
            end_time: String::new(),
            after_submit_action: AfterSubmitAction::Message,
            submit_message: "提交成功，感谢您的参与！".to_string(),
            redirect_url: String::new(),
            enable_notification: false,
            notification_recipients: Vec::new(),
        }
    }
}

/// Parses `datetime-local` input values, with or without seconds.
fn parse_local_time(value: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

impl PublishSettings {
    /// Only published forms are checked; drafts can be saved half-configured.
    pub fn check(&self) -> Result<(), String> {
        if self.form_status != FormStatus::Published {
            return Ok(());
        }
        if self.validity_type == ValidityType::Range {
            if self.start_time.is_empty() {
                return Err("please set a start time".to_string());
            }
            if self.end_time.is_empty() {
                return Err("please set an end time".to_string());
            }
            let start = parse_local_time(&self.start_time)
                .ok_or_else(|| format!("start time '{}' is not a valid time", self.start_time))?;
            let end = parse_local_time(&self.end_time)
                .ok_or_else(|| format!("end time '{}' is not a valid time", self.end_time))?;
            if start >= end {
                return Err("start time must be earlier than end time".to_string());
            }
        }
        if self.after_submit_action == AfterSubmitAction::Redirect && self.redirect_url.is_empty()
        {
            return Err("please set a redirect URL".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn published_range(start: &str, end: &str) -> PublishSettings {
        PublishSettings {
            form_status: FormStatus::Published,
            validity_type: ValidityType::Range,
            start_time: start.to_string(),
            end_time: end.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn drafts_are_never_rejected() {
        let settings = PublishSettings {
            validity_type: ValidityType::Range,
            after_submit_action: AfterSubmitAction::Redirect,
            ..Default::default()
        };
        assert!(settings.check().is_ok());
    }

    #[test]
    fn range_must_be_ordered() {
        assert!(published_range("2024-05-01T09:00", "2024-05-02T09:00").check().is_ok());
        let err = published_range("2024-05-02T09:00", "2024-05-01T09:00")
            .check()
            .unwrap_err();
        assert!(err.contains("earlier"));
        assert!(published_range("", "2024-05-01T09:00").check().is_err());
    }

    #[test]
    fn redirect_needs_a_url() {
        let settings = PublishSettings {
            form_status: FormStatus::Published,
            after_submit_action: AfterSubmitAction::Redirect,
            ..Default::default()
        };
        assert_eq!(settings.check().unwrap_err(), "please set a redirect URL");
    }
}
