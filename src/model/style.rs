use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Visual settings of a form. Keys the designers do not know are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormStyle {
    pub template: String,
    pub theme: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
    pub font_size: String,
    pub border_style: String,
    pub shadow: String,
    #[serde(rename = "customCSS")]
    pub custom_css: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for FormStyle {
    fn default() -> Self {
        Self {
            template: "default".to_string(),
            theme: "default".to_string(),
            primary_color: "#1890ff".to_string(),
            secondary_color: "#52c41a".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#333333".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            font_size: "14px".to_string(),
            border_style: "rounded".to_string(),
            shadow: "none".to_string(),
            custom_css: String::new(),
            extra: Map::new(),
        }
    }
}

/// `(name, background, text, primary)`
const THEMES: &[(&str, &str, &str, &str)] = &[
    ("default", "#ffffff", "#333333", "#1890ff"),
    ("blue", "#f0f5ff", "#1a237e", "#2196f3"),
    ("green", "#e8f5e9", "#2e7d32", "#4caf50"),
    ("purple", "#f3e5f5", "#4a148c", "#9c27b0"),
    ("orange", "#fff3e0", "#e65100", "#ff9800"),
];

impl FormStyle {
    pub fn theme_names() -> impl Iterator<Item = &'static str> {
        THEMES.iter().map(|(name, ..)| *name)
    }

    /// Applies a named colour theme. Unknown names leave the style untouched.
    pub fn apply_theme(&mut self, theme: &str) -> bool {
        let Some((name, background, text, primary)) =
            THEMES.iter().find(|(name, ..)| *name == theme)
        else {
            return false;
        };
        self.theme = name.to_string();
        self.background_color = background.to_string();
        self.text_color = text.to_string();
        self.primary_color = primary.to_string();
        true
    }

    /// CSS box-shadow for the `shadow` preset.
    pub fn box_shadow(&self) -> &'static str {
        match self.shadow.as_str() {
            "light" => "0 2px 4px rgba(0,0,0,0.1)",
            "medium" => "0 4px 8px rgba(0,0,0,0.15)",
            "strong" => "0 8px 16px rgba(0,0,0,0.2)",
            _ => "none",
        }
    }

    pub fn border_radius(&self) -> &'static str {
        if self.border_style == "rounded" {
            "8px"
        } else {
            "0px"
        }
    }
}

/// Black or white, whichever reads better on `color` (`#rrggbb`).
pub fn contrast_color(color: &str) -> &'static str {
    let hex = color.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0) as u32
    };
    let brightness = (channel(0) * 299 + channel(2) * 587 + channel(4) * 114) / 1000;
    if brightness > 128 { "#000000" } else { "#ffffff" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn themes_set_all_three_colours() {
        let mut style = FormStyle::default();
        assert!(style.apply_theme("green"));
        assert_eq!(style.background_color, "#e8f5e9");
        assert_eq!(style.primary_color, "#4caf50");
        assert!(!style.apply_theme("neon"));
        assert_eq!(style.theme, "green");
    }

    #[test]
    fn contrast_picks_readable_text() {
        assert_eq!(contrast_color("#ffffff"), "#000000");
        assert_eq!(contrast_color("#1a237e"), "#ffffff");
        assert_eq!(contrast_color("bogus"), "#ffffff");
    }

    #[test]
    fn default_template_is_default() {
        let json = serde_json::to_value(FormStyle::default()).unwrap();
        assert_eq!(json["template"], "default");
        assert_eq!(json["customCSS"], "");
    }
}
