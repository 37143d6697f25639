//! Theme document served by `/api/theme-info` and related asset helpers.

use crate::constants::FONT_DISPLAY_EXTENSIONS;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response of `GET /api/theme-info`.
///
/// `theme_yaml` stays untyped: the section tracker compares and merges it as
/// raw JSON so keys this client does not know are preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeInfo {
    pub theme_name: String,
    #[serde(default)]
    pub theme_yaml: Value,
    #[serde(default)]
    pub google_fonts: Vec<GoogleFont>,
}

/// Typed read view over a theme document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ThemeColors,
    pub fonts: ThemeFonts,
    pub favicon: Favicon,
    pub google_fonts: Vec<GoogleFont>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub primary: String,
    pub primary_dark: String,
    pub secondary: String,
    pub accent: String,
    pub text_dark: String,
    pub background: String,
    pub browser_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeFonts {
    pub primary: FontChoice,
    pub secondary: FontChoice,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontChoice {
    pub name: String,
    pub fallback: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Favicon {
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleFont {
    pub family: String,
    pub weights: Vec<String>,
}

/// Generic font family used when a font fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFallback {
    Serif,
    SansSerif,
}

impl FontFallback {
    /// Anything other than `serif` or `sans-serif` maps to `sans-serif`.
    pub fn normalize(value: &str) -> Self {
        match value {
            "serif" => Self::Serif,
            _ => Self::SansSerif,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Serif => "serif",
            Self::SansSerif => "sans-serif",
        }
    }
}

impl ThemeConfig {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(value)
    }
}

/// Local font file name without its font extension.
pub fn font_display_name(file_name: &str) -> &str {
    for ext in FONT_DISPLAY_EXTENSIONS {
        if let Some(stem) = file_name.strip_suffix(ext) {
            if let Some(stem) = stem.strip_suffix('.') {
                return stem;
            }
        }
    }
    file_name
}

/// Font dropdown options: Google families first, then local fonts.
pub fn font_options(google_fonts: &[GoogleFont], local_fonts: &[String]) -> Vec<String> {
    google_fonts
        .iter()
        .map(|font| font.family.clone())
        .chain(local_fonts.iter().map(|f| font_display_name(f).to_string()))
        .collect()
}

/// Splits the comma-separated weights field.
pub fn parse_weights(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn font_names_lose_known_extensions_only() {
        assert_eq!(font_display_name("Inter.woff2"), "Inter");
        assert_eq!(font_display_name("Inter.woff"), "Inter");
        assert_eq!(font_display_name("Serif.ttf"), "Serif");
        assert_eq!(font_display_name("Mono.otf"), "Mono");
        assert_eq!(font_display_name("readme.txt"), "readme.txt");
        assert_eq!(font_display_name("woff2"), "woff2");
    }

    #[test]
    fn options_list_google_families_before_local_fonts() {
        let google = vec![GoogleFont {
            family: "Lora".into(),
            weights: vec!["400".into()],
        }];
        let local = vec!["Inter.woff2".to_string()];
        assert_eq!(font_options(&google, &local), vec!["Lora", "Inter"]);
    }

    #[test]
    fn fallback_normalizes_to_known_families() {
        assert_eq!(FontFallback::normalize("serif").as_str(), "serif");
        assert_eq!(FontFallback::normalize("sans-serif").as_str(), "sans-serif");
        assert_eq!(FontFallback::normalize("monospace").as_str(), "sans-serif");
        assert_eq!(FontFallback::normalize("").as_str(), "sans-serif");
    }

    #[test]
    fn theme_config_tolerates_partial_documents() {
        let config = ThemeConfig::from_value(&json!({
            "colors": {"primary": "#0065a1"},
            "google_fonts": [{"family": "Lora"}],
            "unknown": true
        }))
        .expect("parse");
        assert_eq!(config.colors.primary, "#0065a1");
        assert!(config.colors.accent.is_empty());
        assert_eq!(config.google_fonts[0].family, "Lora");
        assert!(config.google_fonts[0].weights.is_empty());
        assert_eq!(config.extra.get("unknown"), Some(&json!(true)));

        assert_eq!(
            ThemeConfig::from_value(&Value::Null).expect("null"),
            ThemeConfig::default()
        );
    }

    #[test]
    fn weights_are_split_on_commas() {
        assert_eq!(parse_weights("400, 700,,900 "), vec!["400", "700", "900"]);
    }
}
