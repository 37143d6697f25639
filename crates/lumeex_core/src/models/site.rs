//! Site information document served by `/api/site-info`.
//!
//! Every struct keeps unknown keys in `extra` so fields this client does not
//! model survive a load/save round-trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub info: SiteDetails,
    pub social: Social,
    pub menu: Menu,
    pub footer: Footer,
    pub legals: Legals,
    pub build: BuildOptions,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteDetails {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub canonical: String,
    pub keywords: Vec<String>,
    pub author: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Social {
    pub instagram_url: String,
    pub thumbnail: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Menu {
    pub items: Vec<MenuItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItem {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Footer {
    pub copyright: String,
    pub legal_label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Legals {
    pub hoster_name: String,
    // Key spelling matches the site.yaml files in the wild.
    pub hoster_adress: String,
    pub hoster_contact: String,
    pub intellectual_property: Vec<IpParagraph>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpParagraph {
    pub paragraph: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub theme: String,
    pub convert_images: bool,
    pub resize_images: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Splits the comma-separated keyword field into a trimmed list without blanks.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn format_keywords(keywords: &[String]) -> String {
    keywords.join(", ")
}

/// Trims menu rows and drops rows where both label and href are empty.
pub fn clean_menu_items(items: Vec<MenuItem>) -> Vec<MenuItem> {
    items
        .into_iter()
        .map(|item| MenuItem {
            label: item.label.trim().to_string(),
            href: item.href.trim().to_string(),
        })
        .filter(|item| !item.label.is_empty() || !item.href.is_empty())
        .collect()
}

/// Trims intellectual property paragraphs and drops empty ones.
pub fn clean_ip_paragraphs(paragraphs: Vec<IpParagraph>) -> Vec<IpParagraph> {
    paragraphs
        .into_iter()
        .map(|p| IpParagraph {
            paragraph: p.paragraph.trim().to_string(),
        })
        .filter(|p| !p.paragraph.is_empty())
        .collect()
}

impl SiteInfo {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(value)
    }

    /// Applies the form clean-up rules the editor enforces before saving.
    pub fn normalized(mut self) -> Self {
        self.menu.items = clean_menu_items(self.menu.items);
        self.legals.intellectual_property = clean_ip_paragraphs(self.legals.intellectual_property);
        self.info.keywords = parse_keywords(&format_keywords(&self.info.keywords));
        self
    }
}
