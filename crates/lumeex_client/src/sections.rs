//! Section editors for the site-info and theme documents.
//!
//! Both documents go through the same editor: fetch the full document, edit
//! sections independently, and save one section at a time by merging it
//! into the last fetched document. There is no version check on save, so a
//! concurrent edit from another admin session is overwritten.

use crate::api::{ApiClient, UploadFile};
use crate::notices::{BusyIndicator, Notifier};
use lumeex_core::dirty::{
    DocumentSections, SectionSchema, SectionStatus, SITE_INFO_SECTIONS, THEME_SECTIONS,
};
use lumeex_core::models::site::{
    clean_ip_paragraphs, clean_menu_items, parse_keywords, IpParagraph, MenuItem, SiteInfo,
};
use lumeex_core::models::theme::{GoogleFont, ThemeConfig};
use lumeex_core::validation::{ensure_favicon_file, ensure_hex_color, ensure_photo_file};
use lumeex_core::AppError;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    SiteInfo,
    Theme,
}

impl DocumentKind {
    fn schemas(self) -> &'static [SectionSchema] {
        match self {
            Self::SiteInfo => SITE_INFO_SECTIONS,
            Self::Theme => THEME_SECTIONS,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::SiteInfo => "site info",
            Self::Theme => "theme",
        }
    }
}

#[derive(Debug)]
pub struct SectionEditor {
    kind: DocumentKind,
    api: Arc<ApiClient>,
    notifier: Notifier,
    busy: BusyIndicator,
    theme_name: Option<String>,
    sections: Option<DocumentSections>,
}

impl SectionEditor {
    pub fn new(
        kind: DocumentKind,
        api: Arc<ApiClient>,
        notifier: Notifier,
        busy: BusyIndicator,
    ) -> Self {
        Self {
            kind,
            api,
            notifier,
            busy,
            theme_name: None,
            sections: None,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Name of the theme being edited, once loaded.
    pub fn theme_name(&self) -> Option<&str> {
        self.theme_name.as_deref()
    }

    async fn fetch(&mut self) -> Result<Value, AppError> {
        match self.kind {
            DocumentKind::SiteInfo => self.api.site_info().await,
            DocumentKind::Theme => {
                let info = self.api.theme_info().await?;
                self.theme_name = Some(info.theme_name);
                Ok(info.theme_yaml)
            }
        }
    }

    /// Fetches the document and resets every section's form to it.
    pub async fn load(&mut self) -> Result<(), AppError> {
        let document = match self.fetch().await {
            Ok(document) => document,
            Err(err) => {
                self.notifier.report(&err);
                return Err(err);
            }
        };
        match self.sections.as_mut() {
            Some(sections) => sections.reset(document),
            None => self.sections = Some(DocumentSections::new(self.kind.schemas(), document)),
        }
        if self.kind == DocumentKind::SiteInfo {
            self.clean_site_lists()?;
        }
        info!(document = self.kind.label(), "document loaded");
        Ok(())
    }

    /// Applies the site-info list clean-up to the freshly loaded forms.
    ///
    /// Sections that change are left unsaved so the cleaned lists go out
    /// with the next save.
    fn clean_site_lists(&mut self) -> Result<(), AppError> {
        let site = match SiteInfo::from_value(self.document()?) {
            Ok(site) => site,
            Err(err) => {
                warn!(error = %err, "site info does not match the expected shape");
                return Ok(());
            }
        };
        let cleaned = site.clone().normalized();
        if cleaned.info.keywords != site.info.keywords {
            self.set_field("info", "keywords", json!(cleaned.info.keywords))?;
        }
        if cleaned.menu.items != site.menu.items {
            self.set_field("menu", "items", serde_json::to_value(cleaned.menu.items)?)?;
        }
        if cleaned.legals.intellectual_property != site.legals.intellectual_property {
            let paragraphs = serde_json::to_value(cleaned.legals.intellectual_property)?;
            self.set_field("legals", "intellectual_property", paragraphs)?;
        }
        Ok(())
    }

    fn sections(&self) -> Result<&DocumentSections, AppError> {
        let label = self.kind.label();
        self.sections
            .as_ref()
            .ok_or_else(|| AppError::validation(format!("The {} has not been loaded yet", label)))
    }

    fn sections_mut(&mut self) -> Result<&mut DocumentSections, AppError> {
        let label = self.kind.label();
        self.sections
            .as_mut()
            .ok_or_else(|| AppError::validation(format!("The {} has not been loaded yet", label)))
    }

    /// Last document fetched from the server.
    pub fn document(&self) -> Result<&Value, AppError> {
        self.sections().map(DocumentSections::loaded)
    }

    pub fn status(&self, section: &str) -> Result<SectionStatus, AppError> {
        self.sections()?.status(section)
    }

    pub fn statuses(&self) -> Result<Vec<(&'static str, SectionStatus)>, AppError> {
        Ok(self.sections()?.statuses())
    }

    pub fn current(&self, section: &str) -> Result<&Value, AppError> {
        self.sections()?.current(section)
    }

    pub fn set_field(
        &mut self,
        section: &str,
        path: &str,
        value: Value,
    ) -> Result<SectionStatus, AppError> {
        let status = self.sections_mut()?.set_field(section, path, value)?;
        debug!(document = self.kind.label(), section, path, ?status, "field updated");
        Ok(status)
    }

    pub fn set_section(&mut self, section: &str, value: Value) -> Result<SectionStatus, AppError> {
        self.sections_mut()?.set_section(section, value)
    }

    /// Discards unsaved edits of one section.
    pub fn revert_section(&mut self, section: &str) -> Result<SectionStatus, AppError> {
        self.sections_mut()?.reset_section(section)
    }

    /// Saves one section.
    ///
    /// Incomplete sections are refused before any request is made. On
    /// success the document is re-fetched so the saved state reflects what
    /// the server actually stored.
    pub async fn save_section(&mut self, section: &str) -> Result<SectionStatus, AppError> {
        let payload = match self.sections()?.merged_payload(section) {
            Ok(payload) => payload,
            Err(err) => {
                self.notifier.report(&err);
                return Err(err);
            }
        };

        let saved = {
            let _busy = self.busy.begin("Saving...");
            match self.kind {
                DocumentKind::SiteInfo => self.api.save_site_info(&payload).await,
                DocumentKind::Theme => {
                    let theme_name = self.theme_name.clone().unwrap_or_default();
                    self.api.save_theme_info(&theme_name, &payload).await
                }
            }
        };
        if let Err(err) = saved {
            self.notifier.error("Error saving section.");
            return Err(err);
        }

        self.sync_loaded().await?;
        self.notifier.success("✅ Section saved!");
        self.status(section)
    }

    /// Re-fetches the document after a server-side change, keeping form edits.
    async fn sync_loaded(&mut self) -> Result<(), AppError> {
        let document = match self.fetch().await {
            Ok(document) => document,
            Err(err) => {
                self.notifier.report(&err);
                return Err(err);
            }
        };
        self.sections_mut()?.replace_loaded(document);
        Ok(())
    }

    fn expect_kind(&self, kind: DocumentKind) -> Result<(), AppError> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Operation not available on the {} editor",
                self.kind.label()
            )))
        }
    }

    fn loaded_theme_name(&self) -> Result<String, AppError> {
        self.expect_kind(DocumentKind::Theme)?;
        self.theme_name
            .clone()
            .ok_or_else(|| AppError::validation("The theme has not been loaded yet"))
    }

    // Site info fields

    /// Sets `info.keywords` from the comma-separated form value.
    pub fn set_keywords(&mut self, raw: &str) -> Result<SectionStatus, AppError> {
        self.expect_kind(DocumentKind::SiteInfo)?;
        self.set_field("info", "keywords", json!(parse_keywords(raw)))
    }

    pub fn set_menu_items(&mut self, items: Vec<MenuItem>) -> Result<SectionStatus, AppError> {
        self.expect_kind(DocumentKind::SiteInfo)?;
        self.set_field("menu", "items", serde_json::to_value(clean_menu_items(items))?)
    }

    pub fn set_ip_paragraphs(
        &mut self,
        paragraphs: Vec<IpParagraph>,
    ) -> Result<SectionStatus, AppError> {
        self.expect_kind(DocumentKind::SiteInfo)?;
        self.set_field(
            "legals",
            "intellectual_property",
            serde_json::to_value(clean_ip_paragraphs(paragraphs))?,
        )
    }

    /// Uploads the social thumbnail. The server records it in the document.
    pub async fn upload_thumbnail(&mut self, file: UploadFile) -> Result<String, AppError> {
        self.expect_kind(DocumentKind::SiteInfo)?;
        ensure_photo_file(&file.name).inspect_err(|err| self.notifier.report(err))?;
        let filename = {
            let _busy = self.busy.begin("Uploading thumbnail...");
            self.api.upload_thumbnail(file).await
        }
        .inspect_err(|_| self.notifier.error("❌ Error uploading thumbnail"))?;
        self.set_field("social", "thumbnail", json!(filename))?;
        self.sync_loaded().await?;
        self.notifier.success("✅ Thumbnail uploaded!");
        Ok(filename)
    }

    pub async fn remove_thumbnail(&mut self) -> Result<(), AppError> {
        self.expect_kind(DocumentKind::SiteInfo)?;
        self.api
            .remove_thumbnail()
            .await
            .inspect_err(|_| self.notifier.error("❌ Error removing thumbnail"))?;
        self.set_field("social", "thumbnail", json!(""))?;
        self.sync_loaded().await?;
        self.notifier.success("✅ Thumbnail removed!");
        Ok(())
    }

    // Theme fields

    /// Typed view of the theme as currently edited.
    pub fn theme_config(&self) -> Result<ThemeConfig, AppError> {
        self.expect_kind(DocumentKind::Theme)?;
        let sections = self.sections()?;
        let mut document = sections.loaded().clone();
        if let Value::Object(map) = &mut document {
            for schema in THEME_SECTIONS {
                map.insert(schema.key.to_string(), sections.current(schema.name)?.clone());
            }
        }
        Ok(ThemeConfig::from_value(&document)?)
    }

    pub fn set_color(&mut self, name: &str, value: &str) -> Result<SectionStatus, AppError> {
        self.expect_kind(DocumentKind::Theme)?;
        ensure_hex_color(value)?;
        self.set_field("colors", name, json!(value))
    }

    /// Google fonts are persisted as soon as the list changes.
    async fn store_google_fonts(
        &mut self,
        fonts: Vec<GoogleFont>,
    ) -> Result<Vec<GoogleFont>, AppError> {
        let theme_name = self.loaded_theme_name()?;
        self.api
            .save_google_fonts(&theme_name, &fonts)
            .await
            .inspect_err(|err| self.notifier.report(err))?;
        self.sync_loaded().await?;
        let stored = self
            .document()?
            .get("google_fonts")
            .cloned()
            .unwrap_or_else(|| json!([]));
        self.set_section("google-fonts", stored.clone())?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Appends an empty row, ready to be filled in with `update_google_font`.
    pub async fn add_google_font(&mut self) -> Result<Vec<GoogleFont>, AppError> {
        self.push_google_font(GoogleFont::default()).await
    }

    /// Appends a filled-in font with a single store.
    pub async fn push_google_font(
        &mut self,
        font: GoogleFont,
    ) -> Result<Vec<GoogleFont>, AppError> {
        let mut fonts = self.theme_config()?.google_fonts;
        fonts.push(GoogleFont {
            family: font.family.trim().to_string(),
            weights: font.weights,
        });
        self.store_google_fonts(fonts).await
    }

    pub async fn update_google_font(
        &mut self,
        index: usize,
        font: GoogleFont,
    ) -> Result<Vec<GoogleFont>, AppError> {
        let mut fonts = self.theme_config()?.google_fonts;
        let slot = fonts
            .get_mut(index)
            .ok_or_else(|| AppError::validation(format!("No Google font at index {}", index)))?;
        *slot = GoogleFont {
            family: font.family.trim().to_string(),
            weights: font.weights,
        };
        self.store_google_fonts(fonts).await
    }

    pub async fn remove_google_font(&mut self, index: usize) -> Result<Vec<GoogleFont>, AppError> {
        let mut fonts = self.theme_config()?.google_fonts;
        if index >= fonts.len() {
            return Err(AppError::validation(format!("No Google font at index {}", index)));
        }
        fonts.remove(index);
        self.store_google_fonts(fonts).await
    }

    /// Uploads a favicon for the loaded theme and points `favicon.path` at it.
    pub async fn upload_favicon(&mut self, file: UploadFile) -> Result<String, AppError> {
        let theme_name = self.loaded_theme_name()?;
        if let Err(err) = ensure_favicon_file(&file.name) {
            self.notifier.error("Invalid file type for favicon.");
            return Err(err);
        }
        let filename = {
            let _busy = self.busy.begin("Uploading favicon...");
            self.api.upload_favicon(&theme_name, file).await
        }
        .inspect_err(|_| self.notifier.error("Error uploading favicon"))?;
        self.set_field("favicon", "path", json!(filename))?;
        self.sync_loaded().await?;
        self.notifier.success("✅ Favicon uploaded!");
        Ok(filename)
    }

    pub async fn remove_favicon(&mut self) -> Result<SectionStatus, AppError> {
        let theme_name = self.loaded_theme_name()?;
        let removed = {
            let _busy = self.busy.begin("Removing favicon...");
            self.api.remove_favicon(&theme_name).await
        };
        removed.inspect_err(|_| self.notifier.error("Error removing favicon"))?;
        self.set_field("favicon", "path", json!(""))?;
        self.sync_loaded().await?;
        self.notifier.success("✅ Favicon removed!");
        self.status("favicon")
    }
}
