//! Theme folders and local font files.

use crate::api::{ApiClient, UploadFile};
use crate::notices::{BusyIndicator, Notifier};
use lumeex_core::constants::DEFAULT_THEMES;
use lumeex_core::models::theme::{font_options, GoogleFont};
use lumeex_core::validation::ensure_font_file;
use lumeex_core::AppError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Collects every file below `root` for a theme upload.
///
/// Names are `/`-separated and prefixed with the folder name, which the
/// server uses as the theme name. Files come back sorted by name.
pub async fn collect_theme_files(root: &Path) -> Result<Vec<UploadFile>, AppError> {
    let folder = root
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| AppError::validation(format!("Invalid theme folder: {}", root.display())))?
        .to_string();

    let mut files = Vec::new();
    let mut pending: Vec<(PathBuf, String)> = vec![(root.to_path_buf(), folder)];
    while let Some((dir, prefix)) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!(path = %entry.path().display(), "skipping non UTF-8 path");
                continue;
            };
            let relative = format!("{}/{}", prefix, name);
            if entry.file_type().await?.is_dir() {
                pending.push((entry.path(), relative));
            } else {
                let bytes = tokio::fs::read(entry.path()).await?;
                files.push(UploadFile::new(relative, bytes));
            }
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

pub fn is_default_theme(theme: &str) -> bool {
    DEFAULT_THEMES.contains(&theme)
}

#[derive(Debug, Clone)]
pub struct ThemeAssets {
    api: Arc<ApiClient>,
    notifier: Notifier,
    busy: BusyIndicator,
}

impl ThemeAssets {
    pub fn new(api: Arc<ApiClient>, notifier: Notifier, busy: BusyIndicator) -> Self {
        Self { api, notifier, busy }
    }

    pub async fn themes(&self) -> Result<Vec<String>, AppError> {
        self.api
            .themes()
            .await
            .inspect_err(|err| self.notifier.report(err))
    }

    /// Uploads a theme folder and returns the theme name the server created.
    pub async fn upload_theme(&self, folder: &Path) -> Result<String, AppError> {
        let files = collect_theme_files(folder).await?;
        if files.is_empty() {
            let err = AppError::validation("❌ No files provided");
            self.notifier.report(&err);
            return Err(err);
        }
        let count = files.len();
        let ack = {
            let _busy = self.busy.begin("Uploading theme...");
            self.api.upload_theme(files).await
        }
        .inspect_err(|err| self.notifier.report(err))?;
        let theme = ack.theme.unwrap_or_default();
        info!(%theme, files = count, "theme uploaded");
        self.notifier.success(format!("✅ Theme {} uploaded!", theme));
        Ok(theme)
    }

    /// Removes an uploaded theme. Bundled themes are refused locally.
    pub async fn remove_theme(&self, theme: &str) -> Result<(), AppError> {
        if is_default_theme(theme) {
            let err = AppError::validation("❌ Cannot remove default theme");
            self.notifier.report(&err);
            return Err(err);
        }
        self.api
            .remove_theme(theme)
            .await
            .inspect_err(|err| self.notifier.report(err))?;
        self.notifier.success(format!("✅ Theme {} removed!", theme));
        Ok(())
    }

    pub async fn local_fonts(&self, theme: &str) -> Result<Vec<String>, AppError> {
        self.api
            .local_fonts(theme)
            .await
            .inspect_err(|err| self.notifier.report(err))
    }

    /// Uploads a font and returns the refreshed local font list.
    pub async fn upload_font(
        &self,
        theme: &str,
        file: UploadFile,
    ) -> Result<Vec<String>, AppError> {
        if let Err(err) = ensure_font_file(&file.name) {
            self.notifier.error("Only .woff and .woff2 fonts are allowed.");
            return Err(err);
        }
        let uploaded = {
            let _busy = self.busy.begin("Uploading font...");
            self.api.upload_font(theme, file).await
        };
        let filename = uploaded.inspect_err(|_| self.notifier.error("Error uploading font."))?;
        info!(%theme, %filename, "font uploaded");
        self.notifier.success("✅ Font uploaded!");
        self.local_fonts(theme).await
    }

    /// Removes a font and returns the refreshed local font list.
    pub async fn remove_font(&self, theme: &str, font: &str) -> Result<Vec<String>, AppError> {
        let removed = {
            let _busy = self.busy.begin("Removing font...");
            self.api.remove_font(theme, font).await
        };
        removed.inspect_err(|_| self.notifier.error("Error removing font."))?;
        self.notifier.success("Font removed!");
        self.local_fonts(theme).await
    }

    /// Font names offered by the font selectors of `theme`.
    pub async fn font_options(
        &self,
        theme: &str,
        google_fonts: &[GoogleFont],
    ) -> Result<Vec<String>, AppError> {
        let local = self.local_fonts(theme).await?;
        Ok(font_options(google_fonts, &local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn theme_files_are_prefixed_with_the_folder_name() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let root = dir.path().join("sunset");
        tokio::fs::create_dir_all(root.join("fonts")).await.expect("mkdir");
        tokio::fs::write(root.join("theme.yaml"), b"colors: {}").await.expect("write");
        tokio::fs::write(root.join("fonts").join("Lora.woff2"), b"font").await.expect("write");

        let files = collect_theme_files(&root).await.expect("collect");
        let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, vec!["sunset/fonts/Lora.woff2", "sunset/theme.yaml"]);
        assert_eq!(files[1].bytes, b"colors: {}");
    }

    #[test]
    fn bundled_themes_are_recognized() {
        assert!(is_default_theme("modern"));
        assert!(is_default_theme("classic"));
        assert!(!is_default_theme("sunset"));
    }
}
