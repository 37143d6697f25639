//! Static site build, output archive download, and preview address.

use crate::api::{ApiClient, BuildReport};
use crate::notices::{BusyIndicator, Notifier};
use lumeex_core::AppError;
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Address of the static preview server running next to `server`.
///
/// Falls back to `localhost` when `server` has no usable host.
pub fn preview_url(server: &str, preview_port: u16) -> String {
    let host = Url::parse(server)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "localhost".to_string());
    format!("http://{}:{}", host, preview_port)
}

#[derive(Debug, Clone)]
pub struct Publisher {
    api: Arc<ApiClient>,
    notifier: Notifier,
    busy: BusyIndicator,
}

impl Publisher {
    pub fn new(api: Arc<ApiClient>, notifier: Notifier, busy: BusyIndicator) -> Self {
        Self { api, notifier, busy }
    }

    /// Runs the static build.
    ///
    /// A refused build (missing site info, build error) is returned as a
    /// report with `ok == false`, not as an error.
    pub async fn build(&self) -> Result<BuildReport, AppError> {
        let report = {
            let _busy = self.busy.begin("Building static site...");
            self.api.build().await
        };
        let report = report.inspect_err(|err| self.notifier.report(err))?;
        if report.ok {
            info!("static site built");
            self.notifier.success("✅ Build complete!");
        } else {
            warn!(message = ?report.message, "static build refused");
            let text = report
                .message
                .clone()
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| "❌ Build failed!".to_string());
            self.notifier.error(text);
        }
        Ok(report)
    }

    /// Downloads the zipped build output to `dest` and returns the written path.
    ///
    /// When `dest` is a directory the archive is written inside it under its
    /// default name.
    pub async fn download_output_zip(
        &self,
        dest: &Path,
        default_name: &str,
    ) -> Result<PathBuf, AppError> {
        let is_dir = tokio::fs::metadata(dest)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        let target = if is_dir {
            dest.join(default_name)
        } else {
            dest.to_path_buf()
        };
        let bytes = match self.api.download_output_zip().await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.notifier.error("❌ Error creating ZIP");
                return Err(err);
            }
        };
        if let Err(err) = tokio::fs::write(&target, &bytes).await {
            self.notifier.error("❌ Error creating ZIP");
            return Err(err.into());
        }
        info!(path = %target.display(), bytes = bytes.len(), "output archive saved");
        Ok(target)
    }
}
