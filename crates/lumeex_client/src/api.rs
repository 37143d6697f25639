//! Typed HTTP gateway over the Lumeex admin API.
//!
//! Every method maps one endpoint. Failures are classified once, here:
//! no response at all is [`AppError::Transport`], a non-success answer to a
//! mutation is [`AppError::MutationRejected`], and a GET whose body can not
//! be fetched or decoded is [`AppError::Load`].

use lumeex_core::config::Config;
use lumeex_core::constants::UPLOAD_FIELD;
use lumeex_core::models::item::{CollectionKind, Item};
use lumeex_core::models::theme::{GoogleFont, ThemeInfo};
use lumeex_core::AppError;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Multipart field used by single-file endpoints (fonts, favicon, thumbnail).
const SINGLE_FILE_FIELD: &str = "file";

/// A file to send in a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name sent to the server. May contain a relative folder for theme uploads.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Reads a file from disk, keeping only its file name.
    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AppError::validation(format!("Invalid file name: {}", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { name, bytes })
    }

    fn into_part(self) -> Part {
        Part::bytes(self.bytes).file_name(self.name)
    }
}

/// Generic `{"status": ...}` acknowledgement returned by mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub status: String,
    pub message: Option<String>,
    pub error: Option<String>,
    pub filename: Option<String>,
    pub theme: Option<String>,
    pub uploaded: Vec<String>,
    pub deleted: Option<u64>,
}

impl StatusResponse {
    fn is_error(&self) -> bool {
        self.status.eq_ignore_ascii_case("error")
    }
}

/// Outcome of `POST /api/build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub ok: bool,
    pub message: Option<String>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    src: &'a str,
}

/// Extracts the human-readable reason from an error response body.
pub fn error_message_for_response(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

/// Appends path segments to the server base URL.
pub fn api_url(server: &str, segments: &[&str]) -> Result<Url, AppError> {
    let mut url = Url::parse(server).map_err(|err| {
        AppError::validation(format!("Invalid server URL '{}': {}", server, err))
    })?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| AppError::validation("Server URL cannot be used as an API base"))?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

/// Trims trailing slashes and pins plain-http `localhost` to IPv4 loopback.
pub fn normalize_server(server: &str) -> String {
    let server = server.trim();
    if let Ok(mut url) = Url::parse(server) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server.to_string();
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server.to_string()
}

fn transport_error(err: reqwest::Error) -> AppError {
    AppError::Transport(err.to_string())
}

/// Async client for one Lumeex admin backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    server: String,
}

impl ApiClient {
    /// Builds a client for `server`.
    ///
    /// `timeout` of `None` lets requests run indefinitely.
    pub fn new(server: &str, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(transport_error)?;
        let server = normalize_server(server);
        // Fail early on an unusable base instead of on the first request.
        api_url(&server, &[])?;
        Ok(Self { http, server })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(&config.server_url, config.request_timeout)
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    fn url(&self, segments: &[&str]) -> Result<Url, AppError> {
        api_url(&self.server, segments)
    }

    async fn ensure_success(res: Response) -> Result<Response, AppError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => format!("failed to read error response body: {}", err),
        };
        let message = error_message_for_response(status, &body);
        warn!(status = status.as_u16(), message = %message, "request rejected");
        Err(AppError::rejected(Some(status.as_u16()), Some(message)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let url = self.url(segments)?;
        debug!(%url, "GET");
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| AppError::load(what, err))?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::load(
                what,
                format!("{} ({})", error_message_for_response(status, &body), status),
            ));
        }
        res.json::<T>().await.map_err(|err| AppError::load(what, err))
    }

    async fn acknowledge(res: Response) -> Result<StatusResponse, AppError> {
        let status = res.status();
        let res = Self::ensure_success(res).await?;
        let body = res.text().await.map_err(transport_error)?;
        let ack: StatusResponse = serde_json::from_str(&body).unwrap_or_default();
        if ack.is_error() {
            let message = ack.message.clone().or_else(|| ack.error.clone());
            warn!(status = status.as_u16(), ?message, "request reported an error status");
            return Err(AppError::rejected(Some(status.as_u16()), message));
        }
        Ok(ack)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<StatusResponse, AppError> {
        let url = self.url(segments)?;
        debug!(%url, "POST json");
        let res = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        Self::acknowledge(res).await
    }

    async fn post_empty(&self, segments: &[&str]) -> Result<StatusResponse, AppError> {
        let url = self.url(segments)?;
        debug!(%url, "POST");
        let res = self.http.post(url).send().await.map_err(transport_error)?;
        Self::acknowledge(res).await
    }

    async fn post_form(&self, segments: &[&str], form: Form) -> Result<StatusResponse, AppError> {
        let url = self.url(segments)?;
        debug!(%url, "POST multipart");
        let res = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        Self::acknowledge(res).await
    }

    // Collections

    pub async fn list(&self, kind: CollectionKind) -> Result<Vec<Item>, AppError> {
        self.get_json("images", &["api", kind.api_segment()], &[])
            .await
    }

    /// Overwrites the server copy of the whole collection.
    pub async fn update(&self, kind: CollectionKind, items: &[Item]) -> Result<(), AppError> {
        self.post_json(&["api", kind.api_segment(), "update"], items)
            .await
            .map(drop)
    }

    /// Deletes one stored photo by file name.
    pub async fn delete(&self, kind: CollectionKind, filename: &str) -> Result<(), AppError> {
        self.post_json(
            &["api", kind.api_segment(), "delete"],
            &DeleteRequest { src: filename },
        )
        .await
        .map(drop)
    }

    pub async fn delete_all(&self, kind: CollectionKind) -> Result<StatusResponse, AppError> {
        self.post_empty(&["api", kind.api_segment(), "delete_all"])
            .await
    }

    /// Asks the server to rescan the collection's photo folder.
    pub async fn refresh(&self, kind: CollectionKind) -> Result<(), AppError> {
        self.post_empty(&["api", kind.api_segment(), "refresh"])
            .await
            .map(drop)
    }

    pub async fn upload(
        &self,
        kind: CollectionKind,
        files: Vec<UploadFile>,
    ) -> Result<StatusResponse, AppError> {
        let form = files
            .into_iter()
            .fold(Form::new(), |form, file| form.part(UPLOAD_FIELD, file.into_part()));
        self.post_form(&["api", kind.api_segment(), "upload"], form)
            .await
    }

    // Site info

    pub async fn site_info(&self) -> Result<Value, AppError> {
        self.get_json("site info", &["api", "site-info"], &[]).await
    }

    pub async fn save_site_info(&self, document: &Value) -> Result<(), AppError> {
        self.post_json(&["api", "site-info"], document)
            .await
            .map(drop)
    }

    pub async fn upload_thumbnail(&self, file: UploadFile) -> Result<String, AppError> {
        let form = Form::new().part(SINGLE_FILE_FIELD, file.into_part());
        let ack = self.post_form(&["api", "thumbnail", "upload"], form).await?;
        Ok(ack.filename.unwrap_or_default())
    }

    pub async fn remove_thumbnail(&self) -> Result<(), AppError> {
        self.post_empty(&["api", "thumbnail", "remove"])
            .await
            .map(drop)
    }

    // Themes

    pub async fn themes(&self) -> Result<Vec<String>, AppError> {
        self.get_json("themes", &["api", "themes"], &[]).await
    }

    /// Uploads a theme folder. File names carry the folder-relative path.
    pub async fn upload_theme(&self, files: Vec<UploadFile>) -> Result<StatusResponse, AppError> {
        let form = files
            .into_iter()
            .fold(Form::new(), |form, file| form.part(UPLOAD_FIELD, file.into_part()));
        self.post_form(&["api", "theme", "upload"], form).await
    }

    pub async fn remove_theme(&self, theme: &str) -> Result<(), AppError> {
        self.post_json(&["api", "theme", "remove"], &json!({ "theme": theme }))
            .await
            .map(drop)
    }

    pub async fn theme_info(&self) -> Result<ThemeInfo, AppError> {
        self.get_json("theme", &["api", "theme-info"], &[]).await
    }

    pub async fn save_theme_info(
        &self,
        theme_name: &str,
        theme_yaml: &Value,
    ) -> Result<(), AppError> {
        self.post_json(
            &["api", "theme-info"],
            &json!({ "theme_name": theme_name, "theme_yaml": theme_yaml }),
        )
        .await
        .map(drop)
    }

    /// Replaces only the `google_fonts` list of a theme.
    pub async fn save_google_fonts(
        &self,
        theme_name: &str,
        google_fonts: &[GoogleFont],
    ) -> Result<(), AppError> {
        self.post_json(
            &["api", "theme-google-fonts"],
            &json!({ "theme_name": theme_name, "google_fonts": google_fonts }),
        )
        .await
        .map(drop)
    }

    pub async fn local_fonts(&self, theme: &str) -> Result<Vec<String>, AppError> {
        self.get_json("fonts", &["api", "local-fonts"], &[("theme", theme)])
            .await
    }

    pub async fn upload_font(&self, theme: &str, file: UploadFile) -> Result<String, AppError> {
        let fallback = file.name.clone();
        let form = Form::new()
            .part(SINGLE_FILE_FIELD, file.into_part())
            .text("theme", theme.to_string());
        let ack = self.post_form(&["api", "font", "upload"], form).await?;
        Ok(ack.filename.unwrap_or(fallback))
    }

    pub async fn remove_font(&self, theme: &str, font: &str) -> Result<(), AppError> {
        self.post_json(
            &["api", "font", "remove"],
            &json!({ "theme": theme, "font": font }),
        )
        .await
        .map(drop)
    }

    /// Uploads a favicon and returns the file name the server stored it under.
    pub async fn upload_favicon(&self, theme: &str, file: UploadFile) -> Result<String, AppError> {
        let form = Form::new()
            .part(SINGLE_FILE_FIELD, file.into_part())
            .text("theme", theme.to_string());
        let ack = self.post_form(&["api", "favicon", "upload"], form).await?;
        Ok(ack.filename.unwrap_or_default())
    }

    pub async fn remove_favicon(&self, theme: &str) -> Result<(), AppError> {
        self.post_json(&["api", "favicon", "remove"], &json!({ "theme": theme }))
            .await
            .map(drop)
    }

    // Build

    /// Triggers a static build. A rejected build is a report, not an error.
    pub async fn build(&self) -> Result<BuildReport, AppError> {
        match self.post_empty(&["api", "build"]).await {
            Ok(ack) => Ok(BuildReport {
                ok: ack.status == "ok",
                message: ack.message,
            }),
            Err(AppError::MutationRejected { message, .. }) => {
                Ok(BuildReport { ok: false, message })
            }
            Err(err) => Err(err),
        }
    }

    /// Fetches the zipped build output.
    pub async fn download_output_zip(&self) -> Result<Vec<u8>, AppError> {
        let url = self.url(&["download-output-zip"])?;
        debug!(%url, "POST download");
        let res = self.http.post(url).send().await.map_err(transport_error)?;
        let res = Self::ensure_success(res).await?;
        let bytes = res.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }

    /// File names of the built gallery images, used by the hero rotation.
    pub async fn gallery_feed(&self) -> Result<Vec<String>, AppError> {
        self.get_json("gallery feed", &["data", "gallery.json"], &[])
            .await
    }
}
