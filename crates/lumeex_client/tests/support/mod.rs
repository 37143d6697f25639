//! In-process fake Lumeex backend shared by the integration tests.
//!
//! Holds everything in memory behind one mutex, records the order in which
//! collection writes complete, and lets tests inject failures and delays.

#![allow(dead_code)]

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use lumeex_client::notices::{notice_channel, BusyIndicator, NoticeBoard, Notifier};
use lumeex_client::{ApiClient, CollectionStore, SyncQueue};
use lumeex_core::config::Config;
use lumeex_core::{CollectionKind, Item};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct Backend {
    pub gallery: Vec<Item>,
    pub hero: Vec<Item>,
    /// Photo files on "disk", per collection segment.
    pub files: HashMap<&'static str, Vec<String>>,
    pub site_info: Value,
    pub themes: Vec<String>,
    pub theme_name: String,
    pub theme_yaml: Value,
    pub fonts: Vec<String>,
    pub build_error: Option<String>,
    pub zip: Vec<u8>,
    pub gallery_feed: Vec<String>,
    /// Route labels (`gallery/list`, `site-info/save`) that answer 500.
    pub failing: HashSet<String>,
    /// Delays applied to successive collection updates, in arrival order.
    pub update_delays: VecDeque<Duration>,
    pub updates_in_flight: usize,
    pub max_updates_in_flight: usize,
    /// Completed collection updates: segment and payload, in completion order.
    pub update_log: Vec<(&'static str, Vec<Item>)>,
    pub site_info_posts: Vec<Value>,
    pub theme_posts: Vec<Value>,
    pub google_font_posts: Vec<Value>,
}

impl Backend {
    pub fn items(&self, segment: &str) -> &Vec<Item> {
        if segment == "hero" {
            &self.hero
        } else {
            &self.gallery
        }
    }

    fn items_mut(&mut self, segment: &str) -> &mut Vec<Item> {
        if segment == "hero" {
            &mut self.hero
        } else {
            &mut self.gallery
        }
    }

    fn fails(&self, label: &str) -> bool {
        self.failing.contains(label)
    }
}

pub type SharedBackend = Arc<Mutex<Backend>>;

pub struct FakeServer {
    pub url: String,
    pub state: SharedBackend,
}

impl FakeServer {
    pub fn backend(&self) -> MutexGuard<'_, Backend> {
        self.state.lock().expect("backend lock")
    }

    pub fn fail(&self, label: &str) {
        self.backend().failing.insert(label.to_string());
    }

    pub fn recover(&self, label: &str) {
        self.backend().failing.remove(label);
    }

    pub fn config(&self) -> Config {
        Config {
            server_url: self.url.clone(),
            request_timeout: Some(Duration::from_secs(10)),
            ..Config::default()
        }
    }

    pub fn api(&self) -> Arc<ApiClient> {
        Arc::new(ApiClient::new(&self.url, Some(Duration::from_secs(10))).expect("api client"))
    }

    /// A store wired to this server, with its notice board.
    pub fn store(&self, kind: CollectionKind) -> (CollectionStore, NoticeBoard, BusyIndicator) {
        let (notifier, board) = notice_channel();
        let busy = BusyIndicator::default();
        let queue = SyncQueue::start(kind, self.api(), notifier.clone());
        (CollectionStore::new(queue, notifier, busy.clone()), board, busy)
    }

    pub fn notifier(&self) -> (Notifier, NoticeBoard) {
        notice_channel()
    }
}

pub fn seeded_backend() -> Backend {
    let mut files = HashMap::new();
    files.insert("gallery", vec!["a.jpg".to_string(), "b.jpg".to_string(), "c.jpg".to_string()]);
    files.insert("hero", vec!["h1.jpg".to_string(), "h2.jpg".to_string()]);
    Backend {
        gallery: vec![
            Item::with_tags("gallery/a.jpg", ["beach", "sunset"]),
            Item::with_tags("gallery/b.jpg", ["beach"]),
            Item::new("gallery/c.jpg"),
        ],
        hero: vec![Item::new("hero/h1.jpg"), Item::new("hero/h2.jpg")],
        files,
        site_info: json!({
            "info": {
                "title": "Lumeex",
                "subtitle": "Photos",
                "description": "A photo gallery",
                "canonical": "https://photos.example",
                "keywords": ["photo", "gallery"],
                "author": "Admin"
            },
            "social": {"instagram_url": "", "thumbnail": ""},
            "menu": {"items": [{"label": "Home", "href": "/"}]},
            "footer": {"copyright": "© 2025", "legal_label": "Legal"},
            "legals": {
                "hoster_name": "Host",
                "hoster_adress": "Street",
                "hoster_contact": "host@example.com",
                "intellectual_property": [{"paragraph": "All rights reserved."}]
            },
            "build": {"theme": "modern", "convert_images": true, "resize_images": true}
        }),
        themes: vec!["classic".to_string(), "modern".to_string()],
        theme_name: "modern".to_string(),
        theme_yaml: json!({
            "colors": {
                "primary": "#0065a1",
                "primary_dark": "#005384",
                "secondary": "#00b0f0",
                "accent": "#ffc700",
                "text_dark": "#616161",
                "background": "#ffffff",
                "browser_color": "#ffffff"
            },
            "google_fonts": [{"family": "Lora", "weights": ["400", "700"]}],
            "fonts": {
                "primary": {"name": "Lora", "fallback": "serif"},
                "secondary": {"name": "Inter", "fallback": "sans-serif"}
            },
            "favicon": {"path": "favicon.png"}
        }),
        fonts: vec!["Inter.woff2".to_string()],
        zip: b"PK\x03\x04fake-zip".to_vec(),
        gallery_feed: vec!["a.jpg".to_string(), "b.jpg".to_string()],
        ..Backend::default()
    }
}

pub async fn spawn_server() -> FakeServer {
    spawn_server_with(seeded_backend()).await
}

pub async fn spawn_server_with(backend: Backend) -> FakeServer {
    let state: SharedBackend = Arc::new(Mutex::new(backend));
    let app = Router::new()
        .merge(collection_routes("gallery"))
        .merge(collection_routes("hero"))
        .route("/api/site-info", get(get_site_info).post(save_site_info))
        .route("/api/thumbnail/upload", post(upload_thumbnail))
        .route("/api/thumbnail/remove", post(remove_thumbnail))
        .route("/api/themes", get(list_themes))
        .route("/api/theme/upload", post(upload_theme))
        .route("/api/theme/remove", post(remove_theme))
        .route("/api/theme-info", get(get_theme_info).post(save_theme_info))
        .route("/api/theme-google-fonts", post(save_google_fonts))
        .route("/api/local-fonts", get(local_fonts))
        .route("/api/font/upload", post(upload_font))
        .route("/api/font/remove", post(remove_font))
        .route("/api/favicon/upload", post(upload_favicon))
        .route("/api/favicon/remove", post(remove_favicon))
        .route("/api/build", post(build))
        .route("/download-output-zip", post(download_zip))
        .route("/data/gallery.json", get(gallery_feed))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake backend");
    });
    FakeServer {
        url: format!("http://{}", addr),
        state,
    }
}

fn lock(state: &SharedBackend) -> MutexGuard<'_, Backend> {
    state.lock().expect("backend lock")
}

fn ok() -> Response {
    Json(json!({"status": "ok"})).into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}

fn injected() -> Response {
    error(StatusCode::INTERNAL_SERVER_ERROR, "injected failure")
}

/// Reads a multipart body into (field name, file name or text value, bytes).
async fn read_parts(mut multipart: Multipart) -> Vec<(String, String, Vec<u8>)> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.expect("field bytes").to_vec();
        let label = file_name.unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
        parts.push((name, label, bytes));
    }
    parts
}

fn collection_routes(segment: &'static str) -> Router<SharedBackend> {
    Router::new()
        .route(
            &format!("/api/{}", segment),
            get(move |State(state): State<SharedBackend>| async move {
                let backend = lock(&state);
                if backend.fails(&format!("{}/list", segment)) {
                    return injected();
                }
                Json(backend.items(segment).clone()).into_response()
            }),
        )
        .route(
            &format!("/api/{}/update", segment),
            post(
                move |State(state): State<SharedBackend>, Json(items): Json<Vec<Item>>| async move {
                    let delay = {
                        let mut backend = lock(&state);
                        if backend.fails(&format!("{}/update", segment)) {
                            return injected();
                        }
                        backend.updates_in_flight += 1;
                        backend.max_updates_in_flight =
                            backend.max_updates_in_flight.max(backend.updates_in_flight);
                        backend.update_delays.pop_front()
                    };
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    let mut backend = lock(&state);
                    backend.updates_in_flight -= 1;
                    *backend.items_mut(segment) = items.clone();
                    backend.update_log.push((segment, items));
                    ok()
                },
            ),
        )
        .route(
            &format!("/api/{}/delete", segment),
            post(
                move |State(state): State<SharedBackend>, Json(body): Json<Value>| async move {
                    let mut backend = lock(&state);
                    if backend.fails(&format!("{}/delete", segment)) {
                        return injected();
                    }
                    let src = body.get("src").and_then(Value::as_str).unwrap_or_default();
                    let files = backend.files.entry(segment).or_default();
                    match files.iter().position(|name| name == src) {
                        Some(pos) => {
                            files.remove(pos);
                            ok()
                        }
                        None => error(StatusCode::NOT_FOUND, "❌ File not found"),
                    }
                },
            ),
        )
        .route(
            &format!("/api/{}/delete_all", segment),
            post(move |State(state): State<SharedBackend>| async move {
                let mut backend = lock(&state);
                if backend.fails(&format!("{}/delete_all", segment)) {
                    return injected();
                }
                let deleted = backend.files.entry(segment).or_default().drain(..).count();
                backend.items_mut(segment).clear();
                Json(json!({"status": "ok", "deleted": deleted})).into_response()
            }),
        )
        .route(
            &format!("/api/{}/refresh", segment),
            post(move |State(state): State<SharedBackend>| async move {
                let mut backend = lock(&state);
                if backend.fails(&format!("{}/refresh", segment)) {
                    return injected();
                }
                let files = backend.files.get(segment).cloned().unwrap_or_default();
                let known = backend.items(segment).clone();
                let refreshed = files
                    .iter()
                    .map(|name| {
                        let src = format!("{}/{}", segment, name);
                        known
                            .iter()
                            .find(|item| item.src == src)
                            .cloned()
                            .unwrap_or_else(|| Item::new(src))
                    })
                    .collect();
                *backend.items_mut(segment) = refreshed;
                ok()
            }),
        )
        .route(
            &format!("/api/{}/upload", segment),
            post(
                move |State(state): State<SharedBackend>, multipart: Multipart| async move {
                    let parts = read_parts(multipart).await;
                    let mut backend = lock(&state);
                    if backend.fails(&format!("{}/upload", segment)) {
                        return injected();
                    }
                    let uploaded: Vec<String> = parts
                        .into_iter()
                        .filter(|(field, _, _)| field == "files")
                        .map(|(_, name, _)| name)
                        .collect();
                    backend
                        .files
                        .entry(segment)
                        .or_default()
                        .extend(uploaded.iter().cloned());
                    Json(json!({"status": "ok", "uploaded": uploaded})).into_response()
                },
            ),
        )
}

async fn get_site_info(State(state): State<SharedBackend>) -> Response {
    let backend = lock(&state);
    if backend.fails("site-info/get") {
        return injected();
    }
    Json(backend.site_info.clone()).into_response()
}

async fn save_site_info(State(state): State<SharedBackend>, Json(body): Json<Value>) -> Response {
    let mut backend = lock(&state);
    if backend.fails("site-info/save") {
        return injected();
    }
    backend.site_info_posts.push(body.clone());
    backend.site_info = body;
    ok()
}

async fn upload_thumbnail(State(state): State<SharedBackend>, multipart: Multipart) -> Response {
    let parts = read_parts(multipart).await;
    if !parts.iter().any(|(field, _, _)| field == "file") {
        return error(StatusCode::BAD_REQUEST, "❌ No file provided");
    }
    let mut backend = lock(&state);
    backend.site_info["social"]["thumbnail"] = json!("thumbnail.png");
    Json(json!({"status": "ok", "filename": "thumbnail.png"})).into_response()
}

async fn remove_thumbnail(State(state): State<SharedBackend>) -> Response {
    let mut backend = lock(&state);
    backend.site_info["social"]["thumbnail"] = json!("");
    ok()
}

async fn list_themes(State(state): State<SharedBackend>) -> Response {
    Json(lock(&state).themes.clone()).into_response()
}

async fn upload_theme(State(state): State<SharedBackend>, multipart: Multipart) -> Response {
    let parts = read_parts(multipart).await;
    let Some((_, first, _)) = parts.iter().find(|(field, _, _)| field == "files") else {
        return error(StatusCode::BAD_REQUEST, "❌ No files provided");
    };
    let theme = first
        .split_once('/')
        .map(|(folder, _)| folder.to_string())
        .unwrap_or_else(|| "custom".to_string());
    let mut backend = lock(&state);
    if !backend.themes.contains(&theme) {
        backend.themes.push(theme.clone());
    }
    Json(json!({"status": "ok", "theme": theme})).into_response()
}

async fn remove_theme(State(state): State<SharedBackend>, Json(body): Json<Value>) -> Response {
    let theme = body.get("theme").and_then(Value::as_str).unwrap_or_default();
    let mut backend = lock(&state);
    let Some(pos) = backend.themes.iter().position(|name| name == theme) else {
        return error(StatusCode::NOT_FOUND, "❌ Theme not found");
    };
    if theme == "modern" || theme == "classic" {
        return error(StatusCode::BAD_REQUEST, "❌ Cannot remove default theme");
    }
    backend.themes.remove(pos);
    ok()
}

async fn get_theme_info(State(state): State<SharedBackend>) -> Response {
    let backend = lock(&state);
    if backend.fails("theme-info/get") {
        return injected();
    }
    Json(json!({
        "theme_name": backend.theme_name,
        "theme_yaml": backend.theme_yaml,
        "google_fonts": backend.theme_yaml.get("google_fonts").cloned().unwrap_or(json!([])),
    }))
    .into_response()
}

async fn save_theme_info(State(state): State<SharedBackend>, Json(body): Json<Value>) -> Response {
    let mut backend = lock(&state);
    if backend.fails("theme-info/save") {
        return injected();
    }
    backend.theme_posts.push(body.clone());
    backend.theme_yaml = body.get("theme_yaml").cloned().unwrap_or(Value::Null);
    ok()
}

async fn save_google_fonts(
    State(state): State<SharedBackend>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = lock(&state);
    backend.google_font_posts.push(body.clone());
    let fonts = body.get("google_fonts").cloned().unwrap_or_else(|| json!([]));
    backend.theme_yaml["google_fonts"] = fonts;
    ok()
}

async fn local_fonts(
    State(state): State<SharedBackend>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let backend = lock(&state);
    if query.get("theme") != Some(&backend.theme_name) {
        return Json(Vec::<String>::new()).into_response();
    }
    Json(backend.fonts.clone()).into_response()
}

async fn upload_font(State(state): State<SharedBackend>, multipart: Multipart) -> Response {
    let parts = read_parts(multipart).await;
    let Some((_, filename, _)) = parts.into_iter().find(|(field, _, _)| field == "file") else {
        return error(StatusCode::BAD_REQUEST, "❌ Missing theme or font");
    };
    let mut backend = lock(&state);
    if backend.fails("font/upload") {
        return injected();
    }
    backend.fonts.push(filename.clone());
    Json(json!({"status": "ok", "filename": filename})).into_response()
}

async fn remove_font(State(state): State<SharedBackend>, Json(body): Json<Value>) -> Response {
    let font = body.get("font").and_then(Value::as_str).unwrap_or_default();
    let mut backend = lock(&state);
    match backend.fonts.iter().position(|name| name == font) {
        Some(pos) => {
            backend.fonts.remove(pos);
            ok()
        }
        None => error(StatusCode::NOT_FOUND, "❌ Font not found"),
    }
}

async fn upload_favicon(State(state): State<SharedBackend>, multipart: Multipart) -> Response {
    let parts = read_parts(multipart).await;
    let Some((_, name, _)) = parts.into_iter().find(|(field, _, _)| field == "file") else {
        return error(StatusCode::BAD_REQUEST, "❌ Missing file or theme");
    };
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()).unwrap_or_default();
    let filename = format!("favicon.{}", ext);
    let mut backend = lock(&state);
    backend.theme_yaml["favicon"]["path"] = json!(filename);
    Json(json!({"status": "ok", "filename": filename})).into_response()
}

async fn remove_favicon(State(state): State<SharedBackend>) -> Response {
    let mut backend = lock(&state);
    backend.theme_yaml["favicon"]["path"] = json!("");
    ok()
}

async fn build(State(state): State<SharedBackend>) -> Response {
    let backend = lock(&state);
    match &backend.build_error {
        Some(message) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "message": message})),
        )
            .into_response(),
        None => ok(),
    }
}

async fn download_zip(State(state): State<SharedBackend>) -> Response {
    let backend = lock(&state);
    if backend.fails("download") {
        return injected();
    }
    backend.zip.clone().into_response()
}

async fn gallery_feed(State(state): State<SharedBackend>) -> Response {
    Json(lock(&state).gallery_feed.clone()).into_response()
}
