//! Site-info and theme section editors against the fake backend.

mod support;

use lumeex_client::notices::notice_channel;
use lumeex_client::{BusyIndicator, DocumentKind, SectionEditor, UploadFile};
use lumeex_core::dirty::SectionStatus;
use lumeex_core::models::site::MenuItem;
use lumeex_core::models::theme::GoogleFont;
use lumeex_core::AppError;
use serde_json::json;
use support::{seeded_backend, spawn_server, spawn_server_with, FakeServer};

fn editor(server: &FakeServer, kind: DocumentKind) -> (SectionEditor, lumeex_client::NoticeBoard) {
    let (notifier, board) = notice_channel();
    (
        SectionEditor::new(kind, server.api(), notifier, BusyIndicator::default()),
        board,
    )
}

fn texts(board: &mut lumeex_client::NoticeBoard) -> Vec<String> {
    board.drain().into_iter().map(|notice| notice.text).collect()
}

#[tokio::test]
async fn incomplete_section_is_refused_without_a_request() {
    let server = spawn_server().await;
    let (mut site, mut board) = editor(&server, DocumentKind::SiteInfo);
    site.load().await.expect("load");
    assert!(site
        .statuses()
        .expect("statuses")
        .iter()
        .all(|(_, status)| *status == SectionStatus::Saved));

    let status = site.set_field("info", "title", json!("")).expect("edit");
    assert_eq!(status, SectionStatus::Incomplete);
    let err = site.save_section("info").await.expect_err("refused");
    assert!(matches!(err, AppError::Validation(_)));
    assert!(server.backend().site_info_posts.is_empty());
    assert_eq!(
        texts(&mut board),
        vec!["❌ Please fill all required fields before saving."]
    );
}

#[tokio::test]
async fn saving_one_section_merges_into_the_loaded_document() {
    let server = spawn_server().await;
    let (mut site, mut board) = editor(&server, DocumentKind::SiteInfo);
    site.load().await.expect("load");

    site.set_field("info", "title", json!("Lumeex Photos"))
        .expect("edit");
    site.set_field("footer", "copyright", json!("© 2030"))
        .expect("edit other section");
    assert_eq!(site.status("info").expect("info"), SectionStatus::Unsaved);

    let status = site.save_section("info").await.expect("save");
    assert_eq!(status, SectionStatus::Saved);
    // The other edited section stays unsaved and was not sent.
    assert_eq!(site.status("footer").expect("footer"), SectionStatus::Unsaved);

    let backend = server.backend();
    assert_eq!(backend.site_info_posts.len(), 1);
    assert_eq!(backend.site_info["info"]["title"], "Lumeex Photos");
    assert_eq!(backend.site_info["footer"]["copyright"], "© 2025");
    assert_eq!(backend.site_info["build"]["theme"], "modern");
    assert!(texts(&mut board).contains(&"✅ Section saved!".to_string()));
}

#[tokio::test]
async fn failed_save_keeps_the_section_unsaved() {
    let server = spawn_server().await;
    let (mut site, mut board) = editor(&server, DocumentKind::SiteInfo);
    site.load().await.expect("load");
    server.fail("site-info/save");

    site.set_field("social", "instagram_url", json!("https://instagram.com/lumeex"))
        .expect("edit");
    assert!(site.save_section("social").await.is_err());
    assert_eq!(site.status("social").expect("social"), SectionStatus::Unsaved);
    assert!(texts(&mut board).contains(&"Error saving section.".to_string()));
}

#[tokio::test]
async fn site_form_helpers_clean_their_input() {
    let server = spawn_server().await;
    let (mut site, _board) = editor(&server, DocumentKind::SiteInfo);
    site.load().await.expect("load");

    site.set_keywords(" photo , ,travel ").expect("keywords");
    assert_eq!(
        site.current("info").expect("info")["keywords"],
        json!(["photo", "travel"])
    );

    site.set_menu_items(vec![
        MenuItem {
            label: "Home".to_string(),
            href: "/".to_string(),
        },
        MenuItem::default(),
    ])
    .expect("menu");
    assert_eq!(site.status("menu").expect("menu"), SectionStatus::Saved);

    assert!(site.set_color("primary", "#000000").is_err());
}

#[tokio::test]
async fn loaded_site_lists_are_cleaned_and_left_unsaved() {
    let mut backend = seeded_backend();
    backend.site_info["info"]["keywords"] = json!([" photo ", "", "travel"]);
    backend.site_info["menu"]["items"] = json!([
        {"label": " Home ", "href": "/"},
        {"label": "", "href": " "}
    ]);
    let server = spawn_server_with(backend).await;
    let (mut site, _board) = editor(&server, DocumentKind::SiteInfo);
    site.load().await.expect("load");

    assert_eq!(
        site.current("info").expect("info")["keywords"],
        json!(["photo", "travel"])
    );
    assert_eq!(
        site.current("menu").expect("menu")["items"],
        json!([{"label": "Home", "href": "/"}])
    );
    assert_eq!(site.status("info").expect("info"), SectionStatus::Unsaved);
    assert_eq!(site.status("menu").expect("menu"), SectionStatus::Unsaved);
    assert_eq!(site.status("legals").expect("legals"), SectionStatus::Saved);

    site.save_section("menu").await.expect("save");
    assert_eq!(
        server.backend().site_info["menu"]["items"],
        json!([{"label": "Home", "href": "/"}])
    );
    assert_eq!(site.status("menu").expect("menu"), SectionStatus::Saved);
}

#[tokio::test]
async fn thumbnail_upload_updates_social_section() {
    let server = spawn_server().await;
    let (mut site, _board) = editor(&server, DocumentKind::SiteInfo);
    site.load().await.expect("load");

    let filename = site
        .upload_thumbnail(UploadFile::new("cover.jpg", b"jpeg".to_vec()))
        .await
        .expect("upload");
    assert_eq!(filename, "thumbnail.png");
    assert_eq!(site.status("social").expect("social"), SectionStatus::Saved);
    assert_eq!(site.document().expect("doc")["social"]["thumbnail"], "thumbnail.png");

    site.remove_thumbnail().await.expect("remove");
    assert_eq!(server.backend().site_info["social"]["thumbnail"], "");
    assert_eq!(site.status("social").expect("social"), SectionStatus::Saved);
}

#[tokio::test]
async fn theme_color_save_posts_theme_name_and_full_yaml() {
    let server = spawn_server().await;
    let (mut theme, _board) = editor(&server, DocumentKind::Theme);
    theme.load().await.expect("load");
    assert_eq!(theme.theme_name(), Some("modern"));

    assert!(matches!(
        theme.set_color("primary", "blue"),
        Err(AppError::Validation(_))
    ));
    assert_eq!(
        theme.set_color("primary", "#111111").expect("color"),
        SectionStatus::Unsaved
    );
    theme.save_section("colors").await.expect("save");

    let backend = server.backend();
    let post = &backend.theme_posts[0];
    assert_eq!(post["theme_name"], "modern");
    assert_eq!(post["theme_yaml"]["colors"]["primary"], "#111111");
    assert_eq!(post["theme_yaml"]["google_fonts"][0]["family"], "Lora");
    assert_eq!(post["theme_yaml"]["favicon"]["path"], "favicon.png");
}

#[tokio::test]
async fn font_fallback_edits_are_saved_as_a_known_family() {
    let server = spawn_server().await;
    let (mut theme, _board) = editor(&server, DocumentKind::Theme);
    theme.load().await.expect("load");

    let status = theme
        .set_field("fonts", "primary.fallback", json!("monospace"))
        .expect("edit");
    assert_eq!(status, SectionStatus::Unsaved);
    assert_eq!(
        theme.current("fonts").expect("fonts")["primary"]["fallback"],
        "sans-serif"
    );
    theme.save_section("fonts").await.expect("save");

    let backend = server.backend();
    let fonts = &backend.theme_posts[0]["theme_yaml"]["fonts"];
    assert_eq!(fonts["primary"]["fallback"], "sans-serif");
    assert_eq!(fonts["secondary"]["fallback"], "sans-serif");
}

#[tokio::test]
async fn pushing_a_google_font_stores_it_once() {
    let server = spawn_server().await;
    let (mut theme, _board) = editor(&server, DocumentKind::Theme);
    theme.load().await.expect("load");

    let fonts = theme
        .push_google_font(GoogleFont {
            family: " Inter ".to_string(),
            weights: vec!["400".to_string(), "700".to_string()],
        })
        .await
        .expect("push");
    assert_eq!(fonts.len(), 2);
    assert_eq!(fonts[1].family, "Inter");
    assert_eq!(
        theme.status("google-fonts").expect("status"),
        SectionStatus::Saved
    );

    let backend = server.backend();
    assert_eq!(backend.google_font_posts.len(), 1);
    assert_eq!(backend.theme_yaml["google_fonts"][1]["weights"], json!(["400", "700"]));
}

#[tokio::test]
async fn google_font_edits_are_stored_immediately() {
    let server = spawn_server().await;
    let (mut theme, _board) = editor(&server, DocumentKind::Theme);
    theme.load().await.expect("load");

    let fonts = theme.add_google_font().await.expect("add");
    assert_eq!(fonts.len(), 2);
    assert_eq!(
        theme.status("google-fonts").expect("status"),
        SectionStatus::Incomplete
    );

    let fonts = theme
        .update_google_font(
            1,
            GoogleFont {
                family: " Inter ".to_string(),
                weights: vec!["400".to_string()],
            },
        )
        .await
        .expect("update");
    assert_eq!(fonts[1].family, "Inter");
    assert_eq!(
        theme.status("google-fonts").expect("status"),
        SectionStatus::Saved
    );
    assert_eq!(server.backend().theme_yaml["google_fonts"][1]["family"], "Inter");

    let fonts = theme.remove_google_font(0).await.expect("remove");
    assert_eq!(fonts, vec![GoogleFont {
        family: "Inter".to_string(),
        weights: vec!["400".to_string()],
    }]);
    assert!(theme.remove_google_font(5).await.is_err());
    assert_eq!(theme.theme_config().expect("config").google_fonts.len(), 1);
}

#[tokio::test]
async fn favicon_upload_and_removal_drive_the_favicon_section() {
    let server = spawn_server().await;
    let (mut theme, mut board) = editor(&server, DocumentKind::Theme);
    theme.load().await.expect("load");

    let err = theme
        .upload_favicon(UploadFile::new("icon.gif", b"gif".to_vec()))
        .await
        .expect_err("bad type");
    assert!(matches!(err, AppError::Validation(_)));
    assert!(texts(&mut board).contains(&"Invalid file type for favicon.".to_string()));

    let filename = theme
        .upload_favicon(UploadFile::new("icon.ICO", b"ico".to_vec()))
        .await
        .expect("upload");
    assert_eq!(filename, "favicon.ico");
    assert_eq!(theme.status("favicon").expect("favicon"), SectionStatus::Saved);

    let status = theme.remove_favicon().await.expect("remove");
    assert_eq!(status, SectionStatus::Incomplete);
    assert_eq!(server.backend().theme_yaml["favicon"]["path"], "");
    assert!(texts(&mut board).contains(&"✅ Favicon removed!".to_string()));
}

#[tokio::test]
async fn editors_refuse_work_before_load() {
    let server = spawn_server().await;
    let (mut theme, _board) = editor(&server, DocumentKind::Theme);
    assert!(theme.status("colors").is_err());
    assert!(theme.set_field("colors", "primary", json!("#000000")).is_err());

    server.fail("theme-info/get");
    assert!(matches!(theme.load().await, Err(AppError::Load { .. })));
}
