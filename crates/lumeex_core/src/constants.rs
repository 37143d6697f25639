//! Shared constants used across Lumeex crates.

use std::time::Duration;

/// Default base URL of the Lumeex admin backend.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Default port of the static preview server.
pub const DEFAULT_PREVIEW_PORT: u16 = 3000;

/// Delay between a tag input losing focus and its pending text being discarded.
pub const BLUR_GRACE: Duration = Duration::from_millis(150);

/// How long a notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_millis(3_000);
/// Upper bound on notices kept on the board at once.
pub const NOTICE_LIMIT: usize = 4;

/// Interval between hero background changes on the public site.
pub const HERO_ROTATION_INTERVAL: Duration = Duration::from_millis(7_000);

/// Query parameter holding the active tag filter.
pub const TAG_QUERY_KEY: &str = "tag";

/// Photo extensions accepted by the gallery and hero upload endpoints.
pub const PHOTO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
/// Local font extensions accepted by the font upload endpoint.
pub const FONT_EXTENSIONS: &[&str] = &["woff", "woff2"];
/// Extensions stripped from local font file names for display.
pub const FONT_DISPLAY_EXTENSIONS: &[&str] = &["woff2", "woff", "ttf", "otf"];
/// Favicon extensions accepted by the favicon upload endpoint.
pub const FAVICON_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "ico"];

/// Bundled themes that cannot be removed.
pub const DEFAULT_THEMES: &[&str] = &["modern", "classic"];

/// File name used when saving the built site archive.
pub const OUTPUT_ZIP_NAME: &str = "site_output.zip";

/// Multipart field name used by every upload endpoint.
pub const UPLOAD_FIELD: &str = "files";
