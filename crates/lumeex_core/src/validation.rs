//! Client-side checks run before anything is sent to the server.

use crate::constants::{FAVICON_EXTENSIONS, FONT_EXTENSIONS, PHOTO_EXTENSIONS};
use crate::error::AppError;
use std::path::Path;

/// Lowercased extension of `name`, without the dot.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

pub fn has_allowed_extension(name: &str, allowed: &[&str]) -> bool {
    extension_of(name).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

fn ensure_extension(name: &str, allowed: &[&str], message: &str) -> Result<(), AppError> {
    if has_allowed_extension(name, allowed) {
        Ok(())
    } else {
        Err(AppError::validation(format!("{}: {}", message, name)))
    }
}

pub fn ensure_photo_file(name: &str) -> Result<(), AppError> {
    ensure_extension(name, PHOTO_EXTENSIONS, "❌ File type not allowed")
}

pub fn ensure_font_file(name: &str) -> Result<(), AppError> {
    ensure_extension(
        name,
        FONT_EXTENSIONS,
        "❌ Only .woff and .woff2 fonts are allowed",
    )
}

pub fn ensure_favicon_file(name: &str) -> Result<(), AppError> {
    ensure_extension(name, FAVICON_EXTENSIONS, "❌ Invalid file type")
}

/// `#RRGGBB`, case-insensitive.
pub fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn ensure_hex_color(value: &str) -> Result<(), AppError> {
    if is_hex_color(value) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "❌ Invalid color '{}', expected #RRGGBB",
            value
        )))
    }
}
