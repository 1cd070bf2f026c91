//! Upload path derivation for user-supplied images.

use uuid::Uuid;

/// Derive a storage path for an uploaded image.
///
/// The path is `uploads/{kind}/{slug}-{uuid}.{ext}` where `slug` is derived
/// from a human-readable label (post title, user email) and the UUID keeps
/// paths unique across uploads with the same label.
#[must_use]
pub fn upload_path(kind: &str, label: &str, original_name: &str) -> String {
    // Extract extension from original name
    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && !ext.is_empty())
        .unwrap_or("bin");

    format!("uploads/{}/{}-{}.{}", kind, slugify(label), Uuid::new_v4(), extension)
}

/// Lowercase a label and collapse non-alphanumeric runs into single hyphens.
fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut last_was_hyphen = true;

    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() { "file".to_string() } else { slug }
}
