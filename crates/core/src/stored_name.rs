//! Stored-name derivation for uploaded files.
//!
//! Two uploads with the same original name must never share a blob key.
//! Uniqueness comes from a random UUID suffix, not from locking.

use uuid::Uuid;

const MAX_STEM_LEN: usize = 64;
const MAX_EXT_LEN: usize = 16;

fn sanitize(part: &str, max_len: usize) -> String {
    part.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(max_len)
        .collect()
}

/// Derive a collision-resistant blob key from a client-supplied file name.
///
/// The key keeps a sanitized stem and extension so stored files stay
/// recognizable on disk, e.g. `paper.pdf` -> `paper-<uuid>.pdf`.
pub fn stored_name_for(original: &str) -> String {
    // Clients may send a full path; only the last component matters.
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    };

    let mut stem = sanitize(stem, MAX_STEM_LEN);
    if stem.is_empty() {
        stem = "file".to_string();
    }
    let suffix = Uuid::new_v4().simple();

    match ext.map(|e| sanitize(e, MAX_EXT_LEN).to_ascii_lowercase()) {
        Some(ext) if !ext.is_empty() => format!("{stem}-{suffix}.{ext}"),
        _ => format!("{stem}-{suffix}"),
    }
}
