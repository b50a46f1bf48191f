//! Default avatar selection and profile image path handling.
//!
//! When an account has no stored image, a default avatar is picked from a
//! fixed catalog by hashing a stable seed (the account email). The same seed
//! always maps to the same file, across calls and process restarts, so a
//! user's assigned avatar never shuffles.

/// Namespace under the upload root holding the shipped default avatars.
pub const DEFAULT_AVATAR_DIR: &str = "default-avatars";

/// Namespace for user-uploaded profile images. Only files under this prefix
/// are deleted when an account is removed.
pub const PROFILE_IMAGE_DIR: &str = "profile-images";

/// Seed used when the caller has no usable seed at all.
const FALLBACK_SEED: &str = "default";

/// Fixed, ordered catalog. Order matters: the hash indexes into it.
pub const DEFAULT_AVATARS: [&str; 11] = [
    "avatar-01.png",
    "avatar-02.png",
    "avatar-03.png",
    "avatar-04.png",
    "avatar-05.png",
    "avatar-06.png",
    "avatar-07.png",
    "avatar-08.png",
    "avatar-09.png",
    "avatar-10.png",
    "avatar-11.png",
];

/// 32-bit multiplicative polynomial hash over UTF-16 code units, wrapping on
/// overflow. Not a general-purpose hash; the only requirement is stability.
fn seed_hash(seed: &str) -> u32 {
    seed.encode_utf16()
        .fold(0u32, |hash, unit| {
            hash.wrapping_mul(31).wrapping_add(u32::from(unit))
        })
}

/// Deterministic default avatar path for a seed.
#[must_use]
pub fn default_avatar_path(seed: &str) -> String {
    let seed = if seed.is_empty() { FALLBACK_SEED } else { seed };
    let index = seed_hash(seed) as usize % DEFAULT_AVATARS.len();
    format!("{DEFAULT_AVATAR_DIR}/{}", DEFAULT_AVATARS[index])
}

/// Effective avatar path: the stored path when present (normalized), else
/// the deterministic default for the seed.
#[must_use]
pub fn resolve_avatar_path(stored: Option<&str>, seed: &str) -> String {
    match stored.map(normalize_stored_path).filter(|p| !p.is_empty()) {
        Some(path) => path,
        None => default_avatar_path(seed),
    }
}

/// Strips a redundant storage-root prefix so stored paths are always a plain
/// relative path like "profile-images/7-1712345678901.png".
fn normalize_stored_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    trimmed
        .strip_prefix("uploads/")
        .unwrap_or(trimmed)
        .to_string()
}

/// True when the path points at a user upload rather than a shared default.
#[must_use]
pub fn is_custom_upload(path: &str) -> bool {
    normalize_stored_path(path).starts_with(&format!("{PROFILE_IMAGE_DIR}/"))
}

/// Web URL for a relative upload path.
#[must_use]
pub fn public_url(relative_path: &str) -> String {
    format!("/uploads/{relative_path}")
}

/// Resolved avatar as a web URL.
#[must_use]
pub fn avatar_url(stored: Option<&str>, seed: &str) -> String {
    public_url(&resolve_avatar_path(stored, seed))
}
