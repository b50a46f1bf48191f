use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// Namespace under the upload root for gallery media.
pub const MEDIA_DIR: &str = "media";

/// Profile images are capped at 5 MB per upload.
pub const MAX_PROFILE_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Gallery media (photos/videos from past events) are capped at 50 MB.
pub const MAX_MEDIA_BYTES: usize = 50 * 1024 * 1024;

/// Blob store for uploaded files, rooted at a single directory and addressed
/// by relative paths like "media/7-1712345678901.mp4".
#[derive(Clone)]
pub struct UploadService {
    root: PathBuf,
}

impl UploadService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the upload root and its namespaces. Idempotent.
    pub async fn ensure_directories(&self) -> Result<()> {
        for namespace in [
            crate::avatar::PROFILE_IMAGE_DIR,
            crate::avatar::DEFAULT_AVATAR_DIR,
            MEDIA_DIR,
        ] {
            fs::create_dir_all(self.root.join(namespace))
                .await
                .with_context(|| format!("Failed to create upload directory {namespace}"))?;
        }
        Ok(())
    }

    /// Writes an upload and returns its relative path. Filenames follow the
    /// `{account_id}-{millis}{ext}` scheme so they never collide with other
    /// accounts and sort chronologically.
    pub async fn save(
        &self,
        namespace: &str,
        account_id: i32,
        original_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String> {
        let extension = extension_for(original_name, content_type);
        let filename = format!(
            "{account_id}-{}{}",
            chrono::Utc::now().timestamp_millis(),
            extension
        );
        let relative = format!("{namespace}/{filename}");

        let target = self
            .resolve(&relative)
            .ok_or_else(|| anyhow::anyhow!("Refusing to write outside the upload root"))?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&target, bytes)
            .await
            .with_context(|| format!("Failed to write upload to {}", target.display()))?;

        info!(path = %target.display(), size = bytes.len(), "Stored upload");
        Ok(relative)
    }

    /// Best-effort delete. Missing files are fine; real IO failures are
    /// logged and swallowed so record deletion is never blocked on disk
    /// state.
    pub async fn delete(&self, relative_path: &str) {
        let Some(target) = self.resolve(relative_path) else {
            warn!(path = relative_path, "Skipping delete of suspicious upload path");
            return;
        };

        match fs::remove_file(&target).await {
            Ok(()) => info!(path = %target.display(), "Deleted upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %target.display(), error = %e, "Failed to delete upload"),
        }
    }

    /// Maps a relative path under the root, rejecting traversal components.
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = relative.trim_start_matches('/');
        let path = Path::new(relative);
        let safe = path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative.is_empty() {
            return None;
        }
        Some(self.root.join(path))
    }
}

/// File extension (with leading dot) from the original filename, falling back
/// to the content type, else empty.
fn extension_for(original_name: Option<&str>, content_type: Option<&str>) -> String {
    if let Some(name) = original_name
        && let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str())
    {
        return format!(".{}", ext.to_lowercase());
    }

    if let Some(mime) = content_type
        && let Some(exts) = mime_guess::get_mime_extensions_str(mime)
        && let Some(ext) = exts.first()
    {
        return format!(".{ext}");
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_service() -> UploadService {
        let root = std::env::temp_dir().join(format!("encore-uploads-{}", uuid::Uuid::new_v4()));
        UploadService::new(root)
    }

    #[tokio::test]
    async fn save_writes_under_namespace_and_delete_removes() {
        let service = temp_service();
        service.ensure_directories().await.unwrap();

        let relative = service
            .save(MEDIA_DIR, 7, Some("clip.MP4"), Some("video/mp4"), b"bytes")
            .await
            .unwrap();

        assert!(relative.starts_with("media/7-"));
        assert!(relative.ends_with(".mp4"));
        assert!(service.root().join(&relative).exists());

        service.delete(&relative).await;
        assert!(!service.root().join(&relative).exists());
    }

    #[tokio::test]
    async fn delete_of_missing_file_is_silent() {
        let service = temp_service();
        service.delete("media/does-not-exist.png").await;
    }

    #[test]
    fn traversal_paths_are_rejected() {
        let service = temp_service();
        assert!(service.resolve("../etc/passwd").is_none());
        assert!(service.resolve("media/../../etc/passwd").is_none());
        assert!(service.resolve("").is_none());
        assert!(service.resolve("media/ok.png").is_some());
    }

    #[test]
    fn extension_prefers_filename_then_content_type() {
        assert_eq!(extension_for(Some("photo.PNG"), Some("image/jpeg")), ".png");
        assert_eq!(extension_for(Some("noext"), Some("image/png")), ".png");
        assert_eq!(extension_for(None, None), "");
    }
}
