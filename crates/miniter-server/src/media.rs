//! On-disk storage for uploaded profile pictures.
//!
//! Files live under `<media_path>/profile_image/<user_id>.<ext>` and are
//! served back under the configured public base URL.

use std::path::{Component, Path, PathBuf};

use miniter_shared::constants::PROFILE_IMAGE_DIR;
use miniter_shared::UserId;
use tokio::fs;
use tracing::{debug, info};

use crate::error::ServerError;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Verify that a resolved path stays within the expected base directory.
fn ensure_within(base: &Path, target: &Path) -> Result<PathBuf, ServerError> {
    let mut resolved = base.to_path_buf();
    for component in target.strip_prefix(base).unwrap_or(target).components() {
        match component {
            Component::Normal(c) => resolved.push(c),
            Component::ParentDir => {
                return Err(ServerError::BadRequest("Path traversal detected".to_string()));
            }
            _ => {} // RootDir, CurDir, Prefix: skip
        }
    }
    if !resolved.starts_with(base) {
        return Err(ServerError::BadRequest("Path traversal detected".to_string()));
    }
    Ok(resolved)
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    base_path: PathBuf,
    base_url: String,
    max_size: usize,
}

impl MediaStore {
    pub async fn new(
        base_path: PathBuf,
        base_url: String,
        max_size: usize,
    ) -> Result<Self, ServerError> {
        let image_dir = base_path.join(PROFILE_IMAGE_DIR);
        fs::create_dir_all(&image_dir).await.map_err(|e| {
            ServerError::Internal(format!(
                "Failed to create media directory '{}': {}",
                image_dir.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Media store initialized");

        Ok(Self {
            base_path,
            base_url,
            max_size,
        })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Write a user's profile picture, replacing any previous upload with
    /// the same extension. Returns the stored file name.
    pub async fn store_profile_picture(
        &self,
        user_id: UserId,
        original_name: Option<&str>,
        data: &[u8],
    ) -> Result<String, ServerError> {
        if data.is_empty() {
            return Err(ServerError::BadRequest("Empty file".to_string()));
        }
        if data.len() > self.max_size {
            debug!(user_id = %user_id, size = data.len(), "Rejected oversized profile picture");
            return Err(ServerError::PayloadTooLarge { max: self.max_size });
        }

        let ext = image_extension(original_name)?;
        let file_name = format!("{user_id}.{ext}");
        let path = self.safe_image_path(&file_name)?;

        self.remove_other_uploads(user_id, &ext).await?;

        fs::write(&path, data).await.map_err(|e| {
            ServerError::Internal(format!("Failed to write {}: {}", path.display(), e))
        })?;

        debug!(user_id = %user_id, file = %file_name, size = data.len(), "Stored profile picture");
        Ok(file_name)
    }

    /// Delete the user's pictures stored under any extension but `keep`.
    async fn remove_other_uploads(&self, user_id: UserId, keep: &str) -> Result<(), ServerError> {
        for ext in ALLOWED_EXTENSIONS.iter().filter(|e| **e != keep) {
            let path = self.safe_image_path(&format!("{user_id}.{ext}"))?;
            match fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(user_id = %user_id, file = %path.display(), "Removed previous profile picture")
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ServerError::Internal(format!(
                        "Failed to remove {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }
        Ok(())
    }

    pub async fn read_profile_picture(&self, file_name: &str) -> Result<Vec<u8>, ServerError> {
        let path = self.safe_image_path(file_name)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ServerError::NotFound(format!("No such image: {file_name}")));
        }

        fs::read(&path).await.map_err(|e| {
            ServerError::Internal(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    /// Public URL of a stored profile picture.
    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}{}/{}", self.base_url, PROFILE_IMAGE_DIR, file_name)
    }

    fn safe_image_path(&self, file_name: &str) -> Result<PathBuf, ServerError> {
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.contains("..")
        {
            return Err(ServerError::BadRequest("Invalid file name".to_string()));
        }
        let target = self.base_path.join(PROFILE_IMAGE_DIR).join(file_name);
        ensure_within(&self.base_path, &target)
    }
}

/// Lower-cased image extension of an uploaded file name.
fn image_extension(original_name: Option<&str>) -> Result<String, ServerError> {
    let ext = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| ServerError::BadRequest("File name has no extension".to_string()))?;

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ServerError::BadRequest(format!(
            "Unsupported image type: .{ext}"
        )));
    }
    Ok(ext)
}

/// MIME type for a stored image, by extension.
pub fn content_type(file_name: &str) -> &'static str {
    match Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
    {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
