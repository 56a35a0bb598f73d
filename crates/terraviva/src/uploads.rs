use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

pub const MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Relative path segment stored in the database and served by the static
/// file host.
const PUBLIC_PREFIX: &str = "uploads";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("upload storage unavailable: {0}")]
    Io(#[from] std::io::Error),
}

/// One in-memory file received from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Validation rules plus the directory accepted files are written to.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadPolicy {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Extension check, case-insensitive. A name without an extension is
    /// never accepted.
    pub fn accepts(&self, filename: &str) -> bool {
        let Some((_, extension)) = filename.rsplit_once('.') else {
            return false;
        };
        ALLOWED_IMAGE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
    }

    /// Writes each acceptable file under a collision-proof name and returns
    /// the stored relative paths in input order. Files failing validation
    /// (empty name, disallowed extension, oversize) are skipped silently;
    /// only filesystem trouble is an error.
    pub fn store_images(&self, uploads: &[ImageUpload]) -> Result<Vec<String>, UploadError> {
        let mut stored = Vec::new();
        if uploads.is_empty() {
            return Ok(stored);
        }

        fs::create_dir_all(&self.dir)?;
        for upload in uploads {
            if upload.filename.is_empty() || !self.accepts(&upload.filename) {
                continue;
            }
            if upload.bytes.len() > self.max_bytes {
                continue;
            }

            let unique = format!(
                "{}_{}",
                Uuid::new_v4().simple(),
                sanitize_filename(&upload.filename)
            );
            fs::write(self.dir.join(&unique), &upload.bytes)?;
            stored.push(format!("{PUBLIC_PREFIX}/{unique}"));
        }
        Ok(stored)
    }
}

/// Strips any path components and replaces everything outside
/// `[A-Za-z0-9._-]` with underscores.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
