use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use chrono::Utc;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    ProfilePhoto,
    FoodImage,
}

impl UploadKind {
    fn prefix(self) -> &'static str {
        match self {
            UploadKind::ProfilePhoto => "profile",
            UploadKind::FoodImage => "food",
        }
    }

    fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            UploadKind::ProfilePhoto => &["jpeg", "jpg", "png", "gif"],
            UploadKind::FoodImage => &["jpeg", "jpg", "png"],
        }
    }

    pub fn max_bytes(self) -> usize {
        match self {
            UploadKind::ProfilePhoto => 5 * 1024 * 1024,
            UploadKind::FoodImage => 10 * 1024 * 1024,
        }
    }

    fn rejection(self) -> &'static str {
        match self {
            UploadKind::ProfilePhoto => "Only image files are allowed (jpeg, jpg, png, gif)",
            UploadKind::FoodImage => "Only image files are allowed (jpeg, jpg, png)",
        }
    }
}

/// One uploaded file as received from a multipart field.
#[derive(Debug)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Upload {
    /// Reads the first field called `field` and drops every other part.
    pub async fn from_multipart(multipart: &mut Multipart, field: &str) -> AppResult<Option<Self>> {
        while let Some(part) = multipart.next_field().await? {
            if part.name() != Some(field) {
                continue;
            }
            let file_name = part.file_name().map(str::to_string);
            let content_type = part.content_type().map(str::to_string);
            let data = part.bytes().await?.to_vec();
            return Ok(Some(Self {
                file_name,
                content_type,
                data,
            }));
        }
        Ok(None)
    }
}

/// Flat directory of user-uploaded images.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub async fn open(dir: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!(path = %dir.display(), "Upload directory ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validates and writes `upload`, returning its public URL.
    pub async fn save(&self, kind: UploadKind, owner: Uuid, upload: &Upload) -> AppResult<String> {
        let ext = check(kind, upload)?;
        let name = format!(
            "{}-{}-{}.{}",
            kind.prefix(),
            owner,
            Utc::now().timestamp_millis(),
            ext
        );
        fs::write(self.dir.join(&name), &upload.data)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to store upload: {}", e)))?;
        Ok(format!("{}/{}", PUBLIC_PREFIX, name))
    }
}

/// Returns the lowercased extension to store the file under.
fn check(kind: UploadKind, upload: &Upload) -> AppResult<String> {
    if upload.data.is_empty() {
        return Err(AppError::Validation("No file uploaded".into()));
    }
    if upload.data.len() > kind.max_bytes() {
        return Err(AppError::Validation(format!(
            "File too large (max {} MB)",
            kind.max_bytes() / (1024 * 1024)
        )));
    }

    let ext = upload
        .file_name
        .as_deref()
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| kind.allowed_extensions().contains(&e.as_str()))
        .ok_or_else(|| AppError::Validation(kind.rejection().into()))?;

    let mime_ok = match upload.content_type.as_deref() {
        Some(mime) => mime
            .strip_prefix("image/")
            .map_or(false, |sub| kind.allowed_extensions().contains(&sub)),
        None => true,
    };
    if !mime_ok {
        return Err(AppError::Validation(kind.rejection().into()));
    }
    Ok(ext)
}
