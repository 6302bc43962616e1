//! src/services/upload_service.rs
//!
//! UploadService — the multipart staging and relocation pipeline. File parts
//! are streamed into a staging directory first, then copied into the public
//! upload folder and deleted from staging. Copy-then-delete, never rename:
//! the staging and public directories may live on different filesystems.

use crate::models::upload::UploadedFile;
use axum::extract::multipart::{Field, MultipartError};
use bytes::Bytes;
use chrono::Utc;
use futures::future::join_all;
use md5::Context;
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

/// Folder under the public directory, and URL path segment, where relocated
/// files land.
pub const UPLOAD_FOLDER: &str = "uploads";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid file name")]
    InvalidFileName,
    #[error("stored file `{0}` not found")]
    NotFound(String),
    #[error("multipart stream error: {0}")]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type UploadResult<T> = Result<T, UploadError>;

/// UploadService owns the two directories of the pipeline:
/// - `staging_dir`, where parsed file parts are parked as `.tmp-{uuid}`
/// - `public_dir`, whose `uploads/` subfolder is the durable destination
///
/// Relocation of a batch is all-or-nothing with no rollback: when one file
/// fails, the whole batch fails, but siblings that already relocated stay on
/// disk. Files keep their client-supplied names, so two uploads sharing a
/// name silently overwrite each other.
#[derive(Clone)]
pub struct UploadService {
    staging_dir: PathBuf,
    public_dir: PathBuf,
    scheme: String,
}

impl UploadService {
    pub fn new(
        staging_dir: impl Into<PathBuf>,
        public_dir: impl Into<PathBuf>,
        scheme: impl Into<String>,
    ) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            public_dir: public_dir.into(),
            scheme: scheme.into(),
        }
    }

    /// The durable destination directory.
    pub fn uploads_dir(&self) -> PathBuf {
        self.public_dir.join(UPLOAD_FOLDER)
    }

    /// Reduce a client-supplied file name to its final path component.
    ///
    /// Names with no usable final component (empty, `..`, a bare separator)
    /// are rejected. Everything else is kept verbatim, collisions included.
    fn sanitize_name(raw: &str) -> UploadResult<String> {
        Path::new(raw)
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or(UploadError::InvalidFileName)
    }

    /// Stream one multipart file part into the staging directory.
    ///
    /// Size and MD5 accumulate while streaming. A failed read or write
    /// removes the partial staging file before returning the error.
    pub async fn stage_field(&self, mut field: Field<'_>) -> UploadResult<UploadedFile> {
        let name = Self::sanitize_name(field.file_name().unwrap_or_default())?;
        let content_type = field.content_type().map(|v| v.to_string());

        let tmp_path = self.staging_dir.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;

        let mut size: u64 = 0;
        let mut digest = Context::new();
        loop {
            let chunk: Bytes = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(err) => {
                    let _ = fs::remove_file(&tmp_path).await;
                    return Err(UploadError::Multipart(err));
                }
            };
            size += chunk.len() as u64;
            digest.consume(&chunk);
            if let Err(err) = file.write_all(&chunk).await {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(UploadError::Io(err));
            }
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(UploadError::Io(err));
        }

        debug!("staged `{}` ({} bytes) at {}", name, size, tmp_path.display());

        Ok(UploadedFile {
            path: tmp_path.to_string_lossy().into_owned(),
            name,
            size,
            content_type,
            mtime: Utc::now(),
            etag: format!("{:x}", digest.compute()),
        })
    }

    /// Move one staged file into the public upload folder and rewrite its
    /// path to the URL it is now fetchable from.
    ///
    /// The bytes are copied and the staging file deleted afterwards; on
    /// success exactly one durable copy exists and no staging copy remains.
    /// If the delete fails after a successful copy, the durable copy stays
    /// and the staging file leaks with the error.
    pub async fn relocate(&self, mut file: UploadedFile, host: &str) -> UploadResult<UploadedFile> {
        let dest = self.uploads_dir().join(&file.name);
        fs::copy(&file.path, &dest).await?;
        fs::remove_file(&file.path).await?;

        debug!("relocated {} -> {}", file.path, dest.display());

        file.path = format!("{}://{}/{}/{}", self.scheme, host, UPLOAD_FOLDER, file.name);
        Ok(file)
    }

    /// Relocate a whole batch, dispatched together and awaited jointly.
    ///
    /// Every relocation runs to completion before the batch result is
    /// decided; there is no cancellation of siblings. The first error in
    /// submission order fails the batch. Output order is submission order
    /// regardless of completion order.
    pub async fn relocate_all(
        &self,
        files: Vec<UploadedFile>,
        host: &str,
    ) -> UploadResult<Vec<UploadedFile>> {
        let relocations = files.into_iter().map(|file| self.relocate(file, host));
        join_all(relocations).await.into_iter().collect()
    }

    /// Open a relocated file for streaming out. Returns the handle and its
    /// length.
    pub async fn open_public(&self, name: &str) -> UploadResult<(File, u64)> {
        let name = Self::sanitize_name(name)?;
        let path = self.uploads_dir().join(&name);

        let file = File::open(&path).await.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                UploadError::NotFound(name.clone())
            } else {
                UploadError::Io(err)
            }
        })?;
        let len = file.metadata().await?.len();
        Ok((file, len))
    }
}
