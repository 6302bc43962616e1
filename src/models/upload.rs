//! Metadata describing one uploaded file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single file received through a multipart upload.
///
/// Created when a file part finishes streaming into the staging directory,
/// at which point `path` is the staging location on disk. The relocator
/// rewrites `path` exactly once, to the public URL the file is fetchable
/// from; the staging copy is gone by the time a client sees this record.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadedFile {
    /// Staging path while parked, public URL after relocation.
    pub path: String,

    /// Client-supplied file name, reduced to its final path component.
    pub name: String,

    /// Size in bytes.
    pub size: u64,

    /// Declared MIME type of the part, if any.
    #[serde(rename = "type")]
    pub content_type: Option<String>,

    /// When the part finished streaming to disk.
    pub mtime: DateTime<Utc>,

    /// MD5 of the streamed bytes.
    pub etag: String,
}
