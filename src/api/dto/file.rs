//! File storage DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::services::{FileEntry, StoredFile};

#[derive(Debug, Serialize, ToSchema)]
pub struct FileUploadResponse {
    /// Name the file was stored under
    #[schema(example = "report_1.pdf")]
    pub filename: String,
    #[schema(example = 5120)]
    pub size: u64,
    #[schema(example = "application/pdf")]
    pub content_type: Option<String>,
    pub message: String,
}

impl From<StoredFile> for FileUploadResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            filename: file.filename,
            size: file.size,
            content_type: file.content_type,
            message: "File uploaded successfully".to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileInfo {
    pub filename: String,
    pub size: u64,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub modified_at: Option<jiff::Timestamp>,
}

impl From<FileEntry> for FileInfo {
    fn from(entry: FileEntry) -> Self {
        Self {
            filename: entry.filename,
            size: entry.size,
            modified_at: entry.modified_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileListResponse {
    pub files: Vec<FileInfo>,
    pub total: usize,
}

impl From<Vec<FileEntry>> for FileListResponse {
    fn from(entries: Vec<FileEntry>) -> Self {
        let files: Vec<FileInfo> = entries.into_iter().map(FileInfo::from).collect();
        Self {
            total: files.len(),
            files,
        }
    }
}
