//! File storage under the configured upload directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use jiff::Timestamp;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::FilesConfig;
use crate::error::{AppError, AppResult};

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name the file was stored under, possibly with a `_N` suffix
    pub filename: String,
    pub size: u64,
    pub content_type: Option<String>,
}

/// A file present in the upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub filename: String,
    pub size: u64,
    pub modified_at: Option<Timestamp>,
}

/// Flat file store: no subdirectories, names are single path components.
#[derive(Clone)]
pub struct FileService {
    upload_dir: PathBuf,
    max_upload_size: u64,
}

impl FileService {
    pub fn new(config: &FilesConfig) -> Self {
        Self {
            upload_dir: PathBuf::from(&config.upload_dir),
            max_upload_size: config.max_upload_size,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    /// Create the upload directory if it is missing
    pub async fn ensure_upload_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.upload_dir)
            .await
            .with_context(|| format!("Failed to create upload dir {}", self.upload_dir.display()))?;
        Ok(())
    }

    /// Fail with `PayloadTooLarge` once `size` passes the configured limit
    pub fn check_size(&self, size: u64) -> AppResult<()> {
        if size > self.max_upload_size {
            return Err(AppError::PayloadTooLarge {
                limit: self.max_upload_size,
            });
        }
        Ok(())
    }

    /// Store an upload.
    ///
    /// Directory components of `original_name` are discarded. An existing
    /// file is never overwritten: `report.pdf` becomes `report_1.pdf`,
    /// `report_2.pdf` and so on.
    pub async fn save(
        &self,
        original_name: &str,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> AppResult<StoredFile> {
        let name = sanitize_name(original_name)
            .ok_or_else(|| AppError::bad_request("No filename provided"))?;
        self.check_size(bytes.len() as u64)?;

        let (stem, ext) = split_extension(&name);
        let mut candidate = name.clone();
        let mut counter = 1u32;

        let (file, path) = loop {
            let path = self.upload_dir.join(&candidate);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => break (file, path),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    candidate = format!("{stem}_{counter}{ext}");
                    counter += 1;
                }
                Err(e) => {
                    return Err(anyhow::Error::from(e)
                        .context(format!("Could not save file {candidate}"))
                        .into());
                }
            }
        };

        write_or_discard(file, &path, bytes)
            .await
            .with_context(|| format!("Could not save file {candidate}"))?;

        tracing::info!(filename = %candidate, size = bytes.len(), "File stored");

        Ok(StoredFile {
            filename: candidate,
            size: bytes.len() as u64,
            content_type,
        })
    }

    /// Regular files in the upload directory, sorted by name
    pub async fn list(&self) -> AppResult<Vec<FileEntry>> {
        let mut dir = fs::read_dir(&self.upload_dir)
            .await
            .with_context(|| format!("Failed to read {}", self.upload_dir.display()))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.context("Failed to read dir entry")? {
            let metadata = entry.metadata().await.context("Failed to stat file")?;
            if !metadata.is_file() {
                continue;
            }
            entries.push(FileEntry {
                filename: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                modified_at: metadata
                    .modified()
                    .ok()
                    .and_then(|t| Timestamp::try_from(t).ok()),
            });
        }

        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(entries)
    }

    /// Contents of a stored file, `None` if it does not exist
    pub async fn read(&self, name: &str) -> AppResult<Option<Vec<u8>>> {
        let Some(path) = self.resolve(name) else {
            return Ok(None);
        };
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(anyhow::Error::from(e)
                .context(format!("Could not read file {name}"))
                .into()),
        }
    }

    /// `false` when there was no such file
    pub async fn delete(&self, name: &str) -> AppResult<bool> {
        let Some(path) = self.resolve(name) else {
            return Ok(false);
        };
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(filename = name, "File deleted");
                Ok(true)
            }
            Err(e) if is_missing(&e) => Ok(false),
            Err(e) => Err(anyhow::Error::from(e)
                .context(format!("Could not delete file {name}"))
                .into()),
        }
    }

    /// Path for a client-supplied name, refusing anything that is not a
    /// single normal component.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        match sanitize_name(name) {
            Some(clean) if clean == name => Some(self.upload_dir.join(clean)),
            _ => None,
        }
    }
}

// A directory or a missing file both mean "no such file" to callers.
fn is_missing(error: &std::io::Error) -> bool {
    matches!(error.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory)
}

/// Write `bytes` to a freshly created file, removing it again when the
/// write fails so no partial upload is left behind.
async fn write_or_discard<W>(mut writer: W, path: &Path, bytes: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(writer);
        if let Err(cleanup) = fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %cleanup, "Could not remove partial upload");
        }
        return Err(e);
    }
    Ok(())
}

/// Last path component of a client file name, with both `/` and `\`
/// treated as separators. Control characters are dropped.
fn sanitize_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?;
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }
    Some(cleaned.to_string())
}

/// `("archive.tar", ".gz")`; dotfiles keep their leading dot in the stem.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir, max: u64) -> FileService {
        FileService::new(&FilesConfig {
            upload_dir: dir.path().to_string_lossy().into_owned(),
            max_upload_size: max,
        })
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(sanitize_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_name(r"C:\Users\me\notes.txt").as_deref(), Some("notes.txt"));
        assert_eq!(sanitize_name(""), None);
        assert_eq!(sanitize_name("dir/"), None);
        assert_eq!(sanitize_name(".."), None);
        assert_eq!(sanitize_name("bad\r\nname.txt").as_deref(), Some("badname.txt"));
        assert_eq!(sanitize_name("\u{7}"), None);
    }

    struct FailingWriter;

    impl AsyncWrite for FailingWriter {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::Error::other("disk full")))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.bin");
        fs::write(&path, b"half").await.unwrap();

        let result = write_or_discard(FailingWriter, &path, b"payload").await;

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("report.pdf"), ("report", ".pdf"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".env"), (".env", ""));
    }

    #[tokio::test]
    async fn test_save_and_read_back() {
        let dir = TempDir::new().unwrap();
        let files = service(&dir, 1024);

        let stored = files
            .save("hello.txt", Some("text/plain".to_string()), b"hello")
            .await
            .unwrap();
        assert_eq!(stored.filename, "hello.txt");
        assert_eq!(stored.size, 5);
        assert_eq!(stored.content_type.as_deref(), Some("text/plain"));

        let bytes = files.read("hello.txt").await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"hello"[..]));
    }

    #[tokio::test]
    async fn test_collisions_get_numbered_suffix() {
        let dir = TempDir::new().unwrap();
        let files = service(&dir, 1024);

        let first = files.save("a.txt", None, b"1").await.unwrap();
        let second = files.save("a.txt", None, b"2").await.unwrap();
        let third = files.save("a.txt", None, b"3").await.unwrap();

        assert_eq!(first.filename, "a.txt");
        assert_eq!(second.filename, "a_1.txt");
        assert_eq!(third.filename, "a_2.txt");
        assert_eq!(files.read("a.txt").await.unwrap().as_deref(), Some(&b"1"[..]));
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let dir = TempDir::new().unwrap();
        let files = service(&dir, 4);

        let result = files.save("big.bin", None, b"12345").await;
        assert!(matches!(result, Err(AppError::PayloadTooLarge { limit: 4 })));
        assert!(files.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_filename_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let files = service(&dir, 1024);

        let result = files.save("", None, b"x").await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let dir = TempDir::new().unwrap();
        let files = service(&dir, 1024);
        files.save("b.txt", None, b"bb").await.unwrap();
        files.save("a.txt", None, b"a").await.unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let listed = files.list().await.unwrap();
        let names: Vec<_> = listed.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt"]);
        assert_eq!(listed[1].size, 2);
        assert!(listed[0].modified_at.is_some());

        assert!(files.delete("a.txt").await.unwrap());
        assert!(!files.delete("a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_traversal_names_are_not_found() {
        let dir = TempDir::new().unwrap();
        let files = service(&dir, 1024);

        assert_eq!(files.read("../secret").await.unwrap(), None);
        assert!(!files.delete("nested/../../x").await.unwrap());
        assert_eq!(files.read("nope.txt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ensure_upload_dir_creates_nested_path() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let files = FileService::new(&FilesConfig {
            upload_dir: nested.to_string_lossy().into_owned(),
            max_upload_size: 10,
        });

        files.ensure_upload_dir().await.unwrap();
        assert!(nested.is_dir());
    }
}
