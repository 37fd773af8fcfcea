// Scratch directory backing the download-once route.
//
// Files are staged here by something outside this service, streamed to a
// client exactly once, and removed shortly after the transfer finishes. A
// name is claimed for the whole window from the first byte sent until the
// file is gone, so two downloads of the same file never overlap with the
// delete.

use axum::body::Bytes;
use futures::Stream;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

pub const DEFAULT_DELETE_DELAY: Duration = Duration::from_secs(1);
const READ_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum ScratchError {
    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("file is already being downloaded: {0}")]
    InUse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug)]
struct ScratchInner {
    root: PathBuf,
    delete_delay: Duration,
    claims: Mutex<HashSet<String>>,
}

/// Handle to the scratch directory. Cheap to clone; clones share claims.
#[derive(Debug, Clone)]
pub struct ScratchStore {
    inner: Arc<ScratchInner>,
}

impl ScratchStore {
    pub fn new(root: impl Into<PathBuf>, delete_delay: Duration) -> Self {
        Self {
            inner: Arc::new(ScratchInner {
                root: root.into(),
                delete_delay,
                claims: Mutex::new(HashSet::new()),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    pub fn delete_delay(&self) -> Duration {
        self.inner.delete_delay
    }

    /// Creates the scratch directory if it does not exist yet.
    pub async fn ensure_root(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.inner.root).await
    }

    /// Claims `name` and opens it for a one-shot download.
    pub async fn open_download(&self, name: &str) -> Result<Download, ScratchError> {
        let path = self.resolve(name)?;
        let claim = self.try_claim(name, path)?;

        let file = match tokio::fs::File::open(&claim.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ScratchError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(ScratchError::NotFound(name.to_string()));
        }

        Ok(Download {
            len: metadata.len(),
            file,
            claim,
        })
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, ScratchError> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', ':', '\0'])
        {
            return Err(ScratchError::InvalidName(name.to_string()));
        }
        Ok(self.inner.root.join(name))
    }

    fn claims(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked.
        self.inner
            .claims
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn try_claim(&self, name: &str, path: PathBuf) -> Result<DownloadClaim, ScratchError> {
        if !self.claims().insert(name.to_string()) {
            return Err(ScratchError::InUse(name.to_string()));
        }
        Ok(DownloadClaim {
            store: self.clone(),
            name: name.to_string(),
            path,
            delivered: false,
        })
    }

    fn release(&self, name: &str) {
        self.claims().remove(name);
    }

    #[cfg(test)]
    pub(crate) fn is_claimed(&self, name: &str) -> bool {
        self.claims().contains(name)
    }
}

/// Exclusive hold on a scratch file name.
///
/// Dropping an undelivered claim frees the name and leaves the file alone.
/// Dropping a delivered one deletes the file after the configured delay and
/// frees the name once it is gone.
#[derive(Debug)]
struct DownloadClaim {
    store: ScratchStore,
    name: String,
    path: PathBuf,
    delivered: bool,
}

impl DownloadClaim {
    /// Every byte of the file has been handed to the client.
    fn mark_delivered(&mut self) {
        self.delivered = true;
    }
}

impl Drop for DownloadClaim {
    fn drop(&mut self) {
        if !self.delivered {
            self.store.release(&self.name);
            return;
        }

        let store = self.store.clone();
        let name = std::mem::take(&mut self.name);
        let path = std::mem::take(&mut self.path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(delete_after_delay(store, name, path));
            }
            Err(_) => {
                // No runtime left to wait on.
                log_removal(&path, std::fs::remove_file(&path));
                store.release(&name);
            }
        }
    }
}

async fn delete_after_delay(store: ScratchStore, name: String, path: PathBuf) {
    tokio::time::sleep(store.delete_delay()).await;
    log_removal(&path, tokio::fs::remove_file(&path).await);
    store.release(&name);
}

fn log_removal(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => info!("Deleted downloaded file {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Downloaded file {} was already removed", path.display())
        }
        Err(e) => warn!("Failed to delete downloaded file {}: {}", path.display(), e),
    }
}

/// An opened, claimed scratch file ready to be streamed.
#[derive(Debug)]
pub struct Download {
    len: u64,
    file: tokio::fs::File,
    claim: DownloadClaim,
}

impl Download {
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn name(&self) -> &str {
        &self.claim.name
    }

    /// Streams exactly `len()` bytes in fixed-size chunks.
    ///
    /// The claim counts as delivered as soon as the chunk carrying the last
    /// byte is yielded, so the delete is scheduled even when the consumer
    /// stops polling once it has `Content-Length` bytes. An I/O error, a file
    /// that shrank, or dropping the stream earlier leaves the file in place
    /// and frees the name.
    pub fn into_stream(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        let Download {
            len,
            file,
            mut claim,
        } = self;
        if len == 0 {
            claim.mark_delivered();
        }

        futures::stream::try_unfold(
            (file, claim, len),
            |(mut file, mut claim, remaining)| async move {
                if remaining == 0 {
                    return Ok(None);
                }

                let chunk_len = remaining.min(READ_CHUNK_SIZE as u64) as usize;
                let mut buf = vec![0u8; chunk_len];
                let read = file.read(&mut buf).await?;
                if read == 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("{} shrank while being downloaded", claim.name),
                    ));
                }
                buf.truncate(read);

                let remaining = remaining - read as u64;
                if remaining == 0 {
                    debug!("Finished streaming {}", claim.name);
                    claim.mark_delivered();
                }
                Ok::<_, io::Error>(Some((Bytes::from(buf), (file, claim, remaining))))
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{StreamExt, TryStreamExt};
    use tokio_test::{assert_err, assert_ok};

    const SHORT_DELAY: Duration = Duration::from_millis(20);

    async fn collect(download: Download) -> Vec<u8> {
        let chunks: Vec<Bytes> = download.into_stream().try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScratchStore::new(dir.path(), SHORT_DELAY);

        for name in ["", ".", "..", "../secret", "a/b", "a\\b", "C:evil", "nul\0byte"] {
            let result = store.open_download(name).await;
            assert!(
                matches!(result, Err(ScratchError::InvalidName(_))),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found_and_leaves_directory_alone() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("other.pdf"), b"keep me").unwrap();
        let store = ScratchStore::new(dir.path(), SHORT_DELAY);

        let result = store.open_download("missing.pdf").await;
        assert!(matches!(result, Err(ScratchError::NotFound(_))));
        assert!(!store.is_claimed("missing.pdf"));

        tokio::time::sleep(SHORT_DELAY * 3).await;
        assert!(dir.path().join("other.pdf").exists());
    }

    #[tokio::test]
    async fn test_directory_is_not_downloadable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let store = ScratchStore::new(dir.path(), SHORT_DELAY);

        let result = store.open_download("nested").await;
        assert!(matches!(result, Err(ScratchError::NotFound(_))));
        assert!(dir.path().join("nested").exists());
    }

    #[tokio::test]
    async fn test_download_streams_bytes_then_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, &content).unwrap();
        let store = ScratchStore::new(dir.path(), SHORT_DELAY);

        let download = assert_ok!(store.open_download("report.pdf").await);
        assert_eq!(download.len(), content.len() as u64);
        assert_eq!(download.name(), "report.pdf");

        assert_eq!(collect(download).await, content);

        // Still there and still claimed during the delay window.
        assert!(path.exists());
        assert!(matches!(
            store.open_download("report.pdf").await,
            Err(ScratchError::InUse(_))
        ));

        tokio::time::sleep(SHORT_DELAY * 5).await;
        assert!(!path.exists());
        assert!(!store.is_claimed("report.pdf"));
    }

    #[tokio::test]
    async fn test_concurrent_download_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("once.pdf"), b"%PDF-1.4 data").unwrap();
        let store = ScratchStore::new(dir.path(), SHORT_DELAY);

        let first = assert_ok!(store.open_download("once.pdf").await);
        let second = assert_err!(store.open_download("once.pdf").await);
        assert!(matches!(second, ScratchError::InUse(_)));

        assert_eq!(collect(first).await, b"%PDF-1.4 data");
    }

    #[tokio::test]
    async fn test_abandoned_download_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let content = vec![7u8; READ_CHUNK_SIZE * 3];
        let path = dir.path().join("big.bin");
        std::fs::write(&path, &content).unwrap();
        let store = ScratchStore::new(dir.path(), SHORT_DELAY);

        let download = store.open_download("big.bin").await.unwrap();
        let mut stream = Box::pin(download.into_stream());
        let first_chunk = stream.next().await.unwrap().unwrap();
        assert!(!first_chunk.is_empty() && first_chunk.len() <= READ_CHUNK_SIZE);
        drop(stream);

        assert!(!store.is_claimed("big.bin"));
        tokio::time::sleep(SHORT_DELAY * 5).await;
        assert!(path.exists());

        // A fresh attempt can still fetch the whole thing.
        let retry = store.open_download("big.bin").await.unwrap();
        assert_eq!(collect(retry).await, content);
    }

    #[tokio::test]
    async fn test_last_chunk_delivers_without_polling_for_end() {
        let dir = tempfile::tempdir().unwrap();
        let content = vec![3u8; READ_CHUNK_SIZE + READ_CHUNK_SIZE / 2];
        let path = dir.path().join("sized.pdf");
        std::fs::write(&path, &content).unwrap();
        let store = ScratchStore::new(dir.path(), SHORT_DELAY);

        let download = assert_ok!(store.open_download("sized.pdf").await);
        let len = download.len() as usize;
        let mut stream = Box::pin(download.into_stream());

        // Stop once `len` bytes arrived, the way an HTTP/1.1 server does
        // after writing Content-Length bytes.
        let mut received = Vec::new();
        while received.len() < len {
            received.extend_from_slice(&stream.next().await.unwrap().unwrap());
        }
        drop(stream);
        assert_eq!(received, content);

        assert!(store.is_claimed("sized.pdf"));
        tokio::time::sleep(SHORT_DELAY * 5).await;
        assert!(!path.exists());
        assert!(!store.is_claimed("sized.pdf"));
    }

    #[tokio::test]
    async fn test_empty_file_is_deleted_without_being_polled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::write(&path, b"").unwrap();
        let store = ScratchStore::new(dir.path(), SHORT_DELAY);

        let download = assert_ok!(store.open_download("empty.pdf").await);
        assert_eq!(download.len(), 0);
        drop(download.into_stream());

        tokio::time::sleep(SHORT_DELAY * 5).await;
        assert!(!path.exists());
        assert!(!store.is_claimed("empty.pdf"));
    }

    #[tokio::test]
    async fn test_bytes_appended_after_open_are_not_sent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("growing.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        let store = ScratchStore::new(dir.path(), SHORT_DELAY);

        let download = assert_ok!(store.open_download("growing.pdf").await);
        std::fs::write(&path, b"%PDF-1.4 plus trailing junk").unwrap();

        assert_eq!(collect(download).await, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_ensure_root_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("scratch");
        let store = ScratchStore::new(&root, DEFAULT_DELETE_DELAY);

        assert_ok!(store.ensure_root().await);
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
    }
}
