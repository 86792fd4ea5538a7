//! Uploaded files (post thumbnails and user avatars).
//!
//! Files live flat in one directory under generated names; records only
//! ever store that name.

use axum::body::Bytes;
use std::{
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Largest accepted post thumbnail, in bytes.
pub const THUMBNAIL_LIMIT: usize = 2_000_000;
/// Largest accepted avatar, in bytes.
pub const AVATAR_LIMIT: usize = 500_000;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("File size should not exceed {limit} bytes (got {size}).")]
    TooLarge { size: usize, limit: usize },
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),
    #[error("File {0} not found")]
    NotFound(String),
    #[error("Failed to write {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to delete {name}: {source}")]
    Delete {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// A file received from a client, still in memory.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Strategy for turning a client file name into a collision-free one.
pub trait NameGenerator: Send + Sync {
    fn generate_unique_name(&self, base: &str, ext: Option<&str>) -> String;
}

/// `photo.png` becomes `photo<uuid>.png`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSuffix;

impl NameGenerator for UuidSuffix {
    fn generate_unique_name(&self, base: &str, ext: Option<&str>) -> String {
        let suffix = Uuid::new_v4();
        match ext {
            Some(ext) => format!("{base}{suffix}.{ext}"),
            None => format!("{base}{suffix}"),
        }
    }
}

pub struct MediaStore {
    root: PathBuf,
    names: Box<dyn NameGenerator>,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_generator(root, UuidSuffix)
    }

    pub fn with_generator(root: impl Into<PathBuf>, names: impl NameGenerator + 'static) -> Self {
        Self {
            root: root.into(),
            names: Box::new(names),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Resolves a stored name to its path. Anything that is not a single
    /// plain path component is refused.
    pub fn path_of(&self, name: &str) -> Result<PathBuf, MediaError> {
        if name.is_empty() || Path::new(name).file_name() != Some(OsStr::new(name)) {
            return Err(MediaError::InvalidName(name.to_owned()));
        }

        Ok(self.root.join(name))
    }

    pub async fn exists(&self, name: &str) -> bool {
        match self.path_of(name) {
            Ok(path) => fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Writes `upload` under a freshly generated name and returns that name.
    ///
    /// The size limit is checked before anything touches the disk.
    pub async fn store(&self, upload: &Upload, limit: usize) -> Result<String, MediaError> {
        if upload.size() > limit {
            return Err(MediaError::TooLarge {
                size: upload.size(),
                limit,
            });
        }

        let (base, ext) = split_file_name(&upload.file_name)?;
        let name = self.names.generate_unique_name(base, ext);
        let path = self.path_of(&name)?;

        fs::write(&path, &upload.bytes)
            .await
            .map_err(|source| MediaError::Write {
                name: name.clone(),
                source,
            })?;

        debug!(file = %name, size = upload.size(), "Stored upload");
        Ok(name)
    }

    pub async fn remove(&self, name: &str) -> Result<(), MediaError> {
        let path = self.path_of(name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(file = %name, "Removed upload");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(MediaError::NotFound(name.to_owned()))
            }
            Err(source) => Err(MediaError::Delete {
                name: name.to_owned(),
                source,
            }),
        }
    }

    /// Removes a file that a committed record no longer points at.
    ///
    /// Failure only leaves an orphaned file behind, so it is logged and
    /// swallowed.
    pub async fn discard(&self, name: &str) {
        match self.remove(name).await {
            Ok(()) => {}
            Err(MediaError::NotFound(_)) => {
                warn!(file = %name, "Superseded upload was already gone");
            }
            Err(err) => {
                error!(file = %name, error = %err, "Failed to remove superseded upload");
            }
        }
    }
}

/// Splits a client file name into the part before the first `.` and the
/// part after the last one. Directory components are dropped.
fn split_file_name(file_name: &str) -> Result<(&str, Option<&str>), MediaError> {
    let file_name = Path::new(file_name)
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| MediaError::InvalidName(file_name.to_owned()))?;

    let base = file_name.split('.').next().unwrap_or_default();
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty());

    Ok((base, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixed(&'static str);

    impl NameGenerator for Fixed {
        fn generate_unique_name(&self, base: &str, ext: Option<&str>) -> String {
            format!("{base}-{}.{}", self.0, ext.unwrap_or("bin"))
        }
    }

    fn store() -> (TempDir, MediaStore) {
        let dir = TempDir::new().unwrap();
        let media = MediaStore::new(dir.path());
        (dir, media)
    }

    #[tokio::test]
    async fn thumbnail_limit_is_inclusive() {
        let (_dir, media) = store();

        let at_limit = Upload::new("cover.png", vec![0u8; THUMBNAIL_LIMIT]);
        let name = media.store(&at_limit, THUMBNAIL_LIMIT).await.unwrap();
        assert!(media.exists(&name).await);

        let over_limit = Upload::new("cover.png", vec![0u8; THUMBNAIL_LIMIT + 1]);
        let err = media.store(&over_limit, THUMBNAIL_LIMIT).await.unwrap_err();
        assert!(matches!(
            err,
            MediaError::TooLarge {
                size: 2_000_001,
                limit: 2_000_000
            }
        ));
    }

    #[tokio::test]
    async fn rejected_upload_writes_nothing() {
        let (dir, media) = store();

        let avatar = Upload::new("me.jpg", vec![1u8; AVATAR_LIMIT + 1]);
        assert!(media.store(&avatar, AVATAR_LIMIT).await.is_err());

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn generated_name_keeps_base_and_extension() {
        let (dir, media) = store();

        let name = media
            .store(&Upload::new("holiday.photo.jpeg", "data"), AVATAR_LIMIT)
            .await
            .unwrap();

        assert!(name.starts_with("holiday"));
        assert!(name.ends_with(".jpeg"));
        assert_ne!(name, "holiday.jpeg");
        assert_eq!(std::fs::read(dir.path().join(&name)).unwrap(), b"data");

        let other = media
            .store(&Upload::new("holiday.photo.jpeg", "data"), AVATAR_LIMIT)
            .await
            .unwrap();
        assert_ne!(name, other);
    }

    #[tokio::test]
    async fn directory_components_are_dropped() {
        let (dir, media) = store();

        let name = media
            .store(&Upload::new("../../etc/passwd.txt", "x"), AVATAR_LIMIT)
            .await
            .unwrap();

        assert!(name.starts_with("passwd"));
        assert!(dir.path().join(&name).exists());
    }

    #[tokio::test]
    async fn custom_generator_is_used() {
        let dir = TempDir::new().unwrap();
        let media = MediaStore::with_generator(dir.path(), Fixed("v1"));

        let name = media
            .store(&Upload::new("cat.gif", "meow"), AVATAR_LIMIT)
            .await
            .unwrap();

        assert_eq!(name, "cat-v1.gif");
    }

    #[tokio::test]
    async fn remove_reports_missing_files() {
        let (_dir, media) = store();

        let name = media
            .store(&Upload::new("a.png", "x"), AVATAR_LIMIT)
            .await
            .unwrap();
        media.remove(&name).await.unwrap();
        assert!(!media.exists(&name).await);

        assert!(matches!(
            media.remove(&name).await,
            Err(MediaError::NotFound(_))
        ));
        // Swallowed either way.
        media.discard(&name).await;
    }

    #[test]
    fn path_of_refuses_traversal() {
        let media = MediaStore::new("/srv/uploads");

        assert!(media.path_of("a.png").is_ok());
        assert!(media.path_of("../a.png").is_err());
        assert!(media.path_of("sub/a.png").is_err());
        assert!(media.path_of("..").is_err());
        assert!(media.path_of("").is_err());
    }

    #[test]
    fn split_file_name_edge_cases() {
        assert_eq!(split_file_name("a.b.c").unwrap(), ("a", Some("c")));
        assert_eq!(split_file_name("README").unwrap(), ("README", None));
        assert_eq!(split_file_name("trailing.").unwrap(), ("trailing", None));
        assert!(split_file_name("..").is_err());
    }
}
