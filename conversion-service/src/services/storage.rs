use crate::config::StorageConfig;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// A flat directory of files addressed by bare file name.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> io::Result<Self> {
        let base_path = base_path.into();
        if !fs::try_exists(&base_path).await? {
            fs::create_dir_all(&base_path).await?;
            tracing::info!(path = %base_path.display(), "Created directory");
        }
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Maps `name` into this directory. Returns `None` for anything that is
    /// not a single plain path component.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part == name => {
                Some(self.base_path.join(name))
            }
            _ => None,
        }
    }

    pub async fn write(&self, name: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.resolve(name).ok_or_else(|| invalid_name(name))?;
        fs::write(&path, data).await?;
        Ok(path)
    }

    /// Returns the path of `name` if it exists as a regular file.
    pub async fn find(&self, name: &str) -> io::Result<Option<PathBuf>> {
        let Some(path) = self.resolve(name) else {
            return Ok(None);
        };
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path).await
    }
}

fn invalid_name(name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("invalid storage file name: {:?}", name),
    )
}

/// The transient uploads directory and the durable output directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub uploads: LocalStorage,
    pub output: LocalStorage,
}

impl StoragePaths {
    pub async fn init(config: &StorageConfig) -> io::Result<Self> {
        Ok(Self {
            uploads: LocalStorage::new(&config.uploads_dir).await?,
            output: LocalStorage::new(&config.output_dir).await?,
        })
    }
}
