//! Catalog repository: the only way the persisted catalog is read or changed.

use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use refurb_core::Catalog;
use tempfile::NamedTempFile;

use crate::StoreError;

/// Load/modify/store access to the catalog.
pub trait CatalogRepository {
    /// Reads the current catalog. A repository with nothing stored yet yields
    /// an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the stored catalog cannot be read or parsed.
    fn load(&self) -> Result<Catalog, StoreError>;

    /// Runs `apply` against the current catalog and stores the result as one
    /// unit. If loading fails `apply` is never called and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the catalog cannot be locked, read, or written.
    fn transaction<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Catalog) -> T;
}

/// Catalog kept in a single pretty-printed JSON file.
///
/// Writers take an exclusive `<file>.lock` sidecar for the duration of a
/// transaction and replace the catalog by renaming a fully written temporary
/// file from the same directory, so readers never observe a partial document.
#[derive(Debug, Clone)]
pub struct JsonCatalogStore {
    path: PathBuf,
}

impl JsonCatalogStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn read(&self) -> Result<Catalog, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Catalog::default()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        serde_json::from_str(&text).map_err(|e| StoreError::Parse {
            path: self.path.display().to_string(),
            source: e,
        })
    }

    fn write(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let dir = self.parent_dir();
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let tmp_path = tmp.path().to_path_buf();
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, catalog).map_err(StoreError::Encode)?;
            writer
                .write_all(b"\n")
                .and_then(|()| writer.flush())
                .map_err(|e| StoreError::io(&tmp_path, e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;
        Ok(())
    }
}

impl CatalogRepository for JsonCatalogStore {
    fn load(&self) -> Result<Catalog, StoreError> {
        self.read()
    }

    fn transaction<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Catalog) -> T,
    {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let _lock = LockFile::acquire(self.lock_path())?;
        let mut catalog = self.read()?;
        let result = apply(&mut catalog);
        self.write(&catalog)?;
        Ok(result)
    }
}

/// Exclusive sidecar lock, removed on drop.
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    fn acquire(path: PathBuf) -> Result<Self, StoreError> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let owner = fs::read_to_string(&path)
                    .ok()
                    .map(|pid| pid.trim().to_owned())
                    .filter(|pid| !pid.is_empty())
                    .unwrap_or_else(|| "unknown".to_owned());
                return Err(StoreError::Locked {
                    path: path.display().to_string(),
                    owner,
                });
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        // Owner pid, reported to writers that find the lock held.
        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            tracing::debug!(path = %path.display(), error = %e, "could not record lock owner");
        }
        Ok(Self { path })
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release catalog lock");
        }
    }
}

/// Catalog held in memory; used by dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    catalog: RefCell<Catalog>,
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: RefCell::new(catalog),
        }
    }

    #[must_use]
    pub fn into_inner(self) -> Catalog {
        self.catalog.into_inner()
    }
}

impl CatalogRepository for MemoryCatalogStore {
    fn load(&self) -> Result<Catalog, StoreError> {
        Ok(self.catalog.borrow().clone())
    }

    fn transaction<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Catalog) -> T,
    {
        Ok(apply(&mut self.catalog.borrow_mut()))
    }
}
