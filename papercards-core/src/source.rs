use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::catalog::{load_catalog, Catalog, LoadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Some(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

struct Loaded {
    catalog: Arc<Catalog>,
    fingerprint: Option<Fingerprint>,
}

/// Owns the data file and hands out the catalog for its current version.
pub struct CatalogSource {
    path: PathBuf,
    loaded: Mutex<Loaded>,
}

impl CatalogSource {
    /// Performs the initial load. Failing here is fatal for the caller.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let path = path.into();
        let fingerprint = Fingerprint::of(&path);
        let catalog = Arc::new(load_catalog(&path)?);
        Ok(Self {
            path,
            loaded: Mutex::new(Loaded {
                catalog,
                fingerprint,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.loaded.lock().catalog)
    }

    /// Reloads the file when it changed on disk since the last successful load.
    ///
    /// Returns the new catalog if one was installed. On error the previous
    /// catalog stays current.
    pub fn refresh(&self) -> Result<Option<Arc<Catalog>>, LoadError> {
        let current = Fingerprint::of(&self.path);
        let mut loaded = self.loaded.lock();
        if current == loaded.fingerprint {
            return Ok(None);
        }
        // a broken version is reported once, not on every poll
        loaded.fingerprint = current;
        if current.is_none() {
            return Err(LoadError::NotFound(self.path.clone()));
        }

        debug!(path = %self.path.display(), "data file changed, reloading");
        let catalog = Arc::new(load_catalog(&self.path)?);
        loaded.catalog = Arc::clone(&catalog);
        info!(rows = catalog.len(), "catalog reloaded");
        Ok(Some(catalog))
    }
}
