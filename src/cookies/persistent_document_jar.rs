//! JSON-backed document jar.
//!
//! `PersistentDocumentJar` is a [`DocumentJar`] decorator around an
//! [`InMemoryDocumentJar`]. Reads are served from memory; **every write**
//! snapshots the live entries to a JSON file so the jar survives restarts.
//!
//! ### I/O characteristics & caveats
//! - Each write rewrites the entire file. Jars hold a handful of cookies, so
//!   this stays cheap.
//! - File writes are not atomic. Writes through one jar are serialized, so the
//!   file always holds the state after the latest write.
//! - I/O and serialization failures are returned to the caller instead of
//!   panicking. A failed persist leaves the in-memory state updated.
//!
//! ### Example
//! ```ignore
//! let jar = PersistentDocumentJar::open("cookies.json")?;
//! let store = CookieStore::new(Arc::new(jar));
//! store.set("theme", "dark", &CookieOptions::default())?;
//! ```
use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::cookies::{CookieEntry, DocumentJar, InMemoryDocumentJar};
use crate::errors::CookieError;
use serde::{Deserialize, Serialize};

/// On-disk representation of a jar.
#[derive(Debug, Default, Serialize, Deserialize)]
struct JarFile {
    cookies: Vec<CookieEntry>,
}

/// A `DocumentJar` decorator that persists changes after each write.
///
/// This type is *transparent* for reads but *eagerly* persists after writes.
#[derive(Debug)]
pub struct PersistentDocumentJar {
    /// Path to the JSON file where cookies are stored.
    path: PathBuf,
    /// Inner jar that holds the actual cookie state.
    inner: InMemoryDocumentJar,
    /// Held across the in-memory write and the file write.
    write_lock: Mutex<()>,
}

impl PersistentDocumentJar {
    /// Opens the jar stored at `path`.
    ///
    /// A missing file yields an empty jar; the file is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CookieError> {
        let path = path.into();
        let file = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str::<JarFile>(&contents).map_err(CookieError::Snapshot)?
        } else {
            JarFile::default()
        };

        log::debug!("Opened cookie jar {} ({} entries)", path.display(), file.cookies.len());

        Ok(Self {
            path,
            inner: InMemoryDocumentJar::from_entries(file.cookies),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a snapshot of all live entries.
    pub fn entries(&self) -> Vec<CookieEntry> {
        self.inner.entries()
    }

    /// Snapshots the inner jar and writes it to disk (pretty-printed).
    fn persist(&self) -> Result<(), CookieError> {
        let snapshot = JarFile {
            cookies: self.inner.entries(),
        };
        let contents = serde_json::to_string_pretty(&snapshot).map_err(CookieError::Snapshot)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl DocumentJar for PersistentDocumentJar {
    fn as_any(&self) -> &dyn Any { self }

    /// Returns the jar contents without persisting.
    fn cookie_string(&self) -> Result<String, CookieError> {
        self.inner.cookie_string()
    }

    /// Writes the descriptor, then persists the updated state.
    fn write_entry(&self, descriptor: &str) -> Result<(), CookieError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner.write_entry(descriptor)?;
        self.persist().inspect_err(|e| {
            log::error!("Cannot persist cookie jar {}: {}", self.path.display(), e);
        })
    }
}
