use std::collections::{BTreeMap, HashMap};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use log::{debug, error, warn};

use crate::errors::WikiError;
use crate::types::{Page, Title};
use crate::utils::page_stem;

/// Storage for wiki pages, keyed by title.
///
/// Handlers only talk to this trait, so the flat-file layout can be swapped
/// for another backend without touching request handling.
pub trait PageStore: Send + Sync {
    /// Read the page stored under `title`.
    ///
    /// Every read failure is reported as [`WikiError::PageNotFound`].
    fn load(&self, title: &Title) -> Result<Page, WikiError>;

    /// Create or fully overwrite the page.
    fn save(&self, page: &Page) -> Result<(), WikiError>;

    /// Titles of every stored page, sorted.
    fn list(&self) -> Result<Vec<String>, WikiError>;
}

/// One `<title>.txt` file per page inside a root directory
pub struct FileStore {
    root: PathBuf,
    save_locks: Mutex<HashMap<Title, Arc<Mutex<()>>>>,
}

impl FileStore {
    /// Create a new file store
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        debug!("Creating FileStore with root directory: {:?}", root);
        Self { root, save_locks: Mutex::new(HashMap::new()) }
    }

    fn page_path(&self, title: &Title) -> PathBuf {
        self.root.join(title.file_name())
    }

    /// Lock guarding writes to one title
    fn save_lock(&self, title: &Title) -> Arc<Mutex<()>> {
        let mut locks = self.save_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(title.clone()).or_default().clone()
    }

    /// Hand back a lock from [`Self::save_lock`], forgetting it once no other
    /// save holds it.
    fn release_save_lock(&self, title: &Title, lock: Arc<Mutex<()>>) {
        let mut locks = self.save_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference lives in the map, the other is ours
        if Arc::strong_count(&lock) == 2 {
            locks.remove(title);
        }
    }
}

impl PageStore for FileStore {
    fn load(&self, title: &Title) -> Result<Page, WikiError> {
        let path = self.page_path(title);
        match fs::read(&path) {
            Ok(body) => {
                debug!("Loaded page {:?}, {} bytes", path, body.len());
                Ok(Page::new(title.clone(), body))
            }
            Err(e) => {
                debug!("Could not read page {:?}: {}", path, e);
                Err(WikiError::PageNotFound(title.to_string()))
            }
        }
    }

    fn save(&self, page: &Page) -> Result<(), WikiError> {
        let path = self.page_path(&page.title);
        let lock = self.save_lock(&page.title);
        let written = {
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            write_page_file(&path, &page.body)
        };
        self.release_save_lock(&page.title, lock);

        written.map_err(|e| {
            error!("Failed to write page {:?}: {}", path, e);
            WikiError::Persistence(e)
        })?;

        debug!("Wrote page {:?}, {} bytes", path, page.body.len());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, WikiError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            error!("Failed to read directory {:?}: {}", self.root, e);
            WikiError::ListingScan(e)
        })?;

        let mut titles = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    let file_name = entry.file_name();
                    let name = file_name.to_string_lossy();
                    if let Some(stem) = page_stem(&name) {
                        if file_name.to_str().is_none() {
                            warn!(
                                "Page file name {:?} is not valid UTF-8, listing as '{}'",
                                file_name, stem
                            );
                        }
                        titles.push(stem.to_string());
                    }
                }
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                }
            }
        }
        titles.sort();

        debug!("Listed {:?}, found {} pages", self.root, titles.len());
        Ok(titles)
    }
}

/// Owner read/write only for newly created files; existing modes are kept.
fn write_page_file(path: &Path, body: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(body)?;
    file.flush()
}

/// Pages held in a map, for tests and throwaway instances
#[derive(Default)]
pub struct MemoryStore {
    pages: RwLock<BTreeMap<Title, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageStore for MemoryStore {
    fn load(&self, title: &Title) -> Result<Page, WikiError> {
        let pages = self.pages.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        pages
            .get(title)
            .map(|body| Page::new(title.clone(), body.clone()))
            .ok_or_else(|| WikiError::PageNotFound(title.to_string()))
    }

    fn save(&self, page: &Page) -> Result<(), WikiError> {
        let mut pages = self.pages.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        pages.insert(page.title.clone(), page.body.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, WikiError> {
        let pages = self.pages.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(pages.keys().map(|t| t.to_string()).collect())
    }
}
