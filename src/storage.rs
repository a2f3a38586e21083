use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("profile {path} is not a JSON object of strings: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String-keyed, string-valued durable storage, shaped like browser `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A profile file holding one JSON object of key -> string.
///
/// Every access goes to disk so two processes sharing a profile observe each
/// other's writes. Writes go through a sibling temp file and a rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    op: "read",
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |op, source| StorageError::Io {
            op,
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| io_err("create dir for", e))?;
            }
        }

        let json = serde_json::to_vec_pretty(entries).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json).map_err(|e| io_err("write", e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_err("rename into", e))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // A corrupt profile is left alone rather than clobbered.
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }
}

struct Inner {
    backend: Box<dyn KeyValueStore>,
    shadow: BTreeMap<String, String>,
    degraded: bool,
}

/// Shared handle over a [`KeyValueStore`] that never fails into the caller.
///
/// Read failures look like absent values. The first write failure switches the
/// handle to memory-only mode for the rest of the session: later writes land in
/// an in-process map and stay readable until the process exits.
#[derive(Clone)]
pub struct Persistence {
    inner: Rc<RefCell<Inner>>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Persistence")
            .field("degraded", &inner.degraded)
            .field("shadowed_keys", &inner.shadow.len())
            .finish_non_exhaustive()
    }
}

impl Persistence {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                backend: Box::new(backend),
                shadow: BTreeMap::new(),
                degraded: false,
            })),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn read(&self, key: &str) -> Option<String> {
        let inner = self.inner.borrow();
        if let Some(v) = inner.shadow.get(key) {
            return Some(v.clone());
        }
        match inner.backend.get(key) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(key, error = %err, "storage read failed; treating value as absent");
                None
            }
        }
    }

    pub fn write(&self, key: &str, value: &str) {
        let mut inner = self.inner.borrow_mut();
        if !inner.degraded {
            match inner.backend.set(key, value) {
                Ok(()) => return,
                Err(err) => {
                    tracing::warn!(
                        key,
                        error = %err,
                        "storage write failed; keeping preferences in memory for this session"
                    );
                    inner.degraded = true;
                }
            }
        }
        inner.shadow.insert(key.to_string(), value.to_string());
    }

    /// True once a write has failed and values only live in memory.
    pub fn is_degraded(&self) -> bool {
        self.inner.borrow().degraded
    }
}
