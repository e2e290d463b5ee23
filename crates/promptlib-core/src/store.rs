//! Persistent store adapter: the prompt collection and the theme preference,
//! each under its own fixed key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::prompt::{Prompt, Theme};

pub const PROMPTS_KEY: &str = "prompts.json";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("stored prompt collection is malformed: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("failed to encode prompt collection: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Durable key-value backend for the prompt collection and theme.
///
/// Missing data is never an error: `load` yields an empty collection and
/// `load_theme` yields [`Theme::Light`].
pub trait Store {
    fn load(&self) -> Result<Vec<Prompt>, StoreError>;
    fn save(&self, prompts: &[Prompt]) -> Result<(), StoreError>;
    fn load_theme(&self) -> Result<Theme, StoreError>;
    fn save_theme(&self, theme: Theme) -> Result<(), StoreError>;
}

/// Load the collection, treating malformed or unreadable data as empty.
///
/// The stored data is left as-is; the next successful save replaces it.
pub fn load_or_empty(store: &dyn Store) -> Vec<Prompt> {
    match store.load() {
        Ok(prompts) => prompts,
        Err(e) => {
            warn!(error = %e, "falling back to an empty prompt collection");
            Vec::new()
        }
    }
}

pub fn load_theme_or_default(store: &dyn Store) -> Theme {
    store.load_theme().unwrap_or_else(|e| {
        warn!(error = %e, "falling back to the light theme");
        Theme::Light
    })
}

pub fn encode(prompts: &[Prompt]) -> Result<String, StoreError> {
    serde_json::to_string(prompts).map_err(StoreError::Encode)
}

pub fn decode(content: &str) -> Result<Vec<Prompt>, StoreError> {
    serde_json::from_str(content).map_err(StoreError::Malformed)
}

/// Base data directory: `~/.local/share/promptlib/`
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("promptlib"))
}

// ── File backend ──

/// Stores each key as a file inside `dir`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.dir.join(PROMPTS_KEY)
    }

    pub fn theme_path(&self) -> PathBuf {
        self.dir.join(THEME_KEY)
    }

    fn read_key(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.dir.join(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write through a sibling temp file so a crash never leaves a torn value.
    fn write_key(&self, key: &str, content: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{key}.tmp"));
        fs::write(&tmp, content)?;
        fs::rename(&tmp, self.dir.join(key))
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<Vec<Prompt>, StoreError> {
        match self.read_key(PROMPTS_KEY)? {
            Some(content) if !content.trim().is_empty() => decode(&content),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&self, prompts: &[Prompt]) -> Result<(), StoreError> {
        let content = encode(prompts)?;
        self.write_key(PROMPTS_KEY, &content)?;
        debug!(count = prompts.len(), path = %self.prompts_path().display(), "saved prompts");
        Ok(())
    }

    fn load_theme(&self) -> Result<Theme, StoreError> {
        Ok(self
            .read_key(THEME_KEY)?
            .map(|s| Theme::parse(&s))
            .unwrap_or_default())
    }

    fn save_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.write_key(THEME_KEY, theme.as_str())?;
        Ok(())
    }
}

// ── In-memory backend ──

#[derive(Default)]
struct MemoryState {
    prompts: Option<String>,
    theme: Option<String>,
    saves: usize,
    theme_saves: usize,
}

/// Process-local backend. Clones share the same underlying state, so a
/// caller can keep a handle to inspect what was written.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the prompts key with raw stored text.
    pub fn with_raw(prompts: &str) -> Self {
        let store = Self::default();
        store.lock().prompts = Some(prompts.to_string());
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn raw(&self) -> Option<String> {
        self.lock().prompts.clone()
    }

    /// Number of collection writes so far.
    pub fn saves(&self) -> usize {
        self.lock().saves
    }

    pub fn theme_saves(&self) -> usize {
        self.lock().theme_saves
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Vec<Prompt>, StoreError> {
        match self.lock().prompts.as_deref() {
            Some(content) => decode(content),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, prompts: &[Prompt]) -> Result<(), StoreError> {
        let content = encode(prompts)?;
        let mut state = self.lock();
        state.prompts = Some(content);
        state.saves += 1;
        Ok(())
    }

    fn load_theme(&self) -> Result<Theme, StoreError> {
        Ok(self
            .lock()
            .theme
            .as_deref()
            .map(Theme::parse)
            .unwrap_or_default())
    }

    fn save_theme(&self, theme: Theme) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.theme = Some(theme.as_str().to_string());
        state.theme_saves += 1;
        Ok(())
    }
}
