//! Persistence
//!
//! The overlay document is a single JSON file; general options go through
//! `confy`. Document writes are debounced by [`SaveDebounce`].

mod document;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clarity_types::{GeneralOptions, OverlayDocument};

use crate::error::StoreError;

pub use document::Models;

/// Name used for the config directory and the `confy` app name
pub const APP_NAME: &str = "clarity";
const DOCUMENT_FILE: &str = "overlay.json";

/// Key-value persistence for the overlay document
pub trait PersistenceStore {
    fn load(&self) -> Result<OverlayDocument, StoreError>;
    fn save(&mut self, document: &OverlayDocument) -> Result<(), StoreError>;
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config location, or at `options.document_path`
    pub fn from_options(options: &GeneralOptions) -> Result<Self, StoreError> {
        match &options.document_path {
            Some(path) => Ok(Self::new(path.clone())),
            None => default_document_path().map(Self::new),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceStore for DocumentStore {
    /// A missing file is a first launch and yields an empty document
    fn load(&self) -> Result<OverlayDocument, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = ?self.path, "No overlay document yet, starting empty");
                return Ok(OverlayDocument::default());
            }
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Writes a sibling temp file, then renames it over the document
    fn save(&mut self, document: &OverlayDocument) -> Result<(), StoreError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| StoreError::Io { path, source }
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let contents = serde_json::to_string_pretty(document).map_err(StoreError::Serialize)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(io_err(&self.path))?;

        tracing::debug!(path = ?self.path, "Saved overlay document");
        Ok(())
    }
}

/// In-memory store for hosts that persist elsewhere
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub document: OverlayDocument,
    pub saves: usize,
}

impl PersistenceStore for MemoryStore {
    fn load(&self) -> Result<OverlayDocument, StoreError> {
        Ok(self.document.clone())
    }

    fn save(&mut self, document: &OverlayDocument) -> Result<(), StoreError> {
        self.document = document.clone();
        self.saves += 1;
        Ok(())
    }
}

pub fn default_document_path() -> Result<PathBuf, StoreError> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME).join(DOCUMENT_FILE))
        .ok_or(StoreError::NoConfigDir)
}

pub fn load_options() -> Result<GeneralOptions, StoreError> {
    Ok(confy::load(APP_NAME, None)?)
}

pub fn store_options(options: &GeneralOptions) -> Result<(), StoreError> {
    Ok(confy::store(APP_NAME, None, options)?)
}

pub fn load_options_from(path: &Path) -> Result<GeneralOptions, StoreError> {
    Ok(confy::load_path(path)?)
}

pub fn store_options_to(path: &Path, options: &GeneralOptions) -> Result<(), StoreError> {
    Ok(confy::store_path(path, options)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Debounce
// ─────────────────────────────────────────────────────────────────────────────

/// Dirty flag plus the time of the last write
#[derive(Debug, Clone)]
pub struct SaveDebounce {
    delay: Duration,
    dirty: bool,
    last_save: Option<Instant>,
}

impl Default for SaveDebounce {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

impl SaveDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            dirty: false,
            last_save: None,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Dirty, and at least `delay` since the previous write
    pub fn is_due(&self, now: Instant) -> bool {
        self.dirty
            && self
                .last_save
                .is_none_or(|last| now.saturating_duration_since(last) >= self.delay)
    }

    pub fn mark_saved(&mut self, now: Instant) {
        self.dirty = false;
        self.last_save = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarity_types::GridConfig;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load().unwrap(), OverlayDocument::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DocumentStore::new(dir.path().join("nested").join("overlay.json"));
        let doc = OverlayDocument {
            buff_grids: vec![GridConfig {
                name: "Boons".into(),
                ..GridConfig::default()
            }],
            ..OverlayDocument::default()
        };

        store.save(&doc).unwrap();

        assert_eq!(store.load().unwrap(), doc);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.json");
        fs::write(&path, "{ not json").unwrap();

        let err = DocumentStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn test_options_round_trip_through_confy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");
        let opts = GeneralOptions {
            remember_layout: true,
            save_delay_ms: 500,
            ..GeneralOptions::default()
        };

        store_options_to(&path, &opts).unwrap();

        assert_eq!(load_options_from(&path).unwrap(), opts);
    }

    #[test]
    fn test_debounce() {
        let start = Instant::now();
        let mut debounce = SaveDebounce::new(Duration::from_millis(1000));
        assert!(!debounce.is_due(start));

        debounce.mark_dirty();
        assert!(debounce.is_due(start));
        debounce.mark_saved(start);
        assert!(!debounce.is_dirty());

        debounce.mark_dirty();
        assert!(!debounce.is_due(start + Duration::from_millis(999)));
        assert!(debounce.is_due(start + Duration::from_millis(1000)));
    }
}
