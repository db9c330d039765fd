#![forbid(unsafe_code)]

//! Save and load of the character document.
//!
//! Save writes the whole document as `characterData.json`. Load reads a
//! user-picked file, caches the raw text under [`CACHE_KEY`] and feeds the
//! parsed value through the reducer as a `load-from-disk` action.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::{info, warn};

use crate::action::dispatch;
use crate::cache::LocalCache;
use crate::document::{CharacterDocument, default_document};

/// File name used by save.
pub const DOCUMENT_FILE_NAME: &str = "characterData.json";
/// Local cache key of the last loaded document.
pub const CACHE_KEY: &str = "characterData";

/// Errors from saving, loading or caching documents.
#[derive(Debug)]
pub enum StorageError {
    /// File system failure at `path`.
    Io { path: PathBuf, source: io::Error },
    /// The text is not valid JSON.
    Parse(serde_json::Error),
    /// The JSON is valid but not an object.
    NotADocument,
    /// The document could not be serialized.
    Serialize(serde_json::Error),
    /// Cache keys are plain names.
    InvalidKey { key: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error at {}: {source}", path.display()),
            Self::Parse(e) => write!(f, "document is not valid JSON: {e}"),
            Self::NotADocument => f.write_str("document JSON must be an object"),
            Self::Serialize(e) => write!(f, "could not serialize document: {e}"),
            Self::InvalidKey { key } => write!(f, "invalid cache key: {key:?}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(e) | Self::Serialize(e) => Some(e),
            Self::NotADocument | Self::InvalidKey { .. } => None,
        }
    }
}

/// Serialized form written by [`save_document`].
pub fn document_to_string(doc: &CharacterDocument) -> Result<String, StorageError> {
    serde_json::to_string(doc).map_err(StorageError::Serialize)
}

/// Parse document text. Anything but a JSON object is rejected.
pub fn parse_document(text: &str) -> Result<Value, StorageError> {
    let value: Value = serde_json::from_str(text).map_err(StorageError::Parse)?;
    if !value.is_object() {
        return Err(StorageError::NotADocument);
    }
    Ok(value)
}

/// Write `doc` to `dir/characterData.json` and return the path.
pub fn save_document(doc: &CharacterDocument, dir: &Path) -> Result<PathBuf, StorageError> {
    let text = document_to_string(doc)?;
    let path = dir.join(DOCUMENT_FILE_NAME);
    fs::write(&path, text).map_err(|source| StorageError::Io {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "character document saved");
    Ok(path)
}

/// Load a user-selected file.
///
/// - no file selected: `Ok(None)`, nothing touched;
/// - unreadable or malformed file: error, cache and `doc` untouched;
/// - otherwise the raw text is cached and the reduced document returned.
pub fn load_document(
    path: Option<&Path>,
    cache: &mut dyn LocalCache,
    doc: &CharacterDocument,
) -> Result<Option<CharacterDocument>, StorageError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = parse_document(&text)?;
    cache.set(CACHE_KEY, &text)?;
    info!(path = %path.display(), "character document loaded");
    Ok(Some(dispatch(doc, &json!({"type": "load-from-disk", "data": data}))))
}

/// Document to boot from: the cached copy when it parses, else the default.
pub fn recover_document(cache: &dyn LocalCache) -> Result<CharacterDocument, StorageError> {
    let Some(text) = cache.get(CACHE_KEY)? else {
        return Ok(default_document());
    };
    match parse_document(&text) {
        Ok(value) => Ok(CharacterDocument::from_value(value).unwrap_or_else(default_document)),
        Err(err) => {
            warn!(error = %err, "cached document unreadable, starting from defaults");
            Ok(default_document())
        }
    }
}
