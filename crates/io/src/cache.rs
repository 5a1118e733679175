// Decode cache: one RawGrid per distinct upload, keyed by content hash.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use supsum_pipeline::RawGrid;

use crate::error::IngestError;
use crate::{decode, InputFormat};

/// Identity of an upload: blake3 hash of its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileKey(blake3::Hash);

impl FileKey {
    pub fn of(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

/// Memoizes decoded grids so repeated queries never re-decode a file.
#[derive(Debug, Default)]
pub struct SheetCache {
    entries: HashMap<FileKey, Rc<RawGrid>>,
    hits: usize,
    misses: usize,
}

impl SheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` and return its grid, decoding only on first sight of its content.
    pub fn load(&mut self, path: &Path) -> Result<Rc<RawGrid>, IngestError> {
        let format = InputFormat::from_path(path)?;
        let bytes = std::fs::read(path).map_err(|e| IngestError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.load_bytes(&bytes, format)
    }

    pub fn load_bytes(&mut self, bytes: &[u8], format: InputFormat) -> Result<Rc<RawGrid>, IngestError> {
        let key = FileKey::of(bytes);
        if let Some(grid) = self.entries.get(&key) {
            self.hits += 1;
            log::debug!("sheet cache hit {}", &key.to_hex()[..12]);
            return Ok(Rc::clone(grid));
        }

        self.misses += 1;
        let grid = Rc::new(decode(bytes, format)?);
        log::debug!(
            "sheet cache miss {}: decoded {} rows",
            &key.to_hex()[..12],
            grid.height()
        );
        self.entries.insert(key, Rc::clone(&grid));
        Ok(grid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
