//! Kana engine facade.
//!
//! Loads a DataSet file (memory-mapped), verifies it once, and hands out
//! zero-copy views: the raw `DataSetReader` and the `LoudsDictionary` that
//! a `kana_session::Converter` runs against.

mod trace_init;

pub use kana_core;
pub use kana_session;
pub use trace_init::init_tracing;

use std::fs::{self, File};
use std::path::Path;

use kana_core::data_set::{DataSetError, DataSetReader, DEFAULT_MAGIC};
use kana_core::dict::{DictError, LoudsDictionary};
use kana_core::settings::{self, SettingsError};
use memmap2::Mmap;
use tracing::{debug, debug_span};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data set error: {0}")]
    DataSet(#[from] DataSetError),

    #[error("dictionary error: {0}")]
    Dict(#[from] DictError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Backing storage for a data file: either owned or memory-mapped.
enum Storage {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

/// A verified DataSet blob.
///
/// Construction checks the size field, the checksum and the directory, so
/// every view handed out afterwards reads trusted bytes.
pub struct DataFile {
    storage: Storage,
    magic: Vec<u8>,
}

impl std::fmt::Debug for DataFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFile")
            .field("len", &self.len())
            .field("mapped", &matches!(self.storage, Storage::Mapped(_)))
            .finish()
    }
}

impl DataFile {
    /// Map `path` read-only and verify it with the default magic.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        Self::open_with_magic(path, DEFAULT_MAGIC)
    }

    pub fn open_with_magic(path: &Path, magic: &[u8]) -> Result<Self, EngineError> {
        let _span = debug_span!("data_file_open", path = %path.display()).entered();
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(DataSetError::Truncated.into());
        }
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // The mapping lives as long as this struct; the file must not be
        // modified while it is open.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::verified(Storage::Mapped(mmap), magic)
    }

    /// Verify an in-memory blob.
    pub fn from_bytes(blob: Vec<u8>) -> Result<Self, EngineError> {
        Self::verified(Storage::Owned(blob), DEFAULT_MAGIC)
    }

    fn verified(storage: Storage, magic: &[u8]) -> Result<Self, EngineError> {
        let file = Self {
            storage,
            magic: magic.to_vec(),
        };
        let reader = file.reader()?;
        debug!(bytes = file.len(), regions = reader.entries().len(), "data file verified");
        Ok(file)
    }

    pub fn bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(blob) => blob,
            Storage::Mapped(mmap) => mmap,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// Directory view over the blob.
    pub fn reader(&self) -> Result<DataSetReader<'_>, EngineError> {
        Ok(DataSetReader::new(self.bytes(), &self.magic)?)
    }

    /// Dictionary stored in the blob's `dict.*` regions.
    pub fn dictionary(&self) -> Result<LoudsDictionary<'_>, EngineError> {
        let reader = self.reader()?;
        Ok(LoudsDictionary::from_data_set(&reader)?)
    }
}

/// Install a custom settings file for process-level callers. Must run
/// before the first `kana_core::settings::settings()` call.
pub fn init_settings(path: &Path) -> Result<(), EngineError> {
    let content = fs::read_to_string(path)?;
    settings::init_custom(content)?;
    Ok(())
}
