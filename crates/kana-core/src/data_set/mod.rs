//! Single-blob container of named byte regions.
//!
//! ```text
//! [magic][region bytes, each optionally aligned][bincode directory]
//! [directory size: u64 LE][crc32 of all preceding bytes: u32 LE]
//! [total size: u64 LE]
//! ```
//!
//! The trailing size is the offset of that field plus 8, so a reader can
//! walk back from the end: size, checksum, directory, regions.

mod reader;
mod writer;

pub use reader::{verify_checksum, DataSetReader};
pub use writer::DataSetWriter;

use std::io;

use serde::{Deserialize, Serialize};

/// Magic written at the start of every blob produced by this crate.
pub const DEFAULT_MAGIC: &[u8] = b"\xEFKANA\r\n";

pub(crate) const SIZE_FIELD_LEN: usize = 8;
pub(crate) const CHECKSUM_LEN: usize = 4;
/// Directory size + checksum + total size.
pub(crate) const TRAILER_LEN: usize = SIZE_FIELD_LEN + CHECKSUM_LEN + SIZE_FIELD_LEN;

#[derive(Debug, thiserror::Error)]
pub enum DataSetError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid magic bytes")]
    InvalidMagic,

    #[error("data set is truncated")]
    Truncated,

    #[error("size field says {expected} bytes, blob has {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("checksum mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("duplicate region name: {0}")]
    DuplicateName(String),

    #[error("invalid alignment: {0} bits (expected 8, 16, 32 or 64)")]
    InvalidAlignment(u32),

    #[error("region {0} lies outside the data area")]
    EntryOutOfBounds(String),

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("missing region: {0}")]
    MissingRegion(String),
}

/// Directory record for one region. Offsets are from the start of the blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetEntry {
    pub name: String,
    pub offset: u64,
    pub size: u64,
}

pub(crate) fn is_valid_alignment(bits: u32) -> bool {
    matches!(bits, 8 | 16 | 32 | 64)
}

pub(crate) fn read_u64_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}
