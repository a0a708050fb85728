use tracing::{debug, debug_span, warn};

use super::{
    read_u64_le, DataSetEntry, DataSetError, CHECKSUM_LEN, SIZE_FIELD_LEN, TRAILER_LEN,
};

/// Verified view over a data set blob. Regions borrow from the blob.
#[derive(Debug, Clone)]
pub struct DataSetReader<'a> {
    blob: &'a [u8],
    entries: Vec<DataSetEntry>,
}

/// Check the trailing size field and the CRC-32 over everything before the
/// checksum. Any single flipped byte fails one of the two.
pub fn verify_checksum(blob: &[u8]) -> Result<(), DataSetError> {
    if blob.len() < TRAILER_LEN {
        return Err(DataSetError::Truncated);
    }
    let size_at = blob.len() - SIZE_FIELD_LEN;
    let expected = read_u64_le(&blob[size_at..]);
    if expected != blob.len() as u64 {
        return Err(DataSetError::SizeMismatch {
            expected,
            actual: blob.len() as u64,
        });
    }

    let checksum_at = size_at - CHECKSUM_LEN;
    let mut stored = [0u8; CHECKSUM_LEN];
    stored.copy_from_slice(&blob[checksum_at..size_at]);
    let stored = u32::from_le_bytes(stored);
    let computed = crc32fast::hash(&blob[..checksum_at]);
    if stored != computed {
        return Err(DataSetError::ChecksumMismatch { stored, computed });
    }
    Ok(())
}

impl<'a> DataSetReader<'a> {
    /// Verify `blob` and parse its directory. Nothing is handed out unless
    /// every check passes.
    pub fn new(blob: &'a [u8], magic: &[u8]) -> Result<Self, DataSetError> {
        let _span = debug_span!("data_set_open", bytes = blob.len()).entered();

        if let Err(e) = verify_checksum(blob) {
            warn!(error = %e, "data set verification failed");
            return Err(e);
        }

        let dir_size_at = blob.len() - TRAILER_LEN;
        let dir_size = read_u64_le(&blob[dir_size_at..]);
        let data_end = (dir_size_at as u64)
            .checked_sub(dir_size)
            .filter(|&start| start >= magic.len() as u64)
            .ok_or(DataSetError::Truncated)? as usize;

        if !blob.starts_with(magic) {
            return Err(DataSetError::InvalidMagic);
        }

        let entries: Vec<DataSetEntry> = bincode::deserialize(&blob[data_end..dir_size_at])
            .map_err(DataSetError::Deserialize)?;
        for entry in &entries {
            let in_bounds = entry.offset >= magic.len() as u64
                && entry
                    .offset
                    .checked_add(entry.size)
                    .is_some_and(|end| end <= data_end as u64);
            if !in_bounds {
                return Err(DataSetError::EntryOutOfBounds(entry.name.clone()));
            }
        }

        debug!(regions = entries.len(), directory_bytes = dir_size);
        Ok(Self { blob, entries })
    }

    /// Bytes of the named region.
    pub fn get(&self, name: &str) -> Option<&'a [u8]> {
        let entry = self.entries.iter().find(|e| e.name == name)?;
        let start = entry.offset as usize;
        self.blob.get(start..start + entry.size as usize)
    }

    /// Like `get`, failing with `MissingRegion`.
    pub fn require(&self, name: &str) -> Result<&'a [u8], DataSetError> {
        self.get(name)
            .ok_or_else(|| DataSetError::MissingRegion(name.to_string()))
    }

    pub fn entries(&self) -> &[DataSetEntry] {
        &self.entries
    }

    pub fn blob(&self) -> &'a [u8] {
        self.blob
    }
}
