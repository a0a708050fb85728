use std::collections::HashSet;
use std::io::Write;

use tracing::{debug, debug_span, warn};

use super::{
    is_valid_alignment, DataSetEntry, DataSetError, DEFAULT_MAGIC, SIZE_FIELD_LEN, TRAILER_LEN,
};

/// Accumulates regions in memory; `finish` appends the trailer and writes
/// the blob out in one go.
#[derive(Debug)]
pub struct DataSetWriter {
    image: Vec<u8>,
    entries: Vec<DataSetEntry>,
    names: HashSet<String>,
}

impl Default for DataSetWriter {
    fn default() -> Self {
        Self::new(DEFAULT_MAGIC)
    }
}

impl DataSetWriter {
    pub fn new(magic: &[u8]) -> Self {
        Self {
            image: magic.to_vec(),
            entries: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Append a region, zero-padding the image to `alignment` bits first.
    pub fn add(&mut self, name: &str, alignment: u32, data: &[u8]) -> Result<(), DataSetError> {
        if self.names.contains(name) {
            warn!(name, "duplicate data set region");
            return Err(DataSetError::DuplicateName(name.to_string()));
        }
        if !is_valid_alignment(alignment) {
            return Err(DataSetError::InvalidAlignment(alignment));
        }

        let align_bytes = (alignment / 8) as usize;
        let padded = self.image.len().next_multiple_of(align_bytes);
        self.image.resize(padded, 0);

        self.entries.push(DataSetEntry {
            name: name.to_string(),
            offset: padded as u64,
            size: data.len() as u64,
        });
        self.names.insert(name.to_string());
        self.image.extend_from_slice(data);
        debug!(name, offset = padded, size = data.len(), "region added");
        Ok(())
    }

    /// Append a region that only needs byte alignment.
    pub fn add_unaligned(&mut self, name: &str, data: &[u8]) -> Result<(), DataSetError> {
        self.add(name, 8, data)
    }

    pub fn entries(&self) -> &[DataSetEntry] {
        &self.entries
    }

    /// Append the directory and trailer, then write the whole blob.
    pub fn finish<W: Write>(self, mut output: W) -> Result<(), DataSetError> {
        let blob = self.into_bytes()?;
        output.write_all(&blob)?;
        output.flush()?;
        Ok(())
    }

    /// Same as `finish`, returning the blob.
    pub fn into_bytes(self) -> Result<Vec<u8>, DataSetError> {
        let _span = debug_span!("data_set_finish", regions = self.entries.len()).entered();

        let directory = bincode::serialize(&self.entries).map_err(DataSetError::Serialize)?;
        let mut blob = self.image;
        blob.reserve(directory.len() + TRAILER_LEN);
        blob.extend_from_slice(&directory);
        blob.extend_from_slice(&(directory.len() as u64).to_le_bytes());

        let checksum = crc32fast::hash(&blob);
        blob.extend_from_slice(&checksum.to_le_bytes());

        let total = (blob.len() + SIZE_FIELD_LEN) as u64;
        blob.extend_from_slice(&total.to_le_bytes());

        debug!(
            directory_bytes = directory.len(),
            total_bytes = total,
            checksum
        );
        Ok(blob)
    }
}
