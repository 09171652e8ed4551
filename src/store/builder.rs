//! Store builder.
//!
//! Writes a new store file for the population tool and for tests. The
//! server never writes; population happens out-of-band, before the process
//! that serves from the file starts.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Error, Result};

use super::{HEADER_SIZE, MAGIC, VERSION};

/// Builder for a new store file.
///
/// Entries may be added in any order; adding a key twice is an error.
/// `finish` writes the index block and the CRC-carrying footer.
pub struct StoreBuilder {
    writer: BufWriter<File>,
    entry_count: u64,
    current_offset: u64,
    /// key, value offset, value length
    index: Vec<(Vec<u8>, u64, u32)>,
    seen_keys: HashSet<Vec<u8>>,
}

impl StoreBuilder {
    /// Create a new store file, truncating any existing one.
    ///
    /// Writes the header immediately with an entry-count placeholder that is
    /// fixed up in `finish`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&0u64.to_le_bytes())?;

        Ok(Self {
            writer,
            entry_count: 0,
            current_offset: HEADER_SIZE,
            index: Vec::new(),
            seen_keys: HashSet::new(),
        })
    }

    /// Append one record. Fails on a key that was already added.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if !self.seen_keys.insert(key.to_vec()) {
            return Err(Error::Store(format!(
                "duplicate key: {}",
                String::from_utf8_lossy(key)
            )));
        }
        let key_len = u32::try_from(key.len())
            .map_err(|_| Error::Store(format!("key too long: {} bytes", key.len())))?;
        let val_len = u32::try_from(value.len())
            .map_err(|_| Error::Store(format!("value too long: {} bytes", value.len())))?;

        self.writer.write_all(&key_len.to_le_bytes())?;
        self.writer.write_all(&val_len.to_le_bytes())?;
        self.writer.write_all(key)?;
        self.writer.write_all(value)?;

        let value_offset = self.current_offset + 8 + u64::from(key_len);
        self.index.push((key.to_vec(), value_offset, val_len));

        self.current_offset = value_offset + u64::from(val_len);
        self.entry_count += 1;
        Ok(())
    }

    /// Write the index block and footer, fix up the entry count, and sync.
    ///
    /// Returns the number of records written.
    pub fn finish(mut self) -> Result<u64> {
        let index_offset = self.current_offset;
        let mut hasher = crc32fast::Hasher::new();

        for (key, offset, len) in &self.index {
            let key_len = u32::try_from(key.len())
                .map_err(|_| Error::Store("key too long".to_string()))?
                .to_le_bytes();
            let offset_bytes = offset.to_le_bytes();
            let len_bytes = len.to_le_bytes();

            self.writer.write_all(&key_len)?;
            self.writer.write_all(&offset_bytes)?;
            self.writer.write_all(&len_bytes)?;
            self.writer.write_all(key)?;

            hasher.update(&key_len);
            hasher.update(&offset_bytes);
            hasher.update(&len_bytes);
            hasher.update(key);
        }

        let index_crc = hasher.finalize();
        self.writer.write_all(&index_offset.to_le_bytes())?;
        self.writer.write_all(&index_crc.to_le_bytes())?;
        self.writer.flush()?;

        let mut file = self
            .writer
            .into_inner()
            .map_err(|e| Error::Store(format!("flush failed: {e}")))?;
        file.seek(SeekFrom::Start(6))?; // after magic + version
        file.write_all(&self.entry_count.to_le_bytes())?;
        file.sync_all()?;

        Ok(self.entry_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn duplicate_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dup.store");
        let mut builder = StoreBuilder::create(&path).unwrap();

        builder.add(b"example.com", b"301 /a").unwrap();
        let err = builder.add(b"example.com", b"302 /b").unwrap_err();
        assert!(err.to_string().contains("duplicate key"), "{err}");

        // Distinct keys still go through.
        builder.add(b"other.example.com", b"301 /c").unwrap();
        assert_eq!(builder.finish().unwrap(), 2);
    }
}

