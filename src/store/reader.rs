//! Store reader.
//!
//! Opens a store file, validates it, and serves keyed lookups.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::os::unix::fs::FileExt;
use std::path::Path;

use crate::error::{Error, Result};

use super::{FOOTER_SIZE, HEADER_SIZE, MAGIC, VERSION};

/// Read-only handle over a store file.
///
/// The whole index is loaded into memory at open; a lookup is one positioned
/// read of the value bytes. Lookups take `&self`, so a single handle behind
/// an `Arc` serves concurrent requests without locking.
#[derive(Debug)]
pub struct Store {
    file: File,
    index: HashMap<Vec<u8>, ValueRef>,
}

/// Location of a value inside the data section.
#[derive(Debug, Clone, Copy)]
struct ValueRef {
    offset: u64,
    len: u32,
}

impl Store {
    /// Open a store file.
    ///
    /// Fails on a missing path, bad magic, unsupported version, truncation,
    /// or an index checksum mismatch. Startup-fatal; never retried.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_size = file.metadata()?.len();

        if file_size < HEADER_SIZE + FOOTER_SIZE {
            return Err(Error::Store(format!(
                "{}: file too small ({file_size} bytes)",
                path.display()
            )));
        }

        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(Error::Store(format!(
                "{}: bad magic, not a redirect store",
                path.display()
            )));
        }

        let version = u16_at(&header, 4);
        if version != VERSION {
            return Err(Error::Store(format!(
                "{}: unsupported store version {version}",
                path.display()
            )));
        }

        let entry_count = u64_at(&header, 6);

        let mut footer = [0u8; FOOTER_SIZE as usize];
        file.seek(SeekFrom::Start(file_size - FOOTER_SIZE))?;
        file.read_exact(&mut footer)?;

        let index_offset = u64_at(&footer, 0);
        let index_crc = u32_at(&footer, 8);

        if index_offset < HEADER_SIZE || index_offset > file_size - FOOTER_SIZE {
            return Err(Error::Store(format!(
                "{}: index offset {index_offset} out of bounds",
                path.display()
            )));
        }

        let index_len = file_size - FOOTER_SIZE - index_offset;
        let mut index_data = vec![0u8; usize::try_from(index_len).map_err(|_| {
            Error::Store(format!("{}: index block too large", path.display()))
        })?];
        file.seek(SeekFrom::Start(index_offset))?;
        file.read_exact(&mut index_data)?;

        if crc32fast::hash(&index_data) != index_crc {
            return Err(Error::Store(format!(
                "{}: index checksum mismatch",
                path.display()
            )));
        }

        let index = parse_index(&index_data, index_offset)
            .map_err(|msg| Error::Store(format!("{}: {msg}", path.display())))?;

        if index.len() as u64 != entry_count {
            return Err(Error::Store(format!(
                "{}: header claims {entry_count} entries, index has {}",
                path.display(),
                index.len()
            )));
        }

        Ok(Self { file, index })
    }

    /// Look up a value by key (byte-exact).
    ///
    /// `Ok(None)` means the key is absent; `Err` is an I/O failure,
    /// distinguished from "not found". This is a blocking synchronous read
    /// and never mutates the store.
    pub fn lookup(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let Some(vref) = self.index.get(key) else {
            return Ok(None);
        };

        let mut value = vec![0u8; vref.len as usize];
        self.file.read_exact_at(&mut value, vref.offset)?;
        Ok(Some(value))
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Parse index entries: `[key_len u32][value_offset u64][value_len u32][key]`.
fn parse_index(data: &[u8], index_offset: u64) -> std::result::Result<HashMap<Vec<u8>, ValueRef>, String> {
    let mut index = HashMap::new();
    let mut pos = 0usize;

    while pos < data.len() {
        if pos + 16 > data.len() {
            return Err("truncated index entry".to_string());
        }
        let key_len = u32_at(data, pos) as usize;
        let offset = u64_at(data, pos + 4);
        let len = u32_at(data, pos + 12);
        pos += 16;

        if pos + key_len > data.len() {
            return Err("truncated index key".to_string());
        }
        let key = data[pos..pos + key_len].to_vec();
        pos += key_len;

        // Values must lie inside the data section. The end offset is
        // computed checked: a crafted index can carry lengths that would
        // overflow even when its CRC matches.
        let end = offset.checked_add(u64::from(len));
        if offset < HEADER_SIZE || end.map_or(true, |e| e > index_offset) {
            return Err(format!("value at offset {offset} out of bounds"));
        }

        index.insert(key, ValueRef { offset, len });
    }

    Ok(index)
}

fn u16_at(buf: &[u8], pos: usize) -> u16 {
    let mut b = [0u8; 2];
    b.copy_from_slice(&buf[pos..pos + 2]);
    u16::from_le_bytes(b)
}

fn u32_at(buf: &[u8], pos: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[pos..pos + 4]);
    u32::from_le_bytes(b)
}

fn u64_at(buf: &[u8], pos: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[pos..pos + 8]);
    u64::from_le_bytes(b)
}
