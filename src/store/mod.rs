//! Read-only keyed store for redirect records.
//!
//! File layout:
//! - header: magic `RDRS` (4) + version u16 LE (2) + entry count u64 LE (8)
//! - data section: per entry `[key_len u32][val_len u32][key][value]`
//! - index block: per entry `[key_len u32][value_offset u64][value_len u32][key]`
//! - footer: `[index_offset u64][index_crc u32]`
//!
//! The store is populated out-of-band (`redirector-mkstore`) and opened
//! read-only by the server; the index CRC is verified at open.

mod builder;
mod reader;

pub use builder::StoreBuilder;
pub use reader::Store;

pub(crate) const MAGIC: &[u8; 4] = b"RDRS";
pub(crate) const VERSION: u16 = 1;

/// Magic + version + entry count.
pub(crate) const HEADER_SIZE: u64 = 14;

/// Index offset + index CRC.
pub(crate) const FOOTER_SIZE: u64 = 12;
