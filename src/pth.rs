use std::convert::TryFrom;

use log::debug;

use crate::byte_cursor::ByteCursor;
use crate::encoded_strings::encode_name;
use crate::{DecodeError, EncodeError};

type Result<T> = std::result::Result<T, DecodeError>;

const ENTRY_FIXED_SIZE: usize = 8;

/// Directory record of a PTH archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub offset: u32,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntry {
    pub name: String,
    pub contents: Vec<u8>,
}

impl ArchiveEntry {
    fn read(cursor: &mut ByteCursor) -> Result<Self> {
        let name = cursor.read_null_terminated_string()?;
        let offset = cursor.read_u32()?;
        let length = cursor.read_u32()?;
        Ok(ArchiveEntry {
            name,
            offset,
            length,
        })
    }

    /// Slices this entry's blob out of the archive buffer.
    pub fn extract(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let start = self.offset as usize;
        let length = self.length as usize;
        start
            .checked_add(length)
            .and_then(|end| raw.get(start..end))
            .map(|blob| blob.to_vec())
            .ok_or_else(|| DecodeError::MalformedArchive(self.name.clone(), start, length, raw.len()))
    }
}

/// Reads the directory of a PTH archive without extracting anything.
pub fn read_directory(raw: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut cursor = ByteCursor::new(raw);
    let mut entries = Vec::new();
    while cursor.peek_non_zero("the PTH directory")? {
        entries.push(ArchiveEntry::read(&mut cursor)?);
    }
    Ok(entries)
}

/// Splits a PTH archive into its named blobs, in directory order.
/// Nested archives come back as plain blobs; recursing into them is up to the caller.
pub fn parse(raw: &[u8]) -> Result<Vec<ExtractedEntry>> {
    let directory = read_directory(raw)?;
    let mut entries = Vec::with_capacity(directory.len());
    for entry in directory {
        debug!("PTH entry {} at 0x{:x} (0x{:x} bytes)", entry.name, entry.offset, entry.length);
        let contents = entry.extract(raw)?;
        entries.push(ExtractedEntry {
            name: entry.name,
            contents,
        });
    }
    Ok(entries)
}

fn to_address(name: &str, value: usize) -> std::result::Result<u32, EncodeError> {
    u32::try_from(value).map_err(|_| EncodeError::AddressOverflow(name.to_string(), value))
}

pub fn serialize(entries: &[ExtractedEntry]) -> std::result::Result<Vec<u8>, EncodeError> {
    // Two sections: the directory (terminated by a zero byte), then the blobs.
    let raw_names: Vec<Vec<u8>> = entries.iter().map(|e| encode_name(&e.name)).collect();
    let directory_length: usize = raw_names
        .iter()
        .map(|name| name.len() + 1 + ENTRY_FIXED_SIZE)
        .sum::<usize>()
        + 1;

    let mut archive: Vec<u8> = Vec::new();
    let mut next_file_address = directory_length;
    for (raw_name, entry) in raw_names.iter().zip(entries) {
        let offset = to_address(&entry.name, next_file_address)?;
        let length = to_address(&entry.name, entry.contents.len())?;
        archive.extend_from_slice(raw_name);
        archive.push(0);
        archive.extend(offset.to_le_bytes().iter());
        archive.extend(length.to_le_bytes().iter());
        next_file_address += entry.contents.len();
    }
    archive.push(0);
    for entry in entries {
        archive.extend_from_slice(&entry.contents);
    }
    Ok(archive)
}
