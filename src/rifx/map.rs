/*
 * Created on Tue Oct 20 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

//! Directory chunks. The initial map sits at the payload start and points to the trailing memory map,
//! which holds one entry per resource id.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};

use super::{RifxError, RifxErrorKind, chunk::{CHUNK_HEADER_SIZE, Chunk}, tag::{FREE_TAG, FourCC, IMAP_TAG, JUNK_TAG, MMAP_TAG}};

pub const INITIAL_MAP_SIZE: u64 = 16;

pub const MEMORY_MAP_HEADER_SIZE: u16 = 24;
pub const MEMORY_MAP_ENTRY_SIZE: u16 = 20;

/// Link terminator in the free and junk lists.
pub const NO_LINK: i32 = -1;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InitialMap {

    map_count: u32,
    memory_map_offset: u32,

    map_version: u32,
    archive_version: u32

}

impl InitialMap {

    pub fn new(memory_map_offset: u32, map_version: u32, archive_version: u32) -> Self {
        Self {
            map_count: 1,
            memory_map_offset,
            map_version,
            archive_version
        }
    }

    pub fn map_count(&self) -> u32 {
        self.map_count
    }

    /// Absolute offset of the memory map chunk.
    pub fn memory_map_offset(&self) -> u32 {
        self.memory_map_offset
    }

    pub fn set_memory_map_offset(&mut self, memory_map_offset: u32) {
        self.memory_map_offset = memory_map_offset;
    }

    pub fn map_version(&self) -> u32 {
        self.map_version
    }

    pub fn archive_version(&self) -> u32 {
        self.archive_version
    }

    /// Parse initial map from its chunk located at offset.
    pub fn from_chunk<B: ByteOrder>(chunk: &Chunk, offset: u64) -> Result<Self, RifxError> {
        if chunk.tag() != IMAP_TAG {
            return Err(RifxError::new(RifxErrorKind::MalformedHeader { offset, found: chunk.tag() }, None));
        }

        if (chunk.data().len() as u64) < INITIAL_MAP_SIZE {
            return Err(RifxError::new(RifxErrorKind::TruncatedContainer {
                tag: IMAP_TAG,
                offset,
                length: INITIAL_MAP_SIZE
            }, None));
        }

        let mut stream = Cursor::new(chunk.data());

        Ok(Self {
            map_count: stream.read_u32::<B>()?,
            memory_map_offset: stream.read_u32::<B>()?,
            map_version: stream.read_u32::<B>()?,
            archive_version: stream.read_u32::<B>()?
        })
    }

    pub fn to_chunk<B: ByteOrder>(&self) -> Result<Chunk, RifxError> {
        let mut data = Vec::with_capacity(INITIAL_MAP_SIZE as usize);

        data.write_u32::<B>(self.map_count)?;
        data.write_u32::<B>(self.memory_map_offset)?;
        data.write_u32::<B>(self.map_version)?;
        data.write_u32::<B>(self.archive_version)?;

        Ok(Chunk::new(IMAP_TAG, data))
    }

}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryMapEntry {

    tag: FourCC,
    length: u32,
    offset: u32,

    flags: u16,
    reserved: u16,

    next: i32

}

impl MemoryMapEntry {

    pub fn new(tag: FourCC, length: u32, offset: u32) -> Self {
        Self {
            tag,
            length,
            offset,
            flags: 0,
            reserved: 0,
            next: NO_LINK
        }
    }

    /// Unused slot linked to the next free slot.
    pub fn free(next: i32) -> Self {
        Self {
            tag: FREE_TAG,
            length: 0,
            offset: 0,
            flags: 0,
            reserved: 0,
            next
        }
    }

    pub fn tag(&self) -> FourCC {
        self.tag
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    /// Absolute offset of the chunk header.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn set_flags(&mut self, flags: u16) {
        self.flags = flags;
    }

    pub fn next(&self) -> i32 {
        self.next
    }

    /// Entry refers to a resource chunk rather than an unused slot.
    pub fn is_live(&self) -> bool {
        self.tag != FREE_TAG && self.tag != JUNK_TAG
    }

    pub fn from_bytes<B: ByteOrder, T: Read>(stream: &mut T) -> Result<(u64, Self), RifxError> {
        let entry = Self {
            tag: FourCC::from_bytes::<B, _>(stream)?,
            length: stream.read_u32::<B>()?,
            offset: stream.read_u32::<B>()?,
            flags: stream.read_u16::<B>()?,
            reserved: stream.read_u16::<B>()?,
            next: stream.read_i32::<B>()?
        };

        Ok((MEMORY_MAP_ENTRY_SIZE as u64, entry))
    }

    pub fn write_bytes<B: ByteOrder, T: Write>(&self, stream: &mut T) -> Result<u64, RifxError> {
        self.tag.write_bytes::<B, _>(stream)?;
        stream.write_u32::<B>(self.length)?;
        stream.write_u32::<B>(self.offset)?;
        stream.write_u16::<B>(self.flags)?;
        stream.write_u16::<B>(self.reserved)?;
        stream.write_i32::<B>(self.next)?;

        Ok(MEMORY_MAP_ENTRY_SIZE as u64)
    }

}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMap {

    junk_head: i32,
    free_head: i32,

    entries: Vec<MemoryMapEntry>

}

impl MemoryMap {

    pub fn new(entries: Vec<MemoryMapEntry>) -> Self {
        let free_head = entries.iter().position(|entry| entry.tag == FREE_TAG).map(|index| index as i32).unwrap_or(NO_LINK);

        Self {
            junk_head: NO_LINK,
            free_head,
            entries
        }
    }

    pub fn junk_head(&self) -> i32 {
        self.junk_head
    }

    pub fn free_head(&self) -> i32 {
        self.free_head
    }

    /// Entries indexed by resource id.
    pub fn entries(&self) -> &Vec<MemoryMapEntry> {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut Vec<MemoryMapEntry> {
        &mut self.entries
    }

    /// Size of chunk payload.
    pub fn data_size(&self) -> u64 {
        MEMORY_MAP_HEADER_SIZE as u64 + MEMORY_MAP_ENTRY_SIZE as u64 * self.entries.len() as u64
    }

    /// Size of the whole chunk on disk.
    pub fn stored_size(&self) -> u64 {
        CHUNK_HEADER_SIZE + self.data_size()
    }

    /// Parse memory map from its chunk located at offset.
    pub fn from_chunk<B: ByteOrder>(chunk: &Chunk, offset: u64) -> Result<Self, RifxError> {
        if chunk.tag() != MMAP_TAG {
            return Err(RifxError::new(RifxErrorKind::MalformedHeader { offset, found: chunk.tag() }, None));
        }

        let data = chunk.data();
        let truncated = |length: u64| {
            RifxError::new(RifxErrorKind::TruncatedContainer { tag: MMAP_TAG, offset, length }, None)
        };

        if (data.len() as u64) < MEMORY_MAP_HEADER_SIZE as u64 {
            return Err(truncated(MEMORY_MAP_HEADER_SIZE as u64));
        }

        let mut stream = Cursor::new(data);

        let header_size = stream.read_u16::<B>()?;
        let entry_size = stream.read_u16::<B>()?;
        let _max_count = stream.read_u32::<B>()?;
        let used_count = stream.read_u32::<B>()?;
        let junk_head = stream.read_i32::<B>()?;
        let _ = stream.read_i32::<B>()?;
        let free_head = stream.read_i32::<B>()?;

        if header_size < MEMORY_MAP_HEADER_SIZE || entry_size < MEMORY_MAP_ENTRY_SIZE {
            return Err(RifxError::new(RifxErrorKind::MalformedHeader { offset, found: MMAP_TAG }, None));
        }

        let required = header_size as u64 + entry_size as u64 * used_count as u64;
        if required > data.len() as u64 {
            return Err(truncated(required));
        }

        let mut entries = Vec::with_capacity(used_count as usize);
        for i in 0..used_count as u64 {
            stream.seek(SeekFrom::Start(header_size as u64 + i * entry_size as u64))?;

            let (_, entry) = MemoryMapEntry::from_bytes::<B, _>(&mut stream)?;
            entries.push(entry);
        }

        Ok(Self {
            junk_head,
            free_head,
            entries
        })
    }

    pub fn to_chunk<B: ByteOrder>(&self) -> Result<Chunk, RifxError> {
        let mut data = Vec::with_capacity(self.data_size() as usize);
        let count = self.entries.len() as u32;

        data.write_u16::<B>(MEMORY_MAP_HEADER_SIZE)?;
        data.write_u16::<B>(MEMORY_MAP_ENTRY_SIZE)?;
        data.write_u32::<B>(count)?;
        data.write_u32::<B>(count)?;
        data.write_i32::<B>(self.junk_head)?;
        data.write_i32::<B>(NO_LINK)?;
        data.write_i32::<B>(self.free_head)?;

        for entry in &self.entries {
            entry.write_bytes::<B, _>(&mut data)?;
        }

        Ok(Chunk::new(MMAP_TAG, data))
    }

}

#[cfg(test)]
mod tests {
    use byteorder::{BigEndian, LittleEndian};

    use crate::rifx::tag::CAST_MEMBER_TAG;

    use super::*;

    #[test]
    fn memory_map_round_trip() {
        let map = MemoryMap::new(vec![
            MemoryMapEntry::free(2),
            MemoryMapEntry::new(CAST_MEMBER_TAG, 3, 36),
            MemoryMapEntry::free(NO_LINK)
        ]);
        assert_eq!(map.free_head(), 0);

        let chunk = map.to_chunk::<LittleEndian>().unwrap();
        assert_eq!(chunk.data().len() as u64, map.data_size());

        let parsed = MemoryMap::from_chunk::<LittleEndian>(&chunk, 0).unwrap();
        assert_eq!(parsed, map);
        assert!(!parsed.entries()[0].is_live());
        assert!(parsed.entries()[1].is_live());
    }

    #[test]
    fn initial_map_round_trip() {
        let map = InitialMap::new(100, 1, 0x4C7);

        let chunk = map.to_chunk::<BigEndian>().unwrap();
        assert_eq!(chunk.data()[4..8], [0, 0, 0, 100]);

        assert_eq!(InitialMap::from_chunk::<BigEndian>(&chunk, 12).unwrap(), map);
    }

    #[test]
    fn memory_map_with_missing_entries() {
        let mut chunk = MemoryMap::new(vec![MemoryMapEntry::free(NO_LINK)]).to_chunk::<BigEndian>().unwrap();
        chunk.data_mut().truncate(30);

        let err = MemoryMap::from_chunk::<BigEndian>(&chunk, 64).unwrap_err();
        assert!(matches!(err.kind(), RifxErrorKind::TruncatedContainer { offset: 64, length: 44, .. }));
    }

    #[test]
    fn wrong_directory_tag() {
        let chunk = Chunk::new(CAST_MEMBER_TAG, vec![0; 16]);

        let err = InitialMap::from_chunk::<BigEndian>(&chunk, 12).unwrap_err();
        assert!(matches!(err.kind(), RifxErrorKind::MalformedHeader { offset: 12, .. }));
    }
}
