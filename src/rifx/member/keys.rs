/*
 * Created on Wed Oct 21 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

//! `KEY*` links resources to their owners, `CAS*` lists the members of a cast library.

use std::io::{self, Cursor, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::rifx::tag::FourCC;

pub const KEY_TABLE_HEADER_SIZE: u16 = 12;
pub const KEY_TABLE_ENTRY_SIZE: u16 = 12;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyTableEntry {

    child_id: u32,
    parent_id: u32,
    child_tag: FourCC

}

impl KeyTableEntry {

    pub fn new(child_id: u32, parent_id: u32, child_tag: FourCC) -> Self {
        Self {
            child_id,
            parent_id,
            child_tag
        }
    }

    pub fn child_id(&self) -> u32 {
        self.child_id
    }

    pub fn parent_id(&self) -> u32 {
        self.parent_id
    }

    pub fn child_tag(&self) -> FourCC {
        self.child_tag
    }

}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyTable {

    entries: Vec<KeyTableEntry>

}

impl KeyTable {

    pub fn new(entries: Vec<KeyTableEntry>) -> Self {
        Self {
            entries
        }
    }

    pub fn entries(&self) -> &Vec<KeyTableEntry> {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut Vec<KeyTableEntry> {
        &mut self.entries
    }

    pub fn parent_of(&self, child_id: u32) -> Option<&KeyTableEntry> {
        self.entries.iter().find(|entry| entry.child_id == child_id)
    }

    pub fn children_of(&self, parent_id: u32) -> impl Iterator<Item = &KeyTableEntry> {
        self.entries.iter().filter(move |entry| entry.parent_id == parent_id)
    }

    /// Parse table. Byte order is detected from the header size field.
    pub fn from_bytes(data: &[u8]) -> io::Result<Self> {
        if data.len() < KEY_TABLE_HEADER_SIZE as usize {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "key table header is truncated"));
        }

        if BigEndian::read_u16(data) == KEY_TABLE_HEADER_SIZE {
            Self::read_entries::<BigEndian>(data)
        } else if LittleEndian::read_u16(data) == KEY_TABLE_HEADER_SIZE {
            Self::read_entries::<LittleEndian>(data)
        } else {
            Err(io::Error::new(io::ErrorKind::InvalidData, "unknown key table header size"))
        }
    }

    fn read_entries<B: ByteOrder>(data: &[u8]) -> io::Result<Self> {
        let mut stream = Cursor::new(data);

        let header_size = stream.read_u16::<B>()? as u64;
        let entry_size = stream.read_u16::<B>()? as u64;
        let _max_count = stream.read_u32::<B>()?;
        let used_count = stream.read_u32::<B>()? as u64;

        if entry_size < KEY_TABLE_ENTRY_SIZE as u64 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "key table entries are too small"));
        }

        if header_size + used_count * entry_size > data.len() as u64 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "key table entries are truncated"));
        }

        let mut entries = Vec::with_capacity(used_count as usize);
        for i in 0..used_count {
            stream.set_position(header_size + i * entry_size);

            entries.push(KeyTableEntry::new(
                stream.read_u32::<B>()?,
                stream.read_u32::<B>()?,
                FourCC::from_bytes::<B, _>(&mut stream)?
            ));
        }

        Ok(Self::new(entries))
    }

    /// Big endian table bytes.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let count = self.entries.len() as u32;
        let mut data = Vec::with_capacity(KEY_TABLE_HEADER_SIZE as usize + KEY_TABLE_ENTRY_SIZE as usize * self.entries.len());

        data.write_u16::<BigEndian>(KEY_TABLE_HEADER_SIZE)?;
        data.write_u16::<BigEndian>(KEY_TABLE_ENTRY_SIZE)?;
        data.write_u32::<BigEndian>(count)?;
        data.write_u32::<BigEndian>(count)?;

        for entry in &self.entries {
            data.write_u32::<BigEndian>(entry.child_id)?;
            data.write_u32::<BigEndian>(entry.parent_id)?;
            entry.child_tag.write_bytes::<BigEndian, _>(&mut data)?;
        }

        Ok(data)
    }

}

/// Member slots of a cast library. Slot `n` holds the `CASt` resource id of member `n + 1`, zero when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastTable {

    members: Vec<u32>

}

impl CastTable {

    pub fn new(members: Vec<u32>) -> Self {
        Self {
            members
        }
    }

    pub fn members(&self) -> &Vec<u32> {
        &self.members
    }

    pub fn from_bytes(data: &[u8]) -> io::Result<Self> {
        if data.len() % 4 != 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "cast table length is not a multiple of 4"));
        }

        let mut stream = Cursor::new(data);
        let mut members = Vec::with_capacity(data.len() / 4);
        for _ in 0..data.len() / 4 {
            members.push(stream.read_u32::<BigEndian>()?);
        }

        Ok(Self::new(members))
    }

    pub fn write_bytes<T: Write>(&self, stream: &mut T) -> io::Result<u64> {
        for member in &self.members {
            stream.write_u32::<BigEndian>(*member)?;
        }

        Ok(self.members.len() as u64 * 4)
    }

}
