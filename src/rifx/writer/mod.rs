/*
 * Created on Tue Oct 20 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

pub mod variant;

use std::{collections::HashMap, io::Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::debug;

pub use self::variant::{ContainerVariant, TopLevelKind, write_file};

use super::{
    PAYLOAD_START, RIFX_IDENTIFIER, RifxError, RifxErrorKind,
    archive::{DataBlock, ResourceEntry, ResourceLocation},
    chunk::{CHUNK_HEADER_SIZE, Chunk},
    container::{DirFileResource, DirFilesContainer, ResourceName},
    map::{INITIAL_MAP_SIZE, InitialMap, MEMORY_MAP_ENTRY_SIZE, MEMORY_MAP_HEADER_SIZE, MemoryMap, MemoryMapEntry, NO_LINK},
    stream::padded_length,
    tag::{FREE_TAG, IMAP_TAG, JUNK_TAG, MMAP_TAG}
};

/// Largest resource id accepted by the writer. Ids are directory slots.
pub const MAX_RESOURCE_ID: u32 = 0xFFFF;

/// Serializes resource collections into containers of one variant.
#[derive(Debug, Copy, Clone)]
pub struct RifxWriter {

    variant: ContainerVariant

}

impl RifxWriter {

    pub fn new(variant: ContainerVariant) -> Self {
        Self {
            variant
        }
    }

    pub fn variant(&self) -> ContainerVariant {
        self.variant
    }

    pub fn set_variant(&mut self, variant: ContainerVariant) {
        self.variant = variant;
    }

    /// Write container to stream.
    /// The container is assembled in memory first, so nothing is written on failure.
    /// Returns the DataBlock describing the written container.
    pub fn write<T: Write>(&self, stream: &mut T, container: &DirFilesContainer) -> Result<DataBlock, RifxError> {
        let (buffer, data_block) = self.build(container)?;

        stream.write_all(&buffer)?;
        stream.flush()?;

        Ok(data_block)
    }

    /// Build container bytes.
    pub fn build(&self, container: &DirFilesContainer) -> Result<(Vec<u8>, DataBlock), RifxError> {
        if self.variant.descriptor().big_endian() {
            self.build_with::<BigEndian>(container)
        } else {
            self.build_with::<LittleEndian>(container)
        }
    }

    fn build_with<B: ByteOrder>(&self, container: &DirFilesContainer) -> Result<(Vec<u8>, DataBlock), RifxError> {
        let names = resolve_names(container)?;

        // Resources follow the initial map in input order, the memory map trails them.
        let mut offset = PAYLOAD_START + CHUNK_HEADER_SIZE + INITIAL_MAP_SIZE;
        let mut entries = Vec::with_capacity(names.len());
        for (name, file) in &names {
            let length = file.bytes().len() as u64;
            entries.push(ResourceEntry::new(name.id(), name.tag(), offset, length));

            offset += CHUNK_HEADER_SIZE + padded_length(length);
        }

        let memory_map_offset = offset;
        let slot_count = names.iter().map(|(name, _)| name.id() as u64 + 1).max().unwrap_or(0);
        let total_size = memory_map_offset + CHUNK_HEADER_SIZE + MEMORY_MAP_HEADER_SIZE as u64
            + slot_count * MEMORY_MAP_ENTRY_SIZE as u64;

        if total_size > u32::MAX as u64 {
            return Err(RifxError::new(RifxErrorKind::ContainerTooLarge(total_size), None));
        }

        let memory_map = build_memory_map(&entries, slot_count as usize);

        let mut format = self.variant.descriptor();
        format.set_declared_size((total_size - 8) as u32);

        let initial_map = InitialMap::new(memory_map_offset as u32, format.map_version(), format.archive_version());

        let mut buffer = Vec::with_capacity(total_size as usize);
        format.write_bytes(&mut buffer)?;
        initial_map.to_chunk::<B>()?.write_bytes::<B, _>(&mut buffer)?;

        for (name, file) in &names {
            Chunk::new(name.tag(), file.bytes().clone()).write_bytes::<B, _>(&mut buffer)?;
        }

        memory_map.to_chunk::<B>()?.write_bytes::<B, _>(&mut buffer)?;

        debug!(
            "built {:?} {:?} container: {} resources, {} directory slots, {} bytes",
            self.variant.codec(), self.variant.kind(), entries.len(), slot_count, buffer.len()
        );

        Ok((buffer, DataBlock::new(format, entries)))
    }

}

/// Parse every file name, rejecting directory tags and reused ids.
/// Names must be canonical so the reader reproduces them.
fn resolve_names(container: &DirFilesContainer) -> Result<Vec<(ResourceName, &DirFileResource)>, RifxError> {
    let mut used: HashMap<u32, &String> = HashMap::with_capacity(container.len());
    let mut names = Vec::with_capacity(container.len());

    for file in container {
        let name = file.name()?;

        if name.to_string() != *file.file_name() || name.id() > MAX_RESOURCE_ID {
            return Err(RifxError::new(RifxErrorKind::InvalidResourceName(file.file_name().clone()), None));
        }

        match name.tag() {
            RIFX_IDENTIFIER | IMAP_TAG | MMAP_TAG | FREE_TAG | JUNK_TAG => {
                return Err(RifxError::new(RifxErrorKind::InvalidResourceName(file.file_name().clone()), None));
            },

            _ => {}
        }

        if let Some(previous) = used.insert(name.id(), file.file_name()) {
            debug!("resource id {} of {} already used by {}", name.id(), file.file_name(), previous);

            return Err(RifxError::new(RifxErrorKind::DuplicateResourceId {
                file_name: file.file_name().clone(),
                id: name.id()
            }, None));
        }

        names.push((name, file));
    }

    Ok(names)
}

/// Memory map with one slot per id. Unused slots form the free list.
fn build_memory_map(entries: &[ResourceEntry], slot_count: usize) -> MemoryMap {
    let mut slots: Vec<Option<MemoryMapEntry>> = vec![None; slot_count];

    for entry in entries {
        if let ResourceLocation::Chunk(offset) = entry.location() {
            slots[entry.id() as usize] = Some(MemoryMapEntry::new(entry.tag(), entry.length() as u32, offset as u32));
        }
    }

    let mut next_free = NO_LINK;
    let mut map_entries = Vec::with_capacity(slot_count);
    for (index, slot) in slots.into_iter().enumerate().rev() {
        match slot {
            Some(entry) => map_entries.push(entry),

            None => {
                map_entries.push(MemoryMapEntry::free(next_free));
                next_free = index as i32;
            }
        }
    }
    map_entries.reverse();

    MemoryMap::new(map_entries)
}

#[cfg(test)]
mod tests {
    use crate::rifx::tag::{BITMAP_DATA_TAG, CAST_MEMBER_TAG, FourCC};

    use super::*;

    fn container(files: Vec<(&str, Vec<u8>)>) -> DirFilesContainer {
        DirFilesContainer::from_files(
            files.into_iter().map(|(name, bytes)| DirFileResource::new(name.to_owned(), bytes)).collect()
        ).unwrap()
    }

    #[test]
    fn layout() {
        let writer = RifxWriter::new(ContainerVariant::PROTECTED_MOVIE);
        let (buffer, data_block) = writer.build(&container(vec![
            ("CASt_0002.bin", vec![1, 2, 3]),
            ("BITD_0000.bin", vec![4, 5])
        ])).unwrap();

        assert_eq!(&buffer[0..4], b"RIFX");
        assert_eq!(&buffer[4..8], &((buffer.len() - 8) as u32).to_be_bytes());
        assert_eq!(&buffer[8..12], b"MC95");
        assert_eq!(&buffer[12..16], b"imap");

        // CASt chunk with pad byte, then BITD chunk
        assert_eq!(&buffer[36..40], b"CASt");
        assert_eq!(&buffer[44..48], &[1, 2, 3, 0]);
        assert_eq!(&buffer[48..52], b"BITD");
        assert_eq!(&buffer[58..62], b"mmap");

        let entries = data_block.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].tag(), entries[0].id()), (CAST_MEMBER_TAG, 2));
        assert_eq!((entries[1].tag(), entries[1].id()), (BITMAP_DATA_TAG, 0));
        assert_eq!(buffer.len(), 58 + 8 + 24 + 3 * 20);
    }

    #[test]
    fn unused_slots_are_free() {
        let entries = vec![ResourceEntry::new(3, FourCC::new(*b"STXT"), 36, 4)];
        let map = build_memory_map(&entries, 4);

        assert_eq!(map.free_head(), 0);
        assert_eq!(map.entries()[0].next(), 1);
        assert_eq!(map.entries()[1].next(), 2);
        assert_eq!(map.entries()[2].next(), NO_LINK);
        assert!(map.entries()[3].is_live());
    }

    #[test]
    fn duplicate_id() {
        let writer = RifxWriter::new(ContainerVariant::CLASSIC_MOVIE);
        let err = writer.build(&container(vec![
            ("CASt_0001.bin", vec![]),
            ("STXT_0001.bin", vec![])
        ])).unwrap_err();

        match err.kind() {
            RifxErrorKind::DuplicateResourceId { file_name, id } => {
                assert_eq!(file_name, "STXT_0001.bin");
                assert_eq!(*id, 1);
            },
            kind => panic!("unexpected error {:?}", kind)
        }
    }

    #[test]
    fn malformed_name_writes_nothing() {
        let writer = RifxWriter::new(ContainerVariant::CLASSIC_CAST);
        let mut stream = Vec::new();

        let err = writer.write(&mut stream, &container(vec![
            ("CASt_0001.bin", vec![1]),
            ("garbage", vec![2])
        ])).unwrap_err();

        assert!(matches!(err.kind(), RifxErrorKind::InvalidResourceName(name) if name == "garbage"));
        assert!(stream.is_empty());
    }

    #[test]
    fn non_canonical_names() {
        let writer = RifxWriter::new(ContainerVariant::CLASSIC_MOVIE);

        for name in &["CASt_1.bin", "BITD_00002.bin", "STXT_0003", "STXT_0003.BIN"] {
            let err = writer.build(&container(vec![(*name, vec![1])])).unwrap_err();

            assert!(matches!(err.kind(), RifxErrorKind::InvalidResourceName(found) if found == name), "{}", name);
        }
    }

    #[test]
    fn directory_size_is_bounded() {
        let writer = RifxWriter::new(ContainerVariant::CLASSIC_MOVIE);

        let err = writer.build(&container(vec![("CASt_2000000.bin", vec![1])])).unwrap_err();
        assert!(matches!(err.kind(), RifxErrorKind::InvalidResourceName(found) if found == "CASt_2000000.bin"));

        let (buffer, _) = writer.build(&container(vec![("CASt_65535.bin", vec![1])])).unwrap();
        assert_eq!(buffer.len() as u64, 36 + 10 + 8 + 24 + 0x10000 * 20);
    }

    #[test]
    fn directory_tags_are_reserved() {
        let writer = RifxWriter::new(ContainerVariant::CLASSIC_CAST);
        let err = writer.build(&container(vec![("mmap_0001.bin", vec![])])).unwrap_err();

        assert!(matches!(err.kind(), RifxErrorKind::InvalidResourceName(_)));
    }
}
