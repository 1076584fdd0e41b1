/*
 * Created on Thu Oct 22 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::{debug, warn};

use super::{
    PAYLOAD_START, RIFX_IDENTIFIER, RifxError, RifxErrorKind,
    afterburner::AfterburnerMap,
    archive::{DataBlock, ResourceEntry, ResourceLocation},
    chunk::{CHUNK_HEADER_SIZE, Chunk},
    container::{DirFileResource, DirFilesContainer},
    header::{FormatDescriptor, locate_rifx},
    map::{InitialMap, MemoryMap},
    member::{
        bitmap::{BitmapRecord, read_bitmaps},
        library::{CastLibrary, read_cast_libraries},
        script::{ScriptRecord, read_scripts},
        shape::{ShapeRecord, read_shapes},
        sound::{SoundRecord, read_sounds},
        text::{FieldRecord, TextRecord, read_fields, read_texts}
    },
    stream::sub_slice,
    tag::{IMAP_TAG, MMAP_TAG},
    writer::ContainerVariant
};

/// Read session over one container.
/// Owns the source stream until [`into_inner`](Self::into_inner) or [`close`](Self::close).
pub struct ReaderContext<T> {

    stream: T,
    file_name: String,

    buffer: Vec<u8>,
    data_block: DataBlock,
    afterburner: Option<AfterburnerMap>,

    container: Option<DirFilesContainer>

}

impl<T: Read> ReaderContext<T> {

    /// Read whole stream and parse container header and directory.
    /// The extension of file_name is only checked against the content.
    pub fn open(mut stream: T, file_name: &str) -> Result<Self, RifxError> {
        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer)?;

        // Projectors carry the container after the executable image.
        if !has_form_tag(&buffer) {
            if let Some(start) = locate_rifx(&buffer) {
                debug!("{}: found embedded container at offset {}", file_name, start);
                buffer.drain(..start as usize);
            }
        }

        if (buffer.len() as u64) < PAYLOAD_START {
            return Err(RifxError::new(RifxErrorKind::TruncatedContainer {
                tag: RIFX_IDENTIFIER,
                offset: 0,
                length: PAYLOAD_START
            }, None));
        }

        let (_, mut format) = FormatDescriptor::from_bytes(&mut Cursor::new(&buffer))?;

        let declared_length = format.declared_size() as u64 + 8;
        if declared_length > buffer.len() as u64 {
            return Err(RifxError::new(RifxErrorKind::TruncatedContainer {
                tag: RIFX_IDENTIFIER,
                offset: 0,
                length: declared_length
            }, None));
        }

        match ContainerVariant::from_file_name(file_name) {
            Ok(variant) if variant.codec() != format.codec() => warn!(
                "{}: extension suggests {:?} codec but content is {:?}",
                file_name, variant.codec(), format.codec()
            ),

            Err(_) => debug!("{}: unknown extension, using content codec {:?}", file_name, format.codec()),

            _ => {}
        }

        let (data_block, afterburner) = if format.big_endian() {
            read_directory::<BigEndian>(&buffer, &mut format)?
        } else {
            read_directory::<LittleEndian>(&buffer, &mut format)?
        };

        debug!(
            "{}: {:?} container, afterburned: {}, {} resources",
            file_name, format.codec(), format.afterburned(), data_block.entries().len()
        );

        Ok(Self {
            stream,
            file_name: file_name.to_owned(),
            buffer,
            data_block,
            afterburner,
            container: None
        })
    }

}

impl<T> ReaderContext<T> {

    pub fn file_name(&self) -> &String {
        &self.file_name
    }

    pub fn format(&self) -> FormatDescriptor {
        self.data_block.format()
    }

    pub fn data_block(&self) -> &DataBlock {
        &self.data_block
    }

    /// Compressor build string of afterburned containers.
    pub fn afterburner_version(&self) -> Option<&String> {
        self.afterburner.as_ref().and_then(|map| map.version())
    }

    /// Read every live resource in on-disk order.
    pub fn read_dir_files_container(&mut self) -> Result<DirFilesContainer, RifxError> {
        Ok(self.container()?.clone())
    }

    fn container(&mut self) -> Result<&DirFilesContainer, RifxError> {
        let container = match self.container.take() {
            Some(container) => container,
            None => self.load_container()?
        };

        Ok(self.container.get_or_insert(container))
    }

    fn load_container(&self) -> Result<DirFilesContainer, RifxError> {
        let mut container = DirFilesContainer::new();

        for entry in self.data_block.entries() {
            let bytes = self.load_entry(entry)?;
            container.push(DirFileResource::from_parts(entry.tag(), entry.id(), bytes))?;
        }

        Ok(container)
    }

    fn load_entry(&self, entry: &ResourceEntry) -> Result<Vec<u8>, RifxError> {
        match (entry.location(), &self.afterburner) {
            (ResourceLocation::Chunk(offset), _) => {
                if self.data_block.format().big_endian() {
                    read_resource_chunk::<BigEndian>(&self.buffer, entry, offset)
                } else {
                    read_resource_chunk::<LittleEndian>(&self.buffer, entry, offset)
                }
            },

            (_, Some(map)) => map.load(&self.buffer, entry),

            (_, None) => Err(RifxError::resource_decode(&entry.name().to_string(), "segment without afterburner map"))
        }
    }

    pub fn read_texts(&mut self) -> Result<Vec<Result<TextRecord, RifxError>>, RifxError> {
        Ok(read_texts(self.container()?))
    }

    pub fn read_fields(&mut self) -> Result<Vec<Result<FieldRecord, RifxError>>, RifxError> {
        Ok(read_fields(self.container()?))
    }

    pub fn read_scripts(&mut self) -> Result<Vec<Result<ScriptRecord, RifxError>>, RifxError> {
        Ok(read_scripts(self.container()?))
    }

    pub fn read_sounds(&mut self) -> Result<Vec<Result<SoundRecord, RifxError>>, RifxError> {
        Ok(read_sounds(self.container()?))
    }

    pub fn read_bitmaps(&mut self) -> Result<Vec<Result<BitmapRecord, RifxError>>, RifxError> {
        Ok(read_bitmaps(self.container()?))
    }

    pub fn read_shapes(&mut self) -> Result<Vec<Result<ShapeRecord, RifxError>>, RifxError> {
        Ok(read_shapes(self.container()?))
    }

    pub fn read_cast_libraries(&mut self) -> Result<Vec<Result<CastLibrary, RifxError>>, RifxError> {
        Ok(read_cast_libraries(self.container()?))
    }

    /// Unwraps this context, returning the source stream.
    pub fn into_inner(self) -> T {
        self.stream
    }

    /// Release the source stream.
    pub fn close(self) {}

}

fn has_form_tag(buffer: &[u8]) -> bool {
    let tag = RIFX_IDENTIFIER.bytes();

    buffer.starts_with(&tag) || buffer.starts_with(&[tag[3], tag[2], tag[1], tag[0]])
}

fn read_directory<B: ByteOrder>(buffer: &[u8], format: &mut FormatDescriptor) -> Result<(DataBlock, Option<AfterburnerMap>), RifxError> {
    if format.afterburned() {
        let map = AfterburnerMap::from_bytes::<B>(buffer, format)?;
        let entries = map.entries().clone();

        return Ok((DataBlock::new(*format, entries), Some(map)));
    }

    let payload_start = format.payload_start();
    let initial_map = InitialMap::from_chunk::<B>(&Chunk::read_at::<B>(buffer, payload_start)?, payload_start)?;

    format.set_map_version(initial_map.map_version());
    format.set_archive_version(initial_map.archive_version());

    if !format.has_known_versions() {
        warn!(
            "unexpected {:?} versions: map {:#X}, archive {:#X}",
            format.codec(), format.map_version(), format.archive_version()
        );
    }

    let memory_map_offset = initial_map.memory_map_offset() as u64;
    let memory_map_chunk = Chunk::read_at::<B>(buffer, memory_map_offset)?;
    if memory_map_chunk.tag() != MMAP_TAG {
        return Err(RifxError::new(RifxErrorKind::InvalidChunk {
            expected: MMAP_TAG,
            found: memory_map_chunk.tag(),
            offset: memory_map_offset
        }, None));
    }

    let memory_map = MemoryMap::from_chunk::<B>(&memory_map_chunk, memory_map_offset)?;

    // Slots describing the container itself are not resources.
    let mut entries: Vec<ResourceEntry> = memory_map.entries().iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_live() && entry.tag() != IMAP_TAG && entry.tag() != MMAP_TAG && entry.tag() != RIFX_IDENTIFIER)
        .map(|(slot, entry)| ResourceEntry::new(slot as u32, entry.tag(), entry.offset() as u64, entry.length() as u64))
        .collect();

    entries.sort_by_key(|entry| match entry.location() {
        ResourceLocation::Chunk(offset) => offset,
        _ => 0
    });

    debug!("memory map at {}: {} slots, {} live resources", memory_map_offset, memory_map.entries().len(), entries.len());

    Ok((DataBlock::new(*format, entries), None))
}

/// Directory length must fit the buffer. A differing chunk header length within bounds is only reported.
fn read_resource_chunk<B: ByteOrder>(buffer: &[u8], entry: &ResourceEntry, offset: u64) -> Result<Vec<u8>, RifxError> {
    if sub_slice(buffer, offset + CHUNK_HEADER_SIZE, entry.length()).is_none() {
        return Err(RifxError::new(RifxErrorKind::TruncatedContainer {
            tag: entry.tag(),
            offset,
            length: entry.length()
        }, None));
    }

    let chunk = Chunk::read_at::<B>(buffer, offset)?;

    if chunk.tag() != entry.tag() {
        return Err(RifxError::new(RifxErrorKind::InvalidChunk {
            expected: entry.tag(),
            found: chunk.tag(),
            offset
        }, None));
    }

    if chunk.data().len() as u64 != entry.length() {
        warn!(
            "{}: chunk holds {} bytes, directory declares {}",
            entry.name(), chunk.data().len(), entry.length()
        );
    }

    Ok(chunk.into_data())
}

/// Read every resource of a container stream.
/// Returns the stream back when `leave_open` is set.
pub fn read_file<T: Read>(stream: T, file_name: &str, leave_open: bool) -> Result<(DirFilesContainer, Option<T>), RifxError> {
    let mut context = ReaderContext::open(stream, file_name)?;
    let container = context.read_dir_files_container()?;

    if leave_open {
        Ok((container, Some(context.into_inner())))
    } else {
        context.close();
        Ok((container, None))
    }
}
