/*
 * Created on Wed Oct 21 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

//! Read support for afterburned (compressed) containers.
//! The 12 byte header is followed by `Fver`, `Fcdr`, `ABMP` and `FGEI` chunks whose lengths are
//! variable length integers. Resource bytes live in the body after `FGEI`, or in the zlib compressed
//! initial load segment stored as resource 2.

use std::{collections::HashMap, io::{self, Cursor, Read, Write}};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};
use flate2::read::ZlibDecoder;
use tracing::{debug, warn};

use super::{
    PAYLOAD_START, RifxError, RifxErrorKind,
    archive::{ResourceCompression, ResourceEntry, ResourceLocation},
    chunk::Chunk,
    header::FormatDescriptor,
    stream::{decode_latin1, read_c_string, read_varint, sub_slice},
    tag::{ABMP_TAG, FCDR_TAG, FGEI_TAG, FREE_TAG, FVER_TAG, FourCC, ILS_TAG, JUNK_TAG}
};

/// Resource id of the initial load segment.
pub const INITIAL_LOAD_SEGMENT_ID: u32 = 2;

/// Class id of a compression implementation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MoaId {

    data1: u32,
    data2: u16,
    data3: u16,
    data4: [u8; 8]

}

impl MoaId {

    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4
        }
    }

    pub fn from_bytes<B: ByteOrder, T: Read>(stream: &mut T) -> io::Result<Self> {
        let data1 = stream.read_u32::<B>()?;
        let data2 = stream.read_u16::<B>()?;
        let data3 = stream.read_u16::<B>()?;

        let mut data4 = [0_u8; 8];
        stream.read_exact(&mut data4)?;

        Ok(Self::new(data1, data2, data3, data4))
    }

    pub fn write_bytes<B: ByteOrder, T: Write>(&self, stream: &mut T) -> io::Result<u64> {
        stream.write_u32::<B>(self.data1)?;
        stream.write_u16::<B>(self.data2)?;
        stream.write_u16::<B>(self.data3)?;
        stream.write_all(&self.data4)?;

        Ok(16)
    }

}

pub const ZLIB_COMPRESSION_ID: MoaId = MoaId::new(0xAC99_E904, 0x0070, 0x0B36, [0x00, 0x00, 0x08, 0x00, 0x07, 0x2C, 0x63, 0x26]);
pub const NULL_COMPRESSION_ID: MoaId = MoaId::new(0xAC99_982E, 0x005D, 0x0D50, [0x00, 0x00, 0x08, 0x00, 0x07, 0x37, 0x7A, 0x34]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionDescriptor {

    id: MoaId,
    name: String,
    compression: ResourceCompression

}

impl CompressionDescriptor {

    pub fn new(id: MoaId, name: String) -> Self {
        let compression = if id == ZLIB_COMPRESSION_ID || name.to_ascii_lowercase().contains("zlib") {
            ResourceCompression::Zlib
        } else if id == NULL_COMPRESSION_ID {
            ResourceCompression::None
        } else {
            ResourceCompression::Unknown
        };

        Self {
            id,
            name,
            compression
        }
    }

    pub fn id(&self) -> MoaId {
        self.id
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn compression(&self) -> ResourceCompression {
        self.compression
    }

}

/// Resource map of an afterburned container.
#[derive(Debug, Clone)]
pub struct AfterburnerMap {

    version: Option<String>,
    compressions: Vec<CompressionDescriptor>,

    entries: Vec<ResourceEntry>,
    inline_segments: HashMap<u32, Vec<u8>>

}

impl AfterburnerMap {

    /// Build string recorded by the compressor, if present.
    pub fn version(&self) -> Option<&String> {
        self.version.as_ref()
    }

    pub fn compressions(&self) -> &Vec<CompressionDescriptor> {
        &self.compressions
    }

    /// Resource entries in map order, without the initial load segment itself.
    pub fn entries(&self) -> &Vec<ResourceEntry> {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ResourceEntry> {
        self.entries
    }

    /// Read map chunks following the header. Fills version fields of format.
    pub fn from_bytes<B: ByteOrder>(buffer: &[u8], format: &mut FormatDescriptor) -> Result<Self, RifxError> {
        let mut offset = PAYLOAD_START;

        let fver = read_chunk::<B>(buffer, &mut offset, FVER_TAG)?;
        let version = read_fver(fver.data(), format)?;

        let fcdr = read_chunk::<B>(buffer, &mut offset, FCDR_TAG)?;
        let compressions = read_fcdr::<B>(fcdr.data())?;

        let abmp = read_chunk::<B>(buffer, &mut offset, ABMP_TAG)?;
        let raw_entries = read_abmp::<B>(abmp.data())?;

        let fgei_offset = offset;
        read_chunk::<B>(buffer, &mut offset, FGEI_TAG)?;
        let body_offset = offset;

        let segment_entry = raw_entries.iter()
            .find(|entry| entry.id == INITIAL_LOAD_SEGMENT_ID as i32)
            .ok_or_else(|| {
                RifxError::new(RifxErrorKind::InvalidChunk { expected: ILS_TAG, found: FGEI_TAG, offset: fgei_offset }, None)
            })?;

        let mut inline_segments = HashMap::new();
        if segment_entry.stored_length > 0 {
            let stored = sub_slice(buffer, body_offset, segment_entry.stored_length).ok_or_else(|| {
                RifxError::new(RifxErrorKind::TruncatedContainer {
                    tag: ILS_TAG,
                    offset: body_offset,
                    length: segment_entry.stored_length
                }, None)
            })?;

            let segment = inflate(stored, segment_entry.length)?;
            read_inline_segments(&segment, &raw_entries, &mut inline_segments)?;
        }

        let mut entries = Vec::with_capacity(raw_entries.len());
        for raw in &raw_entries {
            if raw.id < 0 {
                warn!("skipping afterburner entry '{}' with negative id {}", raw.tag, raw.id);
                continue;
            }

            if raw.id == INITIAL_LOAD_SEGMENT_ID as i32 || raw.tag == ILS_TAG || raw.tag == FREE_TAG || raw.tag == JUNK_TAG {
                continue;
            }

            let location = if raw.offset < 0 {
                ResourceLocation::Inline
            } else {
                ResourceLocation::Segment(body_offset + raw.offset as u64)
            };

            let compression = match compressions.get(raw.compression_index as usize) {
                Some(descriptor) if raw.compression_index >= 0 => descriptor.compression(),
                _ if raw.stored_length == raw.length => ResourceCompression::None,
                _ => ResourceCompression::Unknown
            };

            entries.push(ResourceEntry::stored(raw.id as u32, raw.tag, location, raw.stored_length, raw.length, compression));
        }

        debug!(
            "afterburner map: {} entries, {} inline segments, {} compression types",
            entries.len(), inline_segments.len(), compressions.len()
        );

        Ok(Self {
            version,
            compressions,
            entries,
            inline_segments
        })
    }

    /// Load and inflate resource payload.
    pub fn load(&self, buffer: &[u8], entry: &ResourceEntry) -> Result<Vec<u8>, RifxError> {
        let file_name = entry.name().to_string();

        let stored: &[u8] = match entry.location() {
            ResourceLocation::Inline => self.inline_segments.get(&entry.id()).ok_or_else(|| {
                RifxError::resource_decode(&file_name, "missing from initial load segment")
            })?,

            ResourceLocation::Segment(offset) => sub_slice(buffer, offset, entry.stored_length()).ok_or_else(|| {
                RifxError::new(RifxErrorKind::TruncatedContainer {
                    tag: entry.tag(),
                    offset,
                    length: entry.stored_length()
                }, None)
            })?,

            ResourceLocation::Chunk(_) => return Err(RifxError::resource_decode(&file_name, "not stored in the afterburner body"))
        };

        match entry.compression() {
            ResourceCompression::Zlib if !stored.is_empty() => inflate(stored, entry.length()).map_err(|err| {
                RifxError::new(RifxErrorKind::ResourceDecode {
                    file_name,
                    reason: "cannot inflate resource".into()
                }, Some(Box::new(err)))
            }),

            _ => Ok(stored.to_vec())
        }
    }

}

struct RawEntry {

    id: i32,
    offset: i32,
    stored_length: u64,
    length: u64,
    compression_index: i32,
    tag: FourCC

}

/// Read chunk with variable length size field at offset and advance past it.
fn read_chunk<B: ByteOrder>(buffer: &[u8], offset: &mut u64, expected: FourCC) -> Result<Chunk, RifxError> {
    let start = *offset;
    let mut stream = Cursor::new(buffer);
    stream.set_position(start);

    let tag = FourCC::from_bytes::<B, _>(&mut stream)?;
    if tag != expected {
        return Err(RifxError::new(RifxErrorKind::InvalidChunk { expected, found: tag, offset: start }, None));
    }

    let length = read_varint(&mut stream)? as u64;
    let data_offset = stream.position();

    let data = sub_slice(buffer, data_offset, length).ok_or_else(|| {
        RifxError::new(RifxErrorKind::TruncatedContainer { tag, offset: start, length }, None)
    })?;

    *offset = data_offset + length;

    Ok(Chunk::new(tag, data.to_vec()))
}

fn read_fver(data: &[u8], format: &mut FormatDescriptor) -> Result<Option<String>, RifxError> {
    let mut stream = Cursor::new(data);

    let version = read_varint(&mut stream)?;
    if version >= 0x401 {
        format.set_map_version(read_varint(&mut stream)?);
        format.set_archive_version(read_varint(&mut stream)?);
    } else {
        format.set_map_version(0);
        format.set_archive_version(0);
    }

    if version >= 0x501 {
        let length = stream.read_u8()? as u64;

        let mut text = Vec::with_capacity(length as usize);
        (&mut stream).take(length).read_to_end(&mut text)?;

        return Ok(Some(decode_latin1(&text)?));
    }

    Ok(None)
}

fn read_fcdr<B: ByteOrder>(data: &[u8]) -> Result<Vec<CompressionDescriptor>, RifxError> {
    let table = inflate(data, 0)?;
    let mut stream = Cursor::new(table);

    let count = stream.read_u16::<B>()?;

    let mut ids = Vec::with_capacity(count as usize);
    for _ in 0..count {
        ids.push(MoaId::from_bytes::<B, _>(&mut stream)?);
    }

    let mut descriptors = Vec::with_capacity(count as usize);
    for id in ids {
        let name = decode_latin1(&read_c_string(&mut stream)?)?;
        descriptors.push(CompressionDescriptor::new(id, name));
    }

    Ok(descriptors)
}

fn read_abmp<B: ByteOrder>(data: &[u8]) -> Result<Vec<RawEntry>, RifxError> {
    let mut stream = Cursor::new(data);

    let mode = read_varint(&mut stream)?;
    let expected_size = read_varint(&mut stream)? as u64;
    let rest = &data[stream.position() as usize..];

    let map = if mode == 0 {
        rest.to_vec()
    } else {
        inflate(rest, expected_size)?
    };

    let mut stream = Cursor::new(map);
    read_varint(&mut stream)?;
    read_varint(&mut stream)?;
    let count = read_varint(&mut stream)?;

    let mut entries = Vec::new();
    for _ in 0..count {
        entries.push(RawEntry {
            id: read_varint(&mut stream)? as i32,
            offset: read_varint(&mut stream)? as i32,
            stored_length: read_varint(&mut stream)? as u64,
            length: read_varint(&mut stream)? as u64,
            compression_index: read_varint(&mut stream)? as i32,
            tag: FourCC::from_bytes::<B, _>(&mut stream)?
        });
    }

    Ok(entries)
}

/// Split initial load segment into `id, bytes` pairs. Stops at the first unknown id.
fn read_inline_segments(segment: &[u8], entries: &[RawEntry], segments: &mut HashMap<u32, Vec<u8>>) -> Result<(), RifxError> {
    let mut stream = Cursor::new(segment);

    while stream.position() < segment.len() as u64 {
        let id = read_varint(&mut stream)? as i32;

        let entry = match entries.iter().find(|entry| entry.id == id) {
            Some(entry) => entry,
            None => {
                warn!("initial load segment refers to unknown resource {}", id);
                break;
            }
        };

        let data = match sub_slice(segment, stream.position(), entry.stored_length) {
            Some(data) => data,
            None => {
                warn!("initial load segment entry {} runs past the segment", id);
                break;
            }
        };

        stream.set_position(stream.position() + entry.stored_length);
        segments.insert(id as u32, data.to_vec());
    }

    Ok(())
}

/// Inflate zlib stream. A non zero expected size limits the output.
/// Inflate zlib stream. expected_size limits the output and is untrusted, so it only hints the capacity.
fn inflate(data: &[u8], expected_size: u64) -> io::Result<Vec<u8>> {
    let decoder = ZlibDecoder::new(data);

    let mut inflated = Vec::with_capacity(expected_size.min(data.len() as u64 * 4) as usize);
    if expected_size > 0 {
        decoder.take(expected_size).read_to_end(&mut inflated)?;
    } else {
        let mut decoder = decoder;
        decoder.read_to_end(&mut inflated)?;
    }

    Ok(inflated)
}
