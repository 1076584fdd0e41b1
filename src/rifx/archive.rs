/*
 * Created on Tue Oct 20 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use super::{PAYLOAD_START, container::ResourceName, header::FormatDescriptor, tag::FourCC};

/// Compression applied to a stored resource. Only afterburned containers compress resources.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceCompression {

    None,
    Zlib,

    /// Compression id not understood. Payload is passed through as stored.
    Unknown

}

/// Where the stored bytes of a resource live.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceLocation {

    /// Absolute offset of a chunk header.
    Chunk(u64),

    /// Absolute offset of raw stored bytes.
    Segment(u64),

    /// Stored inside the afterburner initial load segment.
    Inline

}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {

    id: u32,
    tag: FourCC,

    location: ResourceLocation,

    stored_length: u64,
    length: u64,

    compression: ResourceCompression

}

impl ResourceEntry {

    /// Uncompressed resource stored as a chunk.
    pub fn new(id: u32, tag: FourCC, offset: u64, length: u64) -> Self {
        Self {
            id,
            tag,
            location: ResourceLocation::Chunk(offset),
            stored_length: length,
            length,
            compression: ResourceCompression::None
        }
    }

    pub fn stored(
        id: u32,
        tag: FourCC,
        location: ResourceLocation,
        stored_length: u64,
        length: u64,
        compression: ResourceCompression
    ) -> Self {
        Self {
            id,
            tag,
            location,
            stored_length,
            length,
            compression
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn tag(&self) -> FourCC {
        self.tag
    }

    pub fn location(&self) -> ResourceLocation {
        self.location
    }

    /// Size of the bytes as stored in the container.
    pub fn stored_length(&self) -> u64 {
        self.stored_length
    }

    /// Size of the resource payload.
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn compression(&self) -> ResourceCompression {
        self.compression
    }

    pub fn name(&self) -> ResourceName {
        ResourceName::new(self.tag, self.id)
    }

}

/// Parsed container header with its resolved directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlock {

    format: FormatDescriptor,
    entries: Vec<ResourceEntry>

}

impl DataBlock {

    pub fn new(format: FormatDescriptor, entries: Vec<ResourceEntry>) -> Self {
        Self {
            format,
            entries
        }
    }

    pub fn format(&self) -> FormatDescriptor {
        self.format
    }

    pub fn payload_start(&self) -> u64 {
        PAYLOAD_START
    }

    /// Resource entries in on-disk order.
    pub fn entries(&self) -> &Vec<ResourceEntry> {
        &self.entries
    }

    pub fn get(&self, id: u32) -> Option<&ResourceEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

}
