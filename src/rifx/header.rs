/*
 * Created on Mon Oct 19 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{
    AFTERBURNER_CAST_IDENTIFIER, AFTERBURNER_MOVIE_IDENTIFIER, CLASSIC_ARCHIVE_VERSION, CLASSIC_CODEC_IDENTIFIER,
    CLASSIC_MAP_VERSION, PAYLOAD_START, PROTECTED_ARCHIVE_VERSION, PROTECTED_CODEC_IDENTIFIER, PROTECTED_MAP_VERSION,
    RIFX_IDENTIFIER, RifxError, RifxErrorKind, tag::FourCC
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RifxCodec {

    /// Inspectable authoring layout. Little endian.
    Classic,

    /// Layout used by distributable movies. Big endian.
    Protected

}

impl RifxCodec {

    pub fn identifier(&self) -> FourCC {
        match self {
            RifxCodec::Classic => CLASSIC_CODEC_IDENTIFIER,
            RifxCodec::Protected => PROTECTED_CODEC_IDENTIFIER
        }
    }

    pub fn big_endian(&self) -> bool {
        match self {
            RifxCodec::Classic => false,
            RifxCodec::Protected => true
        }
    }

    pub fn map_version(&self) -> u32 {
        match self {
            RifxCodec::Classic => CLASSIC_MAP_VERSION,
            RifxCodec::Protected => PROTECTED_MAP_VERSION
        }
    }

    pub fn archive_version(&self) -> u32 {
        match self {
            RifxCodec::Classic => CLASSIC_ARCHIVE_VERSION,
            RifxCodec::Protected => PROTECTED_ARCHIVE_VERSION
        }
    }

    /// Returns codec and afterburned flag of a codec tag.
    pub fn from_identifier(identifier: FourCC) -> Option<(Self, bool)> {
        match identifier {
            CLASSIC_CODEC_IDENTIFIER => Some((RifxCodec::Classic, false)),
            PROTECTED_CODEC_IDENTIFIER => Some((RifxCodec::Protected, false)),
            AFTERBURNER_MOVIE_IDENTIFIER | AFTERBURNER_CAST_IDENTIFIER => Some((RifxCodec::Protected, true)),
            _ => None
        }
    }

}

/// Describes one container instance.
/// Version fields are stored in the initial map chunk and filled in once the directory is read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {

    big_endian: bool,
    codec: RifxCodec,
    afterburned: bool,

    map_version: u32,
    archive_version: u32,

    declared_size: u32

}

impl FormatDescriptor {

    /// Descriptor with the byte order and version pair of the codec.
    pub fn new(codec: RifxCodec) -> Self {
        Self {
            big_endian: codec.big_endian(),
            codec,
            afterburned: false,
            map_version: codec.map_version(),
            archive_version: codec.archive_version(),
            declared_size: 0
        }
    }

    pub fn big_endian(&self) -> bool {
        self.big_endian
    }

    pub fn set_big_endian(&mut self, big_endian: bool) {
        self.big_endian = big_endian;
    }

    pub fn codec(&self) -> RifxCodec {
        self.codec
    }

    pub fn set_codec(&mut self, codec: RifxCodec) {
        self.codec = codec;
    }

    pub fn afterburned(&self) -> bool {
        self.afterburned
    }

    pub fn set_afterburned(&mut self, afterburned: bool) {
        self.afterburned = afterburned;
    }

    pub fn map_version(&self) -> u32 {
        self.map_version
    }

    pub fn set_map_version(&mut self, map_version: u32) {
        self.map_version = map_version;
    }

    pub fn archive_version(&self) -> u32 {
        self.archive_version
    }

    pub fn set_archive_version(&mut self, archive_version: u32) {
        self.archive_version = archive_version;
    }

    /// Container length excluding the form tag and this field.
    pub fn declared_size(&self) -> u32 {
        self.declared_size
    }

    pub fn set_declared_size(&mut self, declared_size: u32) {
        self.declared_size = declared_size;
    }

    pub fn payload_start(&self) -> u64 {
        PAYLOAD_START
    }

    pub fn codec_identifier(&self) -> FourCC {
        if self.afterburned {
            AFTERBURNER_MOVIE_IDENTIFIER
        } else {
            self.codec.identifier()
        }
    }

    pub fn has_known_versions(&self) -> bool {
        self.map_version == self.codec.map_version() && self.archive_version == self.codec.archive_version()
    }

    /// Read container header from current position.
    /// Returns read size, FormatDescriptor tuple.
    pub fn from_bytes<T: Read>(stream: &mut T) -> Result<(u64, Self), RifxError> {
        let mut form = [0_u8; 4];
        stream.read_exact(&mut form)?;

        let big_endian = if form == RIFX_IDENTIFIER.bytes() {
            true
        } else if form == reversed(RIFX_IDENTIFIER.bytes()) {
            false
        } else {
            return Err(RifxError::new(RifxErrorKind::MalformedHeader {
                offset: 0,
                found: FourCC::new(form)
            }, None));
        };

        let (declared_size, identifier) = if big_endian {
            read_size_and_codec::<BigEndian, T>(stream)?
        } else {
            read_size_and_codec::<LittleEndian, T>(stream)?
        };

        let (codec, afterburned) = RifxCodec::from_identifier(identifier).ok_or_else(|| {
            RifxError::new(RifxErrorKind::MalformedHeader { offset: 8, found: identifier }, None)
        })?;

        let mut descriptor = FormatDescriptor::new(codec);
        descriptor.big_endian = big_endian;
        descriptor.afterburned = afterburned;
        descriptor.declared_size = declared_size;

        Ok((PAYLOAD_START, descriptor))
    }

    /// Write container header to stream.
    /// Returns written size.
    pub fn write_bytes<T: Write>(&self, stream: &mut T) -> Result<u64, RifxError> {
        if self.big_endian {
            self.write_with::<BigEndian, T>(stream)
        } else {
            self.write_with::<LittleEndian, T>(stream)
        }
    }

    fn write_with<B: ByteOrder, T: Write>(&self, stream: &mut T) -> Result<u64, RifxError> {
        RIFX_IDENTIFIER.write_bytes::<B, _>(stream)?;
        stream.write_u32::<B>(self.declared_size)?;
        self.codec_identifier().write_bytes::<B, _>(stream)?;

        Ok(PAYLOAD_START)
    }

}

fn read_size_and_codec<B: ByteOrder, T: Read>(stream: &mut T) -> Result<(u32, FourCC), RifxError> {
    let declared_size = stream.read_u32::<B>()?;
    let identifier = FourCC::from_bytes::<B, _>(stream)?;

    Ok((declared_size, identifier))
}

fn reversed(mut bytes: [u8; 4]) -> [u8; 4] {
    bytes.reverse();
    bytes
}

/// Find the start of a container embedded in a larger file such as a projector executable.
pub fn locate_rifx(buffer: &[u8]) -> Option<u64> {
    let big = RIFX_IDENTIFIER.bytes();
    let little = reversed(big);

    buffer.windows(12).position(|window| {
        let mut codec = [0_u8; 4];
        codec.copy_from_slice(&window[8..12]);

        if window[0..4] == big {
            RifxCodec::from_identifier(FourCC::new(codec)).is_some()
        } else if window[0..4] == little {
            RifxCodec::from_identifier(FourCC::new(reversed(codec))).is_some()
        } else {
            false
        }
    }).map(|position| position as u64)
}
