/*
 * Created on Mon Oct 19 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::io::{Cursor, Read, Write};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};

use super::{RifxError, RifxErrorKind, stream::{padded_length, sub_slice}, tag::FourCC};

/// Size of tag and length fields preceding every chunk payload.
pub const CHUNK_HEADER_SIZE: u64 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
/// General length prefixed chunk
pub struct Chunk {

    tag: FourCC,
    data: Vec<u8>

}

impl Chunk {

    pub fn new(tag: FourCC, data: Vec<u8>) -> Self {
        Self {
            tag,
            data
        }
    }

    pub fn tag(&self) -> FourCC {
        self.tag
    }

    pub fn set_tag(&mut self, tag: FourCC) {
        self.tag = tag;
    }

    pub fn data(&self) -> &Vec<u8> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Size of chunk on disk including header and pad byte.
    pub fn stored_size(&self) -> u64 {
        CHUNK_HEADER_SIZE + padded_length(self.data.len() as u64)
    }

    /// Read chunk located at offset of buffer.
    pub fn read_at<B: ByteOrder>(buffer: &[u8], offset: u64) -> Result<Self, RifxError> {
        let header = sub_slice(buffer, offset, CHUNK_HEADER_SIZE).ok_or_else(|| {
            RifxError::new(RifxErrorKind::TruncatedContainer {
                tag: FourCC::from_u32(0),
                offset,
                length: CHUNK_HEADER_SIZE
            }, None)
        })?;

        let mut cursor = Cursor::new(header);
        let tag = FourCC::from_bytes::<B, _>(&mut cursor)?;
        let length = cursor.read_u32::<B>()? as u64;

        let data = sub_slice(buffer, offset + CHUNK_HEADER_SIZE, length).ok_or_else(|| {
            RifxError::new(RifxErrorKind::TruncatedContainer { tag, offset, length }, None)
        })?;

        Ok(Self::new(tag, data.to_vec()))
    }

    /// Read chunk from stream.
    /// Returns read size, Chunk tuple. Pad byte is not consumed.
    pub fn from_bytes<B: ByteOrder, T: Read>(stream: &mut T) -> Result<(u64, Self), RifxError> {
        let tag = FourCC::from_bytes::<B, _>(stream)?;
        let length = stream.read_u32::<B>()? as u64;

        // Length is untrusted until the payload is actually read.
        let mut data = Vec::new();
        stream.take(length).read_to_end(&mut data)?;

        if (data.len() as u64) < length {
            return Err(RifxError::new(RifxErrorKind::TruncatedContainer { tag, offset: 0, length }, None));
        }

        Ok((CHUNK_HEADER_SIZE + length, Self::new(tag, data)))
    }

    /// Write chunk to stream with trailing pad byte when the payload length is odd.
    /// Returns written size.
    pub fn write_bytes<B: ByteOrder, T: Write>(&self, stream: &mut T) -> Result<u64, RifxError> {
        let length = self.data.len() as u64;
        if length > u32::MAX as u64 {
            return Err(RifxError::new(RifxErrorKind::ContainerTooLarge(length), None));
        }

        self.tag.write_bytes::<B, _>(stream)?;
        stream.write_u32::<B>(length as u32)?;
        stream.write_all(&self.data)?;

        if length & 1 == 1 {
            stream.write_u8(0)?;
        }

        Ok(self.stored_size())
    }

}

#[cfg(test)]
mod tests {
    use byteorder::{BigEndian, LittleEndian};

    use crate::rifx::tag::{BITMAP_DATA_TAG, CAST_MEMBER_TAG};

    use super::*;

    #[test]
    fn odd_payload_is_padded() {
        let chunk = Chunk::new(BITMAP_DATA_TAG, vec![1, 2, 3]);

        let mut buffer = Vec::new();
        assert_eq!(chunk.write_bytes::<BigEndian, _>(&mut buffer).unwrap(), 12);
        assert_eq!(buffer, vec![b'B', b'I', b'T', b'D', 0, 0, 0, 3, 1, 2, 3, 0]);

        let read = Chunk::read_at::<BigEndian>(&buffer, 0).unwrap();
        assert_eq!(read, chunk);
    }

    #[test]
    fn little_endian_chunk() {
        let chunk = Chunk::new(CAST_MEMBER_TAG, vec![9, 9]);

        let mut buffer = Vec::new();
        chunk.write_bytes::<LittleEndian, _>(&mut buffer).unwrap();
        assert_eq!(&buffer[0..8], &[b't', b'S', b'A', b'C', 2, 0, 0, 0]);

        let (read, parsed) = Chunk::from_bytes::<LittleEndian, _>(&mut Cursor::new(&buffer)).unwrap();
        assert_eq!(read, 10);
        assert_eq!(parsed, chunk);
    }

    #[test]
    fn truncated_chunk() {
        let buffer = [b'B', b'I', b'T', b'D', 0, 0, 0, 9, 1, 2];

        let err = Chunk::read_at::<BigEndian>(&buffer, 0).unwrap_err();
        match err.kind() {
            RifxErrorKind::TruncatedContainer { tag, offset, length } => {
                assert_eq!(*tag, BITMAP_DATA_TAG);
                assert_eq!(*offset, 0);
                assert_eq!(*length, 9);
            },
            kind => panic!("unexpected error {:?}", kind)
        }
    }

    #[test]
    fn oversized_length_from_stream() {
        let buffer = [b'B', b'I', b'T', b'D', 0xFF, 0xFF, 0xFF, 0xFF, 1, 2];

        let err = Chunk::from_bytes::<BigEndian, _>(&mut Cursor::new(&buffer)).unwrap_err();
        assert!(matches!(err.kind(), RifxErrorKind::TruncatedContainer { length: 0xFFFF_FFFF, .. }));
    }
}
