/*
 * Created on Mon Oct 19 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

//! Byte level helpers shared by the container and member codecs.

use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};
use encoding::{DecoderTrap, EncoderTrap, Encoding, all::ISO_8859_1};

/// Read variable length integer.
/// Seven bits per byte with the most significant group first, high bit set on every byte but the last.
pub fn read_varint<T: Read>(stream: &mut T) -> io::Result<u32> {
    let mut value = 0_u32;

    for _ in 0..5 {
        let byte = stream.read_u8()?;
        value = (value << 7) | (byte & 0x7F) as u32;

        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }

    Err(io::Error::new(io::ErrorKind::InvalidData, "variable length integer longer than 5 bytes"))
}

/// Write variable length integer.
/// Returns written size.
pub fn write_varint<T: Write>(stream: &mut T, value: u32) -> io::Result<u64> {
    let mut groups = [0_u8; 5];
    let mut count = 0;
    let mut rest = value;

    loop {
        groups[count] = (rest & 0x7F) as u8;
        count += 1;
        rest >>= 7;

        if rest == 0 {
            break;
        }
    }

    for i in (0..count).rev() {
        let continued = if i > 0 { 0x80 } else { 0 };
        stream.write_u8(groups[i] | continued)?;
    }

    Ok(count as u64)
}

/// Read null terminated byte string. The terminator is consumed but not returned.
pub fn read_c_string<T: Read>(stream: &mut T) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();

    loop {
        match stream.read_u8()? {
            0 => break,
            byte => buffer.push(byte)
        }
    }

    Ok(buffer)
}

/// Bounds checked sub slice.
pub fn sub_slice(buffer: &[u8], offset: u64, length: u64) -> Option<&[u8]> {
    let end = offset.checked_add(length)?;

    if end > buffer.len() as u64 {
        return None;
    }

    Some(&buffer[offset as usize..end as usize])
}

/// Chunk payloads are aligned to even offsets.
pub fn padded_length(length: u64) -> u64 {
    length + (length & 1)
}

pub fn decode_latin1(bytes: &[u8]) -> io::Result<String> {
    ISO_8859_1.decode(bytes, DecoderTrap::Replace)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.into_owned()))
}

pub fn encode_latin1(text: &str) -> io::Result<Vec<u8>> {
    ISO_8859_1.encode(text, EncoderTrap::Replace)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.into_owned()))
}
