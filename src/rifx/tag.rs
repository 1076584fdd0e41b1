/*
 * Created on Mon Oct 19 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::{fmt, io::{self, Read, Write}};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};

/// Four character chunk identifier.
/// Stored as the big endian interpretation of its characters, so a tag written with
/// little endian byte order appears reversed on disk.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCC(u32);

impl FourCC {

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn bytes(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Parse tag from its textual form. Every character must fit in one byte.
    pub fn parse(text: &str) -> Option<Self> {
        let mut bytes = [0_u8; 4];
        let mut count = 0;

        for ch in text.chars() {
            if count >= 4 || ch as u32 > 0xFF {
                return None;
            }

            bytes[count] = ch as u8;
            count += 1;
        }

        if count == 4 {
            Some(Self::new(bytes))
        } else {
            None
        }
    }

    /// Read tag from stream using container byte order.
    pub fn from_bytes<B: ByteOrder, T: Read>(stream: &mut T) -> io::Result<Self> {
        Ok(Self(stream.read_u32::<B>()?))
    }

    /// Write tag to stream using container byte order.
    /// Returns written size.
    pub fn write_bytes<B: ByteOrder, T: Write>(&self, stream: &mut T) -> io::Result<u64> {
        stream.write_u32::<B>(self.0)?;

        Ok(4)
    }

}

impl fmt::Display for FourCC {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.bytes().iter() {
            write!(f, "{}", *byte as char)?;
        }

        Ok(())
    }

}

impl fmt::Debug for FourCC {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC(\"{}\")", self)
    }

}

pub const IMAP_TAG: FourCC = FourCC::new(*b"imap");
pub const MMAP_TAG: FourCC = FourCC::new(*b"mmap");
pub const FREE_TAG: FourCC = FourCC::new(*b"free");
pub const JUNK_TAG: FourCC = FourCC::new(*b"junk");

pub const KEY_TABLE_TAG: FourCC = FourCC::new(*b"KEY*");
pub const CAST_TABLE_TAG: FourCC = FourCC::new(*b"CAS*");
pub const CAST_MEMBER_TAG: FourCC = FourCC::new(*b"CASt");

pub const STYLED_TEXT_TAG: FourCC = FourCC::new(*b"STXT");
pub const XMED_TAG: FourCC = FourCC::new(*b"XMED");

pub const SCRIPT_TAG: FourCC = FourCC::new(*b"Lscr");

pub const MEDIA_TAG: FourCC = FourCC::new(*b"ediM");
pub const SOUND_SAMPLE_TAG: FourCC = FourCC::new(*b"sndS");
pub const MAC_SOUND_TAG: FourCC = FourCC::new(*b"snd ");
pub const MAC_SOUND_UPPER_TAG: FourCC = FourCC::new(*b"SND ");

pub const BITMAP_DATA_TAG: FourCC = FourCC::new(*b"BITD");
pub const DIB_TAG: FourCC = FourCC::new(*b"DIB ");
pub const PICT_TAG: FourCC = FourCC::new(*b"PICT");
pub const ALPHA_TAG: FourCC = FourCC::new(*b"ALFA");
pub const THUMBNAIL_TAG: FourCC = FourCC::new(*b"Thum");

pub const FVER_TAG: FourCC = FourCC::new(*b"Fver");
pub const FCDR_TAG: FourCC = FourCC::new(*b"Fcdr");
pub const ABMP_TAG: FourCC = FourCC::new(*b"ABMP");
pub const FGEI_TAG: FourCC = FourCC::new(*b"FGEI");
pub const ILS_TAG: FourCC = FourCC::new(*b"ILS ");
