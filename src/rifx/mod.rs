/*
 * Created on Mon Oct 19 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

pub mod tag;
pub mod stream;

pub mod header;
pub mod chunk;
pub mod map;

pub mod archive;
pub mod container;

pub mod reader;
pub mod writer;

pub mod afterburner;
pub mod member;

use std::{error::Error, fmt, io};

use self::tag::FourCC;

/// Offset of the first chunk after the fixed 12 byte header.
pub const PAYLOAD_START: u64 = 12;

pub const RIFX_IDENTIFIER: FourCC = FourCC::new(*b"RIFX");

pub const CLASSIC_CODEC_IDENTIFIER: FourCC = FourCC::new(*b"MV93");
pub const PROTECTED_CODEC_IDENTIFIER: FourCC = FourCC::new(*b"MC95");

pub const AFTERBURNER_MOVIE_IDENTIFIER: FourCC = FourCC::new(*b"FGDM");
pub const AFTERBURNER_CAST_IDENTIFIER: FourCC = FourCC::new(*b"FGDC");

pub const CLASSIC_MAP_VERSION: u32 = 1;
pub const CLASSIC_ARCHIVE_VERSION: u32 = 0x0000_0742;

pub const PROTECTED_MAP_VERSION: u32 = 1;
pub const PROTECTED_ARCHIVE_VERSION: u32 = 0x0000_04C7;

#[derive(Debug)]
pub struct RifxError {

    kind: RifxErrorKind,
    error: Option<Box<dyn Error + Send + Sync>>

}

impl RifxError {

    pub fn new(kind: RifxErrorKind, error: Option<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            kind, error
        }
    }

    pub fn kind(&self) -> &RifxErrorKind {
        &self.kind
    }

    pub fn error(&self) -> &Option<Box<dyn Error + Send + Sync>> {
        &self.error
    }

    pub(crate) fn resource_decode(file_name: &str, reason: impl Into<String>) -> Self {
        Self::new(RifxErrorKind::ResourceDecode {
            file_name: file_name.to_owned(),
            reason: reason.into()
        }, None)
    }

}

impl From<io::Error> for RifxError {

    fn from(err: io::Error) -> Self {
        RifxError::new(RifxErrorKind::Io(err), None)
    }

}

impl fmt::Display for RifxError {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RifxErrorKind::Io(err) => write!(f, "io error: {}", err)?,

            RifxErrorKind::MalformedHeader { offset, found } => {
                write!(f, "malformed header: unexpected tag '{}' at offset {}", found, offset)?
            },

            RifxErrorKind::TruncatedContainer { tag, offset, length } => {
                write!(f, "truncated container: '{}' at offset {} declares {} bytes past the end of the buffer", tag, offset, length)?
            },

            RifxErrorKind::InvalidChunk { expected, found, offset } => {
                write!(f, "invalid chunk at offset {}: expected '{}', found '{}'", offset, expected, found)?
            },

            RifxErrorKind::UnsupportedExtension(name) => write!(f, "unsupported file extension: {}", name)?,

            RifxErrorKind::ResourceDecode { file_name, reason } => {
                write!(f, "cannot decode resource {}: {}", file_name, reason)?
            },

            RifxErrorKind::InvalidResourceName(name) => write!(f, "invalid resource name: {}", name)?,

            RifxErrorKind::DuplicateResourceId { file_name, id } => {
                write!(f, "resource id {} of {} is already in use", id, file_name)?
            },

            RifxErrorKind::InvalidMember(reason) => write!(f, "invalid cast member: {}", reason)?,

            RifxErrorKind::ContainerTooLarge(size) => write!(f, "container size {} does not fit in 32 bits", size)?
        }

        if let Some(err) = &self.error {
            write!(f, " ({})", err)?;
        }

        Ok(())
    }

}

impl Error for RifxError {

    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            RifxErrorKind::Io(err) => Some(err),
            _ => self.error.as_deref().map(|err| err as &(dyn Error + 'static))
        }
    }

}

#[derive(Debug)]
pub enum RifxErrorKind {

    Io(io::Error),

    /// Unknown form or codec tag, or a missing directory chunk.
    MalformedHeader {
        offset: u64,
        found: FourCC
    },

    /// A declared length runs past the end of the buffer.
    TruncatedContainer {
        tag: FourCC,
        offset: u64,
        length: u64
    },

    InvalidChunk {
        expected: FourCC,
        found: FourCC,
        offset: u64
    },

    UnsupportedExtension(String),

    ResourceDecode {
        file_name: String,
        reason: String
    },

    InvalidResourceName(String),

    DuplicateResourceId {
        file_name: String,
        id: u32
    },

    InvalidMember(String),

    ContainerTooLarge(u64)

}
