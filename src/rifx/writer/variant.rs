/*
 * Created on Tue Oct 20 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::{io::Write, path::Path};

use crate::rifx::{RifxError, RifxErrorKind, container::DirFilesContainer, header::{FormatDescriptor, RifxCodec}};

use super::RifxWriter;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TopLevelKind {

    Movie,
    Cast

}

/// Writer configuration. Movie and cast containers share the byte layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ContainerVariant {

    codec: RifxCodec,
    kind: TopLevelKind

}

impl ContainerVariant {

    pub const CLASSIC_MOVIE: ContainerVariant = ContainerVariant::new(RifxCodec::Classic, TopLevelKind::Movie);
    pub const CLASSIC_CAST: ContainerVariant = ContainerVariant::new(RifxCodec::Classic, TopLevelKind::Cast);

    pub const PROTECTED_MOVIE: ContainerVariant = ContainerVariant::new(RifxCodec::Protected, TopLevelKind::Movie);
    pub const PROTECTED_CAST: ContainerVariant = ContainerVariant::new(RifxCodec::Protected, TopLevelKind::Cast);

    pub const fn new(codec: RifxCodec, kind: TopLevelKind) -> Self {
        Self {
            codec,
            kind
        }
    }

    pub fn codec(&self) -> RifxCodec {
        self.codec
    }

    pub fn kind(&self) -> TopLevelKind {
        self.kind
    }

    /// Header written for this variant.
    pub fn descriptor(&self) -> FormatDescriptor {
        FormatDescriptor::new(self.codec)
    }

    /// Canonical file extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match (self.codec, self.kind) {
            (RifxCodec::Classic, TopLevelKind::Movie) => "dir",
            (RifxCodec::Classic, TopLevelKind::Cast) => "cst",
            (RifxCodec::Protected, TopLevelKind::Movie) => "dxr",
            (RifxCodec::Protected, TopLevelKind::Cast) => "cxt"
        }
    }

    /// Select variant from file name extension.
    pub fn from_file_name(file_name: &str) -> Result<Self, RifxError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_ascii_lowercase());

        match extension.as_deref() {
            Some("dir") => Ok(Self::CLASSIC_MOVIE),
            Some("cst") => Ok(Self::CLASSIC_CAST),
            Some("dxr") | Some("dcr") => Ok(Self::PROTECTED_MOVIE),
            Some("cxt") => Ok(Self::PROTECTED_CAST),

            _ => Err(RifxError::new(RifxErrorKind::UnsupportedExtension(file_name.to_owned()), None))
        }
    }

}

/// Write container using the variant matching the file name extension.
/// Returns the stream back when `leave_open` is set, otherwise it is dropped after flushing.
pub fn write_file<W: Write>(
    mut stream: W,
    file_name: &str,
    container: &DirFilesContainer,
    leave_open: bool
) -> Result<Option<W>, RifxError> {
    let variant = ContainerVariant::from_file_name(file_name)?;

    RifxWriter::new(variant).write(&mut stream, container)?;

    if leave_open {
        Ok(Some(stream))
    } else {
        Ok(None)
    }
}
