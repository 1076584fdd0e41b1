/*
 * Created on Thu Oct 22 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use crate::rifx::{
    RifxError,
    container::{DirFileResource, DirFilesContainer},
    tag::{FourCC, MAC_SOUND_TAG, MAC_SOUND_UPPER_TAG, MEDIA_TAG, SOUND_SAMPLE_TAG}
};

use super::{cast::{CastInfo, CastMember, CastMemberType}, library::{MemberIndex, build_single_member_library, member_error}};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SoundFormat {

    Mp3,
    Aiff,
    Wav,
    MacSnd,
    Raw,
    Unknown

}

impl SoundFormat {

    /// Classify payload by its signature, then by the resource tag.
    pub fn detect(tag: FourCC, data: &[u8]) -> Self {
        if data.starts_with(b"ID3") || is_mpeg_frame_sync(data) {
            SoundFormat::Mp3
        } else if data.len() >= 12 && &data[0..4] == b"FORM" && (&data[8..12] == b"AIFF" || &data[8..12] == b"AIFC") {
            SoundFormat::Aiff
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE" {
            SoundFormat::Wav
        } else {
            match tag {
                MAC_SOUND_TAG | MAC_SOUND_UPPER_TAG => SoundFormat::MacSnd,
                SOUND_SAMPLE_TAG => SoundFormat::Raw,
                _ => SoundFormat::Unknown
            }
        }
    }

    /// Formats recognized from the payload alone.
    pub fn is_audio_signature(&self) -> bool {
        matches!(self, SoundFormat::Mp3 | SoundFormat::Aiff | SoundFormat::Wav)
    }

}

fn is_mpeg_frame_sync(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] & 0xE0 == 0xE0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundRecord {

    resource_id: u32,
    format: SoundFormat,
    bytes: Vec<u8>

}

impl SoundRecord {

    pub fn new(resource_id: u32, format: SoundFormat, bytes: Vec<u8>) -> Self {
        Self {
            resource_id,
            format,
            bytes
        }
    }

    pub fn resource_id(&self) -> u32 {
        self.resource_id
    }

    pub fn format(&self) -> SoundFormat {
        self.format
    }

    pub fn bytes(&self) -> &Vec<u8> {
        &self.bytes
    }

}

pub fn decode_sound(file: &DirFileResource) -> Result<SoundRecord, RifxError> {
    let tag = match file.tag() {
        Some(tag) => tag,
        None => return Err(RifxError::resource_decode(file.file_name(), "malformed resource name"))
    };

    if file.bytes().is_empty() {
        return Err(RifxError::resource_decode(file.file_name(), "empty sound payload"));
    }

    Ok(SoundRecord::new(file.id().unwrap_or_default(), SoundFormat::detect(tag, file.bytes()), file.bytes().clone()))
}

pub fn encode_sound(record: &SoundRecord) -> Vec<u8> {
    record.bytes.clone()
}

fn is_sound_resource(index: &MemberIndex, file: &DirFileResource) -> bool {
    match file.tag() {
        Some(SOUND_SAMPLE_TAG) | Some(MAC_SOUND_TAG) | Some(MAC_SOUND_UPPER_TAG) => true,

        Some(MEDIA_TAG) => match file.id().and_then(|id| index.owner_type(id)) {
            Some(CastMemberType::Sound) => true,
            Some(_) => false,
            None => SoundFormat::detect(MEDIA_TAG, file.bytes()).is_audio_signature()
        },

        _ => false
    }
}

/// Sound resources in container order.
pub fn read_sounds(container: &DirFilesContainer) -> Vec<Result<SoundRecord, RifxError>> {
    let index = MemberIndex::build(container);

    container.iter()
        .filter(|file| is_sound_resource(&index, file))
        .map(decode_sound)
        .collect()
}

/// Library with one sound member holding payload in an `ediM` resource.
pub fn build_single_member_sound_library(name: &str, payload: &[u8]) -> Result<DirFilesContainer, RifxError> {
    let member = CastMember::new(CastMemberType::Sound, CastInfo::named(name, None).map_err(member_error)?, Vec::new());

    build_single_member_library(&member, vec![(MEDIA_TAG, payload.to_vec())])
}
