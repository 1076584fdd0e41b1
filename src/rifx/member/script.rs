/*
 * Created on Thu Oct 22 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::io::{self, Cursor};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::rifx::{
    RifxError,
    container::{DirFileResource, DirFilesContainer},
    stream::{decode_latin1, encode_latin1},
    tag::{CAST_MEMBER_TAG, SCRIPT_TAG}
};

use super::{cast::{CastInfo, CastMember, CastMemberType}, library::{build_single_member_library, decode_error, member_error}};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScriptFormat {

    Behavior,
    Movie,
    Parent

}

impl ScriptFormat {

    pub fn value(&self) -> u16 {
        match self {
            ScriptFormat::Behavior => 1,
            ScriptFormat::Movie => 3,
            ScriptFormat::Parent => 7
        }
    }

    pub fn from_value(value: u16) -> Option<Self> {
        match value {
            1 => Some(ScriptFormat::Behavior),
            3 => Some(ScriptFormat::Movie),
            7 => Some(ScriptFormat::Parent),
            _ => None
        }
    }

}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRecord {

    resource_id: u32,
    format: ScriptFormat,

    name: Option<String>,
    text: String

}

impl ScriptRecord {

    pub fn new(resource_id: u32, format: ScriptFormat, name: Option<String>, text: String) -> Self {
        Self {
            resource_id,
            format,
            name,
            text
        }
    }

    pub fn resource_id(&self) -> u32 {
        self.resource_id
    }

    pub fn format(&self) -> ScriptFormat {
        self.format
    }

    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    /// Script source as stored, with `\r` line endings.
    pub fn text(&self) -> &String {
        &self.text
    }

}

/// Convert `\r\n` and `\n` line endings to `\r`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\r").replace('\n', "\r")
}

fn read_format(specific: &[u8]) -> io::Result<ScriptFormat> {
    let value = Cursor::new(specific).read_u16::<BigEndian>()?;

    ScriptFormat::from_value(value)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, format!("unknown script type {}", value)))
}

pub fn decode_script(file: &DirFileResource) -> Result<ScriptRecord, RifxError> {
    let member = CastMember::from_bytes(file.bytes()).map_err(|err| decode_error(file, err))?;

    if member.member_type() != CastMemberType::Script {
        return Err(RifxError::resource_decode(file.file_name(), format!("member type {:?} is not a script", member.member_type())));
    }

    let format = read_format(member.specific()).map_err(|err| decode_error(file, err))?;
    let text = decode_latin1(member.info().script_text().unwrap_or_default()).map_err(|err| decode_error(file, err))?;

    Ok(ScriptRecord::new(file.id().unwrap_or_default(), format, member.name(), text))
}

/// Encode record into a `CASt` payload.
pub fn encode_script(record: &ScriptRecord) -> io::Result<Vec<u8>> {
    encode_member(record)?.to_bytes()
}

fn encode_member(record: &ScriptRecord) -> io::Result<CastMember> {
    let text = encode_latin1(&normalize_line_endings(&record.text))?;

    let info = match &record.name {
        Some(name) => CastInfo::named(name, Some(&text))?,
        None => CastInfo::new(0, 0, vec![text])
    };

    let mut specific = Vec::with_capacity(2);
    specific.write_u16::<BigEndian>(record.format.value())?;

    Ok(CastMember::new(CastMemberType::Script, info, specific))
}

/// Every script member in container order.
pub fn read_scripts(container: &DirFilesContainer) -> Vec<Result<ScriptRecord, RifxError>> {
    container.with_tag(CAST_MEMBER_TAG)
        .filter(|file| CastMember::peek_type(file.bytes()) == Some(CastMemberType::Script))
        .map(decode_script)
        .collect()
}

/// Library with one script member and an empty `Lscr` bytecode resource.
pub fn build_single_member_script_library(name: &str, format: ScriptFormat, text: &str) -> Result<DirFilesContainer, RifxError> {
    let record = ScriptRecord::new(0, format, Some(name.to_string()), text.to_string());
    let member = encode_member(&record).map_err(member_error)?;

    build_single_member_library(&member, vec![(SCRIPT_TAG, Vec::new())])
}

pub fn build_single_member_behavior_library(name: &str, text: &str) -> Result<DirFilesContainer, RifxError> {
    build_single_member_script_library(name, ScriptFormat::Behavior, text)
}

#[cfg(test)]
mod tests {
    use crate::rifx::RifxErrorKind;

    use super::*;

    #[test]
    fn line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\nc\rd"), "a\rb\rc\rd");
    }

    #[test]
    fn behavior_library() {
        let container = build_single_member_behavior_library("behavior member", "on beginSprite me\n  put 42\nend").unwrap();

        assert!(container.get("Lscr_0004.bin").unwrap().bytes().is_empty());

        let scripts = read_scripts(&container);
        assert_eq!(scripts.len(), 1);

        let script = scripts[0].as_ref().unwrap();
        assert_eq!(script.resource_id(), 3);
        assert_eq!(script.format(), ScriptFormat::Behavior);
        assert_eq!(script.name().map(String::as_str), Some("behavior member"));
        assert_eq!(script.text(), "on beginSprite me\r  put 42\rend");
    }

    #[test]
    fn encode_then_decode_parent() {
        let record = ScriptRecord::new(7, ScriptFormat::Parent, None, "on new me\rreturn me\rend".to_string());
        let file = DirFileResource::from_parts(CAST_MEMBER_TAG, 7, encode_script(&record).unwrap());

        assert_eq!(decode_script(&file).unwrap(), record);
    }

    #[test]
    fn unknown_script_type() {
        let member = CastMember::new(CastMemberType::Script, CastInfo::default(), vec![0, 9]);
        let file = DirFileResource::from_parts(CAST_MEMBER_TAG, 5, member.to_bytes().unwrap());

        let err = decode_script(&file).unwrap_err();
        assert!(matches!(err.kind(), RifxErrorKind::ResourceDecode { file_name, .. } if file_name == "CASt_0005.bin"));
    }
}
