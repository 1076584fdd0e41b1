/*
 * Created on Thu Oct 22 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::io::{self, Cursor, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::rifx::{
    RifxError,
    container::{DirFileResource, DirFilesContainer},
    stream::{decode_latin1, encode_latin1, sub_slice},
    tag::{FourCC, STYLED_TEXT_TAG, XMED_TAG}
};

use super::{cast::{CastInfo, CastMember, CastMemberType}, library::{MemberIndex, build_single_member_library, decode_error, member_error}};

pub const STYLED_TEXT_HEADER_SIZE: u32 = 12;

/// Empty style run table.
const EMPTY_STYLE: [u8; 2] = [0, 0];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextFormat {

    Stxt,
    Xmed

}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldFormat {

    Stxt,
    Xmed

}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {

    resource_id: u32,
    format: TextFormat,
    bytes: Vec<u8>

}

impl TextRecord {

    pub fn new(resource_id: u32, format: TextFormat, bytes: Vec<u8>) -> Self {
        Self {
            resource_id,
            format,
            bytes
        }
    }

    pub fn resource_id(&self) -> u32 {
        self.resource_id
    }

    pub fn format(&self) -> TextFormat {
        self.format
    }

    /// Text run exactly as stored.
    pub fn bytes(&self) -> &Vec<u8> {
        &self.bytes
    }

    pub fn text(&self) -> io::Result<String> {
        decode_latin1(&self.bytes)
    }

}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {

    resource_id: u32,
    format: FieldFormat,
    bytes: Vec<u8>

}

impl FieldRecord {

    pub fn new(resource_id: u32, format: FieldFormat, bytes: Vec<u8>) -> Self {
        Self {
            resource_id,
            format,
            bytes
        }
    }

    pub fn resource_id(&self) -> u32 {
        self.resource_id
    }

    pub fn format(&self) -> FieldFormat {
        self.format
    }

    pub fn bytes(&self) -> &Vec<u8> {
        &self.bytes
    }

    pub fn text(&self) -> io::Result<String> {
        decode_latin1(&self.bytes)
    }

}

/// `STXT` payload: text run followed by style data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledText {

    text: Vec<u8>,
    style: Vec<u8>

}

impl StyledText {

    pub fn new(text: Vec<u8>, style: Vec<u8>) -> Self {
        Self {
            text,
            style
        }
    }

    pub fn text(&self) -> &Vec<u8> {
        &self.text
    }

    pub fn style(&self) -> &Vec<u8> {
        &self.style
    }

    pub fn from_bytes(data: &[u8]) -> io::Result<Self> {
        let mut stream = Cursor::new(data);

        let header_size = stream.read_u32::<BigEndian>()? as u64;
        let text_length = stream.read_u32::<BigEndian>()? as u64;
        let style_length = stream.read_u32::<BigEndian>()? as u64;

        if header_size < STYLED_TEXT_HEADER_SIZE as u64 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "styled text header is too small"));
        }

        let text = sub_slice(data, header_size, text_length)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "text runs past the payload"))?;

        // Style data is often cut short by older writers.
        let style_start = (header_size + text_length).min(data.len() as u64);
        let style_length = style_length.min(data.len() as u64 - style_start);
        let style = sub_slice(data, style_start, style_length).unwrap_or(&[]);

        Ok(Self::new(text.to_vec(), style.to_vec()))
    }

    pub fn write_bytes<T: Write>(&self, stream: &mut T) -> io::Result<u64> {
        stream.write_u32::<BigEndian>(STYLED_TEXT_HEADER_SIZE)?;
        stream.write_u32::<BigEndian>(self.text.len() as u32)?;
        stream.write_u32::<BigEndian>(self.style.len() as u32)?;
        stream.write_all(&self.text)?;
        stream.write_all(&self.style)?;

        Ok(STYLED_TEXT_HEADER_SIZE as u64 + self.text.len() as u64 + self.style.len() as u64)
    }

}

/// Returns format and text run of a text resource.
fn decode_run(file: &DirFileResource) -> Result<(FourCC, Vec<u8>), RifxError> {
    match file.tag() {
        Some(STYLED_TEXT_TAG) => {
            let styled = StyledText::from_bytes(file.bytes()).map_err(|err| decode_error(file, err))?;

            Ok((STYLED_TEXT_TAG, styled.text))
        },

        Some(XMED_TAG) => Ok((XMED_TAG, file.bytes().clone())),

        _ => Err(RifxError::resource_decode(file.file_name(), "not a text resource"))
    }
}

fn encode_run(xmed: bool, bytes: &[u8]) -> io::Result<Vec<u8>> {
    if xmed {
        return Ok(bytes.to_vec());
    }

    let mut data = Vec::new();
    StyledText::new(bytes.to_vec(), EMPTY_STYLE.to_vec()).write_bytes(&mut data)?;

    Ok(data)
}

pub fn decode_text(file: &DirFileResource) -> Result<TextRecord, RifxError> {
    let (tag, bytes) = decode_run(file)?;
    let format = if tag == XMED_TAG { TextFormat::Xmed } else { TextFormat::Stxt };

    Ok(TextRecord::new(file.id().unwrap_or_default(), format, bytes))
}

pub fn encode_text(record: &TextRecord) -> io::Result<Vec<u8>> {
    encode_run(record.format == TextFormat::Xmed, &record.bytes)
}

pub fn decode_field(file: &DirFileResource) -> Result<FieldRecord, RifxError> {
    let (tag, bytes) = decode_run(file)?;
    let format = if tag == XMED_TAG { FieldFormat::Xmed } else { FieldFormat::Stxt };

    Ok(FieldRecord::new(file.id().unwrap_or_default(), format, bytes))
}

pub fn encode_field(record: &FieldRecord) -> io::Result<Vec<u8>> {
    encode_run(record.format == FieldFormat::Xmed, &record.bytes)
}

fn is_text_resource(file: &DirFileResource) -> bool {
    matches!(file.tag(), Some(STYLED_TEXT_TAG) | Some(XMED_TAG))
}

/// Text resources not owned by a field member, in container order.
pub fn read_texts(container: &DirFilesContainer) -> Vec<Result<TextRecord, RifxError>> {
    let index = MemberIndex::build(container);

    container.iter()
        .filter(|file| is_text_resource(file))
        .filter(|file| !owned_by_field(&index, file))
        .map(decode_text)
        .collect()
}

/// Text resources owned by a field member, in container order.
pub fn read_fields(container: &DirFilesContainer) -> Vec<Result<FieldRecord, RifxError>> {
    let index = MemberIndex::build(container);

    container.iter()
        .filter(|file| is_text_resource(file))
        .filter(|file| owned_by_field(&index, file))
        .map(decode_field)
        .collect()
}

fn owned_by_field(index: &MemberIndex, file: &DirFileResource) -> bool {
    file.id().and_then(|id| index.owner_type(id)) == Some(CastMemberType::Field)
}

fn build_library(member_type: CastMemberType, name: &str, text: &str) -> Result<DirFilesContainer, RifxError> {
    let bytes = encode_latin1(text).map_err(member_error)?;
    let member = CastMember::new(member_type, CastInfo::named(name, None).map_err(member_error)?, Vec::new());

    build_single_member_library(&member, vec![(STYLED_TEXT_TAG, encode_run(false, &bytes).map_err(member_error)?)])
}

/// Library with one text member holding Latin-1 encoded text.
pub fn build_single_member_text_library(name: &str, text: &str) -> Result<DirFilesContainer, RifxError> {
    build_library(CastMemberType::Text, name, text)
}

/// Library with one editable field member holding Latin-1 encoded text.
pub fn build_single_member_field_library(name: &str, text: &str) -> Result<DirFilesContainer, RifxError> {
    build_library(CastMemberType::Field, name, text)
}

#[cfg(test)]
mod tests {
    use crate::rifx::{RifxErrorKind, member::keys::{KeyTable, KeyTableEntry}, tag::{CAST_MEMBER_TAG, KEY_TABLE_TAG}};

    use super::*;

    #[test]
    fn styled_text_round_trip() {
        let styled = StyledText::new(b"Hello".to_vec(), vec![0, 1, 2]);

        let mut data = Vec::new();
        styled.write_bytes(&mut data).unwrap();
        assert_eq!(&data[0..12], &[0, 0, 0, 12, 0, 0, 0, 5, 0, 0, 0, 3]);

        assert_eq!(StyledText::from_bytes(&data).unwrap(), styled);
    }

    #[test]
    fn missing_style_is_tolerated() {
        let data = [0, 0, 0, 12, 0, 0, 0, 2, 0, 0, 0, 20, b'h', b'i'];

        let styled = StyledText::from_bytes(&data).unwrap();
        assert_eq!(styled.text(), &b"hi".to_vec());
        assert!(styled.style().is_empty());
    }

    #[test]
    fn texts_and_fields_are_split_by_owner() {
        let text_member = CastMember::new(CastMemberType::Text, CastInfo::named("text", None).unwrap(), vec![]);
        let field_member = CastMember::new(CastMemberType::Field, CastInfo::named("field", None).unwrap(), vec![]);

        let keys = KeyTable::new(vec![
            KeyTableEntry::new(4, 3, STYLED_TEXT_TAG),
            KeyTableEntry::new(6, 5, STYLED_TEXT_TAG)
        ]);

        let container = DirFilesContainer::from_files(vec![
            DirFileResource::from_parts(KEY_TABLE_TAG, 1, keys.to_bytes().unwrap()),
            DirFileResource::from_parts(CAST_MEMBER_TAG, 3, text_member.to_bytes().unwrap()),
            DirFileResource::from_parts(STYLED_TEXT_TAG, 4, encode_run(false, b"Hello Director").unwrap()),
            DirFileResource::from_parts(CAST_MEMBER_TAG, 5, field_member.to_bytes().unwrap()),
            DirFileResource::from_parts(STYLED_TEXT_TAG, 6, encode_run(false, b"Editable Field").unwrap())
        ]).unwrap();

        let texts = read_texts(&container);
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].as_ref().unwrap().bytes(), &b"Hello Director".to_vec());

        let fields = read_fields(&container);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].as_ref().unwrap().resource_id(), 6);
        assert_eq!(fields[0].as_ref().unwrap().text().unwrap(), "Editable Field");
    }

    #[test]
    fn single_member_text_library() {
        let container = build_single_member_text_library("greeting", "Hello Director").unwrap();

        let stxt = container.get("STXT_0004.bin").unwrap();
        assert_eq!(StyledText::from_bytes(stxt.bytes()).unwrap().text(), &b"Hello Director".to_vec());
        assert!(read_fields(&container).is_empty());
    }

    #[test]
    fn xmed_passes_through() {
        let file = DirFileResource::from_parts(XMED_TAG, 9, vec![1, 2, 3]);

        let record = decode_text(&file).unwrap();
        assert_eq!(record.format(), TextFormat::Xmed);
        assert_eq!(encode_text(&record).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn styled_text_record_round_trip() {
        let record = TextRecord::new(4, TextFormat::Stxt, b"Hello Director".to_vec());

        let file = DirFileResource::from_parts(STYLED_TEXT_TAG, 4, encode_text(&record).unwrap());
        assert_eq!(decode_text(&file).unwrap(), record);
    }

    #[test]
    fn styled_field_record_round_trip() {
        let record = FieldRecord::new(6, FieldFormat::Stxt, b"Editable Field".to_vec());

        let file = DirFileResource::from_parts(STYLED_TEXT_TAG, 6, encode_field(&record).unwrap());
        let decoded = decode_field(&file).unwrap();
        assert_eq!(decoded.format(), FieldFormat::Stxt);
        assert_eq!(decoded, record);
    }

    #[test]
    fn truncated_text_is_reported() {
        let mut container = DirFilesContainer::new();
        container.push(DirFileResource::from_parts(STYLED_TEXT_TAG, 1, vec![0, 0, 0, 12, 0, 0, 0, 9])).unwrap();
        container.push(DirFileResource::from_parts(STYLED_TEXT_TAG, 2, encode_run(false, b"ok").unwrap())).unwrap();

        let texts = read_texts(&container);
        assert_eq!(texts.len(), 2);

        match texts[0].as_ref().unwrap_err().kind() {
            RifxErrorKind::ResourceDecode { file_name, .. } => assert_eq!(file_name, "STXT_0001.bin"),
            kind => panic!("unexpected error {:?}", kind)
        }
        assert_eq!(texts[1].as_ref().unwrap().bytes(), &b"ok".to_vec());
    }
}
