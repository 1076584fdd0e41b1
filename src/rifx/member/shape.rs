/*
 * Created on Thu Oct 22 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::io::{self, Cursor};

use byteorder::{BigEndian, ReadBytesExt};

use crate::rifx::{
    RifxError, RifxErrorKind,
    container::{DirFileResource, DirFilesContainer},
    tag::CAST_MEMBER_TAG
};

use super::{cast::{CastInfo, CastMember, CastMemberType}, library::{build_single_member_library, decode_error, member_error}};

/// Size of a QuickDraw shape record.
pub const SHAPE_RECORD_SIZE: usize = 17;

/// `u16 data_size, u32 info_size, u8 member_type`
const TRANSITIONAL_HEADER_SIZE: usize = 7;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShapeFormat {

    /// Colour indices are unsigned bytes.
    Director4To10UnsignedColors,

    /// Colour indices are signed bytes.
    Director2To3SignedColors

}

/// Decoded view over a shape record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QuickDrawShape {

    pub shape_type: u16,

    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,

    pub pattern: u16,

    pub fore_color: i16,
    pub back_color: i16,

    pub fill_type: u8,
    pub line_size: u8,
    pub line_direction: u8

}

impl QuickDrawShape {

    pub fn from_bytes(data: &[u8], format: ShapeFormat) -> io::Result<Self> {
        let mut stream = Cursor::new(data);

        let shape_type = stream.read_u16::<BigEndian>()?;

        let top = stream.read_i16::<BigEndian>()?;
        let left = stream.read_i16::<BigEndian>()?;
        let bottom = stream.read_i16::<BigEndian>()?;
        let right = stream.read_i16::<BigEndian>()?;

        let pattern = stream.read_u16::<BigEndian>()?;

        let fore = stream.read_u8()?;
        let back = stream.read_u8()?;

        let (fore_color, back_color) = match format {
            ShapeFormat::Director4To10UnsignedColors => (fore as i16, back as i16),
            ShapeFormat::Director2To3SignedColors => (fore as i8 as i16, back as i8 as i16)
        };

        Ok(Self {
            shape_type,
            top,
            left,
            bottom,
            right,
            pattern,
            fore_color,
            back_color,
            fill_type: stream.read_u8()?,
            line_size: stream.read_u8()?,
            line_direction: stream.read_u8()?
        })
    }

    pub fn width(&self) -> i32 {
        self.right as i32 - self.left as i32
    }

    pub fn height(&self) -> i32 {
        self.bottom as i32 - self.top as i32
    }

}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeRecord {

    resource_id: u32,
    format: ShapeFormat,
    bytes: Vec<u8>

}

impl ShapeRecord {

    pub fn new(resource_id: u32, format: ShapeFormat, bytes: Vec<u8>) -> Self {
        Self {
            resource_id,
            format,
            bytes
        }
    }

    pub fn resource_id(&self) -> u32 {
        self.resource_id
    }

    pub fn format(&self) -> ShapeFormat {
        self.format
    }

    /// Shape record as stored.
    pub fn bytes(&self) -> &Vec<u8> {
        &self.bytes
    }

    pub fn geometry(&self) -> Option<QuickDrawShape> {
        QuickDrawShape::from_bytes(&self.bytes, self.format).ok()
    }

}

fn transitional_record(data: &[u8]) -> Option<&[u8]> {
    if data.len() < TRANSITIONAL_HEADER_SIZE || data[6] != CastMemberType::Shape.value() as u8 {
        return None;
    }

    let mut stream = Cursor::new(data);
    let data_size = stream.read_u16::<BigEndian>().ok()? as usize;
    let info_size = stream.read_u32::<BigEndian>().ok()? as usize;

    let area_length = (data.len() - TRANSITIONAL_HEADER_SIZE).checked_sub(info_size)?;
    let available = data_size.saturating_sub(1).min(area_length);
    if available < SHAPE_RECORD_SIZE {
        return None;
    }

    // Record sits at the end of the member data area.
    let start = TRANSITIONAL_HEADER_SIZE + area_length - SHAPE_RECORD_SIZE;
    data.get(start..start + SHAPE_RECORD_SIZE)
}

fn vintage_record(data: &[u8]) -> Option<&[u8]> {
    if data.len() < 2 || data[0] < 2 || data[1] != CastMemberType::Shape.value() as u8 {
        return None;
    }

    let available = (data[0] as usize - 1).min(data.len() - 2);
    if available < SHAPE_RECORD_SIZE {
        return None;
    }

    let start = 2 + available - SHAPE_RECORD_SIZE;
    data.get(start..start + SHAPE_RECORD_SIZE)
}

/// Locate the shape record of a pre Director 5 member payload.
fn legacy_record(data: &[u8]) -> Option<(ShapeFormat, &[u8])> {
    transitional_record(data).map(|record| (ShapeFormat::Director4To10UnsignedColors, record))
        .or_else(|| vintage_record(data).map(|record| (ShapeFormat::Director2To3SignedColors, record)))
}

pub fn decode_shape(file: &DirFileResource) -> Result<ShapeRecord, RifxError> {
    let id = file.id().unwrap_or_default();

    if CastMember::peek_type(file.bytes()) != Some(CastMemberType::Shape) {
        return match legacy_record(file.bytes()) {
            Some((format, record)) => Ok(ShapeRecord::new(id, format, record.to_vec())),
            None => Err(RifxError::resource_decode(file.file_name(), "not a shape member"))
        };
    }

    let member = CastMember::from_bytes(file.bytes()).map_err(|err| decode_error(file, err))?;
    if member.specific().len() < SHAPE_RECORD_SIZE {
        return Err(RifxError::resource_decode(
            file.file_name(),
            format!("shape record is {} bytes, expected at least {}", member.specific().len(), SHAPE_RECORD_SIZE)
        ));
    }

    Ok(ShapeRecord::new(id, ShapeFormat::Director4To10UnsignedColors, member.specific().clone()))
}

/// Encode record into a `CASt` payload.
pub fn encode_shape(record: &ShapeRecord) -> io::Result<Vec<u8>> {
    CastMember::new(CastMemberType::Shape, CastInfo::default(), record.bytes.clone()).to_bytes()
}

fn is_shape_member(data: &[u8]) -> bool {
    match CastMember::peek_type(data) {
        Some(CastMemberType::Shape) => true,
        Some(CastMemberType::Unknown(_)) | None => legacy_record(data).is_some(),
        Some(_) => false
    }
}

/// Shape members in container order.
pub fn read_shapes(container: &DirFilesContainer) -> Vec<Result<ShapeRecord, RifxError>> {
    container.with_tag(CAST_MEMBER_TAG)
        .filter(|file| is_shape_member(file.bytes()))
        .map(decode_shape)
        .collect()
}

/// Library with one shape member. Shapes carry no child resources.
pub fn build_single_member_shape_library(name: &str, record: &[u8]) -> Result<DirFilesContainer, RifxError> {
    if record.len() != SHAPE_RECORD_SIZE {
        return Err(RifxError::new(
            RifxErrorKind::InvalidMember(format!("shape record must be {} bytes, got {}", SHAPE_RECORD_SIZE, record.len())),
            None
        ));
    }

    let member = CastMember::new(CastMemberType::Shape, CastInfo::named(name, None).map_err(member_error)?, record.to_vec());

    build_single_member_library(&member, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: [u8; 17] = [0x00, 0x02, 0xFF, 0xF6, 0xFF, 0xF0, 0x00, 0x14, 0x00, 0x20, 0x12, 0x34, 0x80, 0x7F, 0x1C, 0x08, 0x02];

    #[test]
    fn modern_shape_library() {
        let container = build_single_member_shape_library("box", &RECORD).unwrap();
        assert_eq!(container.len(), 3);

        let shapes = read_shapes(&container);
        assert_eq!(shapes.len(), 1);

        let shape = shapes[0].as_ref().unwrap();
        assert_eq!(shape.resource_id(), 3);
        assert_eq!(shape.format(), ShapeFormat::Director4To10UnsignedColors);
        assert_eq!(shape.bytes(), &RECORD.to_vec());

        let geometry = shape.geometry().unwrap();
        assert_eq!(geometry.shape_type, 2);
        assert_eq!((geometry.top, geometry.left, geometry.bottom, geometry.right), (-10, -16, 20, 32));
        assert_eq!(geometry.width(), 48);
        assert_eq!(geometry.pattern, 0x1234);
        assert_eq!((geometry.fore_color, geometry.back_color), (128, 127));
        assert_eq!((geometry.fill_type, geometry.line_size, geometry.line_direction), (0x1C, 8, 2));
    }

    #[test]
    fn shape_record_round_trip() {
        let record = ShapeRecord::new(3, ShapeFormat::Director4To10UnsignedColors, RECORD.to_vec());

        let file = DirFileResource::from_parts(CAST_MEMBER_TAG, 3, encode_shape(&record).unwrap());
        assert_eq!(decode_shape(&file).unwrap(), record);
    }

    #[test]
    fn builder_rejects_wrong_size() {
        let err = build_single_member_shape_library("box", &RECORD[..16]).unwrap_err();
        assert!(matches!(err.kind(), RifxErrorKind::InvalidMember(_)));
    }

    #[test]
    fn short_modern_record() {
        let member = CastMember::new(CastMemberType::Shape, CastInfo::default(), RECORD[..10].to_vec());
        let file = DirFileResource::from_parts(CAST_MEMBER_TAG, 3, member.to_bytes().unwrap());

        let err = decode_shape(&file).unwrap_err();
        assert!(matches!(err.kind(), RifxErrorKind::ResourceDecode { file_name, .. } if file_name == "CASt_0003.bin"));
    }

    #[test]
    fn transitional_layout() {
        let mut data = vec![0x00, 18, 0x00, 0x00, 0x00, 0x00, 0x08];
        data.extend_from_slice(&RECORD);

        let file = DirFileResource::from_parts(CAST_MEMBER_TAG, 9, data);
        let shape = decode_shape(&file).unwrap();

        assert_eq!(shape.format(), ShapeFormat::Director4To10UnsignedColors);
        assert_eq!(shape.bytes(), &RECORD.to_vec());
    }

    #[test]
    fn vintage_layout() {
        let mut data = vec![18, 0x08];
        data.extend_from_slice(&RECORD);

        let file = DirFileResource::from_parts(CAST_MEMBER_TAG, 9, data);
        let shape = decode_shape(&file).unwrap();

        assert_eq!(shape.format(), ShapeFormat::Director2To3SignedColors);

        let geometry = shape.geometry().unwrap();
        assert_eq!((geometry.fore_color, geometry.back_color), (-128, 127));
    }

    #[test]
    fn other_members_are_skipped() {
        let member = CastMember::new(CastMemberType::Bitmap, CastInfo::default(), RECORD.to_vec());

        let mut container = DirFilesContainer::new();
        container.push(DirFileResource::from_parts(CAST_MEMBER_TAG, 1, member.to_bytes().unwrap())).unwrap();

        assert!(read_shapes(&container).is_empty());
    }
}
