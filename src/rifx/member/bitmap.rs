/*
 * Created on Thu Oct 22 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use crate::rifx::{
    RifxError,
    container::{DirFileResource, DirFilesContainer},
    tag::{ALPHA_TAG, BITMAP_DATA_TAG, DIB_TAG, FourCC, MEDIA_TAG, PICT_TAG, THUMBNAIL_TAG}
};

use super::{cast::{CastInfo, CastMember, CastMemberType}, library::{MemberIndex, build_single_member_library, member_error}};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Known `BITMAPINFOHEADER` family sizes.
const DIB_HEADER_SIZES: [u32; 5] = [0x0C, 0x28, 0x40, 0x6C, 0x7C];

/// Tag prefixes of image resources stored under their file type.
const IMAGE_TAG_PREFIXES: [&[u8]; 7] = [b"PNG", b"JPG", b"JPEG", b"JFIF", b"GIF", b"BMP", b"TIF"];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BitmapFormat {

    Bitd,
    Dib,
    Pict,
    AlphaMask,
    Thumbnail,
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Unknown

}

impl BitmapFormat {

    /// Classify payload by resource tag first, then by signature.
    pub fn detect(tag: FourCC, data: &[u8]) -> Self {
        match tag {
            BITMAP_DATA_TAG => return BitmapFormat::Bitd,
            DIB_TAG => return BitmapFormat::Dib,
            PICT_TAG => return BitmapFormat::Pict,
            ALPHA_TAG => return BitmapFormat::AlphaMask,
            THUMBNAIL_TAG => return BitmapFormat::Thumbnail,
            _ => {}
        }

        if data.starts_with(&PNG_SIGNATURE) {
            BitmapFormat::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            BitmapFormat::Jpeg
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            BitmapFormat::Gif
        } else if data.starts_with(b"BM") {
            BitmapFormat::Bmp
        } else if is_dib_header(data) {
            BitmapFormat::Dib
        } else if data.starts_with(&[b'M', b'M', 0x00, 0x2A]) || data.starts_with(&[b'I', b'I', 0x2A, 0x00]) {
            BitmapFormat::Tiff
        } else {
            BitmapFormat::Unknown
        }
    }

}

fn is_dib_header(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }

    let size = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    DIB_HEADER_SIZES.contains(&size)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapRecord {

    resource_id: u32,
    format: BitmapFormat,
    bytes: Vec<u8>

}

impl BitmapRecord {

    pub fn new(resource_id: u32, format: BitmapFormat, bytes: Vec<u8>) -> Self {
        Self {
            resource_id,
            format,
            bytes
        }
    }

    pub fn resource_id(&self) -> u32 {
        self.resource_id
    }

    pub fn format(&self) -> BitmapFormat {
        self.format
    }

    pub fn bytes(&self) -> &Vec<u8> {
        &self.bytes
    }

}

pub fn decode_bitmap(file: &DirFileResource) -> Result<BitmapRecord, RifxError> {
    let tag = match file.tag() {
        Some(tag) => tag,
        None => return Err(RifxError::resource_decode(file.file_name(), "malformed resource name"))
    };

    if file.bytes().is_empty() {
        return Err(RifxError::resource_decode(file.file_name(), "empty bitmap payload"));
    }

    Ok(BitmapRecord::new(file.id().unwrap_or_default(), BitmapFormat::detect(tag, file.bytes()), file.bytes().clone()))
}

pub fn encode_bitmap(record: &BitmapRecord) -> Vec<u8> {
    record.bytes.clone()
}

fn is_image_tag(tag: FourCC) -> bool {
    let bytes = tag.bytes();

    IMAGE_TAG_PREFIXES.iter().any(|prefix| bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix))
}

fn is_bitmap_resource(index: &MemberIndex, file: &DirFileResource) -> bool {
    match file.tag() {
        Some(BITMAP_DATA_TAG) | Some(DIB_TAG) | Some(PICT_TAG) | Some(ALPHA_TAG) | Some(THUMBNAIL_TAG) => true,

        Some(MEDIA_TAG) => match file.id().and_then(|id| index.owner_type(id)) {
            Some(CastMemberType::Bitmap) | Some(CastMemberType::Picture) => true,
            Some(_) => false,
            None => BitmapFormat::detect(MEDIA_TAG, file.bytes()) != BitmapFormat::Unknown
        },

        Some(tag) if is_image_tag(tag) => BitmapFormat::detect(tag, file.bytes()) != BitmapFormat::Unknown,

        _ => false
    }
}

/// Bitmap resources in container order.
pub fn read_bitmaps(container: &DirFilesContainer) -> Vec<Result<BitmapRecord, RifxError>> {
    let index = MemberIndex::build(container);

    container.iter()
        .filter(|file| is_bitmap_resource(&index, file))
        .map(decode_bitmap)
        .collect()
}

/// Library with one bitmap member holding payload in a `BITD` resource.
pub fn build_single_member_bitmap_library(name: &str, payload: &[u8]) -> Result<DirFilesContainer, RifxError> {
    let member = CastMember::new(CastMemberType::Bitmap, CastInfo::named(name, None).map_err(member_error)?, Vec::new());

    build_single_member_library(&member, vec![(BITMAP_DATA_TAG, payload.to_vec())])
}

#[cfg(test)]
mod tests {
    use crate::rifx::RifxErrorKind;

    use super::*;

    #[test]
    fn detect_by_tag_first() {
        assert_eq!(BitmapFormat::detect(BITMAP_DATA_TAG, &PNG_SIGNATURE), BitmapFormat::Bitd);
        assert_eq!(BitmapFormat::detect(PICT_TAG, &[]), BitmapFormat::Pict);
        assert_eq!(BitmapFormat::detect(THUMBNAIL_TAG, &[1]), BitmapFormat::Thumbnail);
    }

    #[test]
    fn detect_by_signature() {
        assert_eq!(BitmapFormat::detect(MEDIA_TAG, &PNG_SIGNATURE), BitmapFormat::Png);
        assert_eq!(BitmapFormat::detect(MEDIA_TAG, &[0xFF, 0xD8, 0xFF, 0xE0]), BitmapFormat::Jpeg);
        assert_eq!(BitmapFormat::detect(MEDIA_TAG, b"GIF89a"), BitmapFormat::Gif);
        assert_eq!(BitmapFormat::detect(MEDIA_TAG, b"BM\0\0"), BitmapFormat::Bmp);
        assert_eq!(BitmapFormat::detect(MEDIA_TAG, &[0x28, 0, 0, 0]), BitmapFormat::Dib);
        assert_eq!(BitmapFormat::detect(MEDIA_TAG, &[b'I', b'I', 0x2A, 0x00]), BitmapFormat::Tiff);
        assert_eq!(BitmapFormat::detect(MEDIA_TAG, &[1, 2, 3]), BitmapFormat::Unknown);
    }

    #[test]
    fn bitd_library() {
        let payload = [0x01, 0x02, 0x03, 0x04, 0x05];
        let container = build_single_member_bitmap_library("logo", &payload).unwrap();

        let bitmaps = read_bitmaps(&container);
        assert_eq!(bitmaps.len(), 1);

        let bitmap = bitmaps[0].as_ref().unwrap();
        assert_eq!(bitmap.resource_id(), 4);
        assert_eq!(bitmap.format(), BitmapFormat::Bitd);
        assert_eq!(bitmap.bytes(), &payload.to_vec());
    }

    #[test]
    fn bitmap_record_round_trip() {
        let record = BitmapRecord::new(4, BitmapFormat::Bitd, vec![0x01, 0x02, 0x03, 0x04, 0x05]);

        let file = DirFileResource::from_parts(BITMAP_DATA_TAG, 4, encode_bitmap(&record));
        assert_eq!(decode_bitmap(&file).unwrap(), record);
    }

    #[test]
    fn unowned_media_needs_signature() {
        let mut container = DirFilesContainer::new();
        container.push(DirFileResource::from_parts(MEDIA_TAG, 1, PNG_SIGNATURE.to_vec())).unwrap();
        container.push(DirFileResource::from_parts(MEDIA_TAG, 2, vec![1, 2, 3])).unwrap();
        container.push(DirFileResource::from_parts(FourCC::new(*b"PNG "), 3, PNG_SIGNATURE.to_vec())).unwrap();
        container.push(DirFileResource::from_parts(DIB_TAG, 4, vec![])).unwrap();

        let bitmaps = read_bitmaps(&container);
        assert_eq!(bitmaps.len(), 3);
        assert_eq!(bitmaps[0].as_ref().unwrap().format(), BitmapFormat::Png);
        assert_eq!(bitmaps[1].as_ref().unwrap().resource_id(), 3);
        assert!(matches!(bitmaps[2].as_ref().unwrap_err().kind(), RifxErrorKind::ResourceDecode { file_name, .. } if file_name == "DIB _0004.bin"));
    }
}
