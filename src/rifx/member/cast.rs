/*
 * Created on Wed Oct 21 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::io::{self, Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::rifx::stream::{decode_latin1, encode_latin1, sub_slice};

/// Size of the member type and section length fields.
pub const CAST_MEMBER_HEADER_SIZE: u64 = 12;

/// Offset of the item table in info lists written by this crate.
pub const CAST_INFO_HEADER_SIZE: u32 = 20;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CastMemberType {

    Null,
    Bitmap,
    FilmLoop,
    Field,
    Palette,
    Picture,
    Sound,
    Button,
    Shape,
    Movie,
    DigitalVideo,
    Script,
    Text,
    Ole,
    Transition,
    Xtra,

    Unknown(u32)

}

impl CastMemberType {

    pub fn value(&self) -> u32 {
        match self {
            CastMemberType::Null => 0,
            CastMemberType::Bitmap => 1,
            CastMemberType::FilmLoop => 2,
            CastMemberType::Field => 3,
            CastMemberType::Palette => 4,
            CastMemberType::Picture => 5,
            CastMemberType::Sound => 6,
            CastMemberType::Button => 7,
            CastMemberType::Shape => 8,
            CastMemberType::Movie => 9,
            CastMemberType::DigitalVideo => 10,
            CastMemberType::Script => 11,
            CastMemberType::Text => 12,
            CastMemberType::Ole => 13,
            CastMemberType::Transition => 14,
            CastMemberType::Xtra => 15,
            CastMemberType::Unknown(value) => *value
        }
    }

}

impl From<u32> for CastMemberType {

    fn from(value: u32) -> Self {
        match value {
            0 => CastMemberType::Null,
            1 => CastMemberType::Bitmap,
            2 => CastMemberType::FilmLoop,
            3 => CastMemberType::Field,
            4 => CastMemberType::Palette,
            5 => CastMemberType::Picture,
            6 => CastMemberType::Sound,
            7 => CastMemberType::Button,
            8 => CastMemberType::Shape,
            9 => CastMemberType::Movie,
            10 => CastMemberType::DigitalVideo,
            11 => CastMemberType::Script,
            12 => CastMemberType::Text,
            13 => CastMemberType::Ole,
            14 => CastMemberType::Transition,
            15 => CastMemberType::Xtra,
            _ => CastMemberType::Unknown(value)
        }
    }

}

/// Item list attached to a cast member.
/// Item 0 holds script source, item 1 the member name as a pascal string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastInfo {

    flags: u32,
    script_id: u32,

    items: Vec<Vec<u8>>

}

impl CastInfo {

    pub fn new(flags: u32, script_id: u32, items: Vec<Vec<u8>>) -> Self {
        Self {
            flags,
            script_id,
            items
        }
    }

    /// Info with a name and optional script text.
    pub fn named(name: &str, script_text: Option<&[u8]>) -> io::Result<Self> {
        let encoded = encode_latin1(name)?;
        if encoded.len() > u8::MAX as usize {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "member name longer than 255 bytes"));
        }

        let mut name_item = Vec::with_capacity(encoded.len() + 1);
        name_item.push(encoded.len() as u8);
        name_item.extend_from_slice(&encoded);

        Ok(Self::new(0, 0, vec![script_text.map(|text| text.to_vec()).unwrap_or_default(), name_item]))
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn script_id(&self) -> u32 {
        self.script_id
    }

    pub fn items(&self) -> &Vec<Vec<u8>> {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<Vec<u8>> {
        &mut self.items
    }

    pub fn script_text(&self) -> Option<&[u8]> {
        self.items.get(0).map(|item| &item[..])
    }

    /// Member name stored in item 1.
    pub fn name(&self) -> Option<String> {
        let item = self.items.get(1)?;
        let length = *item.get(0)? as u64;

        let text = sub_slice(item, 1, length)?;
        if text.is_empty() {
            return None;
        }

        decode_latin1(text).ok()
    }

    pub fn from_bytes(data: &[u8]) -> io::Result<Self> {
        if data.is_empty() {
            return Ok(Self::default());
        }

        let mut stream = Cursor::new(data);

        let data_offset = stream.read_u32::<BigEndian>()? as u64;
        let _ = stream.read_u32::<BigEndian>()?;
        let _ = stream.read_u32::<BigEndian>()?;
        let flags = stream.read_u32::<BigEndian>()?;
        let script_id = stream.read_u32::<BigEndian>()?;

        stream.set_position(data_offset);
        let offset_count = stream.read_u16::<BigEndian>()? as usize;

        let mut offsets = Vec::with_capacity(offset_count);
        for _ in 0..offset_count {
            offsets.push(stream.read_u32::<BigEndian>()? as u64);
        }

        let items_length = stream.read_u32::<BigEndian>()? as u64;
        let items_start = stream.position();

        let mut items = Vec::with_capacity(offset_count);
        for (index, start) in offsets.iter().enumerate() {
            let end = offsets.get(index + 1).copied().unwrap_or(items_length);

            let item = end.checked_sub(*start)
                .and_then(|length| sub_slice(data, items_start + start, length))
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "cast info item out of bounds"))?;

            items.push(item.to_vec());
        }

        Ok(Self::new(flags, script_id, items))
    }

    pub fn write_bytes<T: Write>(&self, stream: &mut T) -> io::Result<u64> {
        if self.items.is_empty() && self.flags == 0 && self.script_id == 0 {
            return Ok(0);
        }

        stream.write_u32::<BigEndian>(CAST_INFO_HEADER_SIZE)?;
        stream.write_u32::<BigEndian>(0)?;
        stream.write_u32::<BigEndian>(0)?;
        stream.write_u32::<BigEndian>(self.flags)?;
        stream.write_u32::<BigEndian>(self.script_id)?;

        stream.write_u16::<BigEndian>(self.items.len() as u16)?;

        let mut offset = 0_u32;
        for item in &self.items {
            stream.write_u32::<BigEndian>(offset)?;
            offset += item.len() as u32;
        }
        stream.write_u32::<BigEndian>(offset)?;

        for item in &self.items {
            stream.write_all(item)?;
        }

        Ok(CAST_INFO_HEADER_SIZE as u64 + 2 + 4 * self.items.len() as u64 + 4 + offset as u64)
    }

}

/// `CASt` resource payload. Always big endian regardless of the container byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastMember {

    member_type: CastMemberType,
    info: CastInfo,
    specific: Vec<u8>

}

impl CastMember {

    pub fn new(member_type: CastMemberType, info: CastInfo, specific: Vec<u8>) -> Self {
        Self {
            member_type,
            info,
            specific
        }
    }

    pub fn member_type(&self) -> CastMemberType {
        self.member_type
    }

    pub fn info(&self) -> &CastInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut CastInfo {
        &mut self.info
    }

    /// Type specific data following the info list.
    pub fn specific(&self) -> &Vec<u8> {
        &self.specific
    }

    /// Member name. Without a structured name the items after the script are scanned for one.
    pub fn name(&self) -> Option<String> {
        self.info.name().or_else(|| {
            self.info.items().get(1..).and_then(|items| scan_pascal_string(&items.concat()))
        })
    }

    /// Read member type without parsing the rest of the payload.
    pub fn peek_type(data: &[u8]) -> Option<CastMemberType> {
        if (data.len() as u64) < CAST_MEMBER_HEADER_SIZE {
            return None;
        }

        Cursor::new(data).read_u32::<BigEndian>().ok().map(CastMemberType::from)
    }

    pub fn from_bytes(data: &[u8]) -> io::Result<Self> {
        let mut stream = Cursor::new(data);

        let member_type = CastMemberType::from(stream.read_u32::<BigEndian>()?);
        let info_length = stream.read_u32::<BigEndian>()? as u64;
        let specific_length = stream.read_u32::<BigEndian>()? as u64;

        let info_data = sub_slice(data, CAST_MEMBER_HEADER_SIZE, info_length)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "cast info runs past the member"))?;

        let specific = sub_slice(data, CAST_MEMBER_HEADER_SIZE + info_length, specific_length)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "member data runs past the member"))?;

        let info = match CastInfo::from_bytes(info_data) {
            Ok(info) => info,

            // Unstructured info. Keep the name recoverable through the scan.
            Err(_) => match scan_pascal_string(info_data) {
                Some(name) => CastInfo::named(&name, None)?,
                None => CastInfo::default()
            }
        };

        Ok(Self::new(member_type, info, specific.to_vec()))
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut info = Vec::new();
        self.info.write_bytes(&mut info)?;

        let mut data = Vec::with_capacity(CAST_MEMBER_HEADER_SIZE as usize + info.len() + self.specific.len());
        data.write_u32::<BigEndian>(self.member_type.value())?;
        data.write_u32::<BigEndian>(info.len() as u32)?;
        data.write_u32::<BigEndian>(self.specific.len() as u32)?;
        data.write_all(&info)?;
        data.write_all(&self.specific)?;

        Ok(data)
    }

}

/// Best effort search for the first printable length prefixed string.
/// Used when a name cannot be located structurally; the result may be unrelated text.
pub fn scan_pascal_string(data: &[u8]) -> Option<String> {
    for (index, length) in data.iter().enumerate() {
        let length = *length as u64;
        if length == 0 {
            continue;
        }

        let text = match sub_slice(data, index as u64 + 1, length) {
            Some(text) => text,
            None => continue
        };

        if text.iter().all(|byte| (0x20..=0x7E).contains(byte)) {
            let mut name = String::with_capacity(text.len());
            text.iter().for_each(|byte| name.push(*byte as char));

            return Some(name);
        }
    }

    None
}

/// Read whole stream into a member.
pub fn read_member<T: Read>(stream: &mut T) -> io::Result<CastMember> {
    let mut data = Vec::new();
    stream.read_to_end(&mut data)?;

    CastMember::from_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_round_trip() {
        let info = CastInfo::named("behavior member", Some(b"on exitFrame\rgo to the frame\rend")).unwrap();
        let member = CastMember::new(CastMemberType::Script, info, vec![0, 1]);

        let data = member.to_bytes().unwrap();
        assert_eq!(&data[0..4], &[0, 0, 0, 11]);
        assert_eq!(CastMember::peek_type(&data), Some(CastMemberType::Script));

        let parsed = read_member(&mut Cursor::new(&data)).unwrap();
        assert_eq!(parsed, member);
        assert_eq!(parsed.name().as_deref(), Some("behavior member"));
        assert_eq!(parsed.info().script_text(), Some(&b"on exitFrame\rgo to the frame\rend"[..]));
    }

    #[test]
    fn member_without_info() {
        let member = CastMember::new(CastMemberType::Bitmap, CastInfo::default(), vec![]);
        let data = member.to_bytes().unwrap();

        assert_eq!(data.len(), 12);
        assert_eq!(CastMember::from_bytes(&data).unwrap().name(), None);
    }

    #[test]
    fn truncated_member() {
        let mut data = CastMember::new(CastMemberType::Text, CastInfo::named("text", None).unwrap(), vec![1, 2, 3]).to_bytes().unwrap();
        data.truncate(data.len() - 1);

        assert_eq!(CastMember::from_bytes(&data).unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(CastMember::peek_type(&[0, 0, 0]), None);
    }

    #[test]
    fn name_scan_fallback() {
        assert_eq!(scan_pascal_string(&[0xFF, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o', 0x01]).as_deref(), Some("hello"));
        assert_eq!(scan_pascal_string(&[0x00, 0x00]), None);
        assert_eq!(scan_pascal_string(&[0x03, 0x01, 0x02]), None);

        // Garbage info list still yields a name
        let mut data = vec![0, 0, 0, 1, 0, 0, 0, 8, 0, 0, 0, 0];
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x04, b'l', b'o', b'g', b'o']);
        assert_eq!(CastMember::from_bytes(&data).unwrap().name().as_deref(), Some("logo"));
    }

    #[test]
    fn unstructured_name_skips_script() {
        let info = CastInfo::new(0, 0, vec![
            b"\x04junk".to_vec(),
            vec![0xFF, 0x01],
            vec![0x00, 0x05, b'i', b'c', b'o', b'n', b's']
        ]);
        assert_eq!(info.name(), None);

        let member = CastMember::new(CastMemberType::Bitmap, info, vec![]);
        assert_eq!(member.name().as_deref(), Some("icons"));

        let script_only = CastInfo::new(0, 0, vec![b"\x04junk".to_vec()]);
        assert_eq!(CastMember::new(CastMemberType::Script, script_only, vec![]).name(), None);
    }

    #[test]
    fn member_type_values() {
        for value in 0..20 {
            assert_eq!(CastMemberType::from(value).value(), value);
        }
    }
}
