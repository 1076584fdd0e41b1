/*
 * Created on Wed Oct 21 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::{collections::HashMap, io};

use tracing::warn;

use crate::rifx::{
    RifxError, RifxErrorKind,
    container::{DirFileResource, DirFilesContainer, ResourceName},
    tag::{CAST_MEMBER_TAG, CAST_TABLE_TAG, FourCC, KEY_TABLE_TAG}
};

use super::{cast::{CastMember, CastMemberType}, keys::{CastTable, KeyTable, KeyTableEntry}};

/// Resource ids used by single member libraries.
pub const KEY_TABLE_ID: u32 = 1;
pub const CAST_TABLE_ID: u32 = 2;
pub const MEMBER_ID: u32 = 3;
pub const FIRST_CHILD_ID: u32 = 4;

/// Links payload resources to the cast members owning them.
#[derive(Debug, Clone, Default)]
pub struct MemberIndex {

    owners: HashMap<u32, u32>,
    member_types: HashMap<u32, CastMemberType>

}

impl MemberIndex {

    /// Index every `KEY*` table and `CASt` member of container.
    /// Tables that fail to parse are skipped.
    pub fn build(container: &DirFilesContainer) -> Self {
        let mut owners = HashMap::new();
        let mut member_types = HashMap::new();

        for file in container {
            let name = match file.name() {
                Ok(name) => name,
                Err(_) => continue
            };

            match name.tag() {
                KEY_TABLE_TAG => match KeyTable::from_bytes(file.bytes()) {
                    Ok(table) => {
                        for entry in table.entries() {
                            owners.entry(entry.child_id()).or_insert_with(|| entry.parent_id());
                        }
                    },

                    Err(err) => warn!("skipping key table {}: {}", file.file_name(), err)
                },

                CAST_MEMBER_TAG => {
                    if let Some(member_type) = CastMember::peek_type(file.bytes()) {
                        member_types.insert(name.id(), member_type);
                    }
                },

                _ => {}
            }
        }

        Self {
            owners,
            member_types
        }
    }

    /// Id of the resource owning child.
    pub fn owner(&self, child_id: u32) -> Option<u32> {
        self.owners.get(&child_id).copied()
    }

    pub fn member_type(&self, member_id: u32) -> Option<CastMemberType> {
        self.member_types.get(&member_id).copied()
    }

    /// Member type of the cast member owning child.
    pub fn owner_type(&self, child_id: u32) -> Option<CastMemberType> {
        self.owner(child_id).and_then(|owner| self.member_type(owner))
    }

}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastMemberSlot {

    number: u32,
    resource_id: u32,

    member_type: CastMemberType,
    name: Option<String>,

    children: Vec<ResourceName>

}

impl CastMemberSlot {

    /// One based member number inside the library.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn resource_id(&self) -> u32 {
        self.resource_id
    }

    pub fn member_type(&self) -> CastMemberType {
        self.member_type
    }

    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    /// Resources linked to this member through `KEY*`.
    pub fn children(&self) -> &Vec<ResourceName> {
        &self.children
    }

}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastLibrary {

    resource_id: u32,
    members: Vec<CastMemberSlot>

}

impl CastLibrary {

    /// Id of the `CAS*` resource.
    pub fn resource_id(&self) -> u32 {
        self.resource_id
    }

    pub fn members(&self) -> &Vec<CastMemberSlot> {
        &self.members
    }

}

/// Enumerate members of every cast library in container.
pub fn read_cast_libraries(container: &DirFilesContainer) -> Vec<Result<CastLibrary, RifxError>> {
    let keys: Vec<KeyTableEntry> = container.with_tag(KEY_TABLE_TAG)
        .filter_map(|file| KeyTable::from_bytes(file.bytes()).ok())
        .flat_map(|table| table.entries().clone())
        .collect();

    container.with_tag(CAST_TABLE_TAG).map(|file| read_cast_library(container, file, &keys)).collect()
}

fn read_cast_library(container: &DirFilesContainer, file: &DirFileResource, keys: &[KeyTableEntry]) -> Result<CastLibrary, RifxError> {
    let table = CastTable::from_bytes(file.bytes()).map_err(|err| decode_error(file, err))?;

    let mut members = Vec::new();
    for (index, resource_id) in table.members().iter().enumerate() {
        if *resource_id == 0 {
            continue;
        }

        let member_file = container.get(&ResourceName::new(CAST_MEMBER_TAG, *resource_id).to_string())
            .ok_or_else(|| RifxError::resource_decode(file.file_name(), format!("member resource {} is missing", resource_id)))?;

        let member = CastMember::from_bytes(member_file.bytes()).map_err(|err| decode_error(member_file, err))?;

        let children = keys.iter()
            .filter(|entry| entry.parent_id() == *resource_id)
            .map(|entry| ResourceName::new(entry.child_tag(), entry.child_id()))
            .collect();

        members.push(CastMemberSlot {
            number: index as u32 + 1,
            resource_id: *resource_id,
            member_type: member.member_type(),
            name: member.name(),
            children
        });
    }

    Ok(CastLibrary {
        resource_id: file.id().unwrap_or_default(),
        members
    })
}

pub(crate) fn decode_error(file: &DirFileResource, err: io::Error) -> RifxError {
    RifxError::new(RifxErrorKind::ResourceDecode {
        file_name: file.file_name().clone(),
        reason: err.to_string()
    }, Some(Box::new(err)))
}

pub(crate) fn member_error(err: io::Error) -> RifxError {
    RifxError::new(RifxErrorKind::InvalidMember(err.to_string()), Some(Box::new(err)))
}

/// Container with one cast library holding one member.
/// Children get consecutive ids after the member and are linked to it through `KEY*`.
pub fn build_single_member_library(member: &CastMember, children: Vec<(FourCC, Vec<u8>)>) -> Result<DirFilesContainer, RifxError> {
    let mut keys = KeyTable::default();
    let mut child_files = Vec::with_capacity(children.len());

    for (index, (tag, bytes)) in children.into_iter().enumerate() {
        let id = FIRST_CHILD_ID + index as u32;

        keys.entries_mut().push(KeyTableEntry::new(id, MEMBER_ID, tag));
        child_files.push(DirFileResource::from_parts(tag, id, bytes));
    }

    let mut cast_table = Vec::new();
    CastTable::new(vec![MEMBER_ID]).write_bytes(&mut cast_table).map_err(member_error)?;

    let mut container = DirFilesContainer::new();
    container.push(DirFileResource::from_parts(KEY_TABLE_TAG, KEY_TABLE_ID, keys.to_bytes().map_err(member_error)?))?;
    container.push(DirFileResource::from_parts(CAST_TABLE_TAG, CAST_TABLE_ID, cast_table))?;
    container.push(DirFileResource::from_parts(CAST_MEMBER_TAG, MEMBER_ID, member.to_bytes().map_err(member_error)?))?;

    for file in child_files {
        container.push(file)?;
    }

    Ok(container)
}
