/*
 * Created on Tue Oct 20 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::{fmt, slice::Iter};

use super::{RifxError, RifxErrorKind, tag::FourCC};

/// Parsed `<FourCC>_<id>.bin` resource file name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName {

    tag: FourCC,
    id: u32

}

impl ResourceName {

    pub fn new(tag: FourCC, id: u32) -> Self {
        Self {
            tag,
            id
        }
    }

    pub fn tag(&self) -> FourCC {
        self.tag
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Parse resource file name. The extension is optional.
    pub fn parse(file_name: &str) -> Result<Self, RifxError> {
        let invalid = || RifxError::new(RifxErrorKind::InvalidResourceName(file_name.to_owned()), None);

        let stem = match file_name.rfind('.') {
            Some(index) if index >= 4 => &file_name[..index],
            _ => file_name
        };

        let split = stem.char_indices().nth(4).map(|(index, _)| index).ok_or_else(invalid)?;
        let (tag_text, rest) = stem.split_at(split);

        let tag = FourCC::parse(tag_text).ok_or_else(invalid)?;

        let digits = rest.strip_prefix('_').ok_or_else(invalid)?;
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }

        let id = digits.parse::<u32>().map_err(|err| {
            RifxError::new(RifxErrorKind::InvalidResourceName(file_name.to_owned()), Some(Box::new(err)))
        })?;

        Ok(Self::new(tag, id))
    }

}

impl fmt::Display for ResourceName {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:04}.bin", self.tag, self.id)
    }

}

/// One opaque chunk payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirFileResource {

    file_name: String,
    bytes: Vec<u8>

}

impl DirFileResource {

    pub fn new(file_name: String, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            bytes
        }
    }

    pub fn from_parts(tag: FourCC, id: u32, bytes: Vec<u8>) -> Self {
        Self::new(ResourceName::new(tag, id).to_string(), bytes)
    }

    pub fn file_name(&self) -> &String {
        &self.file_name
    }

    pub fn bytes(&self) -> &Vec<u8> {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn name(&self) -> Result<ResourceName, RifxError> {
        ResourceName::parse(&self.file_name)
    }

    /// Tag of the resource, if the file name is well formed.
    pub fn tag(&self) -> Option<FourCC> {
        self.name().ok().map(|name| name.tag())
    }

    pub fn id(&self) -> Option<u32> {
        self.name().ok().map(|name| name.id())
    }

}

/// Ordered resources of one container, unique by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirFilesContainer {

    files: Vec<DirFileResource>

}

impl DirFilesContainer {

    pub fn new() -> Self {
        Self {
            files: Vec::new()
        }
    }

    /// Create container from resources. Fails on a repeated file name.
    pub fn from_files(files: Vec<DirFileResource>) -> Result<Self, RifxError> {
        let mut container = Self::new();

        for file in files {
            container.push(file)?;
        }

        Ok(container)
    }

    /// Append resource. Fails on a repeated file name.
    pub fn push(&mut self, file: DirFileResource) -> Result<(), RifxError> {
        if self.get(&file.file_name).is_some() {
            return Err(RifxError::new(RifxErrorKind::DuplicateResourceId {
                id: file.id().unwrap_or_default(),
                file_name: file.file_name
            }, None));
        }

        self.files.push(file);

        Ok(())
    }

    pub fn files(&self) -> &Vec<DirFileResource> {
        &self.files
    }

    pub fn into_files(self) -> Vec<DirFileResource> {
        self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, DirFileResource> {
        self.files.iter()
    }

    pub fn get(&self, file_name: &str) -> Option<&DirFileResource> {
        self.files.iter().find(|file| file.file_name == file_name)
    }

    /// Resource with given id regardless of tag.
    pub fn get_by_id(&self, id: u32) -> Option<&DirFileResource> {
        self.files.iter().find(|file| file.id() == Some(id))
    }

    /// Resources with given tag in container order.
    pub fn with_tag(&self, tag: FourCC) -> impl Iterator<Item = &DirFileResource> {
        self.files.iter().filter(move |file| file.tag() == Some(tag))
    }

}

impl<'a> IntoIterator for &'a DirFilesContainer {

    type Item = &'a DirFileResource;
    type IntoIter = Iter<'a, DirFileResource>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }

}
