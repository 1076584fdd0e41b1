/*
 * Created on Wed Oct 21 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

//! Cast member sub-codecs operating on [`DirFilesContainer`](super::container::DirFilesContainer).

pub mod cast;
pub mod keys;
pub mod library;

pub mod text;
pub mod script;
pub mod sound;
pub mod bitmap;
pub mod shape;

pub use cast::{CastInfo, CastMember, CastMemberType};
pub use library::{CastLibrary, CastMemberSlot, MemberIndex, build_single_member_library, read_cast_libraries};
