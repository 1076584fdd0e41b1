/*
 * Created on Mon Oct 19 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

pub mod rifx;

pub use crate::rifx::*;
