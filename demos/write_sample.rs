/*
 * Created on Fri Oct 23 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::{fs::File, io::BufWriter};

use rifx::{member::text::build_single_member_text_library, writer::write_file};

pub fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let container = build_single_member_text_library("greeting", "Hello Director").unwrap();

    let stream = BufWriter::new(File::create("sample.cst").unwrap());
    write_file(stream, "sample.cst", &container, false).unwrap();

    for file in &container {
        println!("Written: {} ({} bytes)", file.file_name(), file.bytes().len());
    }
}
