/*
 * Created on Fri Oct 23 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::{fs::{self, File}, io::BufReader, path::Path};

use rifx::reader::ReaderContext;

pub fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let stream = BufReader::new(File::open("sample.cst").unwrap());

    let mut context = ReaderContext::open(stream, "sample.cst").unwrap();
    let container = context.read_dir_files_container().unwrap();

    let directory = Path::new("rifx_test");
    fs::create_dir_all(directory).unwrap();

    for file in &container {
        println!("Extracting: {}", file.file_name());

        fs::write(directory.join(file.file_name()), file.bytes()).unwrap();
    }

    for text in context.read_texts().unwrap() {
        match text {
            Ok(text) => println!("Text {}: {:?}", text.resource_id(), text.text().unwrap()),
            Err(err) => println!("Skipped: {}", err)
        }
    }
}
