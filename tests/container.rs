/*
 * Created on Fri Oct 23 2026
 *
 * Copyright (c) storycraft. Licensed under the MIT Licence.
 */

use std::io::Cursor;

use rifx::{
    CLASSIC_ARCHIVE_VERSION, CLASSIC_CODEC_IDENTIFIER, CLASSIC_MAP_VERSION, PAYLOAD_START, PROTECTED_ARCHIVE_VERSION,
    PROTECTED_CODEC_IDENTIFIER, PROTECTED_MAP_VERSION, RifxErrorKind,
    container::{DirFileResource, DirFilesContainer},
    header::RifxCodec,
    reader::{ReaderContext, read_file},
    tag::{BITMAP_DATA_TAG, CAST_MEMBER_TAG, FourCC, MEDIA_TAG, STYLED_TEXT_TAG},
    writer::{ContainerVariant, RifxWriter, write_file}
};

const VARIANTS: [(ContainerVariant, &str); 4] = [
    (ContainerVariant::CLASSIC_MOVIE, "movie.dir"),
    (ContainerVariant::CLASSIC_CAST, "library.cst"),
    (ContainerVariant::PROTECTED_MOVIE, "movie.dxr"),
    (ContainerVariant::PROTECTED_CAST, "library.cxt")
];

fn sample() -> DirFilesContainer {
    DirFilesContainer::from_files(vec![
        DirFileResource::from_parts(CAST_MEMBER_TAG, 3, vec![0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0]),
        DirFileResource::from_parts(BITMAP_DATA_TAG, 4, vec![1, 2, 3, 4, 5]),
        DirFileResource::from_parts(STYLED_TEXT_TAG, 10, b"odd".to_vec()),
        DirFileResource::from_parts(MEDIA_TAG, 7, Vec::new())
    ]).unwrap()
}

fn write(variant: ContainerVariant, container: &DirFilesContainer) -> Vec<u8> {
    let mut buffer = Vec::new();
    RifxWriter::new(variant).write(&mut buffer, container).unwrap();

    buffer
}

#[test]
fn round_trip_every_variant() {
    for (variant, file_name) in VARIANTS.iter() {
        let buffer = write(*variant, &sample());

        let mut context = ReaderContext::open(Cursor::new(buffer), file_name).unwrap();
        assert_eq!(context.format().codec(), variant.codec(), "{}", file_name);
        assert_eq!(context.read_dir_files_container().unwrap(), sample(), "{}", file_name);
    }
}

#[test]
fn codec_fidelity() {
    let buffer = write(ContainerVariant::CLASSIC_MOVIE, &sample());
    let context = ReaderContext::open(Cursor::new(buffer), "movie.dir").unwrap();

    let format = context.format();
    assert!(!format.big_endian());
    assert_eq!(format.codec_identifier(), CLASSIC_CODEC_IDENTIFIER);
    assert_eq!(format.map_version(), CLASSIC_MAP_VERSION);
    assert_eq!(format.archive_version(), CLASSIC_ARCHIVE_VERSION);

    for file_name in &["movie.dxr", "library.cxt", "movie.dcr"] {
        let variant = ContainerVariant::from_file_name(file_name).unwrap();
        let buffer = write(variant, &sample());
        assert_eq!(&buffer[0..4], b"RIFX");
        assert_eq!(&buffer[8..12], b"MC95");

        let context = ReaderContext::open(Cursor::new(buffer), file_name).unwrap();

        let format = context.format();
        assert!(format.big_endian());
        assert_eq!(format.codec_identifier(), PROTECTED_CODEC_IDENTIFIER);
        assert_eq!(format.map_version(), PROTECTED_MAP_VERSION);
        assert_eq!(format.archive_version(), PROTECTED_ARCHIVE_VERSION);
    }
}

#[test]
fn extension_dispatch() {
    let table = [
        ("library.cst", RifxCodec::Classic),
        ("library.cxt", RifxCodec::Protected),
        ("movie.dir", RifxCodec::Classic),
        ("movie.dxr", RifxCodec::Protected),
        ("movie.dcr", RifxCodec::Protected)
    ];

    for (file_name, codec) in table.iter() {
        let stream = write_file(Cursor::new(Vec::new()), file_name, &sample(), true).unwrap().unwrap();

        let (container, _) = read_file(Cursor::new(stream.into_inner()), file_name, false).unwrap();
        assert_eq!(container, sample());
        assert_eq!(ContainerVariant::from_file_name(file_name).unwrap().codec(), *codec);
    }

    let err = write_file(Cursor::new(Vec::new()), "movie.mov", &sample(), false).unwrap_err();
    assert!(matches!(err.kind(), RifxErrorKind::UnsupportedExtension(name) if name == "movie.mov"));
}

#[test]
fn empty_container() {
    for (variant, file_name) in VARIANTS.iter() {
        let buffer = write(*variant, &DirFilesContainer::new());

        let mut context = ReaderContext::open(Cursor::new(buffer), file_name).unwrap();
        assert!(context.read_dir_files_container().unwrap().is_empty());
    }
}

#[test]
fn classic_payload_start() {
    let (_, data_block) = RifxWriter::new(ContainerVariant::CLASSIC_MOVIE).build(&sample()).unwrap();
    assert_eq!(data_block.payload_start(), PAYLOAD_START);
    assert_eq!(data_block.payload_start(), 12);

    let buffer = write(ContainerVariant::CLASSIC_MOVIE, &sample());
    let context = ReaderContext::open(Cursor::new(buffer), "movie.dir").unwrap();
    assert_eq!(context.data_block().payload_start(), 12);
}

#[test]
fn odd_length_padding() {
    let container = DirFilesContainer::from_files(vec![
        DirFileResource::from_parts(STYLED_TEXT_TAG, 1, vec![1, 2, 3]),
        DirFileResource::from_parts(BITMAP_DATA_TAG, 2, vec![4, 5])
    ]).unwrap();

    let (buffer, data_block) = RifxWriter::new(ContainerVariant::CLASSIC_MOVIE).build(&container).unwrap();

    let offsets: Vec<u64> = data_block.entries().iter().map(|entry| match entry.location() {
        rifx::archive::ResourceLocation::Chunk(offset) => offset,
        location => panic!("unexpected location {:?}", location)
    }).collect();

    // 8 byte header, 3 byte payload, 1 pad byte
    assert_eq!(offsets, vec![36, 48]);
    assert_eq!(buffer[47], 0);
}

#[test]
fn duplicate_ids_are_rejected() {
    let container = DirFilesContainer::from_files(vec![
        DirFileResource::from_parts(STYLED_TEXT_TAG, 1, vec![1]),
        DirFileResource::from_parts(BITMAP_DATA_TAG, 1, vec![2])
    ]).unwrap();

    let mut buffer = Vec::new();
    let err = RifxWriter::new(ContainerVariant::CLASSIC_CAST).write(&mut buffer, &container).unwrap_err();

    assert!(matches!(err.kind(), RifxErrorKind::DuplicateResourceId { id: 1, .. }));
    assert!(buffer.is_empty());
}

#[test]
fn non_canonical_names_are_rejected() {
    for name in &["CASt_1.bin", "STXT_0003"] {
        let container = DirFilesContainer::from_files(vec![DirFileResource::new(name.to_string(), vec![1])]).unwrap();

        let mut buffer = Vec::new();
        let err = RifxWriter::new(ContainerVariant::CLASSIC_CAST).write(&mut buffer, &container).unwrap_err();

        assert!(matches!(err.kind(), RifxErrorKind::InvalidResourceName(found) if found == name), "{}", name);
        assert!(buffer.is_empty());
    }
}

#[test]
fn malformed_inputs() {
    let truncated = write(ContainerVariant::PROTECTED_MOVIE, &sample());
    let err = read_file(Cursor::new(truncated[..truncated.len() / 2].to_vec()), "movie.dxr", false).err().unwrap();
    assert!(matches!(err.kind(), RifxErrorKind::TruncatedContainer { .. }));

    let mut unknown_codec = write(ContainerVariant::CLASSIC_MOVIE, &sample());
    unknown_codec[8..12].copy_from_slice(b"ABCD");
    let err = read_file(Cursor::new(unknown_codec), "movie.dir", false).err().unwrap();
    assert!(matches!(err.kind(), RifxErrorKind::MalformedHeader { offset: 8, found } if *found == FourCC::new(*b"DCBA")));
}
