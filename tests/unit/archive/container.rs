use super::*;

/// Minimal single-file builder mirroring what the design tool writes: local
/// headers with zeroed sizes, trailing central directory with the truth.
fn build_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut locals = Vec::new();

    for (name, data) in files {
        let offset = out.len();
        locals.push((name.to_string(), data.to_vec(), offset));
        out.extend_from_slice(&0x0403_4B50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes()); // version needed
        out.extend_from_slice(&0u16.to_le_bytes()); // flags
        out.extend_from_slice(&0u16.to_le_bytes()); // method: stored
        out.extend_from_slice(&[0u8; 4]); // dos time/date
        out.extend_from_slice(&[0u8; 4]); // crc32 (unused by reader)
        out.extend_from_slice(&0u32.to_le_bytes()); // compressed size: deferred
        out.extend_from_slice(&0u32.to_le_bytes()); // uncompressed size: deferred
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes()); // extra field length
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&[0xEE; 4]); // opaque extra field
        out.extend_from_slice(data);
    }

    let central_offset = out.len();
    for (name, data, offset) in &locals {
        out.extend_from_slice(&0x0201_4B50u32.to_le_bytes());
        out.extend_from_slice(&[0u8; 6]); // versions + flags
        out.extend_from_slice(&0u16.to_le_bytes()); // method: stored
        out.extend_from_slice(&[0u8; 4]); // dos time/date
        out.extend_from_slice(&[0u8; 4]); // crc32
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // extra
        out.extend_from_slice(&0u16.to_le_bytes()); // comment
        out.extend_from_slice(&[0u8; 8]); // disk no, attrs
        out.extend_from_slice(&(*offset as u32).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
    }
    let central_len = out.len() - central_offset;

    out.extend_from_slice(&0x0605_4B50u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]); // disk numbers
    out.extend_from_slice(&(locals.len() as u16).to_le_bytes());
    out.extend_from_slice(&(locals.len() as u16).to_le_bytes());
    out.extend_from_slice(&(central_len as u32).to_le_bytes());
    out.extend_from_slice(&(central_offset as u32).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // comment length
    out
}

#[test]
fn lists_stored_entries() {
    let bytes = build_archive(&[("hi", b"hello")]);
    let container = Container::parse(&bytes).unwrap();
    assert_eq!(container.names(), vec!["hi"]);
}

#[test]
fn reads_entry_bytes_past_local_extra_field() {
    let bytes = build_archive(&[("a.txt", b"alpha"), ("b.bin", &[1, 2, 3])]);
    let container = Container::parse(&bytes).unwrap();
    let entry = container.entry("a.txt").unwrap();
    assert_eq!(container.read(entry).unwrap(), b"alpha");
    let entry = container.entry("b.bin").unwrap();
    assert_eq!(container.read(entry).unwrap(), [1, 2, 3]);
}

#[test]
fn sizes_come_from_the_central_directory() {
    // Local headers above write zero sizes on purpose; if the reader trusted
    // them, every entry would come back empty.
    let bytes = build_archive(&[("x", b"twelve bytes")]);
    let container = Container::parse(&bytes).unwrap();
    let entry = container.entry("x").unwrap();
    assert_eq!(entry.compressed_size, 12);
    assert_eq!(entry.uncompressed_size, 12);
}

#[test]
fn directory_entries_are_skipped_in_names() {
    let bytes = build_archive(&[("images/", b""), ("images/aa", b"raw")]);
    let container = Container::parse(&bytes).unwrap();
    assert_eq!(container.names(), vec!["images/aa"]);
}

#[test]
fn eocd_is_found_behind_a_trailing_comment() {
    let mut bytes = build_archive(&[("hi", b"x")]);
    let comment = b"annotated by some other tool";
    let n = bytes.len();
    bytes[n - 2..].copy_from_slice(&(comment.len() as u16).to_le_bytes());
    bytes.extend_from_slice(comment);
    let container = Container::parse(&bytes).unwrap();
    assert_eq!(container.names(), vec!["hi"]);
}

#[test]
fn missing_marker_is_not_archive() {
    match Container::parse(b"not a container at all") {
        Err(FigError::NotArchive(_)) => {}
        other => panic!("expected NotArchive, got {other:?}"),
    }
}

#[test]
fn truncated_file_is_not_archive() {
    match Container::parse(&[0x50, 0x4B]) {
        Err(FigError::NotArchive(_)) => {}
        other => panic!("expected NotArchive, got {other:?}"),
    }
}
