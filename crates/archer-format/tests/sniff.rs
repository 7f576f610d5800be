use std::cell::Cell;
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;

use archer_format::sniff::TAR_BLOCK_LEN;
use archer_format::{
    ExternalDecoder, FormatDescriptor, NoExternalDecoder, SniffOutcome, by_id, is_tar_payload,
    sniff,
};

fn tar_block() -> Vec<u8> {
    let mut block = vec![0u8; TAR_BLOCK_LEN * 3];
    block[..9].copy_from_slice(b"hello.txt");
    block[257..263].copy_from_slice(b"ustar\0");
    block
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn bzip2(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn xz(data: &[u8]) -> Vec<u8> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn sniff_as(path: &Path, id: &str) -> SniffOutcome {
    sniff(path, by_id(id).unwrap(), &NoExternalDecoder)
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn gzip_tarball_is_tar() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "bundle.gz", &gzip(&tar_block()));
    assert_eq!(sniff_as(&path, "gz"), SniffOutcome::Tar);
}

#[test]
fn gzip_plain_file_is_plain() {
    let dir = tempfile::tempdir().unwrap();
    let text = "just some notes\n".repeat(100);
    let path = write(dir.path(), "notes.gz", &gzip(text.as_bytes()));
    let gz = by_id("gz").unwrap();
    assert_eq!(sniff_as(&path, "gz"), SniffOutcome::Plain);
    assert!(!is_tar_payload(&path, gz, &NoExternalDecoder));
}

#[test]
fn gzip_short_plain_file_is_plain() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "short.gz", &gzip(b"tiny"));
    assert_eq!(sniff_as(&path, "gz"), SniffOutcome::Plain);
}

#[test]
fn truncated_gzip_assumes_tar() {
    let dir = tempfile::tempdir().unwrap();
    let full = gzip(&[b'x'; 300]);
    let path = write(dir.path(), "cut.gz", &full[..full.len() - 4]);
    let gz = by_id("gz").unwrap();
    assert_eq!(sniff_as(&path, "gz"), SniffOutcome::Unreadable);
    assert!(is_tar_payload(&path, gz, &NoExternalDecoder));
}

#[test]
fn garbage_assumes_tar() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "garbage.bz2", b"definitely not bzip2 data");
    let bz2 = by_id("bz2").unwrap();
    assert!(is_tar_payload(&path, bz2, &NoExternalDecoder));
}

#[test]
fn missing_file_assumes_tar() {
    let gz = by_id("gz").unwrap();
    let path = Path::new("/nonexistent/archer/missing.gz");
    assert_eq!(sniff_as(path, "gz"), SniffOutcome::Unreadable);
    assert!(is_tar_payload(path, gz, &NoExternalDecoder));
}

#[test]
fn tar_marker_skips_io() {
    let path = Path::new("/nonexistent/archer/backup.tar.part.gz");
    assert_eq!(sniff_as(path, "gz"), SniffOutcome::Tar);
}

#[test]
fn bzip2_and_xz_tarballs() {
    let dir = tempfile::tempdir().unwrap();
    let bz = write(dir.path(), "a.bz2", &bzip2(&tar_block()));
    let x = write(dir.path(), "a.xz", &xz(&tar_block()));
    let plain = write(dir.path(), "b.xz", &xz(&[b'z'; 2048]));

    assert_eq!(sniff_as(&bz, "bz2"), SniffOutcome::Tar);
    assert_eq!(sniff_as(&x, "xz"), SniffOutcome::Tar);
    assert_eq!(sniff_as(&plain, "xz"), SniffOutcome::Plain);
}

struct FakeDecoder {
    payload: Vec<u8>,
    calls: Cell<usize>,
}

impl ExternalDecoder for FakeDecoder {
    fn decode(&self, _path: &Path, format: &FormatDescriptor) -> io::Result<Box<dyn Read>> {
        assert_eq!(format.id, "lz");
        self.calls.set(self.calls.get() + 1);
        Ok(Box::new(Cursor::new(self.payload.clone())))
    }
}

#[test]
fn external_codec_uses_decoder() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.lz", b"opaque lzip bytes");
    let lz = by_id("lz").unwrap();

    let decoder = FakeDecoder {
        payload: tar_block(),
        calls: Cell::new(0),
    };
    assert_eq!(sniff(&path, lz, &decoder), SniffOutcome::Tar);
    assert_eq!(decoder.calls.get(), 1);

    let decoder = FakeDecoder {
        payload: vec![b'q'; 1024],
        calls: Cell::new(0),
    };
    assert_eq!(sniff(&path, lz, &decoder), SniffOutcome::Plain);
}

#[test]
fn external_codec_without_tool_assumes_tar() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.lzo", b"opaque lzop bytes");
    let lzop = by_id("lzop").unwrap();
    assert_eq!(sniff_as(&path, "lzop"), SniffOutcome::Unreadable);
    assert!(is_tar_payload(&path, lzop, &NoExternalDecoder));
}
