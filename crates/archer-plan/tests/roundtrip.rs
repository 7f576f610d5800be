//! Compress, run, extract and compare, using whatever the host has installed.
//! Each case is skipped when its tools are missing.

use std::fs;
use std::path::Path;

use archer_plan::Synthesizer;
use archer_tool::{ResolverOptions, ToolResolver};

const NO_FLAGS: &[&str] = &[];

fn installed(resolver: &ToolResolver, tools: &[&str]) -> bool {
    let present = tools.iter().all(|tool| resolver.resolve(tool).is_some());
    if !present {
        eprintln!("skipping: needs {tools:?}");
    }
    present
}

fn write_tree(root: &Path) {
    fs::create_dir_all(root.join("docs/deep")).unwrap();
    fs::write(root.join("docs/readme.txt"), b"read me\n").unwrap();
    let data: Vec<u8> = (0..=255).collect();
    fs::write(root.join("docs/deep/data.bin"), data).unwrap();
}

fn assert_same_tree(expected: &Path, actual: &Path) {
    for rel in ["docs/readme.txt", "docs/deep/data.bin"] {
        assert_eq!(
            fs::read(expected.join(rel)).unwrap(),
            fs::read(actual.join(rel)).unwrap(),
            "{rel} differs"
        );
    }
}

fn roundtrip(archive: &str, tools: &[&str]) {
    let resolver = ToolResolver::system(&ResolverOptions::default());
    if !installed(&resolver, tools) {
        return;
    }

    let work = tempfile::tempdir().unwrap();
    write_tree(work.path());
    let synth = Synthesizer::new(&resolver);

    let compress = synth.compress(archive, NO_FLAGS, &["docs"]).unwrap();
    assert!(compress.run(work.path()).unwrap().success(), "{compress}");

    let out = work.path().join("out");
    let archive_path = work.path().join(archive);
    let extract = synth
        .extract(archive_path.to_str().unwrap(), NO_FLAGS, Some(&out))
        .unwrap();
    assert!(extract.run(work.path()).unwrap().success(), "{extract}");

    assert_same_tree(work.path(), &out);
}

#[test]
fn test_roundtrip_tar_gz() {
    roundtrip("bundle.tar.gz", &["tar", "gzip"]);
}

#[test]
fn test_roundtrip_tar_bz2() {
    roundtrip("bundle.tar.bz2", &["tar", "bzip2"]);
}

#[test]
fn test_roundtrip_tar_xz() {
    roundtrip("bundle.tar.xz", &["tar", "xz"]);
}

#[test]
fn test_roundtrip_tar_lz4() {
    roundtrip("bundle.tar.lz4", &["tar", "lz4"]);
}

#[test]
fn test_roundtrip_tar_zst() {
    roundtrip("bundle.tar.zst", &["tar", "zstd"]);
}

#[test]
fn test_roundtrip_plain_tar() {
    roundtrip("bundle.tar", &["tar"]);
}

#[test]
fn test_roundtrip_zip() {
    roundtrip("bundle.zip", &["zip", "unzip"]);
}

#[test]
fn test_roundtrip_7z() {
    let resolver = ToolResolver::system(&ResolverOptions::default());
    if resolver.find_tool(&["7z", "7za", "7zz"]).is_none() {
        eprintln!("skipping: needs one of 7z, 7za, 7zz");
        return;
    }
    roundtrip("bundle.7z", &[]);
}

#[test]
fn test_roundtrip_single_gz() {
    let resolver = ToolResolver::system(&ResolverOptions::default());
    if !installed(&resolver, &["gzip"]) {
        return;
    }

    let work = tempfile::tempdir().unwrap();
    fs::write(work.path().join("note.txt"), b"one line\n".repeat(64)).unwrap();
    let synth = Synthesizer::new(&resolver);

    let compress = synth
        .compress("note.txt.gz", NO_FLAGS, &["note.txt"])
        .unwrap();
    assert!(compress.run(work.path()).unwrap().success());

    let out = work.path().join("out");
    let archive = work.path().join("note.txt.gz");
    let extract = synth
        .extract(archive.to_str().unwrap(), NO_FLAGS, Some(&out))
        .unwrap();
    assert!(extract.run(work.path()).unwrap().success(), "{extract}");

    assert_eq!(
        fs::read(out.join("note.txt")).unwrap(),
        fs::read(work.path().join("note.txt")).unwrap()
    );
}
