//! Filesystem behaviour of `ArrayFileWriter`.

use crate::read_back;
use rusty_numpy::{
    serialize, ArrayFileWriter, FileTarget, InvalidArrayError, NdArray, WriteArrayError,
};
use std::fs;

fn sample() -> NdArray {
    NdArray::new(vec![2, 2], vec![1.5f32, -2.0, 0.25, 8.0]).unwrap()
}

#[test]
fn creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b").join("c");
    assert!(!nested.exists());

    let path = ArrayFileWriter::new()
        .write(&sample(), &FileTarget::new(&nested, "out.npy"))
        .unwrap();
    assert!(nested.is_dir());
    assert_eq!(path, nested.join("out.npy"));
    assert_eq!(read_back(&path), sample());
}

#[test]
fn existing_directory_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ArrayFileWriter::new().sync(true);
    let target = FileTarget::new(dir.path(), "out.npy");
    writer.write(&sample(), &target).unwrap();
    writer
        .write(&sample(), &FileTarget::new(dir.path(), "other.npy"))
        .unwrap();
    assert_eq!(read_back(&target.path()), sample());
}

#[test]
fn written_file_matches_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let path = ArrayFileWriter::new()
        .write(&sample(), &FileTarget::new(dir.path(), "out.npy"))
        .unwrap();
    assert_eq!(fs::read(&path).unwrap(), serialize(&sample()).unwrap());
}

#[test]
fn same_array_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let target = FileTarget::new(dir.path(), "out.npy");
    let writer = ArrayFileWriter::new();

    writer.write(&sample(), &target).unwrap();
    let first = fs::read(target.path()).unwrap();
    writer.write(&sample(), &target).unwrap();
    let second = fs::read(target.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = FileTarget::new(dir.path(), "out.npy");
    fs::write(target.path(), b"stale contents of a different length").unwrap();

    let replacement = NdArray::new(vec![3], vec![7i64, 8, 9]).unwrap();
    ArrayFileWriter::new().write(&replacement, &target).unwrap();
    assert_eq!(read_back(&target.path()), replacement);
}

#[test]
fn leaves_no_temporary_files() {
    let dir = tempfile::tempdir().unwrap();
    ArrayFileWriter::new()
        .write(&sample(), &FileTarget::new(dir.path(), "out.npy"))
        .unwrap();
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, ["out.npy"]);
}

#[test]
fn invalid_array_is_rejected_before_io() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("never_created");
    let result = ArrayFileWriter::new().write_parts(
        vec![2, 3],
        vec![1i64, 2, 3, 4, 5],
        &FileTarget::new(&missing, "out.npy"),
    );
    assert!(matches!(
        result,
        Err(WriteArrayError::InvalidArray(
            InvalidArrayError::LengthMismatch { len: 5, .. }
        ))
    ));
    assert!(!missing.exists());
}

#[test]
fn write_parts_accepts_valid_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = ArrayFileWriter::new()
        .write_parts(
            vec![2],
            vec![true, false],
            &FileTarget::new(dir.path(), "b.npy"),
        )
        .unwrap();
    assert_eq!(read_back(&path).as_slice::<bool>(), Some(&[true, false][..]));
}

#[test]
fn directory_under_regular_file_is_path_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain_file");
    fs::write(&file, b"").unwrap();

    let result = ArrayFileWriter::new().write(
        &sample(),
        &FileTarget::new(file.join("sub"), "out.npy"),
    );
    match result {
        Err(WriteArrayError::Path { directory, .. }) => assert_eq!(directory, file.join("sub")),
        other => panic!("expected a path error, got {:?}", other),
    }
}

#[test]
fn directory_that_is_a_file_is_path_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("data");
    fs::write(&file, b"").unwrap();

    let result = ArrayFileWriter::new().write(&sample(), &FileTarget::new(&file, "out.npy"));
    assert!(matches!(result, Err(WriteArrayError::Path { .. })));
}

#[test]
fn destination_is_directory_is_write_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("out.npy")).unwrap();

    let result = ArrayFileWriter::new().write(&sample(), &FileTarget::new(dir.path(), "out.npy"));
    assert!(matches!(result, Err(WriteArrayError::Write { .. })));
}

#[cfg(unix)]
#[test]
fn file_mode_matches_plain_create() {
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    let dir = tempfile::tempdir().unwrap();
    let written = ArrayFileWriter::new()
        .write(&sample(), &FileTarget::new(dir.path(), "mode.npy"))
        .unwrap();
    let plain = dir.path().join("plain.npy");
    fs::write(&plain, b"").unwrap();

    let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(&written), mode(&plain));
}
