//! Integration tests.

use rusty_numpy::{read_npy_file, NdArray};
use std::path::Path;

mod cli;
mod examples;
mod round_trip;
mod writer;

/// Reads back the file at `path`, panicking on any error.
pub fn read_back(path: &Path) -> NdArray {
    read_npy_file(path).unwrap_or_else(|err| panic!("failed to read {}: {}", path.display(), err))
}

/// Builds the bytes of an `.npy` file by hand, with version 1.0 and the
/// header dictionary exactly as given.
pub fn npy_bytes(dict: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = b"\x93NUMPY\x01\x00".to_vec();
    let mut header = dict.to_owned();
    while (10 + header.len() + 1) % 64 != 0 {
        header.push(' ');
    }
    header.push('\n');
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}
