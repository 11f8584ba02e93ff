//! The fixed set of sample arrays written by the `generate-arrays` binary.

use crate::array::NdArray;
use crate::writer::{ArrayFileWriter, FileTarget, WriteArrayError};
use ndarray::{array, Array};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Which generation of the sample set to write. Later revisions are
/// supersets of earlier ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Revision {
    /// `array_1` to `array_3`.
    R3,
    /// `array_1` to `array_5`.
    R5,
    /// `array_1` to `array_6`.
    #[default]
    R6,
}

impl Revision {
    /// Number of arrays in this revision.
    pub fn count(self) -> usize {
        match self {
            Revision::R3 => 3,
            Revision::R5 => 5,
            Revision::R6 => 6,
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

impl FromStr for Revision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3" => Ok(Revision::R3),
            "5" => Ok(Revision::R5),
            "6" => Ok(Revision::R6),
            other => Err(format!("unknown revision {:?}; expected 3, 5 or 6", other)),
        }
    }
}

/// File extension of every generated file.
pub const EXTENSION: &str = "npy";

/// Returns the arrays of `revision` with their base names, in order.
pub fn catalog(revision: Revision) -> Vec<(String, NdArray)> {
    let arrays = [
        NdArray::from_ndarray(&array![[1i64, 2, 3], [4, 5, 6]]),
        NdArray::from_ndarray(&array![1.0f64, 3.5, 5.5, 7.0]),
        NdArray::from_ndarray(&array![1i64, 2, 3, 3, 3, 2, 8]),
        NdArray::from_ndarray(&array![
            [[3i64, 6, 9], [12, 15, 18], [21, 24, 27]],
            [[30, 33, 36], [39, 42, 45], [48, 51, 54]]
        ]),
        NdArray::from_ndarray(&array![
            [[0.5f64, 1.0], [1.5, 2.0]],
            [[2.5, 3.0], [3.5, 4.0]]
        ]),
        NdArray::from_ndarray(&Array::from_shape_fn((2, 2, 3, 3), |(i, j, k, l)| {
            (i * 18 + j * 9 + k * 3 + l + 1) as i64
        })),
    ];
    arrays
        .into_iter()
        .take(revision.count())
        .enumerate()
        .map(|(i, array)| (format!("array_{}", i + 1), array))
        .collect()
}

/// Writes every array of `revision` into `directory` as
/// `array_<k>.npy`, replacing existing files. Returns the written paths.
pub fn run(
    directory: &Path,
    revision: Revision,
    writer: &ArrayFileWriter,
) -> Result<Vec<PathBuf>, WriteArrayError> {
    info!(directory = %directory.display(), %revision, "generating arrays");
    catalog(revision)
        .into_iter()
        .map(|(name, array)| {
            let target = FileTarget::new(directory, format!("{}.{}", name, EXTENSION));
            writer.write(&array, &target)
        })
        .collect()
}
