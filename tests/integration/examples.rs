//! The example arrays, written to disk and read back.

use crate::read_back;
use ndarray::array;
use ndarray::prelude::*;
use rusty_numpy::{ArrayFileWriter, DType, FileTarget, NdArray};

#[test]
fn two_dimensional_integers() {
    let dir = tempfile::tempdir().unwrap();
    let arr = NdArray::new(vec![2, 3], vec![1i64, 2, 3, 4, 5, 6]).unwrap();
    let path = ArrayFileWriter::new()
        .write(&arr, &FileTarget::new(dir.path(), "array_1.npy"))
        .unwrap();

    let back = read_back(&path);
    assert_eq!(back.dtype(), DType::I64);
    assert_eq!(back.shape(), &[2, 3]);
    assert_eq!(
        back.to_ndarray::<i64>().unwrap(),
        array![[1, 2, 3], [4, 5, 6]].into_dyn()
    );
}

#[test]
fn one_dimensional_floats() {
    let dir = tempfile::tempdir().unwrap();
    let arr = NdArray::new(vec![4], vec![1.0f64, 3.5, 5.5, 7.0]).unwrap();
    let path = ArrayFileWriter::new()
        .write(&arr, &FileTarget::new(dir.path(), "array_2.npy"))
        .unwrap();

    let back = read_back(&path);
    assert_eq!(back.dtype(), DType::F64);
    assert_eq!(back.as_slice::<f64>(), Some(&[1.0, 3.5, 5.5, 7.0][..]));
}

#[test]
fn three_dimensional_integers() {
    let dir = tempfile::tempdir().unwrap();
    let original = array![
        [[3i64, 6, 9], [12, 15, 18], [21, 24, 27]],
        [[30, 33, 36], [39, 42, 45], [48, 51, 54]]
    ];
    let path = ArrayFileWriter::new()
        .write(
            &NdArray::from_ndarray(&original),
            &FileTarget::new(dir.path(), "array_4.npy"),
        )
        .unwrap();

    let back = read_back(&path).to_ndarray::<i64>().unwrap();
    let back = back.into_dimensionality::<Ix3>().unwrap();
    assert_eq!(back, original);
    assert_eq!(back[[1, 2, 2]], 54);
}

#[test]
fn scalar() {
    let dir = tempfile::tempdir().unwrap();
    let path = ArrayFileWriter::new()
        .write(
            &NdArray::scalar(42u16),
            &FileTarget::new(dir.path(), "scalar.npy"),
        )
        .unwrap();
    let back = read_back(&path);
    assert_eq!(back.shape(), &[] as &[usize]);
    assert_eq!(back.as_slice::<u16>(), Some(&[42][..]));
}
