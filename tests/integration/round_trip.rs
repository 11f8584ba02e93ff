//! Writing an array and reading it back must not change it.

use ndarray::array;
use ndarray::prelude::*;
use ndarray::{Data, ShapeBuilder};
use rusty_numpy::{deserialize, serialize, Element, NdArray, ReadNpyExt, WriteNpyExt};
use std::fmt::Debug;

/// Writes the array in standard, Fortran and (if ndim > 2) permuted layouts
/// and checks that each reads back as the same logical array.
fn test_round_trip_multiple_layouts<A, S, D>(original: &ArrayBase<S, D>)
where
    A: Element + Debug,
    S: Data<Elem = A>,
    D: Dimension,
{
    let expected = NdArray::from_ndarray(original);

    let standard = original.to_owned();
    let fortran = Array::from_shape_vec(
        original.raw_dim().f(),
        original.t().iter().cloned().collect(),
    )
    .unwrap();
    assert_eq!(fortran, standard);
    let mut layouts = vec![standard, fortran];
    if original.ndim() > 2 {
        let mut permuted = original.to_owned();
        permuted.swap_axes(1, 2);
        let mut permuted = permuted.as_standard_layout().into_owned();
        permuted.swap_axes(1, 2);
        assert_eq!(permuted, original.to_owned());
        layouts.push(permuted);
    }

    for layout in &layouts {
        let mut npy = Vec::<u8>::new();
        layout.write_npy(&mut npy).unwrap();
        let after = NdArray::read_npy(&npy[..]).unwrap();
        assert_eq!(after, expected);
        assert_eq!(
            after.to_ndarray::<A>().unwrap(),
            original.to_owned().into_dyn()
        );
    }
}

#[test]
fn round_trip_i32() {
    test_round_trip_multiple_layouts(&array![
        [[1i32, 8], [-3, 4], [2, 9]],
        [[-5, 0], [7, 38], [-4, 1]]
    ]);
}

#[test]
fn round_trip_f32() {
    test_round_trip_multiple_layouts(&array![
        [[3f32, -1.4], [-159., 26.], [5., -3.5]],
        [[-89.7, 93.], [2., 384.], [-626.4, 3.]],
    ]);
}

#[test]
fn round_trip_f64() {
    test_round_trip_multiple_layouts(&array![
        [2.7, -40.4, -23., 27.8, -49., -43.3],
        [-25.2, 11.8, -8.9, -17.8, 36.4, -25.6],
    ]);
}

#[test]
fn round_trip_bool() {
    test_round_trip_multiple_layouts(&array![
        [[true], [true], [false]],
        [[false], [true], [false]]
    ]);
}

#[test]
fn round_trip_extreme_integers() {
    test_round_trip_multiple_layouts(&array![i64::MIN, -1, 0, 1, i64::MAX]);
    test_round_trip_multiple_layouts(&array![[u64::MAX, 0], [1, u64::MAX - 1]]);
    test_round_trip_multiple_layouts(&array![[i8::MIN, i8::MAX], [-1, 0]]);
    test_round_trip_multiple_layouts(&array![[u8::MAX, 0, 7]]);
    test_round_trip_multiple_layouts(&array![[i16::MIN], [i16::MAX]]);
    test_round_trip_multiple_layouts(&array![u16::MAX, 3]);
    test_round_trip_multiple_layouts(&array![[u32::MAX, 1, 2]]);
}

#[test]
fn round_trip_scalar_and_empty() {
    let scalar = NdArray::scalar(2.5f64);
    assert_eq!(deserialize(&serialize(&scalar).unwrap()).unwrap(), scalar);

    let empty = NdArray::new(vec![0, 4], Vec::<i64>::new()).unwrap();
    let bytes = serialize(&empty).unwrap();
    assert_eq!(bytes.len() % 64, 0);
    assert_eq!(deserialize(&bytes).unwrap(), empty);
}

#[test]
fn serialize_is_deterministic() {
    let arr = NdArray::new(vec![3, 2], vec![1u32, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(serialize(&arr).unwrap(), serialize(&arr).unwrap());
}
