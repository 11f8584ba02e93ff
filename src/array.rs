use crate::dtype::DType;
use crate::element::{ArrayData, Element};
use ndarray::prelude::*;
use ndarray::{Data, ShapeError};
use std::error::Error;
use std::fmt;

/// An error constructing an [`NdArray`] from a shape and a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidArrayError {
    /// The buffer does not hold `product(shape)` elements.
    LengthMismatch { shape: Vec<usize>, len: usize },
    /// `product(shape)` does not fit in a `usize`.
    ShapeOverflow(Vec<usize>),
}

impl Error for InvalidArrayError {}

impl fmt::Display for InvalidArrayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InvalidArrayError::LengthMismatch { shape, len } => write!(
                f,
                "shape {:?} requires {} elements but the data has {}",
                shape,
                shape.iter().product::<usize>(),
                len
            ),
            InvalidArrayError::ShapeOverflow(shape) => {
                write!(f, "number of elements of shape {:?} overflows usize", shape)
            }
        }
    }
}

/// Returns the number of elements of an array with this shape, or `None` if
/// it overflows.
pub(crate) fn checked_num_elements(shape: &[usize]) -> Option<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &len| acc.checked_mul(len))
}

/// An N-dimensional array with a single element type, stored flat in
/// row-major order.
///
/// The number of elements always equals the product of the shape; a shape of
/// `[]` holds a single element.
///
/// # Example
///
/// ```
/// use rusty_numpy::{DType, NdArray};
///
/// let arr = NdArray::new(vec![2, 3], vec![1i64, 2, 3, 4, 5, 6]).unwrap();
/// assert_eq!(arr.dtype(), DType::I64);
/// assert_eq!(arr.shape(), &[2, 3]);
///
/// assert!(NdArray::new(vec![2, 3], vec![1i64, 2]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl NdArray {
    /// Creates an array, checking that `data` has exactly `product(shape)`
    /// elements.
    pub fn new(shape: Vec<usize>, data: impl Into<ArrayData>) -> Result<Self, InvalidArrayError> {
        let data = data.into();
        let expected = checked_num_elements(&shape)
            .ok_or_else(|| InvalidArrayError::ShapeOverflow(shape.clone()))?;
        if data.len() != expected {
            return Err(InvalidArrayError::LengthMismatch {
                len: data.len(),
                shape,
            });
        }
        Ok(NdArray { shape, data })
    }

    /// Creates a zero-dimensional array holding `value`.
    pub fn scalar<A: Element>(value: A) -> Self {
        NdArray {
            shape: Vec::new(),
            data: A::into_data(vec![value]),
        }
    }

    /// Copies an `ndarray` array of any layout, in logical (row-major) order.
    pub fn from_ndarray<A, S, D>(array: &ArrayBase<S, D>) -> Self
    where
        A: Element,
        S: Data<Elem = A>,
        D: Dimension,
    {
        let data = match array.as_slice() {
            Some(slice) => slice.to_vec(),
            None => array.iter().copied().collect(),
        };
        NdArray {
            shape: array.shape().to_vec(),
            data: A::into_data(data),
        }
    }

    /// The caller has already checked that `data` holds `product(shape)`
    /// elements.
    pub(crate) fn from_checked_parts(shape: Vec<usize>, data: ArrayData) -> Self {
        debug_assert_eq!(checked_num_elements(&shape), Some(data.len()));
        NdArray { shape, data }
    }

    /// Reorders column-major `data` into a row-major array.
    pub(crate) fn from_fortran_order(
        shape: Vec<usize>,
        data: ArrayData,
    ) -> Result<Self, ShapeError> {
        let data = data.fortran_to_row_major(&shape)?;
        Ok(NdArray { shape, data })
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    /// Returns the elements in row-major order if they are of type `A`.
    pub fn as_slice<A: Element>(&self) -> Option<&[A]> {
        A::slice_of(&self.data)
    }

    /// Copies the array into an `ndarray` array if its elements are of type
    /// `A`.
    pub fn to_ndarray<A: Element>(&self) -> Option<ArrayD<A>> {
        let values = self.as_slice::<A>()?.to_vec();
        ArrayD::from_shape_vec(IxDyn(&self.shape), values).ok()
    }
}
