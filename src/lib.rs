//! This crate writes typed N-dimensional arrays to [`.npy`] files and reads
//! them back.
//!
//! [`.npy`]: https://numpy.org/doc/stable/reference/generated/numpy.lib.format.html
//!
//! An [`NdArray`] is a flat, row-major buffer of one of the primitive
//! [`Element`] types together with its shape. [`serialize`] and
//! [`deserialize`] convert between an array and the bytes of an `.npy` file
//! without touching the filesystem; [`ArrayFileWriter`] creates the target
//! directory and replaces the destination file atomically.
//!
//! Arrays from [`ndarray`] can be converted with [`NdArray::from_ndarray`] and
//! [`NdArray::to_ndarray`], or written directly with [`WriteNpyExt`].
//!
//! # Example
//!
//! ```no_run
//! use ndarray::array;
//! use rusty_numpy::{read_npy_file, ArrayFileWriter, FileTarget, NdArray};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let arr = NdArray::from_ndarray(&array![[1i64, 2, 3], [4, 5, 6]]);
//! let path = ArrayFileWriter::new().write(&arr, &FileTarget::new("data", "array_1.npy"))?;
//! assert_eq!(read_npy_file(path)?, arr);
//! # Ok(())
//! # }
//! ```
//!
//! # Limitations
//!
//! * Files are always written in C order with the platform's byte order.
//!   Fortran-order and foreign-endian files can be read.
//!
//! * Only `bool`, fixed-size integers and floating point numbers are
//!   supported. Structured, complex, string and datetime descriptors are
//!   rejected when reading.

mod array;
mod dtype;
mod element;
pub mod generator;
mod header;
mod npy;
mod writer;

pub use crate::array::{InvalidArrayError, NdArray};
pub use crate::dtype::{DType, Endianness, ParseDescriptorError, TypeDescriptor};
pub use crate::element::{ArrayData, Element, ReadDataError};
pub use crate::header::{FormatHeaderError, Header, ParseHeaderError, ReadHeaderError};
pub use crate::npy::{
    deserialize, read_npy, read_npy_file, serialize, write_npy, ReadNpyError, ReadNpyExt,
    WriteNpyError, WriteNpyExt,
};
pub use crate::writer::{ArrayFileWriter, FileTarget, WriteArrayError};
