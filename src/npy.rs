use crate::array::{checked_num_elements, NdArray};
use crate::dtype::TypeDescriptor;
use crate::element::{ArrayData, Element, ReadDataError};
use crate::header::{FormatHeaderError, Header, ParseHeaderError, ReadHeaderError};
use ndarray::{ArrayBase, Data, Dimension, ShapeError};
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// An error writing array data.
#[derive(Debug)]
pub enum WriteNpyError {
    /// An error caused by I/O.
    Io(io::Error),
    /// An error formatting the header.
    FormatHeader(FormatHeaderError),
}

impl Error for WriteNpyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WriteNpyError::Io(err) => Some(err),
            WriteNpyError::FormatHeader(err) => Some(err),
        }
    }
}

impl fmt::Display for WriteNpyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WriteNpyError::Io(err) => write!(f, "I/O error: {}", err),
            WriteNpyError::FormatHeader(err) => write!(f, "error formatting header: {}", err),
        }
    }
}

impl From<io::Error> for WriteNpyError {
    fn from(err: io::Error) -> WriteNpyError {
        WriteNpyError::Io(err)
    }
}

impl From<FormatHeaderError> for WriteNpyError {
    fn from(err: FormatHeaderError) -> WriteNpyError {
        WriteNpyError::FormatHeader(err)
    }
}

/// An error reading a `.npy` file.
#[derive(Debug)]
pub enum ReadNpyError {
    /// An error caused by I/O.
    Io(io::Error),
    /// An error parsing the file header.
    ParseHeader(ParseHeaderError),
    /// An error reading the element data.
    ReadData(ReadDataError),
    /// Overflow while computing the length of the array (in units of bytes
    /// or the number of elements) from the shape described in the file
    /// header.
    LengthOverflow,
    /// The fortran-order data could not be rearranged into the shape from
    /// the header.
    Shape(ShapeError),
}

impl Error for ReadNpyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReadNpyError::Io(err) => Some(err),
            ReadNpyError::ParseHeader(err) => Some(err),
            ReadNpyError::ReadData(err) => Some(err),
            ReadNpyError::LengthOverflow => None,
            ReadNpyError::Shape(err) => Some(err),
        }
    }
}

impl fmt::Display for ReadNpyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadNpyError::Io(err) => write!(f, "I/O error: {}", err),
            ReadNpyError::ParseHeader(err) => write!(f, "error parsing header: {}", err),
            ReadNpyError::ReadData(err) => write!(f, "error reading data: {}", err),
            ReadNpyError::LengthOverflow => write!(f, "overflow computing length from shape"),
            ReadNpyError::Shape(err) => write!(f, "data did not match shape in header: {}", err),
        }
    }
}

impl From<ReadHeaderError> for ReadNpyError {
    fn from(err: ReadHeaderError) -> ReadNpyError {
        match err {
            ReadHeaderError::Io(err) => ReadNpyError::Io(err),
            ReadHeaderError::Parse(err) => ReadNpyError::ParseHeader(err),
        }
    }
}

impl From<ReadDataError> for ReadNpyError {
    fn from(err: ReadDataError) -> ReadNpyError {
        ReadNpyError::ReadData(err)
    }
}

impl From<io::Error> for ReadNpyError {
    fn from(err: io::Error) -> ReadNpyError {
        ReadNpyError::Io(err)
    }
}

impl From<ShapeError> for ReadNpyError {
    fn from(err: ShapeError) -> ReadNpyError {
        ReadNpyError::Shape(err)
    }
}

fn header_for(array: &NdArray) -> Header {
    Header {
        type_descriptor: TypeDescriptor::native(array.dtype()),
        fortran_order: false,
        shape: array.shape().to_vec(),
    }
}

/// Encodes `array` as the complete contents of an `.npy` file.
///
/// This does no I/O; the result can be written anywhere.
///
/// # Example
///
/// ```
/// use rusty_numpy::{deserialize, serialize, NdArray};
///
/// let arr = NdArray::new(vec![4], vec![1.0f64, 3.5, 5.5, 7.0]).unwrap();
/// let bytes = serialize(&arr).unwrap();
/// assert_eq!(&bytes[..6], b"\x93NUMPY");
/// assert_eq!(deserialize(&bytes).unwrap(), arr);
/// ```
pub fn serialize(array: &NdArray) -> Result<Vec<u8>, WriteNpyError> {
    let mut out = header_for(array).to_bytes()?;
    out.reserve_exact(array.data().byte_len());
    array.data().write(&mut out)?;
    Ok(out)
}

/// Writes `array` in `.npy` format to `writer`.
///
/// The header and the data are each handed to `writer` in a single call, so
/// wrapping `writer` in a `BufWriter` is not needed.
pub fn write_npy<W: io::Write>(array: &NdArray, mut writer: W) -> Result<(), WriteNpyError> {
    writer.write_all(&header_for(array).to_bytes()?)?;
    array.data().write(&mut writer)?;
    Ok(())
}

/// Reads an array in `.npy` format from `reader`, which must contain nothing
/// after the element data.
///
/// Memory is only allocated for data that is actually present, so a header
/// claiming more elements than the reader holds fails with
/// [`ReadDataError::MissingData`].
pub fn read_npy<R: io::Read>(mut reader: R) -> Result<NdArray, ReadNpyError> {
    let header = Header::from_reader(&mut reader)?;
    let Header {
        type_descriptor,
        fortran_order,
        shape,
    } = header;
    let len = checked_num_elements(&shape).ok_or(ReadNpyError::LengthOverflow)?;
    // No allocation can exceed `isize::MAX` bytes.
    match len.checked_mul(type_descriptor.dtype.item_size()) {
        Some(num_bytes) if num_bytes <= isize::MAX as usize => {}
        _ => return Err(ReadNpyError::LengthOverflow),
    }
    let data = ArrayData::read_to_end(reader, &type_descriptor, len)?;
    if fortran_order && shape.len() > 1 {
        Ok(NdArray::from_fortran_order(shape, data)?)
    } else {
        Ok(NdArray::from_checked_parts(shape, data))
    }
}

/// Decodes the complete contents of an `.npy` file.
pub fn deserialize(bytes: &[u8]) -> Result<NdArray, ReadNpyError> {
    read_npy(bytes)
}

/// Opens and reads an `.npy` file.
pub fn read_npy_file<P: AsRef<Path>>(path: P) -> Result<NdArray, ReadNpyError> {
    let file = File::open(path)?;
    read_npy(BufReader::new(file))
}

/// Extension trait for writing arrays in `.npy` format.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use rusty_numpy::WriteNpyExt;
///
/// let arr = array![[1i64, 2, 3], [4, 5, 6]];
/// let mut buf = Vec::new();
/// arr.write_npy(&mut buf).unwrap();
/// assert_eq!(buf.len() % 64, 48);
/// ```
pub trait WriteNpyExt {
    /// Writes the array to `writer` in [`.npy`
    /// format](https://numpy.org/doc/stable/reference/generated/numpy.lib.format.html).
    fn write_npy<W: io::Write>(&self, writer: W) -> Result<(), WriteNpyError>;
}

impl WriteNpyExt for NdArray {
    fn write_npy<W: io::Write>(&self, writer: W) -> Result<(), WriteNpyError> {
        write_npy(self, writer)
    }
}

impl<A, S, D> WriteNpyExt for ArrayBase<S, D>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    fn write_npy<W: io::Write>(&self, writer: W) -> Result<(), WriteNpyError> {
        write_npy(&NdArray::from_ndarray(self), writer)
    }
}

/// Extension trait for reading arrays in `.npy` format.
pub trait ReadNpyExt: Sized {
    /// Reads the array from `reader` in [`.npy`
    /// format](https://numpy.org/doc/stable/reference/generated/numpy.lib.format.html).
    fn read_npy<R: io::Read>(reader: R) -> Result<Self, ReadNpyError>;
}

impl ReadNpyExt for NdArray {
    fn read_npy<R: Read>(reader: R) -> Result<Self, ReadNpyError> {
        read_npy(reader)
    }
}
