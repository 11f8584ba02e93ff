//! Element types and the type-erased element buffer.

use crate::dtype::{DType, Endianness, TypeDescriptor};
use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};
use ndarray::{ArrayD, IxDyn, ShapeBuilder, ShapeError};
use std::error::Error;
use std::fmt;
use std::io::{self, Read};
use std::mem;

/// An error reading the element payload of an `.npy` file.
#[derive(Debug)]
pub enum ReadDataError {
    /// An error caused by I/O.
    Io(io::Error),
    /// The file does not contain all the data described in the header.
    MissingData,
    /// Extra bytes are present between the end of the data and the end of
    /// the file.
    ExtraBytes(usize),
    /// A `bool` element was stored as a byte other than `0x00` or `0x01`.
    InvalidBool(u8),
}

impl Error for ReadDataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReadDataError::Io(err) => Some(err),
            ReadDataError::MissingData => None,
            ReadDataError::ExtraBytes(_) => None,
            ReadDataError::InvalidBool(_) => None,
        }
    }
}

impl fmt::Display for ReadDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadDataError::Io(err) => write!(f, "I/O error: {}", err),
            ReadDataError::MissingData => write!(f, "reached EOF before reading all data"),
            ReadDataError::ExtraBytes(num_extra_bytes) => {
                write!(f, "file had {} extra bytes before EOF", num_extra_bytes)
            }
            ReadDataError::InvalidBool(value) => {
                write!(f, "error parsing value {:#04x} as a bool", value)
            }
        }
    }
}

impl From<io::Error> for ReadDataError {
    /// Performs the conversion.
    ///
    /// If the error kind is `UnexpectedEof`, the `MissingData` variant is
    /// returned. Otherwise, the `Io` variant is returned.
    fn from(err: io::Error) -> ReadDataError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            ReadDataError::MissingData
        } else {
            ReadDataError::Io(err)
        }
    }
}

/// Returns `Ok(_)` iff the `reader` had no more bytes on entry to this
/// function.
///
/// **Warning** This will consume the remainder of the reader.
fn check_for_extra_bytes<R: io::Read>(reader: &mut R) -> Result<(), ReadDataError> {
    let num_extra_bytes = reader.read_to_end(&mut Vec::new())?;
    if num_extra_bytes == 0 {
        Ok(())
    } else {
        Err(ReadDataError::ExtraBytes(num_extra_bytes))
    }
}

/// Reads exactly `num_bytes` bytes. The buffer grows with the bytes actually
/// read, so a length taken from a file header never drives the allocation.
fn read_exact_bytes<R: io::Read>(reader: R, num_bytes: usize) -> Result<Vec<u8>, ReadDataError> {
    let mut bytes = Vec::new();
    reader.take(num_bytes as u64).read_to_end(&mut bytes)?;
    if bytes.len() < num_bytes {
        return Err(ReadDataError::MissingData);
    }
    Ok(bytes)
}

/// Reads the payload of `len` elements of `item_size` bytes each, then checks
/// that the reader is exhausted.
fn read_payload<R: io::Read>(
    mut reader: R,
    len: usize,
    item_size: usize,
) -> Result<Vec<u8>, ReadDataError> {
    let num_bytes = len.checked_mul(item_size).ok_or(ReadDataError::MissingData)?;
    let bytes = read_exact_bytes(&mut reader, num_bytes)?;
    check_for_extra_bytes(&mut reader)?;
    Ok(bytes)
}

/// A Rust type that can be stored as an element of an [`NdArray`](crate::NdArray).
pub trait Element: Copy + PartialEq + fmt::Debug + 'static {
    /// The tag of this type.
    const DTYPE: DType;

    /// Wraps a vector of elements into the type-erased buffer.
    fn into_data(values: Vec<Self>) -> ArrayData;

    /// Borrows the elements if `data` holds this type.
    fn slice_of(data: &ArrayData) -> Option<&[Self]>;

    /// Writes the elements in native byte order.
    fn write_slice<W: io::Write>(slice: &[Self], writer: W) -> io::Result<()>;

    /// Reads exactly `len` elements stored with byte order `endian`, and
    /// checks that the reader is exhausted afterwards.
    fn read_to_end_exact_vec<R: io::Read>(
        reader: R,
        endian: Endianness,
        len: usize,
    ) -> Result<Vec<Self>, ReadDataError>;
}

macro_rules! impl_data_conversions {
    ($variant:ident) => {
        const DTYPE: DType = DType::$variant;

        fn into_data(values: Vec<Self>) -> ArrayData {
            ArrayData::$variant(values)
        }

        fn slice_of(data: &ArrayData) -> Option<&[Self]> {
            match data {
                ArrayData::$variant(values) => Some(values.as_slice()),
                _ => None,
            }
        }
    };
}

macro_rules! impl_element_multi_byte {
    ($elem:ty, $variant:ident, $zero:expr, $write_into:ident, $read_into:ident) => {
        impl Element for $elem {
            impl_data_conversions!($variant);

            fn write_slice<W: io::Write>(slice: &[Self], mut writer: W) -> io::Result<()> {
                let mut buf = vec![0u8; slice.len() * mem::size_of::<$elem>()];
                NativeEndian::$write_into(slice, &mut buf);
                writer.write_all(&buf)
            }

            fn read_to_end_exact_vec<R: io::Read>(
                reader: R,
                endian: Endianness,
                len: usize,
            ) -> Result<Vec<Self>, ReadDataError> {
                let bytes = read_payload(reader, len, mem::size_of::<$elem>())?;
                let mut out = vec![$zero; len];
                match endian {
                    Endianness::Little => LittleEndian::$read_into(&bytes, &mut out),
                    Endianness::Big => BigEndian::$read_into(&bytes, &mut out),
                    Endianness::NotApplicable => NativeEndian::$read_into(&bytes, &mut out),
                }
                Ok(out)
            }
        }
    };
}

impl_element_multi_byte!(i16, I16, 0, write_i16_into, read_i16_into);
impl_element_multi_byte!(i32, I32, 0, write_i32_into, read_i32_into);
impl_element_multi_byte!(i64, I64, 0, write_i64_into, read_i64_into);
impl_element_multi_byte!(u16, U16, 0, write_u16_into, read_u16_into);
impl_element_multi_byte!(u32, U32, 0, write_u32_into, read_u32_into);
impl_element_multi_byte!(u64, U64, 0, write_u64_into, read_u64_into);
impl_element_multi_byte!(f32, F32, 0., write_f32_into, read_f32_into);
impl_element_multi_byte!(f64, F64, 0., write_f64_into, read_f64_into);

impl Element for u8 {
    impl_data_conversions!(U8);

    fn write_slice<W: io::Write>(slice: &[Self], mut writer: W) -> io::Result<()> {
        writer.write_all(slice)
    }

    fn read_to_end_exact_vec<R: io::Read>(
        reader: R,
        _endian: Endianness,
        len: usize,
    ) -> Result<Vec<Self>, ReadDataError> {
        read_payload(reader, len, 1)
    }
}

impl Element for i8 {
    impl_data_conversions!(I8);

    fn write_slice<W: io::Write>(slice: &[Self], mut writer: W) -> io::Result<()> {
        let bytes: Vec<u8> = slice.iter().map(|&v| v as u8).collect();
        writer.write_all(&bytes)
    }

    fn read_to_end_exact_vec<R: io::Read>(
        reader: R,
        _endian: Endianness,
        len: usize,
    ) -> Result<Vec<Self>, ReadDataError> {
        let bytes = read_payload(reader, len, 1)?;
        Ok(bytes.into_iter().map(|byte| byte as i8).collect())
    }
}

// `false` is stored as `0x00` and `true` as `0x01`.
impl Element for bool {
    impl_data_conversions!(Bool);

    fn write_slice<W: io::Write>(slice: &[Self], mut writer: W) -> io::Result<()> {
        let bytes: Vec<u8> = slice.iter().map(|&b| u8::from(b)).collect();
        writer.write_all(&bytes)
    }

    fn read_to_end_exact_vec<R: io::Read>(
        reader: R,
        _endian: Endianness,
        len: usize,
    ) -> Result<Vec<Self>, ReadDataError> {
        read_payload(reader, len, 1)?
            .into_iter()
            .map(|byte| match byte {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(ReadDataError::InvalidBool(other)),
            })
            .collect()
    }
}

/// A flat, row-major buffer of elements of a single type.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    Bool(Vec<bool>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Evaluates `$body` with `$values` bound to the inner vector, whatever its
/// element type.
macro_rules! with_values {
    ($data:expr, $values:ident => $body:expr) => {
        match $data {
            ArrayData::Bool($values) => $body,
            ArrayData::I8($values) => $body,
            ArrayData::I16($values) => $body,
            ArrayData::I32($values) => $body,
            ArrayData::I64($values) => $body,
            ArrayData::U8($values) => $body,
            ArrayData::U16($values) => $body,
            ArrayData::U32($values) => $body,
            ArrayData::U64($values) => $body,
            ArrayData::F32($values) => $body,
            ArrayData::F64($values) => $body,
        }
    };
}

/// Like `with_values!`, but rewraps the result of `$body` in the same
/// variant.
macro_rules! map_values {
    ($data:expr, $values:ident => $body:expr) => {
        match $data {
            ArrayData::Bool($values) => ArrayData::Bool($body),
            ArrayData::I8($values) => ArrayData::I8($body),
            ArrayData::I16($values) => ArrayData::I16($body),
            ArrayData::I32($values) => ArrayData::I32($body),
            ArrayData::I64($values) => ArrayData::I64($body),
            ArrayData::U8($values) => ArrayData::U8($body),
            ArrayData::U16($values) => ArrayData::U16($body),
            ArrayData::U32($values) => ArrayData::U32($body),
            ArrayData::U64($values) => ArrayData::U64($body),
            ArrayData::F32($values) => ArrayData::F32($body),
            ArrayData::F64($values) => ArrayData::F64($body),
        }
    };
}

impl ArrayData {
    pub fn dtype(&self) -> DType {
        match self {
            ArrayData::Bool(_) => DType::Bool,
            ArrayData::I8(_) => DType::I8,
            ArrayData::I16(_) => DType::I16,
            ArrayData::I32(_) => DType::I32,
            ArrayData::I64(_) => DType::I64,
            ArrayData::U8(_) => DType::U8,
            ArrayData::U16(_) => DType::U16,
            ArrayData::U32(_) => DType::U32,
            ArrayData::U64(_) => DType::U64,
            ArrayData::F32(_) => DType::F32,
            ArrayData::F64(_) => DType::F64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        with_values!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes the elements take up in a file.
    pub fn byte_len(&self) -> usize {
        self.len() * self.dtype().item_size()
    }

    /// Writes all elements in native byte order.
    pub(crate) fn write<W: io::Write>(&self, writer: W) -> io::Result<()> {
        with_values!(self, values => Element::write_slice(&values[..], writer))
    }

    /// Reorders column-major elements into row-major order for `shape`.
    pub(crate) fn fortran_to_row_major(self, shape: &[usize]) -> Result<ArrayData, ShapeError> {
        fn reorder<A: Clone>(shape: &[usize], values: Vec<A>) -> Result<Vec<A>, ShapeError> {
            let arr = ArrayD::from_shape_vec(IxDyn(shape).f(), values)?;
            Ok(arr.iter().cloned().collect())
        }
        Ok(map_values!(self, values => reorder(shape, values)?))
    }

    /// Reads exactly `len` elements described by `descr`, which must be the
    /// rest of the reader.
    pub(crate) fn read_to_end<R: io::Read>(
        reader: R,
        descr: &TypeDescriptor,
        len: usize,
    ) -> Result<ArrayData, ReadDataError> {
        fn read<A: Element, R: io::Read>(
            reader: R,
            descr: &TypeDescriptor,
            len: usize,
        ) -> Result<ArrayData, ReadDataError> {
            A::read_to_end_exact_vec(reader, descr.endian, len).map(A::into_data)
        }
        match descr.dtype {
            DType::Bool => read::<bool, _>(reader, descr, len),
            DType::I8 => read::<i8, _>(reader, descr, len),
            DType::I16 => read::<i16, _>(reader, descr, len),
            DType::I32 => read::<i32, _>(reader, descr, len),
            DType::I64 => read::<i64, _>(reader, descr, len),
            DType::U8 => read::<u8, _>(reader, descr, len),
            DType::U16 => read::<u16, _>(reader, descr, len),
            DType::U32 => read::<u32, _>(reader, descr, len),
            DType::U64 => read::<u64, _>(reader, descr, len),
            DType::F32 => read::<f32, _>(reader, descr, len),
            DType::F64 => read::<f64, _>(reader, descr, len),
        }
    }
}

impl<A: Element> From<Vec<A>> for ArrayData {
    fn from(values: Vec<A>) -> ArrayData {
        A::into_data(values)
    }
}
