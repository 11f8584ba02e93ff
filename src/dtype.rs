//! Element type tags and `.npy` type descriptors.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// The element type of an [`NdArray`](crate::NdArray).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl DType {
    /// Number of bytes taken up by one element.
    pub fn item_size(self) -> usize {
        match self {
            DType::Bool | DType::I8 | DType::U8 => 1,
            DType::I16 | DType::U16 => 2,
            DType::I32 | DType::U32 | DType::F32 => 4,
            DType::I64 | DType::U64 | DType::F64 => 8,
        }
    }

    /// The numpy kind character (`b`, `i`, `u` or `f`).
    fn kind(self) -> char {
        match self {
            DType::Bool => 'b',
            DType::I8 | DType::I16 | DType::I32 | DType::I64 => 'i',
            DType::U8 | DType::U16 | DType::U32 | DType::U64 => 'u',
            DType::F32 | DType::F64 => 'f',
        }
    }

    fn from_kind_and_size(kind: char, size: usize) -> Option<DType> {
        Some(match (kind, size) {
            ('b', 1) => DType::Bool,
            ('i', 1) => DType::I8,
            ('i', 2) => DType::I16,
            ('i', 4) => DType::I32,
            ('i', 8) => DType::I64,
            ('u', 1) => DType::U8,
            ('u', 2) => DType::U16,
            ('u', 4) => DType::U32,
            ('u', 8) => DType::U64,
            ('f', 4) => DType::F32,
            ('f', 8) => DType::F64,
            _ => return None,
        })
    }

    /// The numpy name of the type, e.g. `"int64"`.
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::I8 => "int8",
            DType::I16 => "int16",
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::U8 => "uint8",
            DType::U16 => "uint16",
            DType::U32 => "uint32",
            DType::U64 => "uint64",
            DType::F32 => "float32",
            DType::F64 => "float64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order of the elements in a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
    /// Single-byte types, which have no byte order (`|` in a descriptor).
    NotApplicable,
}

impl Endianness {
    /// Byte order of the target platform.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    fn symbol(self) -> char {
        match self {
            Endianness::Little => '<',
            Endianness::Big => '>',
            Endianness::NotApplicable => '|',
        }
    }
}

/// The value of the `descr` key of an `.npy` header, e.g. `'<i8'`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub dtype: DType,
    pub endian: Endianness,
}

impl TypeDescriptor {
    /// Descriptor for `dtype` stored in the platform's byte order.
    pub fn native(dtype: DType) -> Self {
        let endian = if dtype.item_size() == 1 {
            Endianness::NotApplicable
        } else {
            Endianness::native()
        };
        TypeDescriptor { dtype, endian }
    }

    /// Returns `true` if elements can be copied without swapping bytes.
    pub fn is_native(&self) -> bool {
        self.endian == Endianness::NotApplicable || self.endian == Endianness::native()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.endian.symbol(),
            self.dtype.kind(),
            self.dtype.item_size()
        )
    }
}

/// An error parsing a type descriptor string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDescriptorError {
    Empty,
    /// The descriptor names a type that is not supported, such as a complex
    /// number, a string or a datetime.
    Unsupported(String),
    /// A multi-byte type was given the `|` byte order.
    MissingByteOrder(String),
}

impl Error for ParseDescriptorError {}

impl fmt::Display for ParseDescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ParseDescriptorError::*;
        match self {
            Empty => write!(f, "empty type descriptor"),
            Unsupported(desc) => write!(f, "unsupported type descriptor: {}", desc),
            MissingByteOrder(desc) => {
                write!(f, "multi-byte type descriptor without byte order: {}", desc)
            }
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = ParseDescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (order, rest) = match chars.next() {
            None => return Err(ParseDescriptorError::Empty),
            Some(c @ ('<' | '>' | '|' | '=')) => (Some(c), chars.as_str()),
            Some(_) => (None, s),
        };

        // Single-character codes without a size.
        let dtype = match rest {
            "?" => Some(DType::Bool),
            "b" => Some(DType::I8),
            "B" => Some(DType::U8),
            _ => {
                let mut rest_chars = rest.chars();
                match rest_chars.next() {
                    Some(kind) => rest_chars
                        .as_str()
                        .parse::<usize>()
                        .ok()
                        .and_then(|size| DType::from_kind_and_size(kind, size)),
                    None => None,
                }
            }
        };
        let dtype = dtype.ok_or_else(|| ParseDescriptorError::Unsupported(s.to_owned()))?;

        let endian = if dtype.item_size() == 1 {
            Endianness::NotApplicable
        } else {
            match order {
                Some('<') => Endianness::Little,
                Some('>') => Endianness::Big,
                Some('|') => return Err(ParseDescriptorError::MissingByteOrder(s.to_owned())),
                Some(_) | None => Endianness::native(),
            }
        };
        Ok(TypeDescriptor { dtype, endian })
    }
}
