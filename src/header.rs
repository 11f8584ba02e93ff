use crate::dtype::{ParseDescriptorError, TypeDescriptor};
use byteorder::{ByteOrder, LittleEndian};
use num_traits::ToPrimitive;
use py_literal::{
    FormatError as PyValueFormatError, ParseError as PyValueParseError, Value as PyValue,
};
use std::error::Error;
use std::fmt;
use std::io::{self, Read};
use tracing::trace;

/// Magic string to indicate npy format.
const MAGIC_STRING: &[u8] = b"\x93NUMPY";

/// The element data starts at a multiple of this many bytes.
pub(crate) const ARRAY_ALIGN: usize = 64;

/// An error in the magic string, version or header dictionary of an `.npy`
/// file.
#[derive(Debug)]
pub enum ParseHeaderError {
    /// The file does not start with `\x93NUMPY`.
    MagicString,
    /// The format version is not 1.0, 2.0 or 3.0.
    Version { major: u8, minor: u8 },
    /// The header dictionary of a version 1.0 or 2.0 file contains a
    /// non-ASCII byte.
    NonAscii,
    /// The header dictionary of a version 3.0 file is not valid UTF-8.
    Utf8Parse(std::str::Utf8Error),
    UnknownKey(PyValue),
    MissingKey(&'static str),
    IllegalValue {
        key: &'static str,
        value: PyValue,
    },
    /// The `descr` value is a string but not one this crate can read.
    Descriptor(ParseDescriptorError),
    DictParse(PyValueParseError),
    MetaNotDict(PyValue),
    MissingNewline,
}

impl Error for ParseHeaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use ParseHeaderError::*;
        match self {
            Utf8Parse(err) => Some(err),
            Descriptor(err) => Some(err),
            DictParse(err) => Some(err),
            MagicString
            | Version { .. }
            | NonAscii
            | UnknownKey(_)
            | MissingKey(_)
            | IllegalValue { .. }
            | MetaNotDict(_)
            | MissingNewline => None,
        }
    }
}

impl fmt::Display for ParseHeaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ParseHeaderError::*;
        match self {
            MagicString => write!(f, "not an .npy file: magic string is missing"),
            Version { major, minor } => {
                write!(f, "unsupported .npy format version {}.{}", major, minor)
            }
            NonAscii => write!(
                f,
                "non-ASCII header; versions 1.0 and 2.0 allow only ASCII"
            ),
            Utf8Parse(err) => write!(f, "header dictionary is not valid UTF-8: {}", err),
            UnknownKey(key) => write!(f, "unexpected key in header dictionary: {}", key),
            MissingKey(key) => write!(f, "header dictionary has no {:?} key", key),
            IllegalValue { key, value } => write!(f, "illegal value for key {}: {}", key, value),
            Descriptor(err) => write!(f, "unreadable type descriptor: {}", err),
            DictParse(err) => write!(f, "header is not a Python literal: {}", err),
            MetaNotDict(value) => write!(f, "header is not a dictionary: {}", value),
            MissingNewline => write!(f, "header does not end with a newline"),
        }
    }
}

impl From<std::str::Utf8Error> for ParseHeaderError {
    fn from(err: std::str::Utf8Error) -> ParseHeaderError {
        ParseHeaderError::Utf8Parse(err)
    }
}

impl From<PyValueParseError> for ParseHeaderError {
    fn from(err: PyValueParseError) -> ParseHeaderError {
        ParseHeaderError::DictParse(err)
    }
}

impl From<ParseDescriptorError> for ParseHeaderError {
    fn from(err: ParseDescriptorError) -> ParseHeaderError {
        ParseHeaderError::Descriptor(err)
    }
}

/// An error reading the header of an `.npy` file.
#[derive(Debug)]
pub enum ReadHeaderError {
    Io(io::Error),
    Parse(ParseHeaderError),
}

impl Error for ReadHeaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReadHeaderError::Io(err) => Some(err),
            ReadHeaderError::Parse(err) => Some(err),
        }
    }
}

impl fmt::Display for ReadHeaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadHeaderError::Io(err) => write!(f, "I/O error: {}", err),
            ReadHeaderError::Parse(err) => write!(f, "error parsing header: {}", err),
        }
    }
}

impl From<io::Error> for ReadHeaderError {
    fn from(err: io::Error) -> ReadHeaderError {
        ReadHeaderError::Io(err)
    }
}

impl From<ParseHeaderError> for ReadHeaderError {
    fn from(err: ParseHeaderError) -> ReadHeaderError {
        ReadHeaderError::Parse(err)
    }
}

/// An error formatting the header dictionary as a Python literal.
#[derive(Debug)]
pub struct FormatHeaderError(PyValueFormatError);

impl Error for FormatHeaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl fmt::Display for FormatHeaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "header dictionary could not be formatted: {}", self.0)
    }
}

impl From<PyValueFormatError> for FormatHeaderError {
    fn from(err: PyValueFormatError) -> FormatHeaderError {
        FormatHeaderError(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Version {
    V1_0,
    V2_0,
    V3_0,
}

impl Version {
    /// Number of bytes taken up by version number (1 byte for major version, 1
    /// byte for minor version).
    const VERSION_NUM_BYTES: usize = 2;

    fn from_bytes(bytes: [u8; 2]) -> Result<Self, ParseHeaderError> {
        match bytes {
            [0x01, 0x00] => Ok(Version::V1_0),
            [0x02, 0x00] => Ok(Version::V2_0),
            [0x03, 0x00] => Ok(Version::V3_0),
            [major, minor] => Err(ParseHeaderError::Version { major, minor }),
        }
    }

    fn to_bytes(self) -> [u8; 2] {
        match self {
            Version::V1_0 => [0x01, 0x00],
            Version::V2_0 => [0x02, 0x00],
            Version::V3_0 => [0x03, 0x00],
        }
    }

    /// Number of bytes in representation of header length.
    fn header_len_num_bytes(self) -> usize {
        match self {
            Version::V1_0 => 2,
            Version::V2_0 | Version::V3_0 => 4,
        }
    }

    fn read_header_len<R: io::Read>(self, mut reader: R) -> io::Result<usize> {
        let mut buf = [0; 4];
        reader.read_exact(&mut buf[..self.header_len_num_bytes()])?;
        match self {
            Version::V1_0 => Ok(LittleEndian::read_u16(&buf) as usize),
            Version::V2_0 | Version::V3_0 => Ok(LittleEndian::read_u32(&buf) as usize),
        }
    }

    /// Appends the header length. The caller picks a version wide enough for
    /// `header_len`.
    fn push_header_len(self, out: &mut Vec<u8>, header_len: usize) {
        let start = out.len();
        out.resize(start + self.header_len_num_bytes(), 0);
        match self {
            Version::V1_0 => LittleEndian::write_u16(&mut out[start..], header_len as u16),
            Version::V2_0 | Version::V3_0 => {
                LittleEndian::write_u32(&mut out[start..], header_len as u32)
            }
        }
    }
}

/// The metadata at the start of an `.npy` file.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub type_descriptor: TypeDescriptor,
    /// Whether the data is stored in column-major order.
    pub fortran_order: bool,
    pub shape: Vec<usize>,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.to_py_value())
    }
}

impl Header {
    fn from_py_value(value: PyValue) -> Result<Self, ParseHeaderError> {
        let dict = match value {
            PyValue::Dict(dict) => dict,
            other => return Err(ParseHeaderError::MetaNotDict(other)),
        };
        let mut type_descriptor: Option<TypeDescriptor> = None;
        let mut fortran_order: Option<bool> = None;
        let mut shape: Option<Vec<usize>> = None;
        for (key, value) in dict {
            match key {
                PyValue::String(ref k) if k == "descr" => match value {
                    PyValue::String(ref s) => type_descriptor = Some(s.parse()?),
                    other => {
                        return Err(ParseHeaderError::IllegalValue {
                            key: "descr",
                            value: other,
                        })
                    }
                },
                PyValue::String(ref k) if k == "fortran_order" => match value {
                    PyValue::Boolean(b) => fortran_order = Some(b),
                    other => {
                        return Err(ParseHeaderError::IllegalValue {
                            key: "fortran_order",
                            value: other,
                        })
                    }
                },
                PyValue::String(ref k) if k == "shape" => {
                    fn parse_shape(value: &PyValue) -> Option<Vec<usize>> {
                        value
                            .as_tuple()?
                            .iter()
                            .map(|elem| elem.as_integer()?.to_usize())
                            .collect()
                    }
                    match parse_shape(&value) {
                        Some(s) => shape = Some(s),
                        None => {
                            return Err(ParseHeaderError::IllegalValue {
                                key: "shape",
                                value,
                            })
                        }
                    }
                }
                k => return Err(ParseHeaderError::UnknownKey(k)),
            }
        }
        match (type_descriptor, fortran_order, shape) {
            (Some(type_descriptor), Some(fortran_order), Some(shape)) => Ok(Header {
                type_descriptor,
                fortran_order,
                shape,
            }),
            (None, _, _) => Err(ParseHeaderError::MissingKey("descr")),
            (_, None, _) => Err(ParseHeaderError::MissingKey("fortran_order")),
            (_, _, None) => Err(ParseHeaderError::MissingKey("shape")),
        }
    }

    /// Reads the header, leaving `reader` positioned at the first byte of the
    /// element data.
    pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Self, ReadHeaderError> {
        let mut buf = [0; MAGIC_STRING.len()];
        reader.read_exact(&mut buf)?;
        if buf != MAGIC_STRING {
            return Err(ParseHeaderError::MagicString.into());
        }

        let mut buf = [0; Version::VERSION_NUM_BYTES];
        reader.read_exact(&mut buf)?;
        let version = Version::from_bytes(buf)?;

        let header_len = version.read_header_len(&mut reader)?;
        // A length field from a truncated or hostile file is not trusted for
        // allocation.
        let mut buf = Vec::new();
        (&mut reader).take(header_len as u64).read_to_end(&mut buf)?;
        if buf.len() < header_len {
            return Err(ReadHeaderError::Io(io::ErrorKind::UnexpectedEof.into()));
        }
        let without_newline = match buf.split_last() {
            Some((&b'\n', rest)) => rest,
            Some(_) | None => return Err(ParseHeaderError::MissingNewline.into()),
        };
        let header_str = match version {
            Version::V1_0 | Version::V2_0 => {
                if !without_newline.is_ascii() {
                    return Err(ParseHeaderError::NonAscii.into());
                }
                std::str::from_utf8(without_newline).map_err(ParseHeaderError::from)?
            }
            Version::V3_0 => {
                std::str::from_utf8(without_newline).map_err(ParseHeaderError::from)?
            }
        };
        trace!(?version, header_len, "read npy header");
        let header_dict: PyValue = header_str
            .trim_end()
            .parse()
            .map_err(ParseHeaderError::from)?;
        Ok(Header::from_py_value(header_dict)?)
    }

    fn to_py_value(&self) -> PyValue {
        PyValue::Dict(vec![
            (
                PyValue::String("descr".into()),
                PyValue::String(self.type_descriptor.to_string()),
            ),
            (
                PyValue::String("fortran_order".into()),
                PyValue::Boolean(self.fortran_order),
            ),
            (
                PyValue::String("shape".into()),
                PyValue::Tuple(
                    self.shape
                        .iter()
                        .map(|&elem| PyValue::Integer(elem.into()))
                        .collect(),
                ),
            ),
        ])
    }

    /// Formats the magic string, version, header length and padded
    /// dictionary. The length of the result is a multiple of
    /// [`ARRAY_ALIGN`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatHeaderError> {
        // Metadata describing array's format as ASCII string.
        let mut arr_format = Vec::new();
        self.to_py_value().write_ascii(&mut arr_format)?;

        // Length of a '\n' char in bytes.
        const NEWLINE_LEN: usize = 1;

        // The smallest version whose length field fits the padded header.
        let version = if arr_format.len() + NEWLINE_LEN + ARRAY_ALIGN > u16::MAX as usize {
            Version::V2_0
        } else {
            Version::V1_0
        };
        let prefix_len =
            MAGIC_STRING.len() + Version::VERSION_NUM_BYTES + version.header_len_num_bytes();

        let unpadded = prefix_len + arr_format.len() + NEWLINE_LEN;
        let padding = (ARRAY_ALIGN - unpadded % ARRAY_ALIGN) % ARRAY_ALIGN;
        arr_format.resize(arr_format.len() + padding, b' ');
        arr_format.push(b'\n');
        let header_len = arr_format.len();

        let mut out = Vec::with_capacity(prefix_len + header_len);
        out.extend_from_slice(MAGIC_STRING);
        out.extend_from_slice(&version.to_bytes());
        version.push_header_len(&mut out, header_len);
        out.extend_from_slice(&arr_format);

        debug_assert_eq!(out.len() % ARRAY_ALIGN, 0);
        trace!(?version, header_len, "formatted npy header");
        Ok(out)
    }
}
