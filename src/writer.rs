use crate::array::{InvalidArrayError, NdArray};
use crate::element::ArrayData;
use crate::header::FormatHeaderError;
use crate::npy::{serialize, WriteNpyError};
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// Where an array file is written: a directory and a file name within it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileTarget {
    pub directory: PathBuf,
    pub name: String,
}

impl FileTarget {
    pub fn new(directory: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        FileTarget {
            directory: directory.into(),
            name: name.into(),
        }
    }

    /// The full path of the file.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.name)
    }
}

/// An error writing an array file.
#[derive(Debug)]
pub enum WriteArrayError {
    /// The target directory could not be created.
    Path {
        directory: PathBuf,
        source: io::Error,
    },
    /// The file could not be created, written or moved into place.
    Write { path: PathBuf, source: io::Error },
    /// The shape and data do not form a valid array.
    InvalidArray(InvalidArrayError),
    /// The header could not be encoded.
    Encode(FormatHeaderError),
}

impl Error for WriteArrayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WriteArrayError::Path { source, .. } => Some(source),
            WriteArrayError::Write { source, .. } => Some(source),
            WriteArrayError::InvalidArray(err) => Some(err),
            WriteArrayError::Encode(err) => Some(err),
        }
    }
}

impl fmt::Display for WriteArrayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WriteArrayError::Path { directory, source } => write!(
                f,
                "failed to create directory {}: {}",
                directory.display(),
                source
            ),
            WriteArrayError::Write { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            WriteArrayError::InvalidArray(err) => write!(f, "invalid array: {}", err),
            WriteArrayError::Encode(err) => write!(f, "failed to encode array: {}", err),
        }
    }
}

impl From<InvalidArrayError> for WriteArrayError {
    fn from(err: InvalidArrayError) -> WriteArrayError {
        WriteArrayError::InvalidArray(err)
    }
}

/// Writes arrays to `.npy` files.
///
/// Each file is written to a temporary file in the target directory and then
/// renamed over the destination, so readers see either the previous file or
/// the complete new one. An existing file is replaced without warning.
///
/// # Example
///
/// ```no_run
/// use rusty_numpy::{ArrayFileWriter, FileTarget, NdArray};
///
/// # fn main() -> Result<(), rusty_numpy::WriteArrayError> {
/// let arr = NdArray::new(vec![2, 3], vec![1i64, 2, 3, 4, 5, 6])?;
/// ArrayFileWriter::new().write(&arr, &FileTarget::new("data", "array_1.npy"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct ArrayFileWriter {
    sync: bool,
}

impl ArrayFileWriter {
    pub fn new() -> Self {
        ArrayFileWriter::default()
    }

    /// Whether to `fsync` each file before moving it into place. Off by
    /// default.
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Writes `array` to `target`, creating the target directory and any
    /// missing parents. Returns the path of the written file.
    pub fn write(&self, array: &NdArray, target: &FileTarget) -> Result<PathBuf, WriteArrayError> {
        let bytes = serialize(array).map_err(|err| match err {
            WriteNpyError::FormatHeader(err) => WriteArrayError::Encode(err),
            WriteNpyError::Io(source) => WriteArrayError::Write {
                path: target.path(),
                source,
            },
        })?;
        create_directory(&target.directory)?;
        let path = target.path();
        self.replace_file(&target.directory, &path, &bytes)
            .map_err(|source| WriteArrayError::Write {
                path: path.clone(),
                source,
            })?;
        debug!(
            path = %path.display(),
            dtype = %array.dtype(),
            shape = ?array.shape(),
            bytes = bytes.len(),
            "wrote array"
        );
        Ok(path)
    }

    /// Builds the array from `shape` and `data` and writes it. An invalid
    /// combination is reported before anything touches the filesystem.
    pub fn write_parts(
        &self,
        shape: Vec<usize>,
        data: impl Into<ArrayData>,
        target: &FileTarget,
    ) -> Result<PathBuf, WriteArrayError> {
        let array = NdArray::new(shape, data)?;
        self.write(&array, target)
    }

    fn replace_file(&self, directory: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = temp_file_in(directory)?;
        file.write_all(bytes)?;
        file.flush()?;
        if self.sync {
            file.as_file().sync_all()?;
        }
        file.persist(path).map_err(|err| err.error)?;
        Ok(())
    }
}

/// Creates a temporary file that ends up with the same permissions as one
/// made by `File::create`.
fn temp_file_in(directory: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // The umask still applies.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(directory)
}

fn create_directory(directory: &Path) -> Result<(), WriteArrayError> {
    if directory.as_os_str().is_empty() || directory.is_dir() {
        return Ok(());
    }
    debug!(directory = %directory.display(), "creating directory");
    fs::create_dir_all(directory).map_err(|source| WriteArrayError::Path {
        directory: directory.to_path_buf(),
        source,
    })
}
