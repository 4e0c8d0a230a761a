//! Structured errors returned by every extended attribute operation.
use std::ffi::CStr;
use std::fmt;
use std::io;
use std::os::raw::c_char;
use std::str::Utf8Error;

use thiserror::Error;

/// Code reported by [`Error::code`] for [`Error::Encoding`].
pub const INAPPLICABLE_STRING_ENCODING: i32 = 261;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) const ENOATTR: i32 = libc::ENODATA;
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub(crate) const ENOATTR: i32 = libc::ENOATTR;

/// Which family an [`Error`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorDomain {
    /// The OS rejected a call, see [`SystemError`].
    Posix,
    /// The call succeeded but a name could not be represented as text.
    Encoding,
}

#[derive(Debug, Error)]
/// Default error used throughout this crate
pub enum Error {
    #[error("{0}")]
    System(SystemError),
    #[error("extended attribute name `{}` is not valid UTF-8 - {source}", String::from_utf8_lossy(.name))]
    Encoding {
        name: Vec<u8>,
        #[source]
        source: Utf8Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Builds a system error from a raw `errno` value.
    pub fn from_raw_os_error(code: i32) -> Self {
        Error::System(SystemError::new(code))
    }

    pub(crate) fn last_os_error() -> Self {
        Error::from(io::Error::last_os_error())
    }

    pub fn domain(&self) -> ErrorDomain {
        match self {
            Error::System(_) => ErrorDomain::Posix,
            Error::Encoding { .. } => ErrorDomain::Encoding,
        }
    }

    /// The `errno` for system errors, [`INAPPLICABLE_STRING_ENCODING`] for encoding errors.
    pub fn code(&self) -> i32 {
        match self {
            Error::System(err) => err.code(),
            Error::Encoding { .. } => INAPPLICABLE_STRING_ENCODING,
        }
    }

    pub fn as_system(&self) -> Option<&SystemError> {
        match self {
            Error::System(err) => Some(err),
            Error::Encoding { .. } => None,
        }
    }

    /// Whether the OS reported that the requested attribute doesn't exist.
    pub fn is_missing_attribute(&self) -> bool {
        self.as_system()
            .map(SystemError::is_missing_attribute)
            .unwrap_or(false)
    }

    /// Whether the filesystem doesn't support extended attributes.
    pub fn is_not_supported(&self) -> bool {
        self.as_system()
            .map(SystemError::is_not_supported)
            .unwrap_or(false)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from_raw_os_error(err.raw_os_error().unwrap_or(libc::EIO))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::System(err) => io::Error::from_raw_os_error(err.code()),
            err @ Error::Encoding { .. } => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

/// An `errno` reported by a failed syscall.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemError {
    code: i32,
}

impl SystemError {
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    /// Human readable message for this error as provided by the OS, for example
    /// `No such file or directory`.
    pub fn description(&self) -> String {
        let mut buf = [0 as c_char; 256];

        // SAFETY: the buffer is valid for `buf.len()` bytes and `strerror_r` always
        // NUL-terminates on success.
        let ret = unsafe { libc::strerror_r(self.code, buf.as_mut_ptr(), buf.len()) };
        if ret != 0 {
            return format!("Unknown error {}", self.code);
        }

        unsafe { CStr::from_ptr(buf.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    pub fn kind(&self) -> io::ErrorKind {
        io::Error::from_raw_os_error(self.code).kind()
    }

    pub fn is_missing_attribute(&self) -> bool {
        self.code == ENOATTR
    }

    pub fn is_not_supported(&self) -> bool {
        self.code == libc::ENOTSUP || self.code == libc::EOPNOTSUPP
    }
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for SystemError {}

impl fmt::Debug for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemError")
            .field("code", &self.code)
            .field("description", &self.description())
            .finish()
    }
}
