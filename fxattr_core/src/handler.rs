//! Extended attribute access for open files, paths and file URLs.
//!
//! Every target must be a file system object, that is a regular file, a directory or a symbolic
//! link. This, the path being non-empty and the URL using the `file` scheme are caller
//! contracts checked with debug assertions only. In release builds a violated contract is left
//! for the OS to report: an empty path fails with `ENOENT`, a non-file URL with `EINVAL`.
use std::ffi::CString;
use std::fs::{self, File};
use std::mem::MaybeUninit;
use std::os::fd::{AsRawFd, BorrowedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use url::Url;

use crate::options::XattrOptions;
use crate::xattr::{self, Descriptor, NativePath, Xattr};
use crate::{Error, Result};

const FS_OBJECT_ONLY: &str =
    "extended attributes are only available for file system objects (files, directories, symlinks)";

/// Native representation of a target handed to the raw bindings.
#[derive(Debug)]
pub enum NativeTarget {
    Descriptor(Descriptor),
    Path(CString),
}

macro_rules! with_target {
    ($this:ident, $target:ident => $body:expr) => {
        match $this.native_target()? {
            NativeTarget::Descriptor(fd) => {
                let $target = &fd;
                $body
            }
            NativeTarget::Path(path) => {
                let $target = &NativePath(&path);
                $body
            }
        }
    };
}

/// Provides the ability to manipulate extended attributes of a file system object.
pub trait ExtendedAttributes {
    /// Validates this target and converts it to its native representation.
    fn native_target(&self) -> Result<NativeTarget>;

    /// Retrieves the extended attribute names associated with this target. If there are no
    /// extended attributes an empty list is returned.
    ///
    /// Fails with [`Error::System`] if the names couldn't be retrieved and with
    /// [`Error::Encoding`] if they were retrieved but one of them is not valid UTF-8.
    fn xattr_names(&self, options: XattrOptions) -> Result<Vec<String>> {
        with_target!(self, target => xattr::list_names(target, options))
    }

    /// Retrieves the value of the extended attribute `name`. If the attribute exists but holds
    /// no data an empty value is returned.
    ///
    /// The attribute must exist, otherwise an error is returned for which
    /// [`Error::is_missing_attribute`] is true.
    fn xattr_value<N>(&self, name: N, options: XattrOptions) -> Result<Vec<u8>>
    where
        N: AsRef<[u8]>,
    {
        with_target!(self, target => xattr::get_value(target, name.as_ref(), options))
    }

    /// Sets the value of the extended attribute `name`, overwriting the previous value.
    ///
    /// If `name` is empty or contains only NUL characters no attribute is set and *no error is
    /// returned*.
    fn set_xattr<N, V>(&self, name: N, value: V, options: XattrOptions) -> Result<()>
    where
        N: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        with_target!(self, target => {
            xattr::set_value(target, name.as_ref(), value.as_ref(), options)
        })
    }

    /// Removes the extended attribute `name`. The attribute must exist.
    fn remove_xattr<N>(&self, name: N, options: XattrOptions) -> Result<()>
    where
        N: AsRef<[u8]>,
    {
        with_target!(self, target => xattr::remove(target, name.as_ref(), options))
    }

    /// Retrieves all extended attributes of this target together with their values.
    fn xattrs(&self, options: XattrOptions) -> Result<Vec<Xattr>> {
        with_target!(self, target => xattr::list_attributes(target, options))
    }
}

impl ExtendedAttributes for File {
    fn native_target(&self) -> Result<NativeTarget> {
        Ok(descriptor(self.as_raw_fd()))
    }
}

impl ExtendedAttributes for BorrowedFd<'_> {
    fn native_target(&self) -> Result<NativeTarget> {
        Ok(descriptor(self.as_raw_fd()))
    }
}

impl ExtendedAttributes for Path {
    fn native_target(&self) -> Result<NativeTarget> {
        debug_assert!(!self.as_os_str().is_empty(), "file path must not be empty");
        debug_assert!(is_fs_object_path(self), "{}", FS_OBJECT_ONLY);

        CString::new(self.as_os_str().as_bytes())
            .map(NativeTarget::Path)
            .map_err(|_| Error::from_raw_os_error(libc::EINVAL))
    }
}

impl ExtendedAttributes for Url {
    fn native_target(&self) -> Result<NativeTarget> {
        debug_assert_eq!(self.scheme(), "file", "only file URLs have extended attributes");

        let path = self
            .to_file_path()
            .map_err(|_| Error::from_raw_os_error(libc::EINVAL))?;
        path.native_target()
    }
}

fn descriptor(fd: RawFd) -> NativeTarget {
    debug_assert!(is_fs_object_fd(fd), "{}", FS_OBJECT_ONLY);
    NativeTarget::Descriptor(Descriptor(fd))
}

/// Best effort check of the type of object behind `fd`. If `fstat` fails the xattr call itself
/// will report the problem.
fn is_fs_object_fd(fd: RawFd) -> bool {
    let mut stat = MaybeUninit::<libc::stat>::uninit();

    if unsafe { libc::fstat(fd, stat.as_mut_ptr()) } != 0 {
        return true;
    }

    let mode = unsafe { stat.assume_init() }.st_mode & libc::S_IFMT;
    mode == libc::S_IFREG || mode == libc::S_IFDIR || mode == libc::S_IFLNK
}

fn is_fs_object_path(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(metadata) => {
            let ft = metadata.file_type();
            ft.is_file() || ft.is_dir() || ft.is_symlink()
        }
        Err(_) => true,
    }
}
