//! Raw bindings of the `*xattr` syscall families to native targets.
#[cfg(any(target_os = "linux", target_os = "android"))]
use libc::{
    fgetxattr, flistxattr, fremovexattr, fsetxattr, getxattr, lgetxattr, listxattr, llistxattr,
    lremovexattr, lsetxattr, removexattr, setxattr,
};
#[cfg(any(target_os = "macos", target_os = "ios"))]
use libc::{
    fgetxattr, flistxattr, fremovexattr, fsetxattr, getxattr, listxattr, removexattr, setxattr,
};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::os::unix::io::RawFd;
use std::ptr;

use crate::options::{Flags, TargetKind};
use crate::{Error, Result};

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios"
)))]
compile_error!("extended attributes are only supported on Linux, Android, macOS and iOS");

/// The four extended attribute calls bound to one native target.
///
/// Every method performs exactly one syscall. An empty `buf` is passed to the OS as a null
/// pointer with a size of zero, which asks for the required buffer size instead of the data.
pub trait RawXattr {
    const KIND: TargetKind;

    fn list(&self, buf: &mut [u8], flags: Flags) -> Result<usize>;

    fn get(&self, name: &CStr, buf: &mut [u8], flags: Flags) -> Result<usize>;

    fn set(&self, name: &CStr, value: &[u8], flags: Flags) -> Result<()>;

    fn remove(&self, name: &CStr, flags: Flags) -> Result<()>;
}

/// An already open file descriptor. The descriptor is borrowed and never closed.
#[derive(Clone, Copy, Debug)]
pub struct Descriptor(pub RawFd);

/// A NUL-terminated native path.
#[derive(Clone, Copy, Debug)]
pub struct NativePath<'a>(pub &'a CStr);

//################################################################################
// Wrappers
//################################################################################

fn out_buf(buf: &mut [u8]) -> (*mut c_void, usize) {
    if buf.is_empty() {
        (ptr::null_mut(), 0)
    } else {
        (buf.as_mut_ptr() as *mut c_void, buf.len())
    }
}

fn size_or_last_error(ret: isize) -> Result<usize> {
    if ret < 0 {
        return Err(Error::last_os_error());
    }

    Ok(ret as usize)
}

fn unit_or_last_error(ret: c_int) -> Result<()> {
    if ret != 0 {
        return Err(Error::last_os_error());
    }

    Ok(())
}

#[cfg(any(target_os = "linux", target_os = "android"))]
impl RawXattr for NativePath<'_> {
    const KIND: TargetKind = TargetKind::Path;

    fn list(&self, buf: &mut [u8], flags: Flags) -> Result<usize> {
        let func = if flags.nofollow { llistxattr } else { listxattr };
        let (buf_ptr, size) = out_buf(buf);

        size_or_last_error(unsafe { func(self.0.as_ptr(), buf_ptr as *mut c_char, size) })
    }

    fn get(&self, name: &CStr, buf: &mut [u8], flags: Flags) -> Result<usize> {
        let func = if flags.nofollow { lgetxattr } else { getxattr };
        let (buf_ptr, size) = out_buf(buf);

        size_or_last_error(unsafe { func(self.0.as_ptr(), name.as_ptr(), buf_ptr, size) })
    }

    fn set(&self, name: &CStr, value: &[u8], flags: Flags) -> Result<()> {
        let func = if flags.nofollow { lsetxattr } else { setxattr };

        unit_or_last_error(unsafe {
            func(
                self.0.as_ptr(),
                name.as_ptr(),
                value.as_ptr() as *const c_void,
                value.len(),
                flags.bits,
            )
        })
    }

    fn remove(&self, name: &CStr, flags: Flags) -> Result<()> {
        let func = if flags.nofollow { lremovexattr } else { removexattr };

        unit_or_last_error(unsafe { func(self.0.as_ptr(), name.as_ptr()) })
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
impl RawXattr for Descriptor {
    const KIND: TargetKind = TargetKind::Descriptor;

    fn list(&self, buf: &mut [u8], _flags: Flags) -> Result<usize> {
        let (buf_ptr, size) = out_buf(buf);

        size_or_last_error(unsafe { flistxattr(self.0, buf_ptr as *mut c_char, size) })
    }

    fn get(&self, name: &CStr, buf: &mut [u8], _flags: Flags) -> Result<usize> {
        let (buf_ptr, size) = out_buf(buf);

        size_or_last_error(unsafe { fgetxattr(self.0, name.as_ptr(), buf_ptr, size) })
    }

    fn set(&self, name: &CStr, value: &[u8], flags: Flags) -> Result<()> {
        unit_or_last_error(unsafe {
            fsetxattr(
                self.0,
                name.as_ptr(),
                value.as_ptr() as *const c_void,
                value.len(),
                flags.bits,
            )
        })
    }

    fn remove(&self, name: &CStr, _flags: Flags) -> Result<()> {
        unit_or_last_error(unsafe { fremovexattr(self.0, name.as_ptr()) })
    }
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
impl RawXattr for NativePath<'_> {
    const KIND: TargetKind = TargetKind::Path;

    fn list(&self, buf: &mut [u8], flags: Flags) -> Result<usize> {
        let (buf_ptr, size) = out_buf(buf);

        size_or_last_error(unsafe {
            listxattr(self.0.as_ptr(), buf_ptr as *mut c_char, size, flags.bits)
        })
    }

    fn get(&self, name: &CStr, buf: &mut [u8], flags: Flags) -> Result<usize> {
        let (buf_ptr, size) = out_buf(buf);

        size_or_last_error(unsafe {
            getxattr(self.0.as_ptr(), name.as_ptr(), buf_ptr, size, 0, flags.bits)
        })
    }

    fn set(&self, name: &CStr, value: &[u8], flags: Flags) -> Result<()> {
        unit_or_last_error(unsafe {
            setxattr(
                self.0.as_ptr(),
                name.as_ptr(),
                value.as_ptr() as *const c_void,
                value.len(),
                0,
                flags.bits,
            )
        })
    }

    fn remove(&self, name: &CStr, flags: Flags) -> Result<()> {
        unit_or_last_error(unsafe { removexattr(self.0.as_ptr(), name.as_ptr(), flags.bits) })
    }
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
impl RawXattr for Descriptor {
    const KIND: TargetKind = TargetKind::Descriptor;

    fn list(&self, buf: &mut [u8], flags: Flags) -> Result<usize> {
        let (buf_ptr, size) = out_buf(buf);

        size_or_last_error(unsafe { flistxattr(self.0, buf_ptr as *mut c_char, size, flags.bits) })
    }

    fn get(&self, name: &CStr, buf: &mut [u8], flags: Flags) -> Result<usize> {
        let (buf_ptr, size) = out_buf(buf);

        size_or_last_error(unsafe { fgetxattr(self.0, name.as_ptr(), buf_ptr, size, 0, flags.bits) })
    }

    fn set(&self, name: &CStr, value: &[u8], flags: Flags) -> Result<()> {
        unit_or_last_error(unsafe {
            fsetxattr(
                self.0,
                name.as_ptr(),
                value.as_ptr() as *const c_void,
                value.len(),
                0,
                flags.bits,
            )
        })
    }

    fn remove(&self, name: &CStr, flags: Flags) -> Result<()> {
        unit_or_last_error(unsafe { fremovexattr(self.0, name.as_ptr(), flags.bits) })
    }
}
