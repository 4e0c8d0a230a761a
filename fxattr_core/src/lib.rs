//! Typed access to the extended attributes of open files, paths and file URLs.
//!
//! ```no_run
//! use fxattr_core::{ExtendedAttributes, XattrOptions};
//! use std::path::Path;
//!
//! let path = Path::new("notes.txt");
//! path.set_xattr("user.tag", b"v1", XattrOptions::empty())?;
//! assert_eq!(path.xattr_value("user.tag", XattrOptions::empty())?, b"v1");
//! # Ok::<(), fxattr_core::Error>(())
//! ```
pub mod error;
pub mod handler;
pub mod options;
pub mod xattr;

pub use error::{Error, ErrorDomain, Result, SystemError};
pub use handler::ExtendedAttributes;
pub use options::XattrOptions;
pub use xattr::Xattr;

/// Namespace available to unprivileged users on Linux.
pub const USER_NAMESPACE: &str = "user.";
