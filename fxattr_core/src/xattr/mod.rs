//! Safe wrappers for manipulating extended attributes, generic over the kind of target.
//!
//! Both [`list_names`] and [`get_value`] use a two step protocol. The first call asks the OS for
//! the required buffer size, the second one fetches the data into a buffer of that size. The
//! two calls are not atomic: if another process grows the attribute set or value in between,
//! the fetch fails with the error reported by the OS (`ERANGE`) and it is up to the caller to
//! retry. If it shrinks, only the bytes produced by the fetch are returned.
mod unix;

pub use unix::{Descriptor, NativePath, RawXattr};

use std::ffi::CString;

use crate::options::{translate, Operation, XattrOptions};
use crate::{Error, Result};

/// A single extended attribute together with its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Xattr {
    name: String,
    value: Vec<u8>,
}

impl Xattr {
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<Vec<u8>>,
    {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.name, self.value)
    }
}

impl From<(String, Vec<u8>)> for Xattr {
    fn from(xattr: (String, Vec<u8>)) -> Self {
        Self::new(xattr.0, xattr.1)
    }
}

/// Retrieves the names of all extended attributes of `target`. A target without attributes
/// yields an empty list.
pub fn list_names<T: RawXattr>(target: &T, options: XattrOptions) -> Result<Vec<String>> {
    let flags = translate(options, T::KIND, Operation::List);

    let size = target.list(&mut [], flags)?;
    log::trace!("probed attribute list of {:?}, size: {}", T::KIND, size);
    if size == 0 {
        return Ok(Vec::new());
    }

    let mut buf = vec![0u8; size];
    let len = target.list(&mut buf, flags)?;
    buf.truncate(len);

    parse_names(&buf)
}

/// Retrieves the value of the attribute `name`. An attribute that holds no data yields an empty
/// value.
pub fn get_value<T: RawXattr>(target: &T, name: &[u8], options: XattrOptions) -> Result<Vec<u8>> {
    let flags = translate(options, T::KIND, Operation::Get);
    let name = attr_name(name);

    let size = target.get(&name, &mut [], flags)?;
    log::trace!("probed value of {:?}, size: {}", name, size);
    if size == 0 {
        return Ok(Vec::new());
    }

    let mut buf = vec![0u8; size];
    let len = target.get(&name, &mut buf, flags)?;
    buf.truncate(len);

    Ok(buf)
}

/// Sets the attribute `name` to `value`, replacing the previous value if any. A `name` that is
/// empty or starts with a NUL byte is silently ignored.
pub fn set_value<T: RawXattr>(
    target: &T,
    name: &[u8],
    value: &[u8],
    options: XattrOptions,
) -> Result<()> {
    let name = attr_name(name);
    if name.as_bytes().is_empty() {
        log::trace!("skipping set of an empty attribute name");
        return Ok(());
    }

    target.set(&name, value, translate(options, T::KIND, Operation::Set))
}

/// Removes the attribute `name`. A `name` that is empty or starts with a NUL byte is silently
/// ignored.
pub fn remove<T: RawXattr>(target: &T, name: &[u8], options: XattrOptions) -> Result<()> {
    let name = attr_name(name);
    if name.as_bytes().is_empty() {
        log::trace!("skipping removal of an empty attribute name");
        return Ok(());
    }

    target.remove(&name, translate(options, T::KIND, Operation::Remove))
}

/// Retrieves all extended attributes of `target` with their values.
pub fn list_attributes<T: RawXattr>(target: &T, options: XattrOptions) -> Result<Vec<Xattr>> {
    let mut attrs = Vec::new();

    for name in list_names(target, options)? {
        let value = get_value(target, name.as_bytes(), options)?;
        attrs.push(Xattr::new(name, value));
    }

    Ok(attrs)
}

//################################################################################
// Other
//################################################################################

/// Interprets `name` the way the OS would, that is up to the first NUL byte.
fn attr_name(name: &[u8]) -> CString {
    let end = name.iter().position(|b| *b == b'\0').unwrap_or(name.len());

    // SAFETY: the bytes are cut before the first NUL so there is none left
    unsafe { CString::from_vec_unchecked(name[..end].to_vec()) }
}

/// Splits a NUL separated list of names. Empty entries are skipped.
fn parse_names(input: &[u8]) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for raw in input.split(|ch| *ch == b'\0').filter(|raw| !raw.is_empty()) {
        match std::str::from_utf8(raw) {
            Ok(name) => names.push(name.to_string()),
            Err(source) => {
                return Err(Error::Encoding {
                    name: raw.to_vec(),
                    source,
                })
            }
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ENOATTR;
    use crate::options::{Flags, TargetKind};
    use std::cell::{Cell, RefCell};
    use std::ffi::CStr;

    type Hook = Box<dyn FnOnce(&mut Vec<(Vec<u8>, Vec<u8>)>)>;

    /// Behaves like the kernel for a single file, with a hook that runs right after the first
    /// size probe to simulate another process racing with us.
    #[derive(Default)]
    struct FakeTarget {
        attrs: RefCell<Vec<(Vec<u8>, Vec<u8>)>>,
        after_probe: RefCell<Option<Hook>>,
        calls: Cell<usize>,
    }

    impl FakeTarget {
        fn with(attrs: &[(&str, &str)]) -> Self {
            let target = Self::default();
            for (name, value) in attrs {
                target
                    .attrs
                    .borrow_mut()
                    .push((name.as_bytes().to_vec(), value.as_bytes().to_vec()));
            }
            target
        }

        fn race<F>(self, hook: F) -> Self
        where
            F: FnOnce(&mut Vec<(Vec<u8>, Vec<u8>)>) + 'static,
        {
            *self.after_probe.borrow_mut() = Some(Box::new(hook));
            self
        }

        fn copy_out(&self, data: &[u8], buf: &mut [u8]) -> Result<usize> {
            self.calls.set(self.calls.get() + 1);
            if buf.is_empty() {
                if let Some(hook) = self.after_probe.borrow_mut().take() {
                    let len = data.len();
                    hook(&mut *self.attrs.borrow_mut());
                    return Ok(len);
                }
                return Ok(data.len());
            }
            if buf.len() < data.len() {
                return Err(Error::from_raw_os_error(libc::ERANGE));
            }
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    impl RawXattr for FakeTarget {
        const KIND: TargetKind = TargetKind::Path;

        fn list(&self, buf: &mut [u8], _flags: Flags) -> Result<usize> {
            let mut data = Vec::new();
            for (name, _) in self.attrs.borrow().iter() {
                data.extend_from_slice(name);
                data.push(b'\0');
            }
            self.copy_out(&data, buf)
        }

        fn get(&self, name: &CStr, buf: &mut [u8], _flags: Flags) -> Result<usize> {
            let value = self
                .attrs
                .borrow()
                .iter()
                .find(|(n, _)| n == name.to_bytes())
                .map(|(_, v)| v.clone())
                .ok_or_else(|| Error::from_raw_os_error(ENOATTR))?;
            self.copy_out(&value, buf)
        }

        fn set(&self, name: &CStr, value: &[u8], _flags: Flags) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            let mut attrs = self.attrs.borrow_mut();
            match attrs.iter_mut().find(|(n, _)| n == name.to_bytes()) {
                Some((_, v)) => *v = value.to_vec(),
                None => attrs.push((name.to_bytes().to_vec(), value.to_vec())),
            }
            Ok(())
        }

        fn remove(&self, name: &CStr, _flags: Flags) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            let mut attrs = self.attrs.borrow_mut();
            let idx = attrs
                .iter()
                .position(|(n, _)| n == name.to_bytes())
                .ok_or_else(|| Error::from_raw_os_error(ENOATTR))?;
            attrs.remove(idx);
            Ok(())
        }
    }

    #[test]
    fn parses_names_from_raw() {
        let raw = &[
            117, 115, 101, 114, 46, 107, 101, 121, 49, 0, 117, 115, 101, 114, 46, 107, 101, 121,
            50, 0, 117, 115, 101, 114, 46, 107, 101, 121, 51, 0, 115, 101, 99, 117, 114, 105, 116,
            121, 46, 116, 101, 115, 116, 105, 110, 103, 0,
        ];

        let names = parse_names(raw).unwrap();
        let mut it = names.iter();

        assert_eq!(it.next(), Some(&"user.key1".to_string()));
        assert_eq!(it.next(), Some(&"user.key2".to_string()));
        assert_eq!(it.next(), Some(&"user.key3".to_string()));
        assert_eq!(it.next(), Some(&"security.testing".to_string()));
        assert_eq!(it.next(), None);
    }

    #[test]
    fn skips_empty_names() {
        let names = parse_names(b"\0user.a\0\0user.b").unwrap();
        assert_eq!(names, vec!["user.a", "user.b"]);
        assert!(parse_names(b"\0\0").unwrap().is_empty());
    }

    #[test]
    fn invalid_utf8_name_is_an_encoding_error() {
        let err = parse_names(b"user.ok\0user.\xff\0").unwrap_err();
        match err {
            Error::Encoding { name, .. } => assert_eq!(name, b"user.\xff"),
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn interprets_names_up_to_first_nul() {
        assert_eq!(attr_name(b"user.tag").as_bytes(), b"user.tag");
        assert_eq!(attr_name(b"user.tag\0junk").as_bytes(), b"user.tag");
        assert!(attr_name(b"\0\0\0").as_bytes().is_empty());
        assert!(attr_name(b"").as_bytes().is_empty());
    }

    #[test]
    fn lists_nothing_without_fetching() {
        let target = FakeTarget::default();

        assert!(list_names(&target, XattrOptions::empty()).unwrap().is_empty());
        assert_eq!(target.calls.get(), 1);
    }

    #[test]
    fn sets_gets_and_removes() {
        let target = FakeTarget::default();
        let opts = XattrOptions::empty();

        set_value(&target, b"user.tag", b"v1", opts).unwrap();
        assert_eq!(list_names(&target, opts).unwrap(), vec!["user.tag"]);
        assert_eq!(get_value(&target, b"user.tag", opts).unwrap(), b"v1");

        set_value(&target, b"user.tag", b"v2", opts).unwrap();
        assert_eq!(list_names(&target, opts).unwrap(), vec!["user.tag"]);
        assert_eq!(get_value(&target, b"user.tag", opts).unwrap(), b"v2");

        remove(&target, b"user.tag", opts).unwrap();
        assert!(get_value(&target, b"user.tag", opts)
            .unwrap_err()
            .is_missing_attribute());
        assert!(remove(&target, b"user.tag", opts)
            .unwrap_err()
            .is_missing_attribute());
        assert!(list_names(&target, opts).unwrap().is_empty());
    }

    #[test]
    fn empty_value_is_returned_without_fetching() {
        let target = FakeTarget::with(&[("user.empty", "")]);

        assert!(get_value(&target, b"user.empty", XattrOptions::empty())
            .unwrap()
            .is_empty());
        assert_eq!(target.calls.get(), 1);
    }

    #[test]
    fn empty_names_are_ignored() {
        let target = FakeTarget::default();
        let opts = XattrOptions::empty();

        set_value(&target, b"", b"value", opts).unwrap();
        set_value(&target, b"\0\0", b"value", opts).unwrap();
        remove(&target, b"", opts).unwrap();

        assert_eq!(target.calls.get(), 0);
        assert!(list_names(&target, opts).unwrap().is_empty());
    }

    #[test]
    fn growing_list_between_probe_and_fetch_is_reported() {
        let target = FakeTarget::with(&[("user.a", "1")])
            .race(|attrs| attrs.push((b"user.longer".to_vec(), b"2".to_vec())));

        let err = list_names(&target, XattrOptions::empty()).unwrap_err();
        assert_eq!(err.code(), libc::ERANGE);

        // nothing is retried internally, the next call sees the new state
        assert_eq!(target.calls.get(), 2);
        assert_eq!(
            list_names(&target, XattrOptions::empty()).unwrap(),
            vec!["user.a", "user.longer"]
        );
    }

    #[test]
    fn shrinking_value_between_probe_and_fetch_is_truncated() {
        let target = FakeTarget::with(&[("user.a", "long value")]).race(|attrs| {
            attrs[0].1 = b"short".to_vec();
        });

        let value = get_value(&target, b"user.a", XattrOptions::empty()).unwrap();
        assert_eq!(value, b"short");
    }

    #[test]
    fn growing_value_between_probe_and_fetch_is_reported() {
        let target = FakeTarget::with(&[("user.a", "v")]).race(|attrs| {
            attrs[0].1 = b"much longer value".to_vec();
        });

        let err = get_value(&target, b"user.a", XattrOptions::empty()).unwrap_err();
        assert_eq!(err.code(), libc::ERANGE);
    }

    #[test]
    fn lists_attributes_with_values() {
        let target = FakeTarget::with(&[("user.a", "1"), ("user.b", "")]);

        let attrs = list_attributes(&target, XattrOptions::empty()).unwrap();
        assert_eq!(
            attrs,
            vec![Xattr::new("user.a", b"1".to_vec()), Xattr::new("user.b", Vec::new())]
        );
    }
}
