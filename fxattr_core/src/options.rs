//! Portable options and their translation into the flags understood by the OS.
use bitflags::bitflags;
use std::os::raw::c_int;

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod consts {
    use std::os::raw::c_int;

    pub const XATTR_NOFOLLOW: c_int = 0x0001;
    pub const XATTR_CREATE: c_int = 0x0002;
    pub const XATTR_REPLACE: c_int = 0x0004;
    pub const XATTR_SHOWCOMPRESSION: c_int = 0x0020;
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod consts {
    pub use libc::{XATTR_CREATE, XATTR_REPLACE};
}

bitflags! {
    /// Modifiers accepted by every extended attribute operation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct XattrOptions: u32 {
        /// Operate on a trailing symbolic link itself instead of the object it points to.
        /// Has no effect on descriptors.
        const NO_FOLLOW = 1 << 0;
        /// Include the attributes the OS hides for transparently compressed files (macOS only).
        const SHOW_COMPRESSION = 1 << 1;
        /// Setting fails if the attribute already exists.
        const CREATE = 1 << 2;
        /// Setting fails if the attribute doesn't exist yet.
        const REPLACE = 1 << 3;
    }
}

/// The kind of native handle an operation is performed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    Descriptor,
    Path,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Set,
    Remove,
}

/// Flags ready to be passed to a raw binding.
///
/// On Linux `nofollow` selects the `l*` family of calls, on macOS it is already folded into
/// `bits` and the field is informational.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub nofollow: bool,
    pub bits: c_int,
}

/// Translates `options` into the flags for `op` performed on a target of `kind`. Options that
/// don't apply to the operation or target are dropped.
pub fn translate(options: XattrOptions, kind: TargetKind, op: Operation) -> Flags {
    let nofollow = kind == TargetKind::Path && options.contains(XattrOptions::NO_FOLLOW);
    let mut bits = 0;

    if op == Operation::Set {
        if options.contains(XattrOptions::CREATE) {
            bits |= consts::XATTR_CREATE;
        }
        if options.contains(XattrOptions::REPLACE) {
            bits |= consts::XATTR_REPLACE;
        }
    }

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    {
        if nofollow {
            bits |= consts::XATTR_NOFOLLOW;
        }
        if matches!(op, Operation::List | Operation::Get)
            && options.contains(XattrOptions::SHOW_COMPRESSION)
        {
            bits |= consts::XATTR_SHOWCOMPRESSION;
        }
    }

    Flags { nofollow, bits }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_following_links() {
        for kind in [TargetKind::Descriptor, TargetKind::Path] {
            for op in [Operation::List, Operation::Get, Operation::Set, Operation::Remove] {
                assert_eq!(translate(XattrOptions::empty(), kind, op), Flags::default());
            }
        }
    }

    #[test]
    fn nofollow_only_applies_to_paths() {
        let opts = XattrOptions::NO_FOLLOW;

        assert!(translate(opts, TargetKind::Path, Operation::Get).nofollow);
        assert_eq!(
            translate(opts, TargetKind::Descriptor, Operation::Get),
            Flags::default()
        );
    }

    #[test]
    fn create_and_replace_only_apply_to_set() {
        let opts = XattrOptions::CREATE | XattrOptions::REPLACE;

        let flags = translate(opts, TargetKind::Path, Operation::Set);
        assert_eq!(flags.bits, consts::XATTR_CREATE | consts::XATTR_REPLACE);

        for op in [Operation::List, Operation::Get, Operation::Remove] {
            assert_eq!(translate(opts, TargetKind::Path, op).bits, 0);
        }
    }

    #[test]
    fn duplicated_options_have_no_effect() {
        let once = XattrOptions::NO_FOLLOW;
        let twice = XattrOptions::NO_FOLLOW | XattrOptions::NO_FOLLOW;

        assert_eq!(
            translate(once, TargetKind::Path, Operation::List),
            translate(twice, TargetKind::Path, Operation::List)
        );
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    #[test]
    fn show_compression_is_ignored_on_linux() {
        let flags = translate(XattrOptions::SHOW_COMPRESSION, TargetKind::Path, Operation::List);
        assert_eq!(flags, Flags::default());
    }

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    #[test]
    fn nofollow_is_folded_into_bits_on_macos() {
        let flags = translate(
            XattrOptions::NO_FOLLOW | XattrOptions::SHOW_COMPRESSION,
            TargetKind::Path,
            Operation::Get,
        );
        assert_eq!(
            flags.bits,
            consts::XATTR_NOFOLLOW | consts::XATTR_SHOWCOMPRESSION
        );
    }
}
