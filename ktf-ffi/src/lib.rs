//! Errno vocabulary shared between the registry and C-facing callers
//!
//! Kernel modules that register tests cannot propagate Rust error types, so
//! every failure in the registry is ultimately expressed as a negative errno.
//! This crate holds that vocabulary and the translation in both directions.

#![cfg_attr(not(test), no_std)]
#![allow(non_camel_case_types)]

pub use libc::c_int;

/// Error codes matching Linux kernel errno values
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KernelError {
    EPERM = 1,
    ENOENT = 2,
    EINTR = 4,
    EIO = 5,
    EAGAIN = 11,
    ENOMEM = 12,
    EACCES = 13,
    EFAULT = 14,
    EBUSY = 16,
    EEXIST = 17,
    EINVAL = 22,
    ENOSPC = 28,
    EMSGSIZE = 90,
}

static_assertions::assert_eq_size!(KernelError, c_int);

impl KernelError {
    /// Negative errno, as returned from kernel entry points.
    pub fn to_errno(self) -> c_int {
        -(self as c_int)
    }

    /// Symbolic name, for log lines.
    pub fn name(self) -> &'static str {
        match self {
            KernelError::EPERM => "EPERM",
            KernelError::ENOENT => "ENOENT",
            KernelError::EINTR => "EINTR",
            KernelError::EIO => "EIO",
            KernelError::EAGAIN => "EAGAIN",
            KernelError::ENOMEM => "ENOMEM",
            KernelError::EACCES => "EACCES",
            KernelError::EFAULT => "EFAULT",
            KernelError::EBUSY => "EBUSY",
            KernelError::EEXIST => "EEXIST",
            KernelError::EINVAL => "EINVAL",
            KernelError::ENOSPC => "ENOSPC",
            KernelError::EMSGSIZE => "EMSGSIZE",
        }
    }

    fn from_positive(errno: c_int) -> Option<Self> {
        Some(match errno {
            1 => KernelError::EPERM,
            2 => KernelError::ENOENT,
            4 => KernelError::EINTR,
            5 => KernelError::EIO,
            11 => KernelError::EAGAIN,
            12 => KernelError::ENOMEM,
            13 => KernelError::EACCES,
            14 => KernelError::EFAULT,
            16 => KernelError::EBUSY,
            17 => KernelError::EEXIST,
            22 => KernelError::EINVAL,
            28 => KernelError::ENOSPC,
            90 => KernelError::EMSGSIZE,
            _ => return None,
        })
    }
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

/// Convert a Result to Linux errno format
///
/// - Ok(value) => 0
/// - Err(error) => negative errno
pub fn result_to_errno<T, E>(result: Result<T, E>) -> c_int
where
    E: Into<KernelError>,
{
    match result {
        Ok(_) => 0,
        Err(e) => e.into().to_errno(),
    }
}

/// Convert errno to Result
///
/// - 0 => Ok(())
/// - negative => Err(KernelError)
/// - positive or unknown => Err(EINVAL)
pub fn errno_to_result(errno: c_int) -> KernelResult<()> {
    if errno == 0 {
        return Ok(());
    }
    if errno > 0 {
        return Err(KernelError::EINVAL);
    }
    Err(KernelError::from_positive(-errno).unwrap_or(KernelError::EINVAL))
}
