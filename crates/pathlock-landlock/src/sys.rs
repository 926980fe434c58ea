//! Landlock kernel interface
//!
//! The only place that touches raw syscalls and kernel struct layouts.
//! Everything above this module talks to the [`Kernel`] trait.

use pathlock_core::AccessFs;
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd};

const LANDLOCK_CREATE_RULESET_VERSION: u32 = 1;
const LANDLOCK_RULE_PATH_BENEATH: u32 = 1;

/// `struct landlock_ruleset_attr`
///
/// `handled_access_net` exists from ABI v4; older kernels accept the
/// larger struct as long as the extra field is zero.
#[repr(C)]
struct LandlockRulesetAttr {
    handled_access_fs: u64,
    handled_access_net: u64,
}

/// `struct landlock_path_beneath_attr`, packed in the kernel headers
#[repr(C, packed)]
struct LandlockPathBeneathAttr {
    allowed_access: u64,
    parent_fd: i32,
}

/// The privileged operations a lock needs from the kernel
pub trait Kernel: Send + Sync {
    /// Highest landlock ABI version supported, 0 when there is none.
    fn probe(&self) -> io::Result<u32>;

    /// Create a ruleset handling `handled` rights.
    fn create_ruleset(&self, handled: AccessFs) -> io::Result<OwnedFd>;

    /// Allow `allowed` beneath the location `anchor` refers to.
    fn add_rule(
        &self,
        ruleset: BorrowedFd<'_>,
        anchor: BorrowedFd<'_>,
        allowed: AccessFs,
    ) -> io::Result<()>;

    /// Set `PR_SET_NO_NEW_PRIVS` on the calling thread.
    fn drop_privileges(&self) -> io::Result<()>;

    /// Enforce `ruleset` on the calling thread and its future children.
    fn restrict_self(&self, ruleset: BorrowedFd<'_>) -> io::Result<()>;
}

/// The running Linux kernel
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxKernel;

impl Kernel for LinuxKernel {
    fn probe(&self) -> io::Result<u32> {
        // With the version flag and no attributes the call returns the ABI
        // version rather than a descriptor.
        let ret = unsafe {
            libc::syscall(
                libc::SYS_landlock_create_ruleset,
                std::ptr::null::<libc::c_void>(),
                0usize,
                LANDLOCK_CREATE_RULESET_VERSION,
            )
        };
        if ret >= 0 {
            return Ok(ret as u32);
        }
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            // not built in, or disabled at boot
            Some(libc::ENOSYS) | Some(libc::EOPNOTSUPP) => Ok(0),
            _ => Err(err),
        }
    }

    fn create_ruleset(&self, handled: AccessFs) -> io::Result<OwnedFd> {
        let attr = LandlockRulesetAttr {
            handled_access_fs: handled.bits(),
            handled_access_net: 0,
        };
        let ret = unsafe {
            libc::syscall(
                libc::SYS_landlock_create_ruleset,
                &attr as *const LandlockRulesetAttr,
                std::mem::size_of::<LandlockRulesetAttr>(),
                0u32,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        // The kernel hands back a fresh close-on-exec descriptor we now own.
        Ok(unsafe { OwnedFd::from_raw_fd(ret as i32) })
    }

    fn add_rule(
        &self,
        ruleset: BorrowedFd<'_>,
        anchor: BorrowedFd<'_>,
        allowed: AccessFs,
    ) -> io::Result<()> {
        let attr = LandlockPathBeneathAttr {
            allowed_access: allowed.bits(),
            parent_fd: anchor.as_raw_fd(),
        };
        let ret = unsafe {
            libc::syscall(
                libc::SYS_landlock_add_rule,
                ruleset.as_raw_fd(),
                LANDLOCK_RULE_PATH_BENEATH,
                &attr as *const LandlockPathBeneathAttr,
                0u32,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn drop_privileges(&self) -> io::Result<()> {
        let ret = unsafe { libc::prctl(libc::PR_SET_NO_NEW_PRIVS, 1, 0, 0, 0) };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn restrict_self(&self, ruleset: BorrowedFd<'_>) -> io::Result<()> {
        let ret =
            unsafe { libc::syscall(libc::SYS_landlock_restrict_self, ruleset.as_raw_fd(), 0u32) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
