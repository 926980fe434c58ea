//! pathlock: Declarative filesystem sandboxing for Linux
//!
//! Describe which paths a process may read, write, create in or execute,
//! then lock. The kernel's Landlock LSM enforces the rules on the process
//! and everything it starts, permanently.
//!
//! # Rules
//!
//! A rule is `kind:mode:path`, where kind is `f` or `d` and mode is any of
//! `r` (read), `w` (write), `c` (create and remove), `x` (execute).
//!
//! # Safety levels
//!
//! - **Mandatory** (default): refuse to continue unless the lock applied.
//! - **OnlySupported**: enforce where the kernel supports landlock.
//! - **Try**: best effort, never fails.
//!
//! # Example
//!
//! ```ignore
//! use pathlock::{Allow, Locker, Path, Preset, Safety};
//!
//! let locker = Locker::new([
//!     Allow::from(Preset::Shared),
//!     Allow::from(Preset::Stdio),
//!     Path::dir("/srv/data", "rwc").into(),
//!     "f:r:/etc/hosts".parse::<Path>()?.into(),
//! ]);
//! locker.lock(Safety::Mandatory)?;
//! ```

pub mod policy;

pub use pathlock_core::{
    self as core, is_proper_mode, is_proper_path, is_proper_type, Abi, AccessFs, Kind,
    LockStage, Path, PathlockError, Preset, PresetRegistry, Result, Safety,
};
pub use pathlock_landlock::{available, detect, Allow, Locker};

#[cfg(target_os = "linux")]
pub use pathlock_landlock::{Kernel, Landlock, LinuxKernel, Ruleset};

pub use policy::Policy;
