//! pathlock-landlock: Unprivileged filesystem sandboxing via Landlock LSM (Linux 5.13+)
//!
//! Applies pathlock rules to the calling process. Once locked, the process
//! and every child it creates can only reach the listed paths, with the
//! listed modes. There is no way back.

mod allow;

#[cfg(target_os = "linux")]
pub mod capabilities;
#[cfg(target_os = "linux")]
mod locker;
#[cfg(target_os = "linux")]
mod ruleset;
#[cfg(target_os = "linux")]
pub mod sys;
#[cfg(all(test, target_os = "linux"))]
mod testing;

#[cfg(not(target_os = "linux"))]
mod unsupported;

pub use allow::Allow;

#[cfg(target_os = "linux")]
pub use capabilities::{available, detect, Landlock};
#[cfg(target_os = "linux")]
pub use locker::Locker;
#[cfg(target_os = "linux")]
pub use ruleset::Ruleset;
#[cfg(target_os = "linux")]
pub use sys::{Kernel, LinuxKernel};

#[cfg(not(target_os = "linux"))]
pub use unsupported::{available, detect, Locker};
