//! Runtime detection of landlock support
//!
//! The probe result is cached on a [`Landlock`] context so the kernel is
//! asked once, however many lockers or threads ask afterwards.

use pathlock_core::{Abi, PathlockError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::sys::{Kernel, LinuxKernel};

/// A kernel together with its cached capability state
#[derive(Debug)]
pub struct Landlock<K: Kernel = LinuxKernel> {
    kernel: K,
    abi: OnceLock<Abi>,
    restricted: AtomicBool,
}

impl Landlock<LinuxKernel> {
    /// Shared context for the running kernel
    pub fn system() -> Arc<Landlock<LinuxKernel>> {
        static SYSTEM: OnceLock<Arc<Landlock<LinuxKernel>>> = OnceLock::new();
        SYSTEM
            .get_or_init(|| Arc::new(Landlock::new(LinuxKernel)))
            .clone()
    }
}

impl<K: Kernel> Landlock<K> {
    pub fn new(kernel: K) -> Self {
        Self {
            kernel,
            abi: OnceLock::new(),
            restricted: AtomicBool::new(false),
        }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// ABI version of the kernel, probed on first use
    pub fn abi(&self) -> Abi {
        *self.abi.get_or_init(|| match self.kernel.probe() {
            Ok(version) => {
                log::debug!("landlock ABI version {}", version);
                Abi(version)
            }
            Err(err) => {
                log::debug!("landlock probe failed: {}", err);
                Abi::UNSUPPORTED
            }
        })
    }

    /// The supported ABI version, or `NotSupported`
    pub fn detect(&self) -> Result<Abi> {
        let abi = self.abi();
        if !abi.is_supported() {
            return Err(PathlockError::NotSupported(
                "kernel does not support landlock (requires Linux 5.13+ with landlock enabled)"
                    .to_string(),
            ));
        }
        Ok(abi)
    }

    pub fn available(&self) -> bool {
        self.abi().is_supported()
    }

    /// Whether a lock has been applied through this context
    pub fn is_restricted(&self) -> bool {
        self.restricted.load(Ordering::SeqCst)
    }

    /// Claim the one restriction this context may apply.
    pub(crate) fn begin_restrict(&self) -> bool {
        self.restricted
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Release the claim after a lock attempt failed.
    pub(crate) fn abort_restrict(&self) {
        self.restricted.store(false, Ordering::SeqCst);
    }
}

/// Landlock ABI version of the running kernel.
pub fn detect() -> Result<Abi> {
    Landlock::system().detect()
}

/// Whether the running kernel supports landlock.
pub fn available() -> bool {
    Landlock::system().available()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeKernel;

    #[test]
    fn detect_reports_version() {
        let ctx = Landlock::new(FakeKernel::with_version(3));
        assert_eq!(ctx.detect().unwrap(), Abi::V3);
        assert!(ctx.available());
    }

    #[test]
    fn version_zero_is_not_supported() {
        let ctx = Landlock::new(FakeKernel::with_version(0));
        assert!(matches!(ctx.detect(), Err(PathlockError::NotSupported(_))));
        assert!(!ctx.available());
    }

    #[test]
    fn probe_error_is_not_supported() {
        let ctx = Landlock::new(FakeKernel::failing_probe());
        assert!(matches!(ctx.detect(), Err(PathlockError::NotSupported(_))));
    }

    #[test]
    fn probe_runs_once() {
        let ctx = Arc::new(Landlock::new(FakeKernel::with_version(2)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                std::thread::spawn(move || ctx.abi())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Abi::V2);
        }
        assert_eq!(ctx.kernel().probes(), 1);
    }

    #[test]
    fn restrict_claim_is_exclusive() {
        let ctx = Landlock::new(FakeKernel::with_version(1));
        assert!(!ctx.is_restricted());
        assert!(ctx.begin_restrict());
        assert!(!ctx.begin_restrict());
        ctx.abort_restrict();
        assert!(ctx.begin_restrict());
        assert!(ctx.is_restricted());
    }

    #[test]
    fn system_detection_is_stable() {
        assert_eq!(available(), detect().is_ok());
        assert_eq!(detect().ok(), detect().ok());
    }
}
