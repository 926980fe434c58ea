//! In-memory kernel for exercising the lock sequence without restricting
//! the test process.

use pathlock_core::AccessFs;
use std::fs::File;
use std::io;
use std::os::fd::{BorrowedFd, OwnedFd};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::sys::Kernel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    CreateRuleset,
    AddRule,
    DropPrivileges,
    RestrictSelf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateRuleset(AccessFs),
    AddRule(AccessFs),
    DropPrivileges,
    RestrictSelf,
}

#[derive(Debug)]
pub struct FakeKernel {
    version: Option<u32>,
    fail: Option<FailAt>,
    errno: i32,
    probes: AtomicUsize,
    calls: Mutex<Vec<Call>>,
}

impl FakeKernel {
    pub fn with_version(version: u32) -> Self {
        Self {
            version: Some(version),
            fail: None,
            errno: libc::EINVAL,
            probes: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_probe() -> Self {
        Self {
            version: None,
            ..Self::with_version(0)
        }
    }

    pub fn failing_at(version: u32, fail: FailAt) -> Self {
        Self {
            fail: Some(fail),
            ..Self::with_version(version)
        }
    }

    /// Fails `fail` with `errno` instead of EINVAL.
    pub fn failing_with(version: u32, fail: FailAt, errno: i32) -> Self {
        Self {
            errno,
            ..Self::failing_at(version, fail)
        }
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call, stage: FailAt) -> io::Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail == Some(stage) {
            return Err(io::Error::from_raw_os_error(self.errno));
        }
        Ok(())
    }
}

impl Kernel for FakeKernel {
    fn probe(&self) -> io::Result<u32> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.version
            .ok_or_else(|| io::Error::from_raw_os_error(libc::EPERM))
    }

    fn create_ruleset(&self, handled: AccessFs) -> io::Result<OwnedFd> {
        self.record(Call::CreateRuleset(handled), FailAt::CreateRuleset)?;
        Ok(File::open("/dev/null")?.into())
    }

    fn add_rule(
        &self,
        _ruleset: BorrowedFd<'_>,
        _anchor: BorrowedFd<'_>,
        allowed: AccessFs,
    ) -> io::Result<()> {
        self.record(Call::AddRule(allowed), FailAt::AddRule)
    }

    fn drop_privileges(&self) -> io::Result<()> {
        self.record(Call::DropPrivileges, FailAt::DropPrivileges)
    }

    fn restrict_self(&self, _ruleset: BorrowedFd<'_>) -> io::Result<()> {
        self.record(Call::RestrictSelf, FailAt::RestrictSelf)
    }
}
