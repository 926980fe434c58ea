//! Landlock ruleset handle
//!
//! A [`Ruleset`] is created open, collects one rule per path, and is
//! consumed by [`Ruleset::restrict_self`]. The descriptor closes on drop,
//! so a ruleset can never be applied twice or gain rules after applying.

use pathlock_core::{Abi, AccessFs, LockStage, Path, PathlockError, Result};
use std::fs::{File, OpenOptions};
use std::os::fd::{AsFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;

use crate::sys::Kernel;

pub struct Ruleset<'k, K: Kernel> {
    kernel: &'k K,
    fd: OwnedFd,
    handled: AccessFs,
    rules: usize,
}

impl<'k, K: Kernel> Ruleset<'k, K> {
    /// Open a ruleset handling `handled` rights.
    pub fn create(kernel: &'k K, handled: AccessFs) -> Result<Self> {
        let fd = kernel
            .create_ruleset(handled)
            .map_err(|e| PathlockError::lock_failed(LockStage::CreateRuleset, e))?;
        log::debug!("created landlock ruleset handling {}", handled);
        Ok(Self {
            kernel,
            fd,
            handled,
            rules: 0,
        })
    }

    pub fn handled(&self) -> AccessFs {
        self.handled
    }

    /// Number of rules attached so far
    pub fn rules(&self) -> usize {
        self.rules
    }

    /// Attach a rule granting `path` its mode under `abi`.
    ///
    /// Rights that only make sense on directories are dropped when the path
    /// turns out not to be one. Returns `false` when nothing was left to
    /// grant and no rule was attached.
    pub fn add_path(&mut self, path: &Path, abi: Abi) -> Result<bool> {
        let anchor = open_anchor(path)?;
        let is_dir = anchor
            .metadata()
            .map_err(|e| PathlockError::lock_failed(LockStage::OpenPath(path.path().to_string()), e))?
            .is_dir();

        let mut allowed = path.access(abi) & self.handled;
        if !is_dir {
            let narrowed = allowed & AccessFs::FILE;
            if narrowed != allowed {
                log::debug!(
                    "{} is not a directory, narrowing {} to {}",
                    path,
                    allowed,
                    narrowed
                );
            }
            allowed = narrowed;
        }

        if allowed.is_empty() {
            log::debug!("{} grants nothing applicable, skipping rule", path);
            return Ok(false);
        }

        self.kernel
            .add_rule(self.fd.as_fd(), anchor.as_fd(), allowed)
            .map_err(|e| PathlockError::lock_failed(LockStage::AddRule(path.path().to_string()), e))?;
        self.rules += 1;
        log::debug!("landlock rule {} -> {}", path, allowed);
        Ok(true)
    }

    /// Drop privilege escalation and enforce the ruleset on this process.
    pub fn restrict_self(self) -> Result<()> {
        self.kernel
            .drop_privileges()
            .map_err(|e| PathlockError::lock_failed(LockStage::NoNewPrivs, e))?;
        self.kernel
            .restrict_self(self.fd.as_fd())
            .map_err(|e| PathlockError::lock_failed(LockStage::RestrictSelf, e))?;
        Ok(())
    }
}

// O_PATH: the descriptor only names the location, it grants no access.
fn open_anchor(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_PATH | libc::O_CLOEXEC)
        .open(path.path())
        .map_err(|e| PathlockError::lock_failed(LockStage::OpenPath(path.path().to_string()), e))
}
