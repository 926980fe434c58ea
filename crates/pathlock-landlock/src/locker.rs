//! Locker: turns a set of path rules into an applied landlock restriction
//!
//! WARNING: a successful lock is irreversible for the calling process and
//! is inherited by every child it starts afterwards.

use pathlock_core::{
    Abi, AccessFs, LockStage, Path, PathlockError, PresetRegistry, Result, Safety,
};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::allow::Allow;
use crate::capabilities::Landlock;
use crate::ruleset::Ruleset;
use crate::sys::{Kernel, LinuxKernel};

/// A set of path rules waiting to be applied
///
/// Rules are keyed by path. When two entries name the same path the first
/// one is kept and later ones are ignored.
///
/// Paths that came from a preset are best effort: if one can no longer be
/// used as a rule anchor when locking, it is skipped. Explicit paths always
/// fail the lock.
#[derive(Debug)]
pub struct Locker<K: Kernel = LinuxKernel> {
    env: Arc<Landlock<K>>,
    paths: BTreeMap<String, Path>,
    from_presets: BTreeSet<String>,
}

impl Locker<LinuxKernel> {
    /// Locker for the running kernel.
    ///
    /// ```ignore
    /// use pathlock_core::{Path, Preset, Safety};
    /// use pathlock_landlock::{Allow, Locker};
    ///
    /// let locker = Locker::new([
    ///     Allow::from(Preset::Shared),
    ///     Path::dir("/srv/data", "rwc").into(),
    ///     Path::file("/etc/hosts", "r").into(),
    /// ]);
    /// locker.lock(Safety::Mandatory)?;
    /// ```
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Allow>,
    {
        Self::with_context(Landlock::system(), items)
    }
}

impl Default for Locker<LinuxKernel> {
    fn default() -> Self {
        Self::new(std::iter::empty::<Allow>())
    }
}

impl<K: Kernel> Locker<K> {
    /// Locker bound to a specific kernel context
    pub fn with_context<I>(env: Arc<Landlock<K>>, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Allow>,
    {
        let mut locker = Self {
            env,
            paths: BTreeMap::new(),
            from_presets: BTreeSet::new(),
        };
        for item in items {
            locker.allow(item);
        }
        locker
    }

    /// Add a path, or every existing member of a preset.
    pub fn allow(&mut self, item: impl Into<Allow>) -> &mut Self {
        self.allow_from(PresetRegistry::system(), item)
    }

    /// Like [`Locker::allow`], expanding presets from `registry`.
    pub fn allow_from(&mut self, registry: &PresetRegistry, item: impl Into<Allow>) -> &mut Self {
        match item.into() {
            Allow::Path(path) => self.insert(path, false),
            Allow::Preset(preset) => {
                for path in registry.paths(preset) {
                    self.insert(path.clone(), true);
                }
            }
        }
        self
    }

    fn insert(&mut self, path: Path, from_preset: bool) {
        match self.paths.entry(path.key().to_string()) {
            Entry::Vacant(slot) => {
                if from_preset {
                    self.from_presets.insert(slot.key().clone());
                }
                slot.insert(path);
            }
            Entry::Occupied(existing) => {
                if existing.get() != &path {
                    log::warn!(
                        "ignoring {} because {} was given first",
                        path,
                        existing.get()
                    );
                }
            }
        }
    }

    /// Rules in path order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.values()
    }

    pub fn get(&self, path: &str) -> Option<&Path> {
        self.paths.get(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn context(&self) -> &Arc<Landlock<K>> {
        &self.env
    }

    /// Restrict the calling process to the rules in this locker.
    ///
    /// How failures surface depends on `safety`:
    /// - `Mandatory`: any failure, including missing kernel support
    /// - `OnlySupported`: failures on a kernel that supports landlock
    /// - `Try`: never; the process may stay unrestricted
    pub fn lock(&self, safety: Safety) -> Result<()> {
        let abi = match self.env.detect() {
            Ok(abi) => abi,
            Err(err) if safety.requires_support() => return Err(err),
            Err(err) => {
                log::warn!("{}; continuing unrestricted", err);
                return Ok(());
            }
        };

        if self.is_empty() && !safety.surfaces_failures() {
            log::debug!("no paths to lock under {}; leaving process unrestricted", safety);
            return Ok(());
        }

        match self.lock_once(abi) {
            Ok(()) => {
                log::info!("landlock {} restricted process to {}", abi, self);
                Ok(())
            }
            Err(err) if safety.surfaces_failures() => Err(err),
            Err(err) => {
                log::warn!("{}; continuing unrestricted", err);
                Ok(())
            }
        }
    }

    fn lock_once(&self, abi: Abi) -> Result<()> {
        if !self.env.begin_restrict() {
            return Err(PathlockError::AlreadyLocked);
        }
        let result = self.apply(abi);
        if result.is_err() {
            self.env.abort_restrict();
        }
        result
    }

    fn apply(&self, abi: Abi) -> Result<()> {
        let mut ruleset = Ruleset::create(self.env.kernel(), AccessFs::handled(abi))?;
        for (key, path) in &self.paths {
            match ruleset.add_path(path, abi) {
                Ok(_) => {}
                Err(err) if self.from_presets.contains(key) && is_unusable_anchor(&err) => {
                    log::debug!("skipping preset member {}: {}", path, err);
                }
                Err(err) => return Err(err),
            }
        }
        log::debug!("attached {} landlock rule(s)", ruleset.rules());
        ruleset.restrict_self()
    }
}

/// The path vanished, or resolves to an inode landlock refuses to anchor on
/// (EBADFD for pipes and sockets reached through `/proc/self/fd`).
fn is_unusable_anchor(err: &PathlockError) -> bool {
    match err {
        PathlockError::LockFailed {
            stage: LockStage::OpenPath(_),
            ..
        } => true,
        PathlockError::LockFailed {
            stage: LockStage::AddRule(_),
            source,
        } => source.raw_os_error() == Some(libc::EBADFD),
        _ => false,
    }
}

impl<K: Kernel> fmt::Display for Locker<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .paths
            .values()
            .map(|p| format!("{}:{}", p.mode(), p.path()))
            .collect();
        write!(f, "[{}]", entries.join(" "))
    }
}
