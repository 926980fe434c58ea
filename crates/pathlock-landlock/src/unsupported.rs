//! Fallback for platforms without landlock
//!
//! Keeps the `Locker` contract so callers compile everywhere; anything
//! stricter than `OnlySupported` reports the platform as unsupported.

use pathlock_core::{Abi, PathlockError, Result, Safety};
use std::fmt;

use crate::allow::Allow;

fn not_supported() -> PathlockError {
    PathlockError::NotSupported("landlock not supported on this platform".to_string())
}

#[derive(Debug, Default)]
pub struct Locker {
    // does nothing
}

impl Locker {
    pub fn new<I>(_items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Allow>,
    {
        Locker {}
    }

    pub fn allow(&mut self, _item: impl Into<Allow>) -> &mut Self {
        self
    }

    pub fn len(&self) -> usize {
        0
    }

    pub fn is_empty(&self) -> bool {
        true
    }

    pub fn lock(&self, safety: Safety) -> Result<()> {
        if safety.requires_support() {
            return Err(not_supported());
        }
        log::warn!("landlock not supported on this platform; continuing unrestricted");
        Ok(())
    }
}

impl fmt::Display for Locker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[]")
    }
}

pub fn detect() -> Result<Abi> {
    Err(not_supported())
}

pub fn available() -> bool {
    false
}
