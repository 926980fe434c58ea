//! Path rules: a filesystem location plus the operations allowed on it

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::access::{Abi, AccessFs};
use crate::error::{PathlockError, Result};

/// Whether a rule is anchored at a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    File,
    Dir,
}

impl Kind {
    fn tag(&self) -> &'static str {
        match self {
            Kind::File => "f",
            Kind::Dir => "d",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Kind::File => "file",
            Kind::Dir => "dir",
        }
    }
}

/// A filesystem path and the mode of access granted on it.
///
/// The mode is any combination of:
/// - `r` - read
/// - `w` - write
/// - `c` - create and remove
/// - `x` - execute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
    mode: String,
    path: String,
    kind: Kind,
}

impl Path {
    /// Rule for a regular file, FIFO, socket or symlink.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or `mode` is not made of `rwcx`.
    pub fn file(path: impl Into<String>, mode: impl Into<String>) -> Path {
        Path::new(path.into(), mode.into(), Kind::File)
    }

    /// Rule for a directory and everything beneath it.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or `mode` is not made of `rwcx`.
    pub fn dir(path: impl Into<String>, mode: impl Into<String>) -> Path {
        Path::new(path.into(), mode.into(), Kind::Dir)
    }

    fn new(path: String, mode: String, kind: Kind) -> Path {
        if !is_proper_path(&path) {
            panic!("improper path");
        }
        if !is_proper_mode(&mode) {
            panic!("improper mode {:?}", mode);
        }
        Path { mode, path, kind }
    }

    /// Parse a rule of the form `"<kind>:<mode>:<path>"`.
    ///
    /// `kind` is `d` or `f`. Everything after the second colon is the path,
    /// so paths may contain colons themselves.
    ///
    /// `"d:rw:/srv/data"` allows reading and writing beneath `/srv/data`,
    /// `"f:x:/bin/cat"` allows executing `/bin/cat`.
    pub fn parse(s: &str) -> Result<Path> {
        Path::parse_exact(s.trim())
    }

    /// [`Path::parse`] without trimming; used for the serde form.
    fn parse_exact(s: &str) -> Result<Path> {
        if s.is_empty() {
            return Err(PathlockError::ImproperPath);
        }
        let mut tokens = s.splitn(3, ':');
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(kind), Some(mode), Some(path)) => Path::from_parts(kind, mode, path),
            _ => Err(PathlockError::ImproperPath),
        }
    }

    fn from_parts(kind: &str, mode: &str, path: &str) -> Result<Path> {
        if !is_proper_type(kind) {
            return Err(PathlockError::ImproperType);
        }
        if !is_proper_mode(mode) {
            return Err(PathlockError::ImproperMode);
        }
        if !is_proper_path(path) {
            return Err(PathlockError::ImproperPath);
        }
        let kind = if kind == "d" { Kind::Dir } else { Kind::File };
        Ok(Path {
            mode: mode.to_string(),
            path: path.to_string(),
            kind,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == Kind::Dir
    }

    /// De-duplication key; two rules on the same location collide.
    pub fn key(&self) -> &str {
        &self.path
    }

    /// Rights this rule grants under the given ABI version.
    pub fn access(&self, abi: Abi) -> AccessFs {
        AccessFs::from_mode(&self.mode, self.kind, abi)
    }

    /// The `"<kind>:<mode>:<path>"` form accepted by [`Path::parse`].
    pub fn to_rule_string(&self) -> String {
        format!("{}:{}:{}", self.kind.tag(), self.mode, self.path)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{}:{})", self.mode, self.kind.name(), self.path)
    }
}

impl FromStr for Path {
    type Err = PathlockError;

    fn from_str(s: &str) -> Result<Path> {
        Path::parse(s)
    }
}

impl TryFrom<String> for Path {
    type Error = PathlockError;

    fn try_from(s: String) -> Result<Path> {
        Path::parse_exact(&s)
    }
}

impl From<Path> for String {
    fn from(p: Path) -> String {
        p.to_rule_string()
    }
}

/// Whether `filetype` is `d` or `f`.
pub fn is_proper_type(filetype: &str) -> bool {
    filetype == "d" || filetype == "f"
}

/// Whether `mode` is non-empty and made only of `rwcx`.
pub fn is_proper_mode(mode: &str) -> bool {
    !mode.is_empty() && mode.bytes().all(|b| matches!(b, b'r' | b'w' | b'c' | b'x'))
}

/// Whether `path` is usable as a rule location.
pub fn is_proper_path(path: &str) -> bool {
    !path.is_empty()
}
