//! Landlock filesystem access rights
//!
//! Maps a rule's mode string onto the kernel's `LANDLOCK_ACCESS_FS_*` bits.
//! Which bits exist at all depends on the ABI version of the running kernel.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::path::Kind;

// Access rights, in kernel bit order
const LANDLOCK_ACCESS_FS_EXECUTE: u64 = 1;
const LANDLOCK_ACCESS_FS_WRITE_FILE: u64 = 1 << 1;
const LANDLOCK_ACCESS_FS_READ_FILE: u64 = 1 << 2;
const LANDLOCK_ACCESS_FS_READ_DIR: u64 = 1 << 3;
const LANDLOCK_ACCESS_FS_REMOVE_DIR: u64 = 1 << 4;
const LANDLOCK_ACCESS_FS_REMOVE_FILE: u64 = 1 << 5;
const LANDLOCK_ACCESS_FS_MAKE_CHAR: u64 = 1 << 6;
const LANDLOCK_ACCESS_FS_MAKE_DIR: u64 = 1 << 7;
const LANDLOCK_ACCESS_FS_MAKE_REG: u64 = 1 << 8;
const LANDLOCK_ACCESS_FS_MAKE_SOCK: u64 = 1 << 9;
const LANDLOCK_ACCESS_FS_MAKE_FIFO: u64 = 1 << 10;
const LANDLOCK_ACCESS_FS_MAKE_BLOCK: u64 = 1 << 11;
const LANDLOCK_ACCESS_FS_MAKE_SYM: u64 = 1 << 12;
const LANDLOCK_ACCESS_FS_REFER: u64 = 1 << 13;
const LANDLOCK_ACCESS_FS_TRUNCATE: u64 = 1 << 14;
const LANDLOCK_ACCESS_FS_IOCTL_DEV: u64 = 1 << 15;

const ACCESS_FS_V1: u64 = LANDLOCK_ACCESS_FS_EXECUTE
    | LANDLOCK_ACCESS_FS_WRITE_FILE
    | LANDLOCK_ACCESS_FS_READ_FILE
    | LANDLOCK_ACCESS_FS_READ_DIR
    | LANDLOCK_ACCESS_FS_REMOVE_DIR
    | LANDLOCK_ACCESS_FS_REMOVE_FILE
    | LANDLOCK_ACCESS_FS_MAKE_CHAR
    | LANDLOCK_ACCESS_FS_MAKE_DIR
    | LANDLOCK_ACCESS_FS_MAKE_REG
    | LANDLOCK_ACCESS_FS_MAKE_SOCK
    | LANDLOCK_ACCESS_FS_MAKE_FIFO
    | LANDLOCK_ACCESS_FS_MAKE_BLOCK
    | LANDLOCK_ACCESS_FS_MAKE_SYM;
const ACCESS_FS_V2: u64 = ACCESS_FS_V1 | LANDLOCK_ACCESS_FS_REFER;
const ACCESS_FS_V3: u64 = ACCESS_FS_V2 | LANDLOCK_ACCESS_FS_TRUNCATE;
const ACCESS_FS_V5: u64 = ACCESS_FS_V3 | LANDLOCK_ACCESS_FS_IOCTL_DEV;

// Rights the kernel accepts on a rule anchored at a non-directory
const ACCESS_FILE: u64 = LANDLOCK_ACCESS_FS_EXECUTE
    | LANDLOCK_ACCESS_FS_WRITE_FILE
    | LANDLOCK_ACCESS_FS_READ_FILE
    | LANDLOCK_ACCESS_FS_TRUNCATE
    | LANDLOCK_ACCESS_FS_IOCTL_DEV;

const CREATE_ACCESS: u64 = LANDLOCK_ACCESS_FS_MAKE_REG
    | LANDLOCK_ACCESS_FS_MAKE_SYM
    | LANDLOCK_ACCESS_FS_MAKE_FIFO
    | LANDLOCK_ACCESS_FS_MAKE_SOCK
    | LANDLOCK_ACCESS_FS_MAKE_BLOCK
    | LANDLOCK_ACCESS_FS_REMOVE_FILE;

/// Landlock ABI version reported by the kernel.
///
/// Version 0 means the kernel does not support landlock at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Abi(pub u32);

impl Abi {
    pub const UNSUPPORTED: Abi = Abi(0);
    pub const V1: Abi = Abi(1);
    pub const V2: Abi = Abi(2);
    pub const V3: Abi = Abi(3);
    pub const V4: Abi = Abi(4);
    pub const V5: Abi = Abi(5);

    pub fn version(&self) -> u32 {
        self.0
    }

    pub fn is_supported(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Abi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A set of landlock filesystem access rights
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessFs(u64);

impl AccessFs {
    pub const EMPTY: AccessFs = AccessFs(0);
    pub const EXECUTE: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_EXECUTE);
    pub const WRITE_FILE: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_WRITE_FILE);
    pub const READ_FILE: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_READ_FILE);
    pub const READ_DIR: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_READ_DIR);
    pub const REMOVE_DIR: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_REMOVE_DIR);
    pub const REMOVE_FILE: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_REMOVE_FILE);
    pub const MAKE_CHAR: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_MAKE_CHAR);
    pub const MAKE_DIR: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_MAKE_DIR);
    pub const MAKE_REG: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_MAKE_REG);
    pub const MAKE_SOCK: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_MAKE_SOCK);
    pub const MAKE_FIFO: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_MAKE_FIFO);
    pub const MAKE_BLOCK: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_MAKE_BLOCK);
    pub const MAKE_SYM: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_MAKE_SYM);
    pub const REFER: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_REFER);
    pub const TRUNCATE: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_TRUNCATE);
    pub const IOCTL_DEV: AccessFs = AccessFs(LANDLOCK_ACCESS_FS_IOCTL_DEV);

    /// Rights that may be granted on a rule whose anchor is not a directory
    pub const FILE: AccessFs = AccessFs(ACCESS_FILE);

    pub const fn from_bits(bits: u64) -> Self {
        AccessFs(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn contains(&self, other: AccessFs) -> bool {
        self.0 & other.0 == other.0
    }

    /// Every right the given ABI version knows how to handle.
    ///
    /// Versions newer than the ones listed here handle the newest known set.
    pub fn handled(abi: Abi) -> AccessFs {
        let bits = match abi.0 {
            0 => 0,
            1 => ACCESS_FS_V1,
            2 => ACCESS_FS_V2,
            3 | 4 => ACCESS_FS_V3,
            _ => ACCESS_FS_V5,
        };
        AccessFs(bits)
    }

    /// Compute the rights granted by `mode` on a path of the given kind.
    ///
    /// - `r` reads files, and lists directories
    /// - `w` writes files (plus truncate from v3, device ioctl from v5)
    /// - `x` executes
    /// - `c` creates and removes entries; directories also get mkdir/rmdir,
    ///   and from v2 the refer right for cross-directory rename and link
    pub fn from_mode(mode: &str, kind: Kind, abi: Abi) -> AccessFs {
        let dir = kind == Kind::Dir;
        let mut allow = 0u64;
        for c in mode.chars() {
            match c {
                'r' => {
                    allow |= LANDLOCK_ACCESS_FS_READ_FILE;
                    if dir {
                        allow |= LANDLOCK_ACCESS_FS_READ_DIR;
                    }
                }
                'w' => {
                    allow |= LANDLOCK_ACCESS_FS_WRITE_FILE;
                    if abi >= Abi::V3 {
                        allow |= LANDLOCK_ACCESS_FS_TRUNCATE;
                    }
                    if abi >= Abi::V5 {
                        allow |= LANDLOCK_ACCESS_FS_IOCTL_DEV;
                    }
                }
                'x' => allow |= LANDLOCK_ACCESS_FS_EXECUTE,
                'c' => {
                    allow |= CREATE_ACCESS;
                    if dir {
                        allow |= LANDLOCK_ACCESS_FS_MAKE_DIR | LANDLOCK_ACCESS_FS_REMOVE_DIR;
                    }
                    if dir && abi > Abi::V1 {
                        allow |= LANDLOCK_ACCESS_FS_REFER;
                    }
                }
                // modes are validated on construction
                _ => {}
            }
        }
        AccessFs(allow)
    }

    fn names(&self) -> Vec<&'static str> {
        const NAMES: [(u64, &str); 16] = [
            (LANDLOCK_ACCESS_FS_EXECUTE, "execute"),
            (LANDLOCK_ACCESS_FS_WRITE_FILE, "write_file"),
            (LANDLOCK_ACCESS_FS_READ_FILE, "read_file"),
            (LANDLOCK_ACCESS_FS_READ_DIR, "read_dir"),
            (LANDLOCK_ACCESS_FS_REMOVE_DIR, "remove_dir"),
            (LANDLOCK_ACCESS_FS_REMOVE_FILE, "remove_file"),
            (LANDLOCK_ACCESS_FS_MAKE_CHAR, "make_char"),
            (LANDLOCK_ACCESS_FS_MAKE_DIR, "make_dir"),
            (LANDLOCK_ACCESS_FS_MAKE_REG, "make_reg"),
            (LANDLOCK_ACCESS_FS_MAKE_SOCK, "make_sock"),
            (LANDLOCK_ACCESS_FS_MAKE_FIFO, "make_fifo"),
            (LANDLOCK_ACCESS_FS_MAKE_BLOCK, "make_block"),
            (LANDLOCK_ACCESS_FS_MAKE_SYM, "make_sym"),
            (LANDLOCK_ACCESS_FS_REFER, "refer"),
            (LANDLOCK_ACCESS_FS_TRUNCATE, "truncate"),
            (LANDLOCK_ACCESS_FS_IOCTL_DEV, "ioctl_dev"),
        ];
        NAMES
            .iter()
            .filter(|(bit, _)| self.0 & bit != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for AccessFs {
    type Output = AccessFs;

    fn bitor(self, rhs: AccessFs) -> AccessFs {
        AccessFs(self.0 | rhs.0)
    }
}

impl BitOrAssign for AccessFs {
    fn bitor_assign(&mut self, rhs: AccessFs) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for AccessFs {
    type Output = AccessFs;

    fn bitand(self, rhs: AccessFs) -> AccessFs {
        AccessFs(self.0 & rhs.0)
    }
}

impl fmt::Debug for AccessFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessFs({:#x}: {})", self.0, self.names().join("|"))
    }
}

impl fmt::Display for AccessFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        write!(f, "{}", self.names().join(","))
    }
}
