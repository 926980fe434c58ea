//! Named bundles of commonly needed paths
//!
//! Distributions and containers differ in which of these files exist, so
//! every bundle is filtered against the live filesystem once per process.
//! Missing entries are dropped instead of failing the lock, and so are
//! entries that resolve to something a rule cannot be anchored on, such as
//! `/dev/stdout` while standard output is a pipe.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::PathlockError;
use crate::path::Path;

/// A named bundle of paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Dynamic linker configuration and shared libraries
    Shared,
    /// Standard I/O devices, locale and timezone data
    Stdio,
    /// Terminal devices and terminfo
    Tty,
    /// System temporary directories
    Tmp,
    /// Machine and process introspection files
    VmInfo,
    /// Name resolution configuration
    Dns,
    /// TLS trust roots
    Certs,
}

impl Preset {
    pub fn all() -> [Preset; 7] {
        [
            Preset::Shared,
            Preset::Stdio,
            Preset::Tty,
            Preset::Tmp,
            Preset::VmInfo,
            Preset::Dns,
            Preset::Certs,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Shared => "shared",
            Preset::Stdio => "stdio",
            Preset::Tty => "tty",
            Preset::Tmp => "tmp",
            Preset::VmInfo => "vminfo",
            Preset::Dns => "dns",
            Preset::Certs => "certs",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Shared => "Shared libraries and linker config for dynamically linked binaries",
            Preset::Stdio => "Standard I/O devices, locale and timezone data",
            Preset::Tty => "Terminal devices and terminfo databases",
            Preset::Tmp => "Read, write and create in the system tmp space",
            Preset::VmInfo => "CPU, memory and kernel introspection under /proc and /sys",
            Preset::Dns => "Host and resolver configuration for name lookups",
            Preset::Certs => "CA certificate bundles for TLS validation",
        }
    }

    /// Members of this preset that exist on the running system.
    pub fn paths(&self) -> &'static [Path] {
        PresetRegistry::system().paths(*self)
    }

    /// Every member of this preset, whether or not it exists here.
    pub fn members(&self) -> Vec<Path> {
        match self {
            Preset::Shared => vec![
                Path::file("/dev/null", "rw"),
                Path::dir("/lib", "rx"),
                Path::dir("/lib64", "rx"),
                Path::dir("/usr/lib", "rx"),
                Path::dir("/usr/lib64", "rx"),
                Path::dir("/usr/local/lib", "rx"),
                Path::dir("/usr/local/lib64", "rx"),
                Path::file("/etc/ld.so.conf", "r"),
                Path::file("/etc/ld.so.cache", "r"),
                Path::dir("/etc/ld.so.conf.d", "r"),
                Path::file("/etc/ld.so.preload", "r"),
            ],
            Preset::Stdio => vec![
                Path::file("/dev/full", "rw"),
                Path::file("/dev/zero", "r"),
                Path::file("/dev/fd", "r"),
                Path::file("/dev/stdin", "rw"),
                Path::file("/dev/stdout", "rw"),
                Path::file("/dev/stderr", "rw"),
                Path::file("/dev/urandom", "r"),
                Path::file("/dev/log", "w"),
                Path::dir("/usr/share/locale", "r"),
                Path::file("/proc/self/cmdline", "r"),
                Path::dir("/usr/share/zoneinfo", "r"),
                Path::dir("/usr/share/common-licenses", "r"),
                Path::file("/proc/sys/kernel/ngroups_max", "r"),
                Path::file("/proc/sys/kernel/cap_last_cap", "r"),
                Path::file("/proc/sys/vm/overcommit_memory", "r"),
            ],
            Preset::Tty => vec![
                Path::file("/dev/tty", "rw"),
                Path::file("/dev/console", "rw"),
                Path::dir("/etc/terminfo", "r"),
                Path::dir("/lib/terminfo", "r"),
                Path::dir("/usr/lib/terminfo", "r"),
                Path::dir("/usr/share/terminfo", "r"),
            ],
            Preset::Tmp => vec![Path::dir("/tmp", "rwc"), Path::dir("/var/tmp", "rwc")],
            Preset::VmInfo => vec![
                Path::file("/proc/stat", "r"),
                Path::file("/proc/meminfo", "r"),
                Path::file("/proc/cpuinfo", "r"),
                Path::file("/proc/diskstats", "r"),
                Path::file("/proc/self/maps", "r"),
                Path::file("/proc/sys/kernel/version", "r"),
                Path::dir("/sys/devices/system/cpu", "r"),
            ],
            Preset::Dns => vec![
                Path::file("/etc/hosts", "r"),
                Path::file("/etc/hostname", "r"),
                Path::file("/etc/services", "r"),
                Path::file("/etc/protocols", "r"),
                Path::file("/etc/resolv.conf", "r"),
                Path::file("/etc/nsswitch.conf", "r"),
                Path::file("/etc/host.conf", "r"),
                Path::file("/etc/gai.conf", "r"),
            ],
            Preset::Certs => vec![
                Path::file("/etc/ssl/certs/ca-certificates.crt", "r"),
                Path::file("/etc/ssl/cert.pem", "r"),
                Path::file("/etc/pki/tls/certs/ca-bundle.crt", "r"),
                Path::dir("/etc/ssl/certs", "r"),
                Path::dir("/etc/pki/ca-trust/extracted", "r"),
            ],
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = PathlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::all()
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| PathlockError::Policy(format!("unknown preset: {}", s)))
    }
}

/// Preset bundles filtered down to the paths that exist
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    bundles: Vec<(Preset, Vec<Path>)>,
}

impl PresetRegistry {
    /// Build a registry keeping only the members for which `exists` holds.
    pub fn load<F>(exists: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let bundles = Preset::all()
            .into_iter()
            .map(|preset| {
                let (kept, dropped): (Vec<Path>, Vec<Path>) = preset
                    .members()
                    .into_iter()
                    .partition(|p| exists(p.path()));
                if !dropped.is_empty() {
                    log::debug!(
                        "preset {}: skipping {} missing path(s)",
                        preset,
                        dropped.len()
                    );
                }
                (preset, kept)
            })
            .collect();
        Self { bundles }
    }

    /// Registry filtered against the live filesystem, loaded once per process
    pub fn system() -> &'static PresetRegistry {
        static SYSTEM: OnceLock<PresetRegistry> = OnceLock::new();
        SYSTEM.get_or_init(|| PresetRegistry::load(is_anchorable))
    }

    pub fn paths(&self, preset: Preset) -> &[Path] {
        self.bundles
            .iter()
            .find(|(p, _)| *p == preset)
            .map(|(_, paths)| paths.as_slice())
            .unwrap_or(&[])
    }
}

/// Whether `path` names a location on a mounted filesystem.
///
/// Links through `/proc/self/fd` to pipes, sockets and anonymous inodes
/// read back as `pipe:[..]`, `socket:[..]` or `anon_inode:..`, which never
/// resolve to an absolute path.
pub fn is_anchorable(path: &str) -> bool {
    match std::fs::canonicalize(path) {
        Ok(resolved) => resolved.is_absolute(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_members_are_dropped() {
        let registry = PresetRegistry::load(|path| path == "/tmp" || path == "/etc/hosts");
        assert_eq!(registry.paths(Preset::Tmp), &[Path::dir("/tmp", "rwc")]);
        assert_eq!(registry.paths(Preset::Dns), &[Path::file("/etc/hosts", "r")]);
        assert!(registry.paths(Preset::Certs).is_empty());
        assert!(registry.paths(Preset::Shared).is_empty());
    }

    #[test]
    fn everything_kept_when_everything_exists() {
        let registry = PresetRegistry::load(|_| true);
        for preset in Preset::all() {
            assert_eq!(registry.paths(preset), preset.members().as_slice());
        }
    }

    #[test]
    fn members_are_unique_within_a_preset() {
        for preset in Preset::all() {
            let members = preset.members();
            let mut keys: Vec<&str> = members.iter().map(|p| p.key()).collect();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), members.len(), "duplicate in {}", preset);
        }
    }

    #[test]
    fn system_registry_only_holds_existing_paths() {
        for preset in Preset::all() {
            for path in preset.paths() {
                assert!(std::fs::metadata(path.path()).is_ok(), "{}", path);
            }
        }
    }

    #[test]
    fn anchorable_paths() {
        assert!(is_anchorable("/"));
        assert!(is_anchorable("/dev/null"));
        assert!(!is_anchorable("/nonexistent/pathlock/anchor"));
        assert!(!is_anchorable(""));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn sockets_behind_proc_fd_are_not_anchorable() {
        use std::os::fd::AsRawFd;
        use std::os::unix::net::UnixStream;

        let (left, _right) = UnixStream::pair().unwrap();
        let link = format!("/proc/self/fd/{}", left.as_raw_fd());
        assert!(std::fs::symlink_metadata(&link).is_ok());
        assert!(!is_anchorable(&link));
    }

    #[test]
    fn names_round_trip() {
        for preset in Preset::all() {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), preset);
        }
        assert!("libs".parse::<Preset>().is_err());
        let json = serde_json::to_string(&Preset::VmInfo).unwrap();
        assert_eq!(json, "\"vminfo\"");
    }
}
