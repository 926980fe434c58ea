//! JSON policy documents
//!
//! ```json
//! {
//!     "safety": "mandatory",
//!     "presets": ["shared", "stdio"],
//!     "paths": ["d:rwc:/srv/data", "f:r:/etc/hosts"]
//! }
//! ```
//!
//! Every field is optional. Explicit paths are inserted before preset
//! members, so a path listed here wins over the same path in a preset.

use pathlock_core::{Path, PathlockError, Preset, Result, Safety};
use pathlock_landlock::{Allow, Locker};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Policy {
    pub safety: Safety,
    pub presets: Vec<Preset>,
    pub paths: Vec<Path>,
}

impl Policy {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PathlockError::Policy(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading policy from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| PathlockError::Policy(format!("{}: {}", path.display(), e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PathlockError::Policy(e.to_string()))
    }

    /// Append more entries after the ones already in this policy.
    pub fn extend<P, Q>(&mut self, presets: P, paths: Q)
    where
        P: IntoIterator<Item = Preset>,
        Q: IntoIterator<Item = Path>,
    {
        self.presets.extend(presets);
        self.paths.extend(paths);
    }

    /// Entries in insertion order: explicit paths, then presets
    pub fn entries(&self) -> impl Iterator<Item = Allow> + '_ {
        self.paths
            .iter()
            .map(Allow::from)
            .chain(self.presets.iter().copied().map(Allow::from))
    }

    pub fn locker(&self) -> Locker {
        Locker::new(self.entries())
    }

    /// Lock the calling process with this policy's safety level.
    pub fn lock(&self) -> Result<()> {
        self.locker().lock(self.safety)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_full_document() {
        let policy = Policy::from_json(
            r#"{
                "safety": "only-supported",
                "presets": ["shared", "dns"],
                "paths": ["d:rwc:/srv/data", "f:r:/etc/hosts"]
            }"#,
        )
        .unwrap();
        assert_eq!(policy.safety, Safety::OnlySupported);
        assert_eq!(policy.presets, vec![Preset::Shared, Preset::Dns]);
        assert_eq!(
            policy.paths,
            vec![
                Path::dir("/srv/data", "rwc"),
                Path::file("/etc/hosts", "r")
            ]
        );
    }

    #[test]
    fn fields_default() {
        let policy = Policy::from_json("{}").unwrap();
        assert_eq!(policy, Policy::default());
        assert_eq!(policy.safety, Safety::Mandatory);
    }

    #[test]
    fn rejects_bad_rules() {
        let cases = [
            r#"{"paths": ["z:r:/etc"]}"#,
            r#"{"paths": ["f:rq:/etc/hosts"]}"#,
            r#"{"paths": [""]}"#,
            r#"{"presets": ["libc"]}"#,
            r#"{"safety": "enforce"}"#,
            r#"{"rules": []}"#,
            "not json",
        ];
        for json in cases {
            let err = Policy::from_json(json).unwrap_err();
            assert!(matches!(err, PathlockError::Policy(_)), "{}", json);
        }
    }

    #[test]
    fn json_round_trip() {
        let policy = Policy {
            safety: Safety::Try,
            presets: vec![Preset::Tmp],
            paths: vec![Path::file("/usr/bin/env", "rx")],
        };
        let json = policy.to_json().unwrap();
        assert!(json.contains("\"f:rx:/usr/bin/env\""));
        assert_eq!(Policy::from_json(&json).unwrap(), policy);
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"paths": ["d:r:/etc"]}}"#).unwrap();
        let policy = Policy::from_file(file.path()).unwrap();
        assert_eq!(policy.paths, vec![Path::dir("/etc", "r")]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Policy::from_file("/nonexistent/pathlock/policy.json").unwrap_err();
        assert!(matches!(err, PathlockError::Io(_)));
    }

    #[test]
    fn explicit_paths_come_before_presets() {
        let mut policy = Policy {
            presets: vec![Preset::Tmp],
            ..Default::default()
        };
        policy.extend(vec![Preset::Dns], vec![Path::dir("/tmp", "r")]);
        let entries: Vec<Allow> = policy.entries().collect();
        assert_eq!(
            entries,
            vec![
                Allow::Path(Path::dir("/tmp", "r")),
                Allow::Preset(Preset::Tmp),
                Allow::Preset(Preset::Dns),
            ]
        );
    }

    #[test]
    fn trailing_space_in_path_survives_round_trip() {
        let policy = Policy {
            paths: vec![Path::dir("/srv/x ", "r")],
            ..Default::default()
        };
        let back = Policy::from_json(&policy.to_json().unwrap()).unwrap();
        assert_eq!(back.paths[0].path(), "/srv/x ");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn file_path_beats_flag_path() {
        let mut policy = Policy::from_json(r#"{"paths": ["d:r:/srv"]}"#).unwrap();
        policy.extend(Vec::<Preset>::new(), [Path::dir("/srv", "rwc")]);
        let locker = policy.locker();
        assert_eq!(locker.get("/srv"), Some(&Path::dir("/srv", "r")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn locker_keeps_explicit_mode_over_preset() {
        let policy = Policy {
            presets: vec![Preset::Tmp],
            paths: vec![Path::dir("/tmp", "r")],
            ..Default::default()
        };
        let locker = policy.locker();
        assert_eq!(locker.get("/tmp"), Some(&Path::dir("/tmp", "r")));
    }
}
