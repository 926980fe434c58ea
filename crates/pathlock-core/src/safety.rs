//! Failure policy for applying a lock

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PathlockError;

/// How a lock attempt behaves when landlock is missing or fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Safety {
    /// Any failure is an error, including a kernel without landlock.
    #[default]
    Mandatory,

    /// Failures are errors only when the kernel supports landlock.
    /// Unsupported kernels run unrestricted.
    OnlySupported,

    /// Never an error. The process may be left unrestricted.
    Try,
}

impl Safety {
    /// Whether an unsupported kernel should be reported as an error
    pub fn requires_support(&self) -> bool {
        matches!(self, Safety::Mandatory)
    }

    /// Whether a failed lock sequence should be reported as an error
    pub fn surfaces_failures(&self) -> bool {
        !matches!(self, Safety::Try)
    }

    pub fn all() -> [Safety; 3] {
        [Safety::Mandatory, Safety::OnlySupported, Safety::Try]
    }

    fn name(&self) -> &'static str {
        match self {
            Safety::Mandatory => "mandatory",
            Safety::OnlySupported => "only-supported",
            Safety::Try => "try",
        }
    }
}

impl fmt::Display for Safety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Safety {
    type Err = PathlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Safety::all()
            .into_iter()
            .find(|safety| safety.name() == s)
            .ok_or_else(|| PathlockError::Policy(format!("unknown safety level: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_mandatory() {
        assert_eq!(Safety::default(), Safety::Mandatory);
    }

    #[test]
    fn support_and_failure_rules() {
        assert!(Safety::Mandatory.requires_support());
        assert!(!Safety::OnlySupported.requires_support());
        assert!(!Safety::Try.requires_support());

        assert!(Safety::Mandatory.surfaces_failures());
        assert!(Safety::OnlySupported.surfaces_failures());
        assert!(!Safety::Try.surfaces_failures());
    }

    #[test]
    fn names_round_trip() {
        for safety in Safety::all() {
            assert_eq!(safety.to_string().parse::<Safety>().unwrap(), safety);
        }
        assert!("enforce".parse::<Safety>().is_err());
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&Safety::OnlySupported).unwrap();
        assert_eq!(json, "\"only-supported\"");
        let safety: Safety = serde_json::from_str("\"try\"").unwrap();
        assert_eq!(safety, Safety::Try);
    }
}
