//! Recording policy: decides when captured traffic is persisted.
//!
//! The policy is resolved exactly once per process (see
//! [`crate::configuration::config::Config`]) and never re-read, so changing
//! `RECORD_BROWSER_TRAFFIC` mid-run has no effect.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Environment variable selecting the recording policy.
pub const POLICY_ENV_VAR: &str = "RECORD_BROWSER_TRAFFIC";

/// When to persist a capture artifact for a finished unit of work.
///
/// | Variant        | token          | save on success | save on failure |
/// |----------------|----------------|-----------------|-----------------|
/// | `Off`          | `off`          | no              | no              |
/// | `FailuresOnly` | `failuresOnly` | no              | yes             |
/// | `Always`       | `always`       | yes             | yes             |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingPolicy {
    Off,
    #[default]
    FailuresOnly,
    Always,
}

impl RecordingPolicy {
    pub const ALL: [RecordingPolicy; 3] = [
        RecordingPolicy::Off,
        RecordingPolicy::FailuresOnly,
        RecordingPolicy::Always,
    ];

    /// Canonical configuration token for this variant.
    pub fn token(self) -> &'static str {
        match self {
            RecordingPolicy::Off => "off",
            RecordingPolicy::FailuresOnly => "failuresOnly",
            RecordingPolicy::Always => "always",
        }
    }

    /// Matches `token` case-sensitively against the canonical tokens,
    /// returning `default` when nothing matches.
    pub fn resolve(token: &str, default: RecordingPolicy) -> RecordingPolicy {
        match Self::ALL.into_iter().find(|p| p.token() == token) {
            Some(policy) => policy,
            None => {
                debug!(
                    "Unknown recording policy token {:?}, using {}",
                    token,
                    default.token()
                );
                default
            }
        }
    }

    /// [`resolve`](Self::resolve) with the `failuresOnly` fallback.
    pub fn from_token(token: &str) -> RecordingPolicy {
        Self::resolve(token, RecordingPolicy::FailuresOnly)
    }

    /// Reads [`POLICY_ENV_VAR`]; absent or unknown means `failuresOnly`.
    pub fn from_env() -> RecordingPolicy {
        match std::env::var(POLICY_ENV_VAR) {
            Ok(token) => Self::from_token(&token),
            Err(_) => RecordingPolicy::FailuresOnly,
        }
    }

    pub fn save_on_success(self) -> bool {
        matches!(self, RecordingPolicy::Always)
    }

    pub fn save_on_failure(self) -> bool {
        matches!(self, RecordingPolicy::FailuresOnly | RecordingPolicy::Always)
    }

    pub fn is_recording_enabled(self) -> bool {
        self.save_on_success() || self.save_on_failure()
    }
}

impl fmt::Display for RecordingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// Never fails: unknown tokens map to the safe default.
impl FromStr for RecordingPolicy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_token(s))
    }
}

impl Serialize for RecordingPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for RecordingPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Self::from_token(&token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_resolve_canonical_tokens() {
        assert_eq!(RecordingPolicy::from_token("off"), RecordingPolicy::Off);
        assert_eq!(
            RecordingPolicy::from_token("failuresOnly"),
            RecordingPolicy::FailuresOnly
        );
        assert_eq!(RecordingPolicy::from_token("always"), RecordingPolicy::Always);
    }

    #[test]
    fn test_resolve_unknown_falls_back() {
        for token in ["", "OFF", "Always", "failures-only", "never", " off"] {
            assert_eq!(
                RecordingPolicy::from_token(token),
                RecordingPolicy::FailuresOnly,
                "token {:?}",
                token
            );
        }
        assert_eq!(
            RecordingPolicy::resolve("nope", RecordingPolicy::Always),
            RecordingPolicy::Always
        );
    }

    #[test]
    fn test_predicate_table() {
        let table = [
            (RecordingPolicy::Off, false, false),
            (RecordingPolicy::FailuresOnly, false, true),
            (RecordingPolicy::Always, true, true),
        ];
        for (policy, on_success, on_failure) in table {
            assert_eq!(policy.save_on_success(), on_success, "{}", policy);
            assert_eq!(policy.save_on_failure(), on_failure, "{}", policy);
            assert_eq!(policy.is_recording_enabled(), on_success || on_failure);
        }
    }

    #[test]
    fn test_token_roundtrips_through_display_and_serde() {
        for policy in RecordingPolicy::ALL {
            assert_eq!(policy.to_string().parse::<RecordingPolicy>(), Ok(policy));
            let json = serde_json::to_string(&policy).unwrap();
            assert_eq!(json, format!("\"{}\"", policy.token()));
        }
        let parsed: RecordingPolicy = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(parsed, RecordingPolicy::FailuresOnly);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(POLICY_ENV_VAR, "always");
        assert_eq!(RecordingPolicy::from_env(), RecordingPolicy::Always);
        std::env::remove_var(POLICY_ENV_VAR);
        assert_eq!(RecordingPolicy::from_env(), RecordingPolicy::FailuresOnly);
    }
}
