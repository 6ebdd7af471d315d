// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted scan preferences and the filter policy they produce.

use sceneref_core::FilterPolicy;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigService, ConfigStore};

/// Config key under which [`ScanPrefs`] are stored.
pub const SCAN_PREFS_KEY: &str = "scan-prefs";

/// Saved options for a reference scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanPrefs {
    /// Enumerate only root objects.
    pub roots_only: bool,
    /// Start from the built-in filter tables (otherwise from empty tables).
    pub use_default_policy: bool,
    /// Additional runtime type names to treat as opaque.
    pub extra_ignored_types: Vec<String>,
    /// Additional member names (or declared type names) to suppress.
    pub extra_ignored_members: Vec<String>,
    /// Additional event names whose subscribers are skipped.
    pub extra_ignored_events: Vec<String>,
}

impl Default for ScanPrefs {
    fn default() -> Self {
        Self {
            roots_only: false,
            use_default_policy: true,
            extra_ignored_types: Vec::new(),
            extra_ignored_members: Vec::new(),
            extra_ignored_events: Vec::new(),
        }
    }
}

impl ScanPrefs {
    /// Filter policy described by these preferences.
    pub fn policy(&self) -> FilterPolicy {
        let base = if self.use_default_policy {
            FilterPolicy::default()
        } else {
            FilterPolicy::empty()
        };
        let base = self
            .extra_ignored_types
            .iter()
            .fold(base, |p, t| p.with_ignored_type(t.as_str()));
        let base = self
            .extra_ignored_members
            .iter()
            .fold(base, |p, m| p.with_ignored_member(m.as_str()));
        self.extra_ignored_events
            .iter()
            .fold(base, |p, e| p.with_ignored_event(e.as_str()))
    }

    /// Loads saved preferences, or the defaults when none are stored.
    pub fn load<S: ConfigStore>(config: &ConfigService<S>) -> Result<Self, ConfigError> {
        config.load_or_default(SCAN_PREFS_KEY)
    }

    /// Persists these preferences.
    pub fn save<S: ConfigStore>(&self, config: &ConfigService<S>) -> Result<(), ConfigError> {
        config.save(SCAN_PREFS_KEY, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::MemStore;

    #[test]
    fn defaults_reproduce_builtin_policy() {
        assert_eq!(ScanPrefs::default().policy(), FilterPolicy::default());
    }

    #[test]
    fn extras_extend_the_chosen_base() {
        let prefs = ScanPrefs {
            use_default_policy: false,
            extra_ignored_types: vec!["Texture2D".into()],
            extra_ignored_members: vec!["owner".into()],
            extra_ignored_events: vec!["onTick".into()],
            ..ScanPrefs::default()
        };
        let policy = prefs.policy();
        assert!(policy.is_ignored_type("Texture2D"));
        assert!(!policy.is_ignored_type("MeshRenderer"));
        assert!(policy.is_ignored_member("Object", "owner"));
        assert!(!policy.is_ignored_member("Transform", "transform"));
        assert!(policy.is_ignored_event("onTick"));
    }

    #[test]
    fn prefs_round_trip_through_service() {
        let svc = ConfigService::new(MemStore::default());
        assert_eq!(ScanPrefs::load(&svc).unwrap(), ScanPrefs::default());

        let prefs = ScanPrefs {
            roots_only: true,
            extra_ignored_events: vec!["onTick".into()],
            ..ScanPrefs::default()
        };
        prefs.save(&svc).unwrap();
        assert!(svc.store().blobs.borrow().contains_key(SCAN_PREFS_KEY));
        assert_eq!(ScanPrefs::load(&svc).unwrap(), prefs);
    }

    #[test]
    fn partial_documents_keep_defaults() {
        let prefs: ScanPrefs = serde_json::from_str(r#"{ "roots_only": true }"#).unwrap();
        assert!(prefs.roots_only);
        assert!(prefs.use_default_policy);
    }
}
