// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Noise-filtering tables consulted by the introspector and the collector.
use std::collections::BTreeSet;

/// Asset-like types that are never traversed nor reported.
pub const DEFAULT_IGNORED_TYPES: &[&str] = &[
    "Mesh",
    "Material",
    "MeshFilter",
    "MeshRenderer",
    "string",
    "SpriteRenderer",
    "ParticleSystem",
    "Renderer",
    "ParticleSystemRenderer",
    "Animator",
    "SkinnedMeshRenderer",
    "NavMesh",
];

/// Infrastructure member names that produce reference noise.
pub const DEFAULT_IGNORED_MEMBERS: &[&str] = &[
    "root",
    "parent",
    "particleEmitter",
    "rigidbody",
    "canvas",
    "rigidbody2D",
    "camera",
    "light",
    "animation",
    "constantForce",
    "gameObject",
    "guiText",
    "guiTexture",
    "hingeJoint",
    "networkView",
    "particleSystem",
    "renderer",
    "tag",
    "transform",
    "hideFlags",
    "name",
    "audio",
    "collider2D",
    "collider",
    "material",
    "mesh",
    "Material",
    "Color",
    "maxVolume",
    "minVolume",
    "rolloffFactor",
    "GetRemainingDistance",
];

/// Events whose subscriber lists are not walked.
pub const DEFAULT_IGNORED_EVENTS: &[&str] = &["onRequestRebuild"];

/// Immutable filtering policy.
///
/// Built once (from [`FilterPolicy::default`], config, or the builder methods)
/// and passed by reference into every introspection call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterPolicy {
    /// Runtime type names treated as opaque and never reported.
    pub ignored_types: BTreeSet<String>,
    /// Member names (or declared type names) suppressed on every type.
    pub ignored_members: BTreeSet<String>,
    /// Event names whose subscribers are not walked.
    pub ignored_events: BTreeSet<String>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            ignored_types: to_set(DEFAULT_IGNORED_TYPES),
            ignored_members: to_set(DEFAULT_IGNORED_MEMBERS),
            ignored_events: to_set(DEFAULT_IGNORED_EVENTS),
        }
    }
}

fn to_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| (*s).to_owned()).collect()
}

impl FilterPolicy {
    /// Policy that filters nothing.
    pub fn empty() -> Self {
        Self {
            ignored_types: BTreeSet::new(),
            ignored_members: BTreeSet::new(),
            ignored_events: BTreeSet::new(),
        }
    }

    /// Adds an ignored type.
    #[must_use]
    pub fn with_ignored_type(mut self, name: impl Into<String>) -> Self {
        self.ignored_types.insert(name.into());
        self
    }

    /// Adds an ignored member name.
    #[must_use]
    pub fn with_ignored_member(mut self, name: impl Into<String>) -> Self {
        self.ignored_members.insert(name.into());
        self
    }

    /// Adds an ignored event name.
    #[must_use]
    pub fn with_ignored_event(mut self, name: impl Into<String>) -> Self {
        self.ignored_events.insert(name.into());
        self
    }

    /// Union of `self` and `other`.
    #[must_use]
    pub fn extend(mut self, other: &Self) -> Self {
        self.ignored_types.extend(other.ignored_types.iter().cloned());
        self.ignored_members
            .extend(other.ignored_members.iter().cloned());
        self.ignored_events.extend(other.ignored_events.iter().cloned());
        self
    }

    /// Whether values of runtime type `name` are opaque.
    pub fn is_ignored_type(&self, name: &str) -> bool {
        self.ignored_types.contains(name)
    }

    /// Whether a member is suppressed, by its name or its declared type name.
    pub fn is_ignored_member(&self, declared_type: &str, name: &str) -> bool {
        self.ignored_members.contains(name) || self.ignored_members.contains(declared_type)
    }

    /// Whether an event's subscriber list is skipped.
    pub fn is_ignored_event(&self, name: &str) -> bool {
        self.ignored_events.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_cover_infrastructure_noise() {
        let p = FilterPolicy::default();
        assert!(p.is_ignored_type("MeshRenderer"));
        assert!(p.is_ignored_type("string"));
        assert!(p.is_ignored_member("Transform", "transform"));
        assert!(p.is_ignored_member("Object", "gameObject"));
        assert!(p.is_ignored_event("onRequestRebuild"));
        assert!(!p.is_ignored_member("EnemyAi", "target"));
    }

    #[test]
    fn declared_type_name_suppresses_member() {
        let p = FilterPolicy::empty().with_ignored_member("Color");
        assert!(p.is_ignored_member("Color", "tint"));
        assert!(!p.is_ignored_member("Vector3", "tint"));
    }

    #[test]
    fn duplicate_default_entries_collapse() {
        let p = FilterPolicy::default();
        let materials = p.ignored_members.iter().filter(|m| *m == "material").count();
        assert_eq!(materials, 1);
    }

    #[test]
    fn extend_unions_tables() {
        let a = FilterPolicy::empty().with_ignored_type("Mesh");
        let b = FilterPolicy::empty()
            .with_ignored_type("Texture")
            .with_ignored_event("onTick");
        let merged = a.extend(&b);
        assert!(merged.is_ignored_type("Mesh"));
        assert!(merged.is_ignored_type("Texture"));
        assert!(merged.is_ignored_event("onTick"));
        assert!(FilterPolicy::empty().ignored_members.is_empty());
    }
}
