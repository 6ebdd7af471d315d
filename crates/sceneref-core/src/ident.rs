// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier and hashing utilities.
use std::fmt;

use blake3::Hasher;

/// Canonical 256-bit hash backing every scene identity.
pub type Hash = [u8; 32];

/// Identity of a live object in the scene (an entity that owns components).
///
/// Ids are opaque. Tooling that builds scenes from labels uses
/// [`make_object_id`] (`blake3("object:" || label)`), but providers are free to
/// mint ids any other way.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(pub Hash);

impl ObjectId {
    /// Returns the canonical byte representation of this id.
    #[must_use]
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// First 8 bytes as lowercase hex, for logs and tables.
    #[must_use]
    pub fn short_hex(&self) -> String {
        short_hex(&self.0)
    }
}

/// Identity of a component attached to exactly one [`ObjectId`].
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentId(pub Hash);

impl ComponentId {
    /// Returns the canonical byte representation of this id.
    #[must_use]
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// First 8 bytes as lowercase hex, for logs and tables.
    #[must_use]
    pub fn short_hex(&self) -> String {
        short_hex(&self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.short_hex())
    }
}

/// The target of a reference edge: either an object or a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Handle {
    /// Reference to an object.
    Object(ObjectId),
    /// Reference to a component.
    Component(ComponentId),
}

impl From<ObjectId> for Handle {
    fn from(id: ObjectId) -> Self {
        Self::Object(id)
    }
}

impl From<ComponentId> for Handle {
    fn from(id: ComponentId) -> Self {
        Self::Component(id)
    }
}

fn short_hex(h: &Hash) -> String {
    let mut short = [0u8; 8];
    short.copy_from_slice(&h[0..8]);
    hex::encode(short)
}

/// Produces a stable, domain-separated object identifier (prefix `b"object:"`) using BLAKE3.
pub fn make_object_id(label: &str) -> ObjectId {
    let mut hasher = Hasher::new();
    hasher.update(b"object:");
    hasher.update(label.as_bytes());
    ObjectId(hasher.finalize().into())
}

/// Produces a stable, domain-separated component identifier (prefix `b"component:"`) using BLAKE3.
pub fn make_component_id(label: &str) -> ComponentId {
    let mut hasher = Hasher::new();
    hasher.update(b"component:");
    hasher.update(label.as_bytes());
    ComponentId(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_separation_prevents_cross_kind_collisions() {
        let lbl = "player";
        assert_ne!(make_object_id(lbl).0, make_component_id(lbl).0);
        assert_eq!(make_object_id(lbl), make_object_id(lbl));
    }

    #[test]
    fn short_hex_is_sixteen_chars() {
        let id = make_component_id("player/health");
        assert_eq!(id.short_hex().len(), 16);
        assert!(format!("{id:?}").starts_with("ComponentId("));
    }
}
