// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Runtime values held by component state, and the type descriptors that
//! classify them.
//!
//! A [`Value`] is what reading a member yields. Handles ([`Value::Object`],
//! [`Value::Component`]) are identities into the scene; everything else is
//! carried by value. Records are owned, so the record graph below any member
//! is a tree: cycles between live entities can only be formed through handles,
//! and the introspector never descends through a handle.
use std::sync::Arc;

use crate::ident::{ComponentId, ObjectId};
use crate::reflect::{Instance, Reflect};

/// Runtime type name reported for object handles.
pub const OBJECT_TYPE_NAME: &str = "Object";

/// Ordered vs. unordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Sequence with a meaningful order (arrays, lists).
    Ordered,
    /// Bag or set without a meaningful order.
    Unordered,
}

/// A member value read from live state.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value (unassigned reference).
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// Text scalar.
    Text(String),
    /// Handle to a live object.
    Object(ObjectId),
    /// Handle to a live component.
    Component(ComponentId),
    /// Plain-data instance held by value.
    Record(Box<Instance>),
    /// Collection of values.
    Collection(CollectionKind, Vec<Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for primitives (no structure to explore).
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Text(_)
        )
    }

    /// Returns `true` for object and component handles.
    #[must_use]
    pub fn is_handle(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Component(_))
    }

    /// Runtime type name for values whose type does not depend on the scene.
    ///
    /// Component handles return `None`: their type lives with the component
    /// state and must be resolved through a scene provider.
    #[must_use]
    pub fn intrinsic_type_name(&self) -> Option<&str> {
        match self {
            Self::Null | Self::Component(_) => None,
            Self::Bool(_) => Some("bool"),
            Self::Int(_) => Some("int"),
            Self::Float(_) => Some("float"),
            Self::Text(_) => Some("string"),
            Self::Object(_) => Some(OBJECT_TYPE_NAME),
            Self::Record(instance) => Some(instance.type_desc().name()),
            Self::Collection(CollectionKind::Ordered, _) => Some("list"),
            Self::Collection(CollectionKind::Unordered, _) => Some("set"),
        }
    }

    /// Ordered collection helper.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Collection(CollectionKind::Ordered, items.into_iter().collect())
    }

    /// Unordered collection helper.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Collection(CollectionKind::Unordered, items.into_iter().collect())
    }

    /// Record helper.
    pub fn record(instance: Instance) -> Self {
        Self::Record(Box::new(instance))
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::Object(id)
    }
}

impl From<ComponentId> for Value {
    fn from(id: ComponentId) -> Self {
        Self::Component(id)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Self::record(instance)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Runtime type of a reflective instance.
///
/// `base` forms the inheritance chain used to resolve which declaration of a
/// member is the most-derived one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDesc {
    name: String,
    transparent: bool,
    base: Option<Arc<TypeDesc>>,
}

impl TypeDesc {
    /// Creates a non-transparent type without a base.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transparent: false,
            base: None,
        }
    }

    /// Marks the type as a transparent composite (plain serializable data).
    #[must_use]
    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    /// Sets the base type.
    #[must_use]
    pub fn with_base(mut self, base: Arc<TypeDesc>) -> Self {
        self.base = Some(base);
        self
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether members of this type are walked as part of the containing node.
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Base type, if any.
    pub fn base(&self) -> Option<&Arc<TypeDesc>> {
        self.base.as_ref()
    }

    /// This type followed by its bases, most-derived first.
    pub fn ancestry(&self) -> impl Iterator<Item = &TypeDesc> {
        std::iter::successors(Some(self), |t| t.base.as_deref())
    }

    /// Distance from this type to `name` along the base chain (`0` = self).
    pub fn depth_of(&self, name: &str) -> Option<usize> {
        self.ancestry().position(|t| t.name == name)
    }
}

/// Static (declared) type of a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    /// Declared type name.
    pub name: String,
    /// Whether the declared type carries the transparent-composite marker.
    pub transparent: bool,
}

impl DeclaredType {
    /// A declared type without the transparent marker.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transparent: false,
        }
    }

    /// A declared type carrying the transparent marker.
    pub fn transparent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transparent: true,
        }
    }
}

impl From<&TypeDesc> for DeclaredType {
    fn from(ty: &TypeDesc) -> Self {
        Self {
            name: ty.name.clone(),
            transparent: ty.transparent,
        }
    }
}
