// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene-graph port and an in-memory scene store.
//!
//! The engine only reads scenes. [`SceneGraph`] is the provider contract: it
//! enumerates live objects, lists their components, and resolves handles.
//! Resolution returns `None` for handles that went stale between enumeration
//! and use; callers treat that as an absent value.
use std::collections::BTreeMap;

use thiserror::Error;

use crate::ident::{ComponentId, ObjectId};
use crate::reflect::{Instance, Reflect};

/// Read-only view of the live scene supplied by the host.
///
/// Callers must not mutate the scene while a collection pass is running.
pub trait SceneGraph {
    /// Live objects, optionally restricted to hierarchy roots.
    ///
    /// Excludes objects that are not editable, transient, or instances of
    /// asset templates.
    fn objects(&self, roots_only: bool) -> Vec<ObjectId>;

    /// Components attached to `object` (empty for unknown objects).
    fn components_of(&self, object: ObjectId) -> Vec<ComponentId>;

    /// Whether `object` is still live.
    fn contains_object(&self, object: ObjectId) -> bool;

    /// Object that `component` is attached to; `None` when the handle is stale.
    fn component_owner(&self, component: ComponentId) -> Option<ObjectId>;

    /// Reflective state of `component`; `None` when the handle is stale.
    fn component_state(&self, component: ComponentId) -> Option<&dyn Reflect>;

    /// Display name of `object`.
    fn object_name(&self, object: ObjectId) -> Option<&str>;

    /// Parent of `object` in the hierarchy.
    fn parent_of(&self, object: ObjectId) -> Option<ObjectId>;

    /// Runtime type name of `component`.
    fn component_type(&self, component: ComponentId) -> Option<&str> {
        self.component_state(component)
            .map(|state| state.type_desc().name())
    }
}

/// Error returned by [`Scene`] mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    /// An object with this id already exists.
    #[error("duplicate object: {0:?}")]
    DuplicateObject(ObjectId),
    /// A component with this id already exists.
    #[error("duplicate component: {0:?}")]
    DuplicateComponent(ComponentId),
    /// The referenced object does not exist.
    #[error("unknown object: {0:?}")]
    UnknownObject(ObjectId),
    /// Re-parenting would make an object its own ancestor.
    #[error("parenting {child:?} under {parent:?} would create a cycle")]
    ParentCycle {
        /// Object being re-parented.
        child: ObjectId,
        /// Requested parent.
        parent: ObjectId,
    },
}

/// Editing state of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Lifecycle {
    /// Regular scene object.
    #[default]
    Editable,
    /// Present but locked against editing.
    NotEditable,
    /// Runtime-only helper that is neither shown nor saved.
    Transient,
}

/// Object entry in a [`Scene`].
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    /// Display name.
    pub name: String,
    /// Hierarchy parent.
    pub parent: Option<ObjectId>,
    /// Editing state.
    pub lifecycle: Lifecycle,
    /// Asset path when the object is part of an asset template.
    pub asset_path: Option<String>,
    /// Attached components, in attachment order.
    pub components: Vec<ComponentId>,
}

/// Component entry in a [`Scene`].
#[derive(Debug, Clone)]
pub struct ComponentRecord {
    /// Object the component is attached to.
    pub owner: ObjectId,
    /// Reflective state.
    pub state: Instance,
}

/// In-memory scene store.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: BTreeMap<ObjectId, ObjectRecord>,
    components: BTreeMap<ComponentId, ComponentRecord>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root-level editable object.
    pub fn add_object(&mut self, id: ObjectId, name: impl Into<String>) -> Result<(), SceneError> {
        if self.objects.contains_key(&id) {
            return Err(SceneError::DuplicateObject(id));
        }
        self.objects.insert(
            id,
            ObjectRecord {
                name: name.into(),
                parent: None,
                lifecycle: Lifecycle::Editable,
                asset_path: None,
                components: Vec::new(),
            },
        );
        Ok(())
    }

    /// Re-parents `child` (`None` makes it a root).
    pub fn set_parent(
        &mut self,
        child: ObjectId,
        parent: Option<ObjectId>,
    ) -> Result<(), SceneError> {
        if !self.objects.contains_key(&child) {
            return Err(SceneError::UnknownObject(child));
        }
        if let Some(parent) = parent {
            if !self.objects.contains_key(&parent) {
                return Err(SceneError::UnknownObject(parent));
            }
            if parent == child || self.ancestors(parent).any(|a| a == child) {
                return Err(SceneError::ParentCycle { child, parent });
            }
        }
        if let Some(record) = self.objects.get_mut(&child) {
            record.parent = parent;
        }
        Ok(())
    }

    /// Sets the editing state of `object`.
    pub fn set_lifecycle(&mut self, object: ObjectId, lifecycle: Lifecycle) -> Result<(), SceneError> {
        self.object_mut(object)?.lifecycle = lifecycle;
        Ok(())
    }

    /// Marks `object` as part of the asset template at `path`.
    pub fn set_asset_path(
        &mut self,
        object: ObjectId,
        path: Option<String>,
    ) -> Result<(), SceneError> {
        self.object_mut(object)?.asset_path = path;
        Ok(())
    }

    /// Attaches a component to `owner`.
    pub fn add_component(
        &mut self,
        owner: ObjectId,
        id: ComponentId,
        state: Instance,
    ) -> Result<(), SceneError> {
        if self.components.contains_key(&id) {
            return Err(SceneError::DuplicateComponent(id));
        }
        self.object_mut(owner)?.components.push(id);
        self.components.insert(id, ComponentRecord { owner, state });
        Ok(())
    }

    /// Destroys `object` and its components. Children become roots.
    ///
    /// Handles to the removed entities stay wherever they are stored and
    /// resolve to nothing from then on.
    pub fn remove_object(&mut self, object: ObjectId) -> Option<ObjectRecord> {
        let record = self.objects.remove(&object)?;
        for component in &record.components {
            self.components.remove(component);
        }
        for other in self.objects.values_mut() {
            if other.parent == Some(object) {
                other.parent = None;
            }
        }
        Some(record)
    }

    /// Destroys a single component.
    pub fn remove_component(&mut self, component: ComponentId) -> Option<ComponentRecord> {
        let record = self.components.remove(&component)?;
        if let Some(owner) = self.objects.get_mut(&record.owner) {
            owner.components.retain(|c| *c != component);
        }
        Some(record)
    }

    /// Returns the object record when it exists.
    pub fn object(&self, id: ObjectId) -> Option<&ObjectRecord> {
        self.objects.get(&id)
    }

    /// Returns the component record when it exists.
    pub fn component(&self, id: ComponentId) -> Option<&ComponentRecord> {
        self.components.get(&id)
    }

    /// Mutable component state, for editing a live scene between passes.
    pub fn component_state_mut(&mut self, id: ComponentId) -> Option<&mut Instance> {
        self.components.get_mut(&id).map(|c| &mut c.state)
    }

    /// Iterate over every object (including filtered ones) in id order.
    pub fn iter_objects(&self) -> impl Iterator<Item = (&ObjectId, &ObjectRecord)> {
        self.objects.iter()
    }

    /// Strict ancestors of `object`, nearest first.
    pub fn ancestors(&self, object: ObjectId) -> impl Iterator<Item = ObjectId> + '_ {
        std::iter::successors(self.parent_of(object), |p| self.parent_of(*p))
    }

    /// Hierarchy root of `object` (itself when it has no parent).
    pub fn root_of(&self, object: ObjectId) -> ObjectId {
        self.ancestors(object).last().unwrap_or(object)
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut ObjectRecord, SceneError> {
        self.objects.get_mut(&id).ok_or(SceneError::UnknownObject(id))
    }

    fn is_enumerable(&self, id: ObjectId, record: &ObjectRecord) -> bool {
        if matches!(record.lifecycle, Lifecycle::NotEditable | Lifecycle::Transient) {
            return false;
        }
        let root = self.root_of(id);
        self.objects
            .get(&root)
            .is_none_or(|r| r.asset_path.as_deref().is_none_or(str::is_empty))
    }
}

impl SceneGraph for Scene {
    fn objects(&self, roots_only: bool) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|(_, r)| !roots_only || r.parent.is_none())
            .filter(|(id, r)| self.is_enumerable(**id, r))
            .map(|(id, _)| *id)
            .collect()
    }

    fn components_of(&self, object: ObjectId) -> Vec<ComponentId> {
        self.objects
            .get(&object)
            .map(|r| r.components.clone())
            .unwrap_or_default()
    }

    fn contains_object(&self, object: ObjectId) -> bool {
        self.objects.contains_key(&object)
    }

    fn component_owner(&self, component: ComponentId) -> Option<ObjectId> {
        self.components.get(&component).map(|c| c.owner)
    }

    fn component_state(&self, component: ComponentId) -> Option<&dyn Reflect> {
        self.components
            .get(&component)
            .map(|c| &c.state as &dyn Reflect)
    }

    fn object_name(&self, object: ObjectId) -> Option<&str> {
        self.objects.get(&object).map(|r| r.name.as_str())
    }

    fn parent_of(&self, object: ObjectId) -> Option<ObjectId> {
        self.objects.get(&object).and_then(|r| r.parent)
    }
}
