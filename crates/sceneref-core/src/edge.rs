// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reference edges produced by a collection pass.
use crate::ident::{ComponentId, Handle, ObjectId};
use crate::scene::SceneGraph;

/// A discovered reference: `owner` holds `referent` in the member `label`.
///
/// Edges identify entities by handle and own nothing. `referent` is never
/// null; whether it still resolves depends on the scene at the time of use.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceEdge {
    /// Component whose state produced the edge.
    pub owner: ComponentId,
    /// Referenced object or component.
    pub referent: Handle,
    /// Field name, accessor name, or `event(handler)` for subscriptions.
    pub label: String,
}

impl ReferenceEdge {
    /// Creates an edge.
    pub fn new(owner: ComponentId, referent: impl Into<Handle>, label: impl Into<String>) -> Self {
        Self {
            owner,
            referent: referent.into(),
            label: label.into(),
        }
    }

    /// Object the owning component is attached to.
    pub fn owner_object<S: SceneGraph + ?Sized>(&self, scene: &S) -> Option<ObjectId> {
        scene.component_owner(self.owner)
    }

    /// Object that visually represents the referent.
    pub fn referent_object<S: SceneGraph + ?Sized>(&self, scene: &S) -> Option<ObjectId> {
        self.referent.representative_object(scene)
    }
}

impl Handle {
    /// The handle itself for objects, the containing object for components.
    ///
    /// Returns `None` when the handle no longer resolves.
    pub fn representative_object<S: SceneGraph + ?Sized>(self, scene: &S) -> Option<ObjectId> {
        match self {
            Self::Object(id) => scene.contains_object(id).then_some(id),
            Self::Component(id) => scene.component_owner(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ident::{make_component_id, make_object_id};
    use crate::reflect::Instance;
    use crate::scene::Scene;
    use crate::value::TypeDesc;

    #[test]
    fn referent_resolves_to_containing_object() {
        let mut scene = Scene::new();
        let (a, b) = (make_object_id("a"), make_object_id("b"));
        scene.add_object(a, "A").unwrap();
        scene.add_object(b, "B").unwrap();
        let ca = make_component_id("a/ai");
        let cb = make_component_id("b/health");
        let ty = Arc::new(TypeDesc::new("Behaviour"));
        scene.add_component(a, ca, Instance::new(Arc::clone(&ty))).unwrap();
        scene.add_component(b, cb, Instance::new(ty)).unwrap();

        let to_component = ReferenceEdge::new(ca, cb, "target");
        let to_object = ReferenceEdge::new(ca, b, "follow");
        assert_eq!(to_component.referent_object(&scene), Some(b));
        assert_eq!(to_object.referent_object(&scene), Some(b));
        assert_eq!(to_object.owner_object(&scene), Some(a));

        scene.remove_object(b);
        assert_eq!(to_component.referent_object(&scene), None);
        assert_eq!(to_object.referent_object(&scene), None);
    }
}
