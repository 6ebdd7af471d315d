// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use std::sync::Arc;

use sceneref_core::{
    make_component_id, make_object_id, ComponentId, DeclaredType, FilterPolicy, Instance,
    ObjectId, ReferenceCollector, ReferenceEdge, Scene, TypeDesc,
};

/// `Component <- Behaviour <- <name>` inheritance chain.
pub fn behaviour_type(name: &str) -> Arc<TypeDesc> {
    let component = Arc::new(TypeDesc::new("Component"));
    let behaviour = Arc::new(TypeDesc::new("Behaviour").with_base(component));
    Arc::new(TypeDesc::new(name).with_base(behaviour))
}

/// Declared type for object-valued members.
pub fn object_ty() -> DeclaredType {
    DeclaredType::opaque("Object")
}

/// Adds an editable root object labelled `label` (also its display name).
pub fn add_object(scene: &mut Scene, label: &str) -> ObjectId {
    let id = make_object_id(label);
    scene.add_object(id, label).expect("add object");
    id
}

/// Attaches `instance` to `owner` under the label `label`.
pub fn add_component(
    scene: &mut Scene,
    owner: ObjectId,
    label: &str,
    instance: Instance,
) -> ComponentId {
    let id = make_component_id(label);
    scene.add_component(owner, id, instance).expect("add component");
    id
}

/// Runs a full pass over every enumerable object.
pub fn collect_all(scene: &Scene, policy: &FilterPolicy) -> Vec<ReferenceEdge> {
    ReferenceCollector::new(scene, policy).collect_scene(false)
}

/// Sorts edges so passes can be compared as multisets.
pub fn sorted(mut edges: Vec<ReferenceEdge>) -> Vec<ReferenceEdge> {
    edges.sort();
    edges
}
