// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reference collector: runs the introspector over every component of every
//! object and turns admitted candidates into [`ReferenceEdge`]s.
//!
//! A pass is synchronous and stateless. Nothing is cached between passes;
//! after the scene changes, collect again.
use rustc_hash::FxHashSet;
use tracing::{debug, instrument, trace};

use crate::edge::ReferenceEdge;
use crate::ident::{ComponentId, Handle, ObjectId};
use crate::introspect::{Candidate, Introspector};
use crate::policy::FilterPolicy;
use crate::scene::SceneGraph;
use crate::value::{Value, OBJECT_TYPE_NAME};

/// Orchestrates reference discovery across a set of objects.
#[derive(Debug)]
pub struct ReferenceCollector<'a, S: ?Sized> {
    scene: &'a S,
    policy: &'a FilterPolicy,
}

impl<'a, S: SceneGraph + ?Sized> ReferenceCollector<'a, S> {
    /// Creates a collector over `scene` filtered by `policy`.
    pub fn new(scene: &'a S, policy: &'a FilterPolicy) -> Self {
        Self { scene, policy }
    }

    /// Introspector sharing this collector's scene and policy.
    pub fn introspector(&self) -> Introspector<'a, S> {
        Introspector::new(self.scene, self.policy)
    }

    /// Collects every edge held by the components of `objects`.
    ///
    /// Edges come out in walk order; no other ordering is promised, and the
    /// same reference held by two members yields two edges.
    #[instrument(level = "debug", skip_all, fields(objects = objects.len()))]
    pub fn collect(&self, objects: &[ObjectId]) -> Vec<ReferenceEdge> {
        let mut edges = Vec::new();
        let components: usize = objects
            .iter()
            .map(|&object| self.collect_object(object, &mut edges))
            .sum();
        debug!(components, edges = edges.len(), "reference pass complete");
        edges
    }

    /// Enumerates objects from the scene provider, then collects.
    pub fn collect_scene(&self, roots_only: bool) -> Vec<ReferenceEdge> {
        self.collect(&self.scene.objects(roots_only))
    }

    /// Appends the edges held by every component attached to `object` and
    /// returns how many components were walked.
    pub fn collect_object(&self, object: ObjectId, out: &mut Vec<ReferenceEdge>) -> usize {
        if !self.scene.contains_object(object) {
            trace!(object = %object.short_hex(), "stale object handle; skipping");
            return 0;
        }
        let components = self.scene.components_of(object);
        for &component in &components {
            self.collect_component(component, out);
        }
        components.len()
    }

    /// Appends the edges held by `component`, walked as its own root.
    pub fn collect_component(&self, component: ComponentId, out: &mut Vec<ReferenceEdge>) {
        self.introspector()
            .walk_component(component, &mut |candidate: Candidate<'_>| {
                let allow_same_object = candidate.origin.allows_same_object();
                self.admit(
                    candidate.owner,
                    &candidate.value,
                    &candidate.label,
                    allow_same_object,
                    out,
                );
            });
    }

    /// Classifies a candidate and appends the resulting edges.
    ///
    /// Object and component handles become edges unless they resolve to the
    /// owner's own object while `allow_same_object` is `false`. Collections
    /// are never edges themselves; each element is classified in turn with
    /// the same owner and label. Stale handles, ignored runtime types, and
    /// every other value are dropped.
    pub fn admit(
        &self,
        owner: ComponentId,
        value: &Value,
        label: &str,
        allow_same_object: bool,
        out: &mut Vec<ReferenceEdge>,
    ) {
        match value {
            Value::Object(id) => {
                if !self.scene.contains_object(*id) {
                    trace!(object = %id.short_hex(), label, "stale object referent");
                    return;
                }
                if self.policy.is_ignored_type(OBJECT_TYPE_NAME) {
                    return;
                }
                if allow_same_object || self.scene.component_owner(owner) != Some(*id) {
                    out.push(ReferenceEdge::new(owner, *id, label));
                }
            }
            Value::Component(id) => {
                let Some(referent_object) = self.scene.component_owner(*id) else {
                    trace!(component = %id.short_hex(), label, "stale component referent");
                    return;
                };
                if self
                    .scene
                    .component_type(*id)
                    .is_some_and(|ty| self.policy.is_ignored_type(ty))
                {
                    return;
                }
                if allow_same_object || self.scene.component_owner(owner) != Some(referent_object)
                {
                    out.push(ReferenceEdge::new(owner, *id, label));
                }
            }
            Value::Collection(_, items) => {
                for item in items {
                    self.admit(owner, item, label, allow_same_object, out);
                }
            }
            _ => {}
        }
    }
}

/// Edges from `edges` whose referent is `object` or one of its components.
///
/// Answers "what references this object" from a previous pass without walking
/// the scene again.
pub fn find_references_to<S: SceneGraph + ?Sized>(
    scene: &S,
    object: ObjectId,
    edges: &[ReferenceEdge],
) -> Vec<ReferenceEdge> {
    let mut targets: FxHashSet<Handle> = scene
        .components_of(object)
        .into_iter()
        .map(Handle::Component)
        .collect();
    targets.insert(Handle::Object(object));
    edges
        .iter()
        .filter(|e| targets.contains(&e.referent))
        .cloned()
        .collect()
}
