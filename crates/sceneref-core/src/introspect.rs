// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Object introspector: enumerates the member values held by one instance and
//! reports every reference-like value as a [`Candidate`].
//!
//! The walk knows nothing about scenes beyond handle resolution. Whether a
//! candidate becomes an edge is decided by the callback (see
//! [`crate::ReferenceCollector::admit`]).
//!
//! Descent happens only through members whose declared type is transparent,
//! into the record or component they hold. Records are owned values and form
//! a tree. A component already on the current descent path is not entered
//! again; it is reported as a candidate instead, so a loop of transparent
//! component members terminates.
use std::borrow::Cow;

use tracing::trace;

use crate::ident::ComponentId;
use crate::policy::FilterPolicy;
use crate::reflect::{Accessor, Event, Field, MemberKind, MemberSource, Reflect};
use crate::scene::SceneGraph;
use crate::value::Value;

/// A value discovered in a member, before classification.
#[derive(Debug, Clone)]
pub struct Candidate<'c> {
    /// Component under whose identity the walk runs.
    pub owner: ComponentId,
    /// Discovered value (never null).
    pub value: Cow<'c, Value>,
    /// Member label.
    pub label: Cow<'c, str>,
    /// Kind of member that produced the value.
    pub origin: MemberKind,
}

/// Walks member values of components and plain-data records.
#[derive(Debug)]
pub struct Introspector<'a, S: ?Sized> {
    scene: &'a S,
    policy: &'a FilterPolicy,
}

impl<S: ?Sized> Clone for Introspector<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for Introspector<'_, S> {}

impl<'a, S: SceneGraph + ?Sized> Introspector<'a, S> {
    /// Creates an introspector over `scene` filtered by `policy`.
    pub fn new(scene: &'a S, policy: &'a FilterPolicy) -> Self {
        Self { scene, policy }
    }

    /// Walks `component` as its own traversal root.
    pub fn walk_component<E>(&self, component: ComponentId, emit: &mut E)
    where
        E: FnMut(Candidate<'_>),
    {
        self.walk(&Value::Component(component), component, emit);
    }

    /// Reports every reference-like value directly reachable inside `value`.
    ///
    /// `value` is either a component handle (resolved through the scene) or a
    /// record. Anything else has no members and is a no-op, as are stale
    /// handles and values whose runtime type the policy ignores.
    pub fn walk<E>(&self, value: &Value, owner: ComponentId, emit: &mut E)
    where
        E: FnMut(Candidate<'_>),
    {
        let mut path = Vec::new();
        self.descend(value, owner, &mut path, emit);
    }

    fn descend<E>(
        &self,
        value: &Value,
        owner: ComponentId,
        path: &mut Vec<ComponentId>,
        emit: &mut E,
    ) where
        E: FnMut(Candidate<'_>),
    {
        let state: &dyn Reflect = match value {
            Value::Component(id) => match self.scene.component_state(*id) {
                Some(state) => state,
                None => {
                    trace!(component = %id.short_hex(), "stale component handle; skipping walk");
                    return;
                }
            },
            Value::Record(instance) => &**instance,
            _ => return,
        };
        let entered = match value {
            Value::Component(id) => Some(*id),
            _ => None,
        };
        if self.policy.is_ignored_type(state.type_desc().name()) {
            return;
        }
        path.extend(entered);
        for source in state.member_sources() {
            match source {
                MemberSource::Field(field) => self.visit_field(field, owner, path, emit),
                MemberSource::Events(event) => self.visit_event(event, owner, emit),
                MemberSource::Accessor(accessor) => self.visit_accessor(accessor, owner, emit),
            }
        }
        if entered.is_some() {
            path.pop();
        }
    }

    fn visit_field<E>(
        &self,
        field: &Field,
        owner: ComponentId,
        path: &mut Vec<ComponentId>,
        emit: &mut E,
    ) where
        E: FnMut(Candidate<'_>),
    {
        if self.policy.is_ignored_member(&field.declared.name, &field.name) || field.value.is_null()
        {
            return;
        }
        if field.declared.transparent {
            let enter = match &field.value {
                Value::Record(_) => true,
                Value::Component(id) => !path.contains(id),
                _ => false,
            };
            if enter {
                self.descend(&field.value, owner, path, emit);
                return;
            }
        }
        emit(Candidate {
            owner,
            value: Cow::Borrowed(&field.value),
            label: Cow::Borrowed(&field.name),
            origin: MemberKind::Field,
        });
    }

    fn visit_event<E>(&self, event: &Event, owner: ComponentId, emit: &mut E)
    where
        E: FnMut(Candidate<'_>),
    {
        if self.policy.is_ignored_event(&event.name) {
            return;
        }
        let Some(subscribers) = event.subscribers.as_deref() else {
            return;
        };
        for subscriber in subscribers.iter().filter(|s| s.receiver.is_handle()) {
            emit(Candidate {
                owner,
                value: Cow::Borrowed(&subscriber.receiver),
                label: Cow::Owned(format!("{}({})", event.name, subscriber.handler)),
                origin: MemberKind::Event,
            });
        }
    }

    fn visit_accessor<E>(&self, accessor: &Accessor, owner: ComponentId, emit: &mut E)
    where
        E: FnMut(Candidate<'_>),
    {
        if self
            .policy
            .is_ignored_member(&accessor.declared.name, &accessor.name)
        {
            return;
        }
        // Unreadable accessors are skipped silently. Read values are leaves.
        let Ok(value) = accessor.read() else {
            return;
        };
        if value.is_null() {
            return;
        }
        emit(Candidate {
            owner,
            value: Cow::Owned(value),
            label: Cow::Borrowed(&accessor.name),
            origin: MemberKind::Accessor,
        });
    }
}
