// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reflection surface for live state.
//!
//! Component state is exposed through [`Reflect`], which hands the
//! introspector a list of [`MemberSource`]s: stored fields, computed
//! accessors, and event subscriber lists. The introspector is written against
//! that list only; how a provider stores its members is its own business.
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::value::{DeclaredType, TypeDesc, Value};

/// Reading a computed accessor failed.
///
/// Accessors often have preconditions unrelated to reference discovery (an
/// active object, an initialised subsystem). The introspector treats this as
/// "skip the accessor".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("accessor `{accessor}` unavailable: {reason}")]
pub struct AccessorUnavailable {
    /// Name of the accessor that failed.
    pub accessor: String,
    /// Why the read failed.
    pub reason: String,
}

impl AccessorUnavailable {
    /// Builds an error for `accessor`.
    pub fn new(accessor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            accessor: accessor.into(),
            reason: reason.into(),
        }
    }
}

/// Computes an accessor's current value.
pub trait Getter: Send + Sync {
    /// Reads the value. May fail when the accessor's preconditions are unmet.
    fn get(&self) -> Result<Value, AccessorUnavailable>;
}

impl<F> Getter for F
where
    F: Fn() -> Result<Value, AccessorUnavailable> + Send + Sync,
{
    fn get(&self) -> Result<Value, AccessorUnavailable> {
        self()
    }
}

/// Stored data member.
#[derive(Debug, Clone)]
pub struct Field {
    /// Member name.
    pub name: String,
    /// Declared type.
    pub declared: DeclaredType,
    /// Name of the type in the inheritance chain that declares this field.
    pub declared_in: String,
    /// Current value.
    pub value: Value,
}

/// Computed accessor (property).
#[derive(Clone)]
pub struct Accessor {
    /// Member name.
    pub name: String,
    /// Declared return type.
    pub declared: DeclaredType,
    getter: Arc<dyn Getter>,
}

impl Accessor {
    /// Accessor that always yields `value`.
    pub fn constant(name: impl Into<String>, declared: DeclaredType, value: Value) -> Self {
        Self::computed(name, declared, move || {
            Ok::<_, AccessorUnavailable>(value.clone())
        })
    }

    /// Accessor whose every read fails with `reason`.
    pub fn unavailable(
        name: impl Into<String>,
        declared: DeclaredType,
        reason: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let err = AccessorUnavailable::new(name.clone(), reason);
        Self::computed(name, declared, move || Err::<Value, _>(err.clone()))
    }

    /// Accessor backed by an arbitrary getter.
    pub fn computed(
        name: impl Into<String>,
        declared: DeclaredType,
        getter: impl Getter + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            declared,
            getter: Arc::new(getter),
        }
    }

    /// Reads the accessor.
    pub fn read(&self) -> Result<Value, AccessorUnavailable> {
        self.getter.get()
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .finish_non_exhaustive()
    }
}

/// One handler bound to an event.
#[derive(Debug, Clone)]
pub struct Subscriber {
    /// Receiver the handler is bound to (`Null` for free functions).
    pub receiver: Value,
    /// Handler method name.
    pub handler: String,
}

impl Subscriber {
    /// Creates a subscriber.
    pub fn new(receiver: impl Into<Value>, handler: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            handler: handler.into(),
        }
    }
}

/// Multicast event and its subscriber list.
#[derive(Debug, Clone)]
pub struct Event {
    /// Event name.
    pub name: String,
    /// Backing subscriber storage; `None` when it cannot be resolved
    /// (custom add/remove implementations).
    pub subscribers: Option<Vec<Subscriber>>,
}

/// Which kind of member produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberKind {
    /// Stored field.
    Field,
    /// Computed accessor.
    Accessor,
    /// Event subscriber list.
    Event,
}

impl MemberKind {
    /// Whether an edge from this kind of member may point back at the owning
    /// component's own object.
    ///
    /// Accessors routinely expose the containing object as a convenience;
    /// fields and subscriptions that do so are deliberate.
    #[must_use]
    pub const fn allows_same_object(self) -> bool {
        match self {
            Self::Field | Self::Event => true,
            Self::Accessor => false,
        }
    }
}

/// A single member exposed for introspection.
#[derive(Debug, Clone, Copy)]
pub enum MemberSource<'a> {
    /// Stored field.
    Field(&'a Field),
    /// Computed accessor.
    Accessor(&'a Accessor),
    /// Event subscriber list.
    Events(&'a Event),
}

impl MemberSource<'_> {
    /// Member name.
    pub fn name(&self) -> &str {
        match self {
            Self::Field(f) => &f.name,
            Self::Accessor(a) => &a.name,
            Self::Events(e) => &e.name,
        }
    }

    /// Member kind.
    pub fn kind(&self) -> MemberKind {
        match self {
            Self::Field(_) => MemberKind::Field,
            Self::Accessor(_) => MemberKind::Accessor,
            Self::Events(_) => MemberKind::Event,
        }
    }
}

/// Live state that can be introspected.
pub trait Reflect {
    /// Runtime type of the state.
    fn type_desc(&self) -> &TypeDesc;

    /// Members to inspect: fields, then events, then accessors.
    ///
    /// Only fields declared on the runtime type itself are yielded; fields
    /// declared on a base type are not.
    fn member_sources(&self) -> Vec<MemberSource<'_>>;
}

/// Reflective instance built from explicit member lists.
#[derive(Debug, Clone)]
pub struct Instance {
    ty: Arc<TypeDesc>,
    fields: Vec<Field>,
    accessors: Vec<Accessor>,
    events: Vec<Event>,
}

impl Instance {
    /// Empty instance of `ty`.
    pub fn new(ty: Arc<TypeDesc>) -> Self {
        Self {
            ty,
            fields: Vec::new(),
            accessors: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Adds a field declared on the instance's own type.
    #[must_use]
    pub fn with_field(
        self,
        name: impl Into<String>,
        declared: DeclaredType,
        value: impl Into<Value>,
    ) -> Self {
        let declared_in = self.ty.name().to_owned();
        self.with_inherited_field(declared_in, name, declared, value)
    }

    /// Adds a field declared on `declared_in` (the type itself or one of its bases).
    #[must_use]
    pub fn with_inherited_field(
        mut self,
        declared_in: impl Into<String>,
        name: impl Into<String>,
        declared: DeclaredType,
        value: impl Into<Value>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            declared,
            declared_in: declared_in.into(),
            value: value.into(),
        });
        self
    }

    /// Adds an accessor.
    #[must_use]
    pub fn with_accessor(mut self, accessor: Accessor) -> Self {
        self.accessors.push(accessor);
        self
    }

    /// Adds an event with a resolvable subscriber list.
    #[must_use]
    pub fn with_event(
        mut self,
        name: impl Into<String>,
        subscribers: impl IntoIterator<Item = Subscriber>,
    ) -> Self {
        self.events.push(Event {
            name: name.into(),
            subscribers: Some(subscribers.into_iter().collect()),
        });
        self
    }

    /// Adds an event whose subscriber storage cannot be resolved.
    #[must_use]
    pub fn with_opaque_event(mut self, name: impl Into<String>) -> Self {
        self.events.push(Event {
            name: name.into(),
            subscribers: None,
        });
        self
    }

    /// Every stored field, including shadowed declarations.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Mutable access to a field by name (most-derived declaration first).
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        let ty = Arc::clone(&self.ty);
        self.fields
            .iter_mut()
            .filter(|f| f.name == name)
            .min_by_key(|f| ty.depth_of(&f.declared_in).unwrap_or(0))
    }

    /// Fields declared on the instance's own type, in insertion order.
    fn own_fields(&self) -> impl Iterator<Item = &Field> {
        let own = self.ty.name();
        self.fields.iter().filter(move |f| f.declared_in == own)
    }
}

impl Reflect for Instance {
    fn type_desc(&self) -> &TypeDesc {
        &self.ty
    }

    fn member_sources(&self) -> Vec<MemberSource<'_>> {
        self.own_fields()
            .map(MemberSource::Field)
            .chain(self.events.iter().map(MemberSource::Events))
            .chain(self.accessors.iter().map(MemberSource::Accessor))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(instance: &Instance) -> Vec<(MemberKind, String)> {
        instance
            .member_sources()
            .iter()
            .map(|m| (m.kind(), m.name().to_owned()))
            .collect()
    }

    #[test]
    fn only_fields_declared_on_the_runtime_type_are_sources() {
        let base = Arc::new(TypeDesc::new("Weapon"));
        let ty = Arc::new(TypeDesc::new("Sword").with_base(base));
        let instance = Instance::new(ty)
            .with_inherited_field("Weapon", "damage", DeclaredType::opaque("int"), Value::Int(1))
            .with_field("damage", DeclaredType::opaque("int"), Value::Int(9))
            .with_inherited_field("Weapon", "owner", DeclaredType::opaque("int"), Value::Int(3));

        let sources = instance.member_sources();
        assert_eq!(sources.len(), 1);
        let MemberSource::Field(damage) = sources[0] else {
            panic!("expected a field, got {:?}", sources[0]);
        };
        assert_eq!(damage.name, "damage");
        assert_eq!(damage.declared_in, "Sword");
        assert_eq!(instance.fields().len(), 3);
    }

    #[test]
    fn sources_are_fields_then_events_then_accessors() {
        let instance = Instance::new(Arc::new(TypeDesc::new("Door")))
            .with_accessor(Accessor::constant(
                "isOpen",
                DeclaredType::opaque("bool"),
                Value::Bool(true),
            ))
            .with_event("onOpened", [])
            .with_field("speed", DeclaredType::opaque("float"), Value::Float(1.5));

        assert_eq!(
            names(&instance),
            vec![
                (MemberKind::Field, "speed".to_owned()),
                (MemberKind::Event, "onOpened".to_owned()),
                (MemberKind::Accessor, "isOpen".to_owned()),
            ]
        );
    }

    #[test]
    fn unavailable_accessor_reports_reason() {
        let acc = Accessor::unavailable("velocity", DeclaredType::opaque("Vector3"), "inactive");
        let err = acc.read().unwrap_err();
        assert_eq!(err.accessor, "velocity");
        assert_eq!(err.to_string(), "accessor `velocity` unavailable: inactive");
    }

    #[test]
    fn field_mut_prefers_most_derived() {
        let base = Arc::new(TypeDesc::new("Weapon"));
        let ty = Arc::new(TypeDesc::new("Sword").with_base(base));
        let mut instance = Instance::new(ty)
            .with_inherited_field("Weapon", "damage", DeclaredType::opaque("int"), Value::Int(1))
            .with_field("damage", DeclaredType::opaque("int"), Value::Int(9));
        let field = instance.field_mut("damage").unwrap();
        assert_eq!(field.declared_in, "Sword");
        field.value = Value::Null;
        assert!(instance.fields()[1].value.is_null());
    }

    #[test]
    fn same_object_policy_by_kind() {
        assert!(MemberKind::Field.allows_same_object());
        assert!(MemberKind::Event.allows_same_object());
        assert!(!MemberKind::Accessor.allows_same_object());
    }
}
