// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! sceneref-core: reference discovery over live scene objects.
//!
//! A collection pass starts from every component of every supplied object,
//! introspects the component's state (fields, accessors, event subscribers),
//! filters noise through a [`FilterPolicy`], and returns a flat list of
//! [`ReferenceEdge`]s.
//!
//! The engine reads the scene through the [`SceneGraph`] port and never
//! mutates it. It computes no transitive closure and does not deduplicate:
//! two members holding the same reference produce two edges.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod collect;
mod edge;
mod ident;
mod introspect;
mod policy;
mod reflect;
mod scene;
mod value;

/// Reference collector and the "who references this object" filter.
pub use collect::{find_references_to, ReferenceCollector};
/// Reference edge type.
pub use edge::ReferenceEdge;
/// Scene identifiers and handles.
pub use ident::{make_component_id, make_object_id, ComponentId, Handle, Hash, ObjectId};
/// Object introspector and its candidate type.
pub use introspect::{Candidate, Introspector};
/// Noise-filtering policy tables.
pub use policy::{
    FilterPolicy, DEFAULT_IGNORED_EVENTS, DEFAULT_IGNORED_MEMBERS, DEFAULT_IGNORED_TYPES,
};
/// Reflection surface exposed to the introspector.
pub use reflect::{
    Accessor, AccessorUnavailable, Event, Field, Getter, Instance, MemberKind, MemberSource,
    Reflect, Subscriber,
};
/// Scene-graph port and the in-memory scene store.
pub use scene::{ComponentRecord, Lifecycle, ObjectRecord, Scene, SceneError, SceneGraph};
/// Runtime values and type descriptors.
pub use value::{CollectionKind, DeclaredType, TypeDesc, Value, OBJECT_TYPE_NAME};
