// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]

use sceneref_core::{make_component_id, make_object_id, FilterPolicy, Handle, ReferenceEdge};

#[test]
fn policy_survives_json() {
    let policy = FilterPolicy::default()
        .with_ignored_type("Texture2D")
        .with_ignored_event("onTick");
    let json = serde_json::to_string(&policy).expect("serialize");
    let back: FilterPolicy = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, policy);
}

#[test]
fn missing_tables_fall_back_to_defaults() {
    let back: FilterPolicy =
        serde_json::from_str(r#"{ "ignored_events": ["onTick"] }"#).expect("deserialize");
    assert_eq!(back.ignored_types, FilterPolicy::default().ignored_types);
    assert_eq!(back.ignored_members, FilterPolicy::default().ignored_members);
    assert!(back.is_ignored_event("onTick"));
    assert!(!back.is_ignored_event("onRequestRebuild"));
}

#[test]
fn explicit_empty_table_disables_filtering() {
    let back: FilterPolicy =
        serde_json::from_str(r#"{ "ignored_types": [] }"#).expect("deserialize");
    assert!(!back.is_ignored_type("MeshRenderer"));
    assert!(back.is_ignored_member("Transform", "transform"));
}

#[test]
fn edge_handles_are_tagged() {
    let edge = ReferenceEdge::new(make_component_id("a/ai"), make_object_id("b"), "follow");
    let value = serde_json::to_value(&edge).expect("serialize");
    assert!(value["referent"].get("object").is_some());
    assert_eq!(value["label"], "follow");
    let back: ReferenceEdge = serde_json::from_value(value).expect("deserialize");
    assert_eq!(back, edge);
    assert!(matches!(back.referent, Handle::Object(_)));
}
