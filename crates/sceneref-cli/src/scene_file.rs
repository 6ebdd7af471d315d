// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON scene documents.
//!
//! A document names objects and components by label; labels become ids via
//! [`make_object_id`] / [`make_component_id`]. Every label a document uses
//! (parents, handle values) must be declared in the same document.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use sceneref_core::{
    make_component_id, make_object_id, Accessor, ComponentId, DeclaredType, Instance, Lifecycle,
    ObjectId, Scene, SceneError, Subscriber, TypeDesc, Value, OBJECT_TYPE_NAME,
};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Top-level scene document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDocument {
    /// Type table: inheritance and transparency.
    #[serde(default)]
    pub types: Vec<TypeDoc>,
    /// Objects in document order.
    #[serde(default)]
    pub objects: Vec<ObjectDoc>,
}

/// Type table entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDoc {
    /// Type name.
    pub name: String,
    /// Base type name.
    #[serde(default)]
    pub base: Option<String>,
    /// Plain data type whose members are walked in place.
    #[serde(default)]
    pub transparent: bool,
}

/// Object entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectDoc {
    /// Document-unique label.
    pub id: String,
    /// Display name; defaults to the label.
    #[serde(default)]
    pub name: Option<String>,
    /// Parent object label.
    #[serde(default)]
    pub parent: Option<String>,
    /// Editing state.
    #[serde(default)]
    pub lifecycle: Lifecycle,
    /// Asset template path.
    #[serde(default)]
    pub asset_path: Option<String>,
    /// Attached components.
    #[serde(default)]
    pub components: Vec<ComponentDoc>,
}

/// Component entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentDoc {
    /// Document-unique label.
    pub id: String,
    /// Runtime type name.
    #[serde(rename = "type")]
    pub ty: String,
    /// Stored fields.
    #[serde(default)]
    pub fields: Vec<FieldDoc>,
    /// Computed accessors.
    #[serde(default)]
    pub accessors: Vec<AccessorDoc>,
    /// Events.
    #[serde(default)]
    pub events: Vec<EventDoc>,
}

/// Field entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDoc {
    /// Member name.
    pub name: String,
    /// Declared type; inferred from the value when absent.
    #[serde(default)]
    pub declared: Option<String>,
    /// Declaring type in the inheritance chain; defaults to the owner type.
    #[serde(default)]
    pub declared_in: Option<String>,
    /// Current value.
    #[serde(default, deserialize_with = "nullable")]
    pub value: ValueDoc,
}

/// Accessor entry. `unavailable` wins over `value`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessorDoc {
    /// Member name.
    pub name: String,
    /// Declared return type.
    #[serde(default)]
    pub declared: Option<String>,
    /// Value every read returns.
    #[serde(default, deserialize_with = "nullable")]
    pub value: ValueDoc,
    /// Failure reason every read reports.
    #[serde(default)]
    pub unavailable: Option<String>,
}

/// Event entry. Omitting `subscribers` models unresolvable storage.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventDoc {
    /// Event name.
    pub name: String,
    /// Bound handlers.
    #[serde(default)]
    pub subscribers: Option<Vec<SubscriberDoc>>,
}

/// Event subscriber entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscriberDoc {
    /// Receiver; `null` for free functions.
    #[serde(default, deserialize_with = "nullable")]
    pub receiver: ValueDoc,
    /// Handler method name.
    pub handler: String,
}

/// Value literal.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDoc {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// String.
    Text(String),
    /// Object handle by label.
    Object(String),
    /// Component handle by label.
    Component(String),
    /// Ordered collection.
    List(#[serde(deserialize_with = "nullable_items")] Vec<ValueDoc>),
    /// Unordered collection.
    Set(#[serde(deserialize_with = "nullable_items")] Vec<ValueDoc>),
    /// Nested plain-data record.
    Record(RecordDoc),
}

/// Reads a value literal where JSON `null` means [`ValueDoc::Null`].
fn nullable<'de, D: Deserializer<'de>>(de: D) -> Result<ValueDoc, D::Error> {
    Ok(Option::<ValueDoc>::deserialize(de)?.unwrap_or_default())
}

fn nullable_items<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<ValueDoc>, D::Error> {
    let items = Vec::<Option<ValueDoc>>::deserialize(de)?;
    Ok(items.into_iter().map(Option::unwrap_or_default).collect())
}

/// Record literal.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordDoc {
    /// Record type name.
    #[serde(rename = "type")]
    pub ty: String,
    /// Record fields.
    #[serde(default)]
    pub fields: Vec<FieldDoc>,
}

/// Error raised while turning a document into a [`Scene`].
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Document is not valid JSON for the schema.
    #[error("malformed scene document: {0}")]
    Json(#[from] serde_json::Error),
    /// Two type table entries share a name.
    #[error("type `{0}` declared twice")]
    DuplicateType(String),
    /// A type's base chain loops back on itself.
    #[error("type `{0}` inherits from itself")]
    InheritanceCycle(String),
    /// Two objects share a label.
    #[error("object `{0}` declared twice")]
    DuplicateObject(String),
    /// Two components share a label.
    #[error("component `{0}` declared twice")]
    DuplicateComponent(String),
    /// A parent label names no object.
    #[error("object `{object}` has unknown parent `{parent}`")]
    UnknownParent {
        /// Child label.
        object: String,
        /// Missing parent label.
        parent: String,
    },
    /// A value names an object label that is not declared.
    #[error("`{member}` on `{component}` references unknown object `{label}`")]
    UnknownObject {
        /// Component holding the value.
        component: String,
        /// Member holding the value.
        member: String,
        /// Missing label.
        label: String,
    },
    /// A value names a component label that is not declared.
    #[error("`{member}` on `{component}` references unknown component `{label}`")]
    UnknownComponent {
        /// Component holding the value.
        component: String,
        /// Member holding the value.
        member: String,
        /// Missing label.
        label: String,
    },
    /// The scene store rejected an operation.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Id to label lookups for a loaded document.
#[derive(Debug, Default)]
pub struct Labels {
    objects: BTreeMap<ObjectId, String>,
    components: BTreeMap<ComponentId, String>,
}

impl Labels {
    /// Label of `object`, or its short hex id when unknown.
    pub fn object(&self, id: ObjectId) -> String {
        self.objects
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.short_hex())
    }

    /// Label of `component`, or its short hex id when unknown.
    pub fn component(&self, id: ComponentId) -> String {
        self.components
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.short_hex())
    }

    /// Id for an object label declared in the document.
    pub fn object_id(&self, label: &str) -> Option<ObjectId> {
        let id = make_object_id(label);
        self.objects.contains_key(&id).then_some(id)
    }
}

/// A scene built from a document, with its labels.
#[derive(Debug)]
pub struct LoadedScene {
    /// The scene.
    pub scene: Scene,
    /// Id to label lookups.
    pub labels: Labels,
}

/// Reads and builds the scene document at `path`.
pub fn load_path(path: &Path) -> anyhow::Result<LoadedScene> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scene document {}", path.display()))?;
    load_str(&text).with_context(|| format!("loading scene document {}", path.display()))
}

/// Parses and builds a scene document.
pub fn load_str(text: &str) -> Result<LoadedScene, DocumentError> {
    let doc: SceneDocument = serde_json::from_str(text)?;
    build(&doc)
}

/// Builds a scene from a parsed document.
pub fn build(doc: &SceneDocument) -> Result<LoadedScene, DocumentError> {
    let types = TypeTable::new(&doc.types)?;

    let mut labels = Labels::default();
    let mut component_types: BTreeMap<&str, &str> = BTreeMap::new();
    for object in &doc.objects {
        if labels
            .objects
            .insert(make_object_id(&object.id), object.id.clone())
            .is_some()
        {
            return Err(DocumentError::DuplicateObject(object.id.clone()));
        }
        for component in &object.components {
            if component_types.insert(&component.id, &component.ty).is_some() {
                return Err(DocumentError::DuplicateComponent(component.id.clone()));
            }
            labels
                .components
                .insert(make_component_id(&component.id), component.id.clone());
        }
    }

    let mut scene = Scene::new();
    for object in &doc.objects {
        let id = make_object_id(&object.id);
        scene.add_object(id, object.name.as_deref().unwrap_or(&object.id))?;
        scene.set_lifecycle(id, object.lifecycle)?;
        scene.set_asset_path(id, object.asset_path.clone())?;
    }
    for object in &doc.objects {
        let Some(parent) = &object.parent else {
            continue;
        };
        let parent_id = labels
            .object_id(parent)
            .ok_or_else(|| DocumentError::UnknownParent {
                object: object.id.clone(),
                parent: parent.clone(),
            })?;
        scene.set_parent(make_object_id(&object.id), Some(parent_id))?;
    }

    let ctx = BuildCtx {
        types: &types,
        labels: &labels,
        component_types: &component_types,
    };
    for object in &doc.objects {
        let owner = make_object_id(&object.id);
        for component in &object.components {
            let state = ctx.component_state(component)?;
            scene.add_component(owner, make_component_id(&component.id), state)?;
        }
    }

    Ok(LoadedScene { scene, labels })
}

struct TypeTable<'d> {
    entries: BTreeMap<&'d str, &'d TypeDoc>,
}

impl<'d> TypeTable<'d> {
    fn new(docs: &'d [TypeDoc]) -> Result<Self, DocumentError> {
        let mut entries = BTreeMap::new();
        for doc in docs {
            if entries.insert(doc.name.as_str(), doc).is_some() {
                return Err(DocumentError::DuplicateType(doc.name.clone()));
            }
        }
        Ok(Self { entries })
    }

    fn is_transparent(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|t| t.transparent)
    }

    /// Descriptor for `name` with its base chain. Unlisted names are plain
    /// opaque types without a base.
    fn resolve(&self, name: &str) -> Result<Arc<TypeDesc>, DocumentError> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut cursor = Some(name);
        while let Some(current) = cursor {
            if !seen.insert(current) {
                return Err(DocumentError::InheritanceCycle(name.to_owned()));
            }
            chain.push(current);
            cursor = self.entries.get(current).and_then(|t| t.base.as_deref());
        }
        let mut desc: Option<Arc<TypeDesc>> = None;
        for ty in chain.into_iter().rev() {
            let mut next = TypeDesc::new(ty);
            if self.is_transparent(ty) {
                next = next.transparent();
            }
            if let Some(base) = desc.take() {
                next = next.with_base(base);
            }
            desc = Some(Arc::new(next));
        }
        Ok(desc.unwrap_or_else(|| Arc::new(TypeDesc::new(name))))
    }
}

struct BuildCtx<'a> {
    types: &'a TypeTable<'a>,
    labels: &'a Labels,
    component_types: &'a BTreeMap<&'a str, &'a str>,
}

impl BuildCtx<'_> {
    fn component_state(&self, doc: &ComponentDoc) -> Result<Instance, DocumentError> {
        let mut state = self.instance(&doc.id, &doc.ty, &doc.fields)?;
        for event in &doc.events {
            state = match &event.subscribers {
                None => state.with_opaque_event(event.name.as_str()),
                Some(subscribers) => {
                    let subscribers = subscribers
                        .iter()
                        .map(|s| {
                            let receiver = self.value(&doc.id, &event.name, &s.receiver)?;
                            Ok(Subscriber::new(receiver, s.handler.as_str()))
                        })
                        .collect::<Result<Vec<_>, DocumentError>>()?;
                    state.with_event(event.name.as_str(), subscribers)
                }
            };
        }
        for accessor in &doc.accessors {
            let declared = self.declared(accessor.declared.as_deref(), &accessor.value);
            let built = match &accessor.unavailable {
                Some(reason) => Accessor::unavailable(accessor.name.as_str(), declared, reason),
                None => {
                    let value = self.value(&doc.id, &accessor.name, &accessor.value)?;
                    Accessor::constant(accessor.name.as_str(), declared, value)
                }
            };
            state = state.with_accessor(built);
        }
        Ok(state)
    }

    fn instance(
        &self,
        component: &str,
        ty: &str,
        fields: &[FieldDoc],
    ) -> Result<Instance, DocumentError> {
        let mut state = Instance::new(self.types.resolve(ty)?);
        for field in fields {
            let value = self.value(component, &field.name, &field.value)?;
            let declared = self.declared(field.declared.as_deref(), &field.value);
            let declared_in = field.declared_in.as_deref().unwrap_or(ty);
            state = state.with_inherited_field(declared_in, field.name.as_str(), declared, value);
        }
        Ok(state)
    }

    fn declared(&self, explicit: Option<&str>, value: &ValueDoc) -> DeclaredType {
        let name = explicit.unwrap_or_else(|| match value {
            ValueDoc::Null | ValueDoc::Object(_) => OBJECT_TYPE_NAME,
            ValueDoc::Bool(_) => "bool",
            ValueDoc::Int(_) => "int",
            ValueDoc::Float(_) => "float",
            ValueDoc::Text(_) => "string",
            ValueDoc::Component(label) => self
                .component_types
                .get(label.as_str())
                .copied()
                .unwrap_or(OBJECT_TYPE_NAME),
            ValueDoc::List(_) => "list",
            ValueDoc::Set(_) => "set",
            ValueDoc::Record(record) => record.ty.as_str(),
        });
        if self.types.is_transparent(name) {
            DeclaredType::transparent(name)
        } else {
            DeclaredType::opaque(name)
        }
    }

    fn value(&self, component: &str, member: &str, doc: &ValueDoc) -> Result<Value, DocumentError> {
        Ok(match doc {
            ValueDoc::Null => Value::Null,
            ValueDoc::Bool(b) => Value::Bool(*b),
            ValueDoc::Int(i) => Value::Int(*i),
            ValueDoc::Float(f) => Value::Float(*f),
            ValueDoc::Text(s) => Value::Text(s.clone()),
            ValueDoc::Object(label) => Value::Object(self.labels.object_id(label).ok_or_else(
                || DocumentError::UnknownObject {
                    component: component.to_owned(),
                    member: member.to_owned(),
                    label: label.clone(),
                },
            )?),
            ValueDoc::Component(label) => {
                if !self.component_types.contains_key(label.as_str()) {
                    return Err(DocumentError::UnknownComponent {
                        component: component.to_owned(),
                        member: member.to_owned(),
                        label: label.clone(),
                    });
                }
                Value::Component(make_component_id(label))
            }
            ValueDoc::List(items) => Value::list(self.values(component, member, items)?),
            ValueDoc::Set(items) => Value::set(self.values(component, member, items)?),
            ValueDoc::Record(record) => {
                Value::record(self.instance(component, &record.ty, &record.fields)?)
            }
        })
    }

    fn values(
        &self,
        component: &str,
        member: &str,
        items: &[ValueDoc],
    ) -> Result<Vec<Value>, DocumentError> {
        items
            .iter()
            .map(|item| self.value(component, member, item))
            .collect()
    }
}
