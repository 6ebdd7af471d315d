// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Presentation of a reference pass: grouping, line formatting, and the
//! visible/isolated object split. Nothing here mutates the scene.

use std::collections::BTreeSet;
use std::io::{self, Write};

use comfy_table::{presets::UTF8_FULL, Table};
use sceneref_core::{Handle, ObjectId, ReferenceEdge, SceneGraph, OBJECT_TYPE_NAME};
use serde::Serialize;

use crate::scene_file::Labels;

/// One edge resolved to display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeRow {
    /// Label of the object owning the component.
    pub owner_object: String,
    /// Display name of that object.
    pub owner_name: String,
    /// Label of the owning component.
    pub owner_component: String,
    /// Runtime type of the owning component.
    pub owner_type: String,
    /// Member label.
    pub label: String,
    /// `object` or `component`.
    pub referent_kind: &'static str,
    /// Label of the referent.
    pub referent: String,
    /// Runtime type of the referent (`Object` for objects).
    pub referent_type: String,
    /// Display name of the object representing the referent.
    pub target_name: String,
}

impl EdgeRow {
    /// Resolves `edge` against `scene`. Unresolvable parts render as `?`.
    pub fn new<S: SceneGraph + ?Sized>(scene: &S, labels: &Labels, edge: &ReferenceEdge) -> Self {
        let owner_object = edge.owner_object(scene);
        let (referent_kind, referent, referent_type) = match edge.referent {
            Handle::Object(id) => ("object", labels.object(id), OBJECT_TYPE_NAME.to_owned()),
            Handle::Component(id) => (
                "component",
                labels.component(id),
                scene.component_type(id).unwrap_or("?").to_owned(),
            ),
        };
        Self {
            owner_object: owner_object.map_or_else(|| "?".to_owned(), |o| labels.object(o)),
            owner_name: display_name(scene, owner_object),
            owner_component: labels.component(edge.owner),
            owner_type: scene.component_type(edge.owner).unwrap_or("?").to_owned(),
            label: edge.label.clone(),
            referent_kind,
            referent,
            referent_type,
            target_name: display_name(scene, edge.referent_object(scene)),
        }
    }

    /// `<OwnerComponentType>.<label> -> (<ReferentType>) <TargetName>`.
    pub fn line(&self) -> String {
        format!(
            "{}.{} -> ({}) {}",
            self.owner_type, self.label, self.referent_type, self.target_name
        )
    }
}

fn display_name<S: SceneGraph + ?Sized>(scene: &S, object: Option<ObjectId>) -> String {
    object
        .and_then(|o| scene.object_name(o))
        .unwrap_or("?")
        .to_owned()
}

/// Edges grouped by owning object, groups ordered by object name.
///
/// Edges keep their pass order inside a group.
pub fn group_by_owner<'e, S: SceneGraph + ?Sized>(
    scene: &S,
    edges: &'e [ReferenceEdge],
) -> Vec<(Option<ObjectId>, Vec<&'e ReferenceEdge>)> {
    let mut keyed: Vec<_> = edges
        .iter()
        .map(|e| (e.owner_object(scene), e))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let name = |o: &Option<ObjectId>| o.and_then(|o| scene.object_name(o));
        name(a).cmp(&name(b)).then(a.cmp(b))
    });
    let mut groups: Vec<(Option<ObjectId>, Vec<&ReferenceEdge>)> = Vec::new();
    for (owner, edge) in keyed {
        match groups.last_mut() {
            Some((current, members)) if *current == owner => members.push(edge),
            _ => groups.push((owner, vec![edge])),
        }
    }
    groups
}

/// Objects kept visible when non-communicating objects are hidden: every
/// owner and referent object plus all of their ancestors.
pub fn visible_objects<S: SceneGraph + ?Sized>(
    scene: &S,
    edges: &[ReferenceEdge],
) -> BTreeSet<ObjectId> {
    let mut visible = BTreeSet::new();
    let participants = edges
        .iter()
        .flat_map(|e| [e.owner_object(scene), e.referent_object(scene)])
        .flatten();
    for object in participants {
        let mut cursor = Some(object);
        while let Some(current) = cursor {
            if !visible.insert(current) {
                break;
            }
            cursor = scene.parent_of(current);
        }
    }
    visible
}

/// Enumerable objects that would be hidden, in enumeration order.
pub fn isolated_objects<S: SceneGraph + ?Sized>(
    scene: &S,
    edges: &[ReferenceEdge],
    roots_only: bool,
) -> Vec<ObjectId> {
    let visible = visible_objects(scene, edges);
    scene
        .objects(roots_only)
        .into_iter()
        .filter(|o| !visible.contains(o))
        .collect()
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    /// Plain lines grouped under object headers.
    #[default]
    Text,
    /// Bordered table.
    Table,
    /// JSON array.
    Json,
}

/// Writes `edges` in `format`.
pub fn write_edges<S: SceneGraph + ?Sized, W: Write>(
    out: &mut W,
    scene: &S,
    labels: &Labels,
    edges: &[ReferenceEdge],
    format: Format,
) -> anyhow::Result<()> {
    let groups = group_by_owner(scene, edges);
    let rows = groups
        .iter()
        .flat_map(|(_, members)| members.iter())
        .map(|e| EdgeRow::new(scene, labels, e));
    match format {
        Format::Json => {
            let rows: Vec<_> = rows.collect();
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
        Format::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(vec![
                "Object", "Component", "Member", "Referent", "Target",
            ]);
            for row in rows {
                table.add_row(vec![
                    row.owner_name,
                    row.owner_type,
                    row.label,
                    row.referent_type,
                    row.target_name,
                ]);
            }
            writeln!(out, "{table}")?;
        }
        Format::Text => {
            for (owner, members) in &groups {
                writeln!(out, "{}:", display_name(scene, *owner))?;
                for edge in members {
                    writeln!(out, "  {}", EdgeRow::new(scene, labels, edge).line())?;
                }
            }
        }
    }
    Ok(())
}

/// Writes the objects in `objects` (label and name) in `format`.
pub fn write_objects<S: SceneGraph + ?Sized, W: Write>(
    out: &mut W,
    scene: &S,
    labels: &Labels,
    objects: &[ObjectId],
    format: Format,
) -> io::Result<()> {
    #[derive(Serialize)]
    struct ObjectRow {
        id: String,
        name: String,
    }
    let rows = objects.iter().map(|&o| ObjectRow {
        id: labels.object(o),
        name: display_name(scene, Some(o)),
    });
    match format {
        Format::Json => {
            let rows: Vec<_> = rows.collect();
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)
        }
        Format::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(vec!["Id", "Name"]);
            for row in rows {
                table.add_row(vec![row.id, row.name]);
            }
            writeln!(out, "{table}")
        }
        Format::Text => {
            for row in rows {
                writeln!(out, "{} ({})", row.name, row.id)?;
            }
            Ok(())
        }
    }
}
