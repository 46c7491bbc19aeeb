//! Live-storage query surface.
//!
//! The engine never owns persistence; it reads existing collections
//! through [`LiveStore`] and returns new value graphs for the caller to
//! write back. [`InMemoryStore`] is the reference implementation used by
//! tests and by the CLI's file-backed store.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{BlockType, FieldId, FieldSettings, Group, LiveField};

#[cfg(test)]
use mockall::automock;

/// Read access to the live collections owned by a composite field.
///
/// Both queries return entities in stable sort order (`sort_order`
/// ascending, ties keeping their stored order).
#[cfg_attr(test, automock)]
pub trait LiveStore {
    /// Block-type groups of the given field.
    fn groups_by_field_id(&self, field: FieldId) -> Vec<Group>;

    /// Block types of the given field.
    fn block_types_by_field_id(&self, field: FieldId) -> Vec<BlockType>;
}

/// A store with no live state. Backs imports into empty storage and
/// exports of fields that were never persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStore;

impl LiveStore for EmptyStore {
    fn groups_by_field_id(&self, _field: FieldId) -> Vec<Group> {
        Vec::new()
    }

    fn block_types_by_field_id(&self, _field: FieldId) -> Vec<BlockType> {
        Vec::new()
    }
}

/// Denormalized in-memory live storage: top-level fields keyed by handle,
/// with composite collections embedded in each field's settings.
///
/// [`InMemoryStore::persist`] is the caller-side half of the import
/// contract: it assigns ids throughout a returned value graph and stores
/// it, replacing any previous graph for the same handle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemoryStore {
    fields: IndexMap<String, LiveField>,
    #[serde(default)]
    next_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a top-level field by handle.
    pub fn field(&self, handle: &str) -> Option<&LiveField> {
        self.fields.get(handle)
    }

    /// Iterates top-level fields in storage order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &LiveField)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Drops top-level fields whose handle the predicate rejects.
    pub fn retain_fields(&mut self, keep: impl Fn(&str) -> bool) {
        self.fields.retain(|handle, _| keep(handle));
    }

    /// Persists a field graph returned by an import: assigns ids to every
    /// entity that lacks one, stamps owning field ids onto groups and
    /// block types, and replaces the stored graph for that handle.
    pub fn persist(&mut self, field: LiveField) -> FieldId {
        let mut field = field;
        self.assign_ids(&mut field);
        let id = field.id.expect("persist assigns an id");
        self.fields.insert(field.handle.clone(), field);
        id
    }

    fn assign_ids(&mut self, field: &mut LiveField) {
        if field.id.is_none() {
            field.id = Some(FieldId(self.bump()));
        }
        let field_id = field.id;
        if let FieldSettings::Composite(settings) = &mut field.settings {
            for group in &mut settings.groups {
                if group.id.is_none() {
                    group.id = Some(self.bump());
                }
                group.field_id = field_id;
            }
            for block_type in &mut settings.block_types {
                if block_type.id.is_none() {
                    block_type.id = Some(self.bump());
                }
                block_type.field_id = field_id;
                for tab in &mut block_type.layout.tabs {
                    for sub_field in &mut tab.fields {
                        self.assign_ids(sub_field);
                    }
                }
            }
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Finds a field anywhere in the stored graphs, including fields
    /// nested inside block-type layouts.
    fn find(&self, id: FieldId) -> Option<&LiveField> {
        fn walk(field: &LiveField, id: FieldId) -> Option<&LiveField> {
            if field.id == Some(id) {
                return Some(field);
            }
            let settings = field.composite_settings()?;
            settings
                .block_types
                .iter()
                .flat_map(|block_type| block_type.layout.tabs.iter())
                .flat_map(|tab| tab.fields.iter())
                .find_map(|sub_field| walk(sub_field, id))
        }
        self.fields.values().find_map(|field| walk(field, id))
    }
}

impl LiveStore for InMemoryStore {
    fn groups_by_field_id(&self, field: FieldId) -> Vec<Group> {
        let mut groups = self
            .find(field)
            .and_then(LiveField::composite_settings)
            .map(|settings| settings.groups.clone())
            .unwrap_or_default();
        groups.sort_by_key(|group| group.sort_order);
        groups
    }

    fn block_types_by_field_id(&self, field: FieldId) -> Vec<BlockType> {
        let mut block_types = self
            .find(field)
            .and_then(LiveField::composite_settings)
            .map(|settings| settings.block_types.clone())
            .unwrap_or_default();
        block_types.sort_by_key(|block_type| block_type.sort_order);
        block_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompositeSettings, FieldLayout, LayoutTab};

    fn composite_field(handle: &str) -> LiveField {
        LiveField {
            id: None,
            handle: handle.into(),
            field_type: "blocks".into(),
            name: handle.to_uppercase(),
            group: None,
            settings: FieldSettings::Composite(CompositeSettings {
                options: Default::default(),
                groups: vec![Group {
                    id: None,
                    field_id: None,
                    name: "Media".into(),
                    sort_order: 2,
                }],
                block_types: vec![BlockType {
                    handle: "quote".into(),
                    name: "Quote".into(),
                    sort_order: 1,
                    layout: FieldLayout {
                        tabs: vec![LayoutTab {
                            name: "Content".into(),
                            fields: vec![LiveField {
                                id: None,
                                handle: "attribution".into(),
                                field_type: "text".into(),
                                name: "Attribution".into(),
                                group: None,
                                settings: FieldSettings::default(),
                            }],
                        }],
                    },
                    ..Default::default()
                }],
            }),
        }
    }

    #[test]
    fn persist_assigns_ids_throughout_the_graph() {
        let mut store = InMemoryStore::new();
        let id = store.persist(composite_field("article"));

        let field = store.field("article").unwrap();
        assert_eq!(field.id, Some(id));

        let settings = field.composite_settings().unwrap();
        assert!(settings.groups[0].id.is_some());
        assert_eq!(settings.groups[0].field_id, Some(id));
        assert!(settings.block_types[0].id.is_some());
        assert!(settings.block_types[0].layout.tabs[0].fields[0].id.is_some());
    }

    #[test]
    fn persist_twice_keeps_ids_stable() {
        let mut store = InMemoryStore::new();
        let id = store.persist(composite_field("article"));
        let again = store.field("article").unwrap().clone();
        assert_eq!(store.persist(again), id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn queries_return_sorted_collections_for_nested_fields_too() {
        let mut store = InMemoryStore::new();
        let id = store.persist(composite_field("article"));

        let groups = store.groups_by_field_id(id);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Media");

        let block_types = store.block_types_by_field_id(id);
        assert_eq!(block_types.len(), 1);

        let article = store.field("article").unwrap();
        let settings = article.composite_settings().unwrap();
        let nested_id = settings.block_types[0].layout.tabs[0].fields[0].id.unwrap();
        // nested non-composite field resolves but has no collections
        assert!(store.groups_by_field_id(nested_id).is_empty());
    }

    #[test]
    fn unknown_id_yields_empty_collections() {
        let store = InMemoryStore::new();
        assert!(store.groups_by_field_id(FieldId(99)).is_empty());
        assert!(store.block_types_by_field_id(FieldId(99)).is_empty());
    }
}
