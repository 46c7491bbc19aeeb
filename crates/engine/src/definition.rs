//! Declarative schema definitions.
//!
//! These types form the portable tree written to and read from schema
//! documents. Identity is carried by handle and name strings only;
//! storage-assigned ids never appear here, so a document diffs cleanly
//! across environments.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SyncError};

/// Type-specific settings as an ordered key/value map.
pub type SettingsMap = IndexMap<String, Value>;

/// Root of a schema document: field definitions keyed by handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub fields: IndexMap<String, FieldDefinition>,
}

/// Declarative definition of a single field.
///
/// `name` and `settings` are optional at the serde layer so a document
/// that omits them can be rejected with a precise error instead of being
/// silently defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Type discriminator resolved through the field type registry.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Parent field-group name, when the field belongs to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsMap>,
    /// Block-type groups keyed by name. Composite fields only.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub groups: IndexMap<String, GroupDefinition>,
    /// Block types keyed by handle. Composite fields only.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub block_types: IndexMap<String, BlockTypeDefinition>,
}

impl FieldDefinition {
    /// Creates a definition with the given type and name and empty settings.
    pub fn new(field_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            field_type: field_type.into(),
            settings: Some(SettingsMap::new()),
            ..Default::default()
        }
    }

    /// Adds a type-specific setting.
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings
            .get_or_insert_with(SettingsMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds a block-type group definition.
    pub fn with_group(mut self, key: impl Into<String>, group: GroupDefinition) -> Self {
        self.groups.insert(key.into(), group);
        self
    }

    /// Adds a block-type definition.
    pub fn with_block_type(
        mut self,
        handle: impl Into<String>,
        block_type: BlockTypeDefinition,
    ) -> Self {
        self.block_types.insert(handle.into(), block_type);
        self
    }

    pub(crate) fn require_name(&self, handle: &str) -> Result<&str> {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| SyncError::malformed(handle, "missing required key 'name'"))
    }

    pub(crate) fn require_settings(&self, handle: &str) -> Result<&SettingsMap> {
        self.settings
            .as_ref()
            .ok_or_else(|| SyncError::malformed(handle, "missing required key 'settings'"))
    }
}

/// Declarative block-type group. Identity is the `name` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDefinition {
    pub name: String,
    #[serde(default)]
    pub sort_order: u32,
}

/// Declarative block type within a composite field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Name of the associated block-type group, when the field type has groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_layout: Option<LayoutDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<BlockTypeSettings>,
}

impl BlockTypeDefinition {
    /// Creates a block-type definition with an empty layout.
    pub fn new(name: impl Into<String>, settings: BlockTypeSettings) -> Self {
        Self {
            name: Some(name.into()),
            field_layout: Some(LayoutDefinition::default()),
            settings: Some(settings),
            ..Default::default()
        }
    }

    /// Sets the associated group name.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Replaces the nested field layout.
    pub fn with_layout(mut self, layout: LayoutDefinition) -> Self {
        self.field_layout = Some(layout);
        self
    }
}

/// Block-type settings. Allowlist-related members are absent for field
/// types without child-block support.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_blocks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_child_blocks: Option<u32>,
    /// Handles of block types allowed as children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_blocks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_level: Option<bool>,
    #[serde(default)]
    pub sort_order: u32,
}

/// Declarative field layout: tab name to sub-field definitions by handle.
///
/// Order is semantic on both levels; it is preserved through import and
/// reproduced on export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutDefinition(pub IndexMap<String, IndexMap<String, FieldDefinition>>);

impl LayoutDefinition {
    pub fn is_empty(&self) -> bool {
        self.0.values().all(IndexMap::is_empty)
    }

    /// True when any tab declares a sub-field with the given handle.
    pub fn declares_handle(&self, handle: &str) -> bool {
        self.0.values().any(|fields| fields.contains_key(handle))
    }

    /// Appends a tab with the given sub-fields, preserving order.
    pub fn with_tab<I>(mut self, name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (String, FieldDefinition)>,
    {
        self.0.insert(name.into(), fields.into_iter().collect());
        self
    }
}
