//! Live-side value objects.
//!
//! The engine transforms these in-memory representations; it never
//! persists them. Import returns a fresh value graph and the caller
//! decides the transaction boundary for writing it back.

use serde::{Deserialize, Serialize};

use crate::definition::SettingsMap;

/// Storage-assigned field identifier. `None` on entities created by an
/// import that has not been persisted yet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FieldId(pub u64);

/// A runtime field as the caller's storage layer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveField {
    pub id: Option<FieldId>,
    pub handle: String,
    pub field_type: String,
    pub name: String,
    /// Parent field-group name, when assigned to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub settings: FieldSettings,
}

impl LiveField {
    /// Composite settings, when this is a composite field.
    pub fn composite_settings(&self) -> Option<&CompositeSettings> {
        match &self.settings {
            FieldSettings::Composite(settings) => Some(settings),
            FieldSettings::Generic(_) => None,
        }
    }

    /// The type-specific settings map, whichever variant is attached.
    pub fn options(&self) -> &SettingsMap {
        match &self.settings {
            FieldSettings::Generic(map) => map,
            FieldSettings::Composite(settings) => &settings.options,
        }
    }
}

/// Field settings, tagged by the shape the field type requires.
///
/// A settings value is only carried over from an existing field when the
/// declared type matches the existing field's type, so a `Generic` value
/// is never reinterpreted as `Composite` or vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldSettings {
    Generic(SettingsMap),
    Composite(CompositeSettings),
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self::Generic(SettingsMap::new())
    }
}

/// Consolidated settings of a composite field: the type-specific options
/// plus the reconciled group and block-type collections, assembled at the
/// end of an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeSettings {
    pub options: SettingsMap,
    pub groups: Vec<Group>,
    pub block_types: Vec<BlockType>,
}

/// A block-type group. Referenced by name, never by id; owned by exactly
/// one composite field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Option<u64>,
    pub field_id: Option<FieldId>,
    pub name: String,
    pub sort_order: u32,
}

/// A block type: a repeatable sub-structure of a composite field carrying
/// its own nested field layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockType {
    pub id: Option<u64>,
    pub field_id: Option<FieldId>,
    pub handle: String,
    pub name: String,
    /// Name of the associated group, so membership survives a round-trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub layout: FieldLayout,
    pub max_blocks: Option<u32>,
    pub max_child_blocks: Option<u32>,
    pub child_blocks: Vec<String>,
    pub top_level: bool,
    pub sort_order: u32,
}

/// An ordered arrangement of fields grouped into tabs. Tabs own their
/// fields as values, so nesting is structural and always finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLayout {
    pub tabs: Vec<LayoutTab>,
}

impl FieldLayout {
    /// Finds a field anywhere in the layout by handle.
    pub fn field_by_handle(&self, handle: &str) -> Option<&LiveField> {
        self.tabs
            .iter()
            .flat_map(|tab| tab.fields.iter())
            .find(|field| field.handle == handle)
    }

    /// Total number of fields across all tabs.
    pub fn field_count(&self) -> usize {
        self.tabs.iter().map(|tab| tab.fields.len()).sum()
    }
}

/// A single layout tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTab {
    pub name: String,
    pub fields: Vec<LiveField>,
}
