//! Type-agnostic field export/import.

use crate::definition::FieldDefinition;
use crate::error::Result;
use crate::model::{FieldSettings, LiveField};
use crate::registry::{FieldTypeHandler, SyncContext};

/// Handler for plain field types: the declared name and settings map
/// carry over verbatim, with no nested collections to reconcile.
///
/// Composite handlers delegate their base attributes here.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFieldHandler;

impl DefaultFieldHandler {
    /// Base attribute population shared by all handlers: validates the
    /// required keys and builds the field shell. The existing field
    /// contributes only its id; every other attribute comes from the
    /// declaration.
    pub(crate) fn populate_base(
        definition: &FieldDefinition,
        existing: Option<&LiveField>,
        handle: &str,
        parent_group: Option<&str>,
    ) -> Result<LiveField> {
        let name = definition.require_name(handle)?;
        definition.require_settings(handle)?;
        Ok(LiveField {
            id: existing.and_then(|field| field.id),
            handle: handle.to_string(),
            field_type: definition.field_type.clone(),
            name: name.to_string(),
            group: parent_group
                .map(str::to_string)
                .or_else(|| definition.group.clone()),
            settings: FieldSettings::default(),
        })
    }
}

impl FieldTypeHandler for DefaultFieldHandler {
    fn export(&self, field: &LiveField, _ctx: &SyncContext<'_>) -> Result<FieldDefinition> {
        Ok(FieldDefinition {
            name: Some(field.name.clone()),
            field_type: field.field_type.clone(),
            group: field.group.clone(),
            settings: Some(field.options().clone()),
            ..Default::default()
        })
    }

    fn import(
        &self,
        definition: &FieldDefinition,
        existing: Option<&LiveField>,
        handle: &str,
        parent_group: Option<&str>,
        _force: bool,
        _ctx: &SyncContext<'_>,
    ) -> Result<LiveField> {
        let mut field = Self::populate_base(definition, existing, handle, parent_group)?;
        field.settings =
            FieldSettings::Generic(definition.require_settings(handle)?.clone());
        Ok(field)
    }
}
