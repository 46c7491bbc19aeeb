//! Composite field export/import.
//!
//! A composite field's value is built from repeatable block types, each
//! carrying its own nested field layout which may contain further
//! composite fields. One handler covers every composite variant; what a
//! variant supports is described by [`CompositeCapabilities`] instead of
//! a class per field family.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::definition::{
    BlockTypeDefinition, BlockTypeSettings, FieldDefinition, GroupDefinition,
};
use crate::error::{Result, SyncError};
use crate::handlers::DefaultFieldHandler;
use crate::model::{BlockType, FieldId, FieldSettings, CompositeSettings, Group, LiveField};
use crate::reconcile::reconcile;
use crate::registry::{FieldTypeHandler, SyncContext};

/// What a composite field type supports beyond bare block types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeCapabilities {
    /// Block types can be organized into named groups.
    pub groups: bool,
    /// Block types carry a child-block allowlist, a child limit, and a
    /// top-level flag.
    pub child_blocks: bool,
}

/// Handler for composite field types, parametrized by capabilities.
#[derive(Debug, Clone, Copy)]
pub struct CompositeFieldHandler {
    capabilities: CompositeCapabilities,
}

impl CompositeFieldHandler {
    pub fn new(capabilities: CompositeCapabilities) -> Self {
        Self { capabilities }
    }

    /// Flat variant: block types only.
    pub fn flat() -> Self {
        Self::new(CompositeCapabilities::default())
    }

    /// Full variant: groups plus child-block allowlist.
    pub fn grouped() -> Self {
        Self::new(CompositeCapabilities {
            groups: true,
            child_blocks: true,
        })
    }

    pub fn capabilities(&self) -> CompositeCapabilities {
        self.capabilities
    }

    // ---- export ----

    fn group_definitions(&self, groups: &[Group]) -> IndexMap<String, GroupDefinition> {
        groups
            .iter()
            .map(|group| {
                (
                    group.name.clone(),
                    GroupDefinition {
                        name: group.name.clone(),
                        sort_order: group.sort_order,
                    },
                )
            })
            .collect()
    }

    fn block_type_definitions(
        &self,
        block_types: &[BlockType],
        groups: &[Group],
        ctx: &SyncContext<'_>,
    ) -> Result<IndexMap<String, BlockTypeDefinition>> {
        let mut definitions = IndexMap::with_capacity(block_types.len());
        for block_type in block_types {
            // first associated group's name, or null when none matches
            let group = block_type
                .group
                .as_ref()
                .filter(|name| groups.iter().any(|g| &g.name == *name))
                .cloned();
            let definition = BlockTypeDefinition {
                name: Some(block_type.name.clone()),
                group: if self.capabilities.groups { group } else { None },
                field_layout: Some(ctx.layouts.to_definition(&block_type.layout, ctx)?),
                settings: Some(self.block_type_settings(block_type)),
            };
            definitions.insert(block_type.handle.clone(), definition);
        }
        Ok(definitions)
    }

    fn block_type_settings(&self, block_type: &BlockType) -> BlockTypeSettings {
        BlockTypeSettings {
            max_blocks: block_type.max_blocks,
            max_child_blocks: self
                .capabilities
                .child_blocks
                .then_some(block_type.max_child_blocks)
                .flatten(),
            child_blocks: self
                .capabilities
                .child_blocks
                .then(|| block_type.child_blocks.clone()),
            top_level: self.capabilities.child_blocks.then_some(block_type.top_level),
            sort_order: block_type.sort_order,
        }
    }

    // ---- import ----

    fn reconcile_groups(
        &self,
        existing: Vec<Group>,
        definition: &FieldDefinition,
        field_id: Option<FieldId>,
        force: bool,
    ) -> Result<Vec<Group>> {
        if !self.capabilities.groups {
            if !definition.groups.is_empty() {
                tracing::debug!("ignoring declared groups: field type has no group support");
            }
            return Ok(Vec::new());
        }

        // identity is the name attribute; duplicate declared names resolve
        // last-write-wins
        let mut declared: IndexMap<String, &GroupDefinition> = IndexMap::new();
        for group in definition.groups.values() {
            declared.insert(group.name.clone(), group);
        }

        reconcile(
            existing,
            &declared,
            force,
            |group| group.name.as_str(),
            |prior, name, declaration| {
                let mut group = prior.unwrap_or_else(|| {
                    tracing::debug!(group = %name, "creating block-type group");
                    Group {
                        id: None,
                        field_id: None,
                        name: name.to_string(),
                        sort_order: 0,
                    }
                });
                group.name = declaration.name.clone();
                group.sort_order = declaration.sort_order;
                group.field_id = group.field_id.or(field_id);
                Ok(group)
            },
        )
    }

    fn reconcile_block_types(
        &self,
        existing: Vec<BlockType>,
        definition: &FieldDefinition,
        groups: &[Group],
        field_handle: &str,
        field_id: Option<FieldId>,
        force: bool,
        ctx: &SyncContext<'_>,
    ) -> Result<Vec<BlockType>> {
        let block_types = reconcile(
            existing,
            &definition.block_types,
            force,
            |block_type| block_type.handle.as_str(),
            |prior, handle, declaration| {
                self.resolve_block_type(
                    prior,
                    handle,
                    declaration,
                    groups,
                    field_handle,
                    field_id,
                    force,
                    ctx,
                )
            },
        )?;

        if self.capabilities.child_blocks {
            validate_child_blocks(&block_types, field_handle)?;
        }
        Ok(block_types)
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_block_type(
        &self,
        prior: Option<BlockType>,
        handle: &str,
        declaration: &BlockTypeDefinition,
        groups: &[Group],
        field_handle: &str,
        field_id: Option<FieldId>,
        force: bool,
        ctx: &SyncContext<'_>,
    ) -> Result<BlockType> {
        let name = declaration
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| SyncError::malformed(handle, "missing required key 'name'"))?;
        let settings = declaration
            .settings
            .as_ref()
            .ok_or_else(|| SyncError::malformed(handle, "missing required key 'settings'"))?;
        let layout_definition = declaration
            .field_layout
            .as_ref()
            .ok_or_else(|| SyncError::malformed(handle, "missing required key 'fieldLayout'"))?;

        // a block type may not nest its own enclosing field
        if layout_definition.declares_handle(field_handle) {
            return Err(SyncError::validation(
                handle,
                format!("field layout references enclosing field '{field_handle}'"),
            ));
        }

        if let Some(group) = &declaration.group {
            if self.capabilities.groups && !groups.iter().any(|g| &g.name == group) {
                return Err(SyncError::validation(
                    handle,
                    format!("unknown group '{group}'"),
                ));
            }
        }

        let (mut block_type, prior_layout) = match prior {
            Some(mut block_type) => {
                let layout = std::mem::take(&mut block_type.layout);
                (block_type, Some(layout))
            }
            None => {
                tracing::debug!(block_type = %handle, field = %field_handle, "creating block type");
                (BlockType::default(), None)
            }
        };

        block_type.field_id = field_id;
        block_type.handle = handle.to_string();
        block_type.name = name.to_string();
        block_type.group = if self.capabilities.groups {
            declaration.group.clone()
        } else {
            None
        };
        block_type.layout =
            ctx.layouts
                .from_definition(layout_definition, prior_layout.as_ref(), force, ctx)?;

        block_type.max_blocks = settings.max_blocks;
        block_type.sort_order = settings.sort_order;
        if self.capabilities.child_blocks {
            block_type.max_child_blocks = settings.max_child_blocks;
            block_type.child_blocks = settings.child_blocks.clone().unwrap_or_default();
            block_type.top_level = settings.top_level.unwrap_or(true);
        } else {
            block_type.max_child_blocks = None;
            block_type.child_blocks = Vec::new();
            block_type.top_level = true;
        }

        Ok(block_type)
    }
}

/// Every child-block handle must name a block type of the same field.
fn validate_child_blocks(block_types: &[BlockType], field_handle: &str) -> Result<()> {
    let handles: HashSet<&str> = block_types
        .iter()
        .map(|block_type| block_type.handle.as_str())
        .collect();
    for block_type in block_types {
        for child in &block_type.child_blocks {
            if !handles.contains(child.as_str()) {
                return Err(SyncError::validation(
                    &block_type.handle,
                    format!("child block '{child}' is not a block type of field '{field_handle}'"),
                ));
            }
        }
    }
    Ok(())
}

impl FieldTypeHandler for CompositeFieldHandler {
    fn export(&self, field: &LiveField, ctx: &SyncContext<'_>) -> Result<FieldDefinition> {
        let mut definition = DefaultFieldHandler.export(field, ctx)?;

        let (groups, block_types) = match field.id {
            Some(id) => (
                ctx.store.groups_by_field_id(id),
                ctx.store.block_types_by_field_id(id),
            ),
            None => (Vec::new(), Vec::new()),
        };

        if self.capabilities.groups {
            definition.groups = self.group_definitions(&groups);
        }
        definition.block_types = self.block_type_definitions(&block_types, &groups, ctx)?;
        Ok(definition)
    }

    fn import(
        &self,
        definition: &FieldDefinition,
        existing: Option<&LiveField>,
        handle: &str,
        parent_group: Option<&str>,
        force: bool,
        ctx: &SyncContext<'_>,
    ) -> Result<LiveField> {
        let mut field =
            DefaultFieldHandler::populate_base(definition, existing, handle, parent_group)?;
        let options = definition.require_settings(handle)?;

        // existing composite state only counts when the declared type
        // matches the existing field's type
        let prior_id = existing
            .filter(|field| field.field_type == definition.field_type)
            .and_then(|field| field.id);
        let (existing_groups, existing_block_types) = match prior_id {
            Some(id) => (
                ctx.store.groups_by_field_id(id),
                ctx.store.block_types_by_field_id(id),
            ),
            None => (Vec::new(), Vec::new()),
        };

        let groups = self.reconcile_groups(existing_groups, definition, prior_id, force)?;
        let block_types = self.reconcile_block_types(
            existing_block_types,
            definition,
            &groups,
            handle,
            prior_id,
            force,
            ctx,
        )?;

        // consolidated settings are assembled only once every block type
        // resolved; any error above leaves the field untouched
        field.settings = FieldSettings::Composite(CompositeSettings {
            options: options.clone(),
            groups,
            block_types,
        });
        Ok(field)
    }
}
