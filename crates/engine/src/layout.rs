//! Field layout mapping between live and declarative form.

use indexmap::IndexMap;

use crate::definition::LayoutDefinition;
use crate::error::Result;
use crate::model::{FieldLayout, LayoutTab};
use crate::registry::SyncContext;

/// Converts field layouts to and from their declarative tree form,
/// delegating every sub-field to its handler through the registry.
pub trait LayoutMapper: Send + Sync {
    /// Builds the declarative tree for a live layout, tab by tab.
    fn to_definition(
        &self,
        layout: &FieldLayout,
        ctx: &SyncContext<'_>,
    ) -> Result<LayoutDefinition>;

    /// Resolves a declarative tree into a live layout. Each declared
    /// sub-field reuses the matching field of `existing` by handle or is
    /// created fresh; declared order is preserved on both levels.
    fn from_definition(
        &self,
        definition: &LayoutDefinition,
        existing: Option<&FieldLayout>,
        force: bool,
        ctx: &SyncContext<'_>,
    ) -> Result<FieldLayout>;
}

/// The standard registry-backed mapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLayoutMapper;

impl LayoutMapper for DefaultLayoutMapper {
    fn to_definition(
        &self,
        layout: &FieldLayout,
        ctx: &SyncContext<'_>,
    ) -> Result<LayoutDefinition> {
        let mut tabs = IndexMap::with_capacity(layout.tabs.len());
        for tab in &layout.tabs {
            let mut fields = IndexMap::with_capacity(tab.fields.len());
            for field in &tab.fields {
                let handler = ctx.registry.resolve(&field.field_type)?;
                fields.insert(field.handle.clone(), handler.export(field, ctx)?);
            }
            tabs.insert(tab.name.clone(), fields);
        }
        Ok(LayoutDefinition(tabs))
    }

    fn from_definition(
        &self,
        definition: &LayoutDefinition,
        existing: Option<&FieldLayout>,
        force: bool,
        ctx: &SyncContext<'_>,
    ) -> Result<FieldLayout> {
        let mut tabs = Vec::with_capacity(definition.0.len());
        for (tab_name, field_definitions) in &definition.0 {
            let mut fields = Vec::with_capacity(field_definitions.len());
            for (handle, field_definition) in field_definitions {
                let handler = ctx.registry.resolve(&field_definition.field_type)?;
                let prior = existing.and_then(|layout| layout.field_by_handle(handle));
                fields.push(handler.import(
                    field_definition,
                    prior,
                    handle,
                    None,
                    force,
                    ctx,
                )?);
            }
            tabs.push(LayoutTab {
                name: tab_name.clone(),
                fields,
            });
        }
        Ok(FieldLayout { tabs })
    }
}
