//! Shared test utilities for schemasync crates.
//!
//! Provides a ready-made registry/store/mapper bundle plus builders for
//! the declarative definitions tests exercise most.

use schemasync_engine::{
    BlockTypeDefinition, BlockTypeSettings, DefaultLayoutMapper, FieldDefinition, FieldId,
    FieldTypeRegistry, GroupDefinition, InMemoryStore, LayoutDefinition, SyncContext, SyncError,
};

/// Registry, in-memory store, and layout mapper wired together, with
/// import/export helpers that follow the caller contract (import, then
/// persist the returned graph).
pub struct SyncFixture {
    pub registry: FieldTypeRegistry,
    pub store: InMemoryStore,
    pub layouts: DefaultLayoutMapper,
}

impl SyncFixture {
    pub fn new() -> Self {
        Self {
            registry: FieldTypeRegistry::with_builtins(),
            store: InMemoryStore::new(),
            layouts: DefaultLayoutMapper,
        }
    }

    /// Imports a definition under the given handle and persists the
    /// resulting graph.
    pub fn import(
        &mut self,
        handle: &str,
        definition: &FieldDefinition,
        force: bool,
    ) -> Result<FieldId, SyncError> {
        let existing = self.store.field(handle).cloned();
        let field = {
            let ctx = SyncContext::new(&self.registry, &self.store, &self.layouts);
            let handler = self.registry.resolve(&definition.field_type)?;
            handler.import(definition, existing.as_ref(), handle, None, force, &ctx)?
        };
        Ok(self.store.persist(field))
    }

    /// Exports the stored field with the given handle.
    pub fn export(&self, handle: &str) -> Result<FieldDefinition, SyncError> {
        let field = self
            .store
            .field(handle)
            .unwrap_or_else(|| panic!("no field '{handle}' in fixture store"));
        let ctx = SyncContext::new(&self.registry, &self.store, &self.layouts);
        self.registry.resolve(&field.field_type)?.export(field, &ctx)
    }
}

impl Default for SyncFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A plain text field definition.
pub fn text_field(name: &str) -> FieldDefinition {
    FieldDefinition::new("text", name)
}

/// A group definition whose key and name agree.
pub fn group(name: &str, sort_order: u32) -> GroupDefinition {
    GroupDefinition {
        name: name.into(),
        sort_order,
    }
}

/// A block type with flat-variant settings and an empty layout.
pub fn flat_block_type(name: &str, sort_order: u32) -> BlockTypeDefinition {
    BlockTypeDefinition::new(
        name,
        BlockTypeSettings {
            sort_order,
            ..Default::default()
        },
    )
}

/// A block type with full grouped-variant settings and an empty layout.
pub fn grouped_block_type(name: &str, sort_order: u32) -> BlockTypeDefinition {
    BlockTypeDefinition::new(
        name,
        BlockTypeSettings {
            max_blocks: None,
            max_child_blocks: Some(0),
            child_blocks: Some(Vec::new()),
            top_level: Some(true),
            sort_order,
        },
    )
}

/// A single-tab layout over the given `(handle, definition)` pairs.
pub fn single_tab(name: &str, fields: Vec<(&str, FieldDefinition)>) -> LayoutDefinition {
    LayoutDefinition::default().with_tab(
        name,
        fields
            .into_iter()
            .map(|(handle, definition)| (handle.to_string(), definition)),
    )
}
