//! Field type registry and handler contract.
//!
//! Type dispatch is a string-keyed lookup populated at initialization,
//! with a runtime registration path for plugin-style field types. Every
//! collaborator a handler needs travels in [`SyncContext`]; there are no
//! process-wide service lookups.

use std::collections::HashMap;
use std::sync::Arc;

use crate::definition::FieldDefinition;
use crate::error::{Result, SyncError};
use crate::handlers::{CompositeFieldHandler, DefaultFieldHandler};
use crate::layout::LayoutMapper;
use crate::model::LiveField;
use crate::store::LiveStore;

/// Collaborators injected into every handler call.
pub struct SyncContext<'a> {
    pub registry: &'a FieldTypeRegistry,
    pub store: &'a dyn LiveStore,
    pub layouts: &'a dyn LayoutMapper,
}

impl<'a> SyncContext<'a> {
    pub fn new(
        registry: &'a FieldTypeRegistry,
        store: &'a dyn LiveStore,
        layouts: &'a dyn LayoutMapper,
    ) -> Self {
        Self {
            registry,
            store,
            layouts,
        }
    }
}

/// Export/import capability for one field type.
///
/// Implementations are pure with respect to their inputs: `import`
/// receives the existing field (if any) by reference and returns a new
/// value graph; nothing caller-owned is mutated.
pub trait FieldTypeHandler: Send + Sync {
    /// Builds the declarative definition of a live field.
    fn export(&self, field: &LiveField, ctx: &SyncContext<'_>) -> Result<FieldDefinition>;

    /// Resolves a declarative definition into a live field value.
    ///
    /// `handle` is the identity under which the field is being imported;
    /// `parent_group` optionally names the field group the caller is
    /// placing the field into. `force` propagates to every nested
    /// collection reconciled along the way.
    fn import(
        &self,
        definition: &FieldDefinition,
        existing: Option<&LiveField>,
        handle: &str,
        parent_group: Option<&str>,
        force: bool,
        ctx: &SyncContext<'_>,
    ) -> Result<LiveField>;
}

/// Resolves a field type discriminator to its handler.
pub struct FieldTypeRegistry {
    handlers: HashMap<String, Arc<dyn FieldTypeHandler>>,
}

impl FieldTypeRegistry {
    /// An empty registry. Most callers want [`FieldTypeRegistry::with_builtins`].
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with the built-in handlers registered:
    ///
    /// - `text`, `number`, `toggle` — plain fields via [`DefaultFieldHandler`]
    /// - `blocks` — flat composite (no groups, no child-block allowlist)
    /// - `grouped_blocks` — composite with groups and child-block allowlist
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let plain = Arc::new(DefaultFieldHandler);
        for type_name in ["text", "number", "toggle"] {
            registry.register(type_name, plain.clone());
        }
        registry.register("blocks", Arc::new(CompositeFieldHandler::flat()));
        registry.register("grouped_blocks", Arc::new(CompositeFieldHandler::grouped()));
        registry
    }

    /// Registers (or replaces) the handler for a type discriminator.
    pub fn register(&mut self, type_name: impl Into<String>, handler: Arc<dyn FieldTypeHandler>) {
        self.handlers.insert(type_name.into(), handler);
    }

    /// Resolves a type discriminator, failing with
    /// [`SyncError::UnknownType`] when nothing is registered for it.
    pub fn resolve(&self, type_name: &str) -> Result<&dyn FieldTypeHandler> {
        self.handlers
            .get(type_name)
            .map(Arc::as_ref)
            .ok_or_else(|| SyncError::UnknownType {
                type_name: type_name.to_string(),
            })
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.handlers.contains_key(type_name)
    }
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
