//! Schema synchronization engine for content-type fields.
//!
//! Converts live, storage-backed fields into portable declarative
//! definitions and reconciles such definitions back into live values.
//! The centerpiece is the recursive composite-field algorithm: fields
//! whose value is built from repeatable block types, each carrying its
//! own nested field layout, which may contain further composite fields
//! to arbitrary depth.
//!
//! The engine is synchronous and performs no I/O or persistence of its
//! own. Import takes the existing field by reference and returns a fresh
//! value graph; the caller persists it and defines the transaction
//! boundary, so re-importing the same definition converges instead of
//! accumulating duplicates.
//!
//! # Examples
//!
//! ```
//! use schemasync_engine::{
//!     BlockTypeDefinition, BlockTypeSettings, DefaultLayoutMapper, FieldDefinition,
//!     FieldTypeRegistry, InMemoryStore, SyncContext,
//! };
//!
//! let registry = FieldTypeRegistry::with_builtins();
//! let layouts = DefaultLayoutMapper;
//! let mut store = InMemoryStore::new();
//!
//! let definition = FieldDefinition::new("blocks", "Article").with_block_type(
//!     "quote",
//!     BlockTypeDefinition::new(
//!         "Quote",
//!         BlockTypeSettings {
//!             max_blocks: Some(1),
//!             sort_order: 1,
//!             ..Default::default()
//!         },
//!     ),
//! );
//!
//! let field = {
//!     let ctx = SyncContext::new(&registry, &store, &layouts);
//!     let handler = registry.resolve("blocks").unwrap();
//!     handler
//!         .import(&definition, None, "article", None, false, &ctx)
//!         .unwrap()
//! };
//! store.persist(field);
//!
//! let settings = store.field("article").unwrap().composite_settings().unwrap();
//! assert_eq!(settings.block_types.len(), 1);
//! assert_eq!(settings.block_types[0].handle, "quote");
//!
//! // exporting reproduces the declarative definition, ids stay internal
//! let ctx = SyncContext::new(&registry, &store, &layouts);
//! let exported = registry
//!     .resolve("blocks")
//!     .unwrap()
//!     .export(store.field("article").unwrap(), &ctx)
//!     .unwrap();
//! assert_eq!(exported, definition);
//! ```

#![deny(unsafe_code)]

pub mod definition;
pub mod error;
pub mod handlers;
pub mod layout;
pub mod model;
pub mod reconcile;
pub mod registry;
pub mod report;
pub mod store;

pub use definition::{
    BlockTypeDefinition, BlockTypeSettings, FieldDefinition, GroupDefinition, LayoutDefinition,
    SchemaDocument, SettingsMap,
};
pub use error::{Result, SyncError};
pub use handlers::{CompositeCapabilities, CompositeFieldHandler, DefaultFieldHandler};
pub use layout::{DefaultLayoutMapper, LayoutMapper};
pub use model::{
    BlockType, CompositeSettings, FieldId, FieldLayout, FieldSettings, Group, LayoutTab, LiveField,
};
pub use reconcile::reconcile;
pub use registry::{FieldTypeHandler, FieldTypeRegistry, SyncContext};
pub use report::{FieldFailure, SyncReport};
pub use store::{EmptyStore, InMemoryStore, LiveStore};
