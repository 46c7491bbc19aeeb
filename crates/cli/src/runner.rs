//! Command execution: store snapshot I/O plus the per-field sync loop.
//!
//! The engine is pure; this module owns everything around it — reading
//! and writing YAML documents, persisting imported graphs into the store
//! snapshot, and aggregating per-field errors into the exit status.

use std::fs;
use std::path::Path;

use anyhow::Context;
use schemasync_engine::{
    DefaultLayoutMapper, FieldTypeRegistry, InMemoryStore, SchemaDocument, SyncContext, SyncError,
    SyncReport,
};

use crate::cli::{Cli, Commands};

/// Runs the parsed command. Returns whether every field succeeded.
pub fn dispatch(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Export {
            store,
            out,
            handles,
        } => run_export(&store, out.as_deref(), &handles),
        Commands::Import {
            store,
            schema,
            force,
            dry_run,
        } => run_import(&store, &schema, force, dry_run),
    }
}

fn load_store(path: &Path) -> anyhow::Result<InMemoryStore> {
    if !path.exists() {
        return Ok(InMemoryStore::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading store {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("parsing store {}", path.display()))
}

fn save_store(path: &Path, store: &InMemoryStore) -> anyhow::Result<()> {
    let raw = serde_yaml::to_string(store)?;
    fs::write(path, raw).with_context(|| format!("writing store {}", path.display()))
}

pub(crate) fn run_import(
    store_path: &Path,
    schema_path: &Path,
    force: bool,
    dry_run: bool,
) -> anyhow::Result<bool> {
    let raw = fs::read_to_string(schema_path)
        .with_context(|| format!("reading schema {}", schema_path.display()))?;
    let document: SchemaDocument = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing schema {}", schema_path.display()))?;

    let mut store = load_store(store_path)?;
    let report = import_document(&mut store, &document, force);

    if dry_run {
        tracing::info!("dry run: store not written");
    } else {
        save_store(store_path, &store)?;
    }

    println!("{}", report.format_summary("Import"));
    Ok(report.success)
}

/// Imports every field of the document, persisting each successful graph
/// and collecting failures. Processing continues past a failed field;
/// with `force`, top-level fields absent from the document are dropped.
pub(crate) fn import_document(
    store: &mut InMemoryStore,
    document: &SchemaDocument,
    force: bool,
) -> SyncReport {
    let registry = FieldTypeRegistry::with_builtins();
    let layouts = DefaultLayoutMapper;
    let mut report = SyncReport::new();
    let mut pending = Vec::new();

    for (handle, definition) in &document.fields {
        let existing = store.field(handle).cloned();
        let ctx = SyncContext::new(&registry, &*store, &layouts);
        let outcome = registry.resolve(&definition.field_type).and_then(|handler| {
            handler.import(definition, existing.as_ref(), handle, None, force, &ctx)
        });
        match outcome {
            Ok(field) => {
                pending.push(field);
                report.record_success();
            }
            Err(err) => {
                tracing::warn!(field = %handle, error = %err, "field import failed");
                report.record_failure(handle, &err);
            }
        }
    }

    for field in pending {
        store.persist(field);
    }
    if force {
        store.retain_fields(|handle| document.fields.contains_key(handle));
    }
    report
}

pub(crate) fn run_export(
    store_path: &Path,
    out: Option<&Path>,
    handles: &[String],
) -> anyhow::Result<bool> {
    let store = load_store(store_path)?;
    let (document, report) = export_document(&store, handles);

    let raw = serde_yaml::to_string(&document)?;
    match out {
        Some(path) => fs::write(path, raw)
            .with_context(|| format!("writing schema {}", path.display()))?,
        None => print!("{raw}"),
    }

    eprintln!("{}", report.format_summary("Export"));
    Ok(report.success)
}

/// Exports the selected fields (all of them when `handles` is empty)
/// into a schema document, collecting per-field failures.
pub(crate) fn export_document(
    store: &InMemoryStore,
    handles: &[String],
) -> (SchemaDocument, SyncReport) {
    let registry = FieldTypeRegistry::with_builtins();
    let layouts = DefaultLayoutMapper;
    let ctx = SyncContext::new(&registry, store, &layouts);

    let mut document = SchemaDocument::default();
    let mut report = SyncReport::new();

    let selected: Vec<&str> = if handles.is_empty() {
        store.fields().map(|(handle, _)| handle.as_str()).collect()
    } else {
        handles.iter().map(String::as_str).collect()
    };

    for handle in selected {
        let Some(field) = store.field(handle) else {
            report.record_failure(
                handle,
                &SyncError::Validation {
                    handle: handle.to_string(),
                    message: "no such field in the store".into(),
                },
            );
            continue;
        };
        let outcome = registry
            .resolve(&field.field_type)
            .and_then(|handler| handler.export(field, &ctx));
        match outcome {
            Ok(definition) => {
                document.fields.insert(handle.to_string(), definition);
                report.record_success();
            }
            Err(err) => report.record_failure(handle, &err),
        }
    }

    (document, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemasync_engine::FieldDefinition;
    use schemasync_test_utils::{group, grouped_block_type, single_tab, text_field};
    use tempfile::tempdir;

    fn write_document(path: &Path, document: &SchemaDocument) {
        fs::write(path, serde_yaml::to_string(document).unwrap()).unwrap();
    }

    fn article_document() -> SchemaDocument {
        let mut document = SchemaDocument::default();
        document.fields.insert(
            "intro".into(),
            text_field("Intro").with_setting("charLimit", 280),
        );
        document.fields.insert(
            "article".into(),
            FieldDefinition::new("grouped_blocks", "Article")
                .with_group("Media", group("Media", 1))
                .with_block_type(
                    "quote",
                    grouped_block_type("Quote", 1)
                        .in_group("Media")
                        .with_layout(single_tab(
                            "Content",
                            vec![("attribution", text_field("Attribution"))],
                        )),
                ),
        );
        document
    }

    #[test]
    fn import_creates_the_store_snapshot() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("store.yaml");
        let schema_path = dir.path().join("schema.yaml");
        write_document(&schema_path, &article_document());

        let success = run_import(&store_path, &schema_path, false, false).unwrap();
        assert!(success);
        assert!(store_path.exists());

        let store = load_store(&store_path).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.field("article").unwrap().composite_settings().is_some());
    }

    #[test]
    fn dry_run_does_not_write_the_store() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("store.yaml");
        let schema_path = dir.path().join("schema.yaml");
        write_document(&schema_path, &article_document());

        let success = run_import(&store_path, &schema_path, false, true).unwrap();
        assert!(success);
        assert!(!store_path.exists());
    }

    #[test]
    fn files_round_trip_through_export() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("store.yaml");
        let schema_path = dir.path().join("schema.yaml");
        let exported_path = dir.path().join("exported.yaml");
        let document = article_document();
        write_document(&schema_path, &document);

        run_import(&store_path, &schema_path, false, false).unwrap();
        let success = run_export(&store_path, Some(&exported_path), &[]).unwrap();
        assert!(success);

        let raw = fs::read_to_string(&exported_path).unwrap();
        let exported: SchemaDocument = serde_yaml::from_str(&raw).unwrap();
        assert_eq!(exported, document);
        // internal ids never leak into the document
        assert!(!raw.contains("id:"));
    }

    #[test]
    fn force_drops_store_fields_absent_from_the_document() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("store.yaml");
        let schema_path = dir.path().join("schema.yaml");
        write_document(&schema_path, &article_document());
        run_import(&store_path, &schema_path, false, false).unwrap();

        let mut narrowed = SchemaDocument::default();
        narrowed
            .fields
            .insert("intro".into(), text_field("Intro").with_setting("charLimit", 280));
        write_document(&schema_path, &narrowed);

        run_import(&store_path, &schema_path, true, false).unwrap();
        let store = load_store(&store_path).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.field("article").is_none());
    }

    #[test]
    fn unknown_top_level_type_fails_that_field_only() {
        let mut document = article_document();
        document
            .fields
            .insert("mystery".into(), FieldDefinition::new("hologram", "Mystery"));

        let mut store = InMemoryStore::new();
        let report = import_document(&mut store, &document, false);
        assert!(!report.success);
        assert_eq!(report.processed, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].handle, "mystery");
        // the good fields still landed
        assert!(store.field("intro").is_some());
        assert!(store.field("article").is_some());
    }

    #[test]
    fn export_selects_requested_handles() {
        let mut store = InMemoryStore::new();
        let report = import_document(&mut store, &article_document(), false);
        assert!(report.success);

        let (document, report) = export_document(&store, &["intro".to_string()]);
        assert!(report.success);
        assert_eq!(document.fields.len(), 1);
        assert!(document.fields.contains_key("intro"));

        let (_, report) = export_document(&store, &["missing".to_string()]);
        assert!(!report.success);
    }

    #[test]
    fn import_is_idempotent_across_runs() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("store.yaml");
        let schema_path = dir.path().join("schema.yaml");
        write_document(&schema_path, &article_document());

        run_import(&store_path, &schema_path, false, false).unwrap();
        let first = fs::read_to_string(&store_path).unwrap();
        run_import(&store_path, &schema_path, false, false).unwrap();
        let second = fs::read_to_string(&store_path).unwrap();
        assert_eq!(first, second);
    }
}
