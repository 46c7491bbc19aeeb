//! Integration tests for composite-field schema sync.
//!
//! These exercise the public API the way an orchestrating caller does:
//! parse a YAML document, import each field, persist the returned graph,
//! and export it back.

use schemasync_engine::{FieldDefinition, LiveStore, SchemaDocument, SyncError};
use schemasync_test_utils::{
    flat_block_type, group, grouped_block_type, single_tab, text_field, SyncFixture,
};

const ARTICLE_YAML: &str = r#"
fields:
  article:
    name: Article
    type: grouped_blocks
    settings:
      propagationMethod: all
    groups:
      Media:
        name: Media
        sortOrder: 1
    blockTypes:
      quote:
        name: Quote
        group: Media
        fieldLayout:
          Content:
            attribution:
              name: Attribution
              type: text
              settings:
                charLimit: 120
        settings:
          maxBlocks: 1
          maxChildBlocks: 0
          childBlocks: []
          topLevel: true
          sortOrder: 1
"#;

#[test]
fn yaml_document_round_trips_through_live_state() {
    let document: SchemaDocument = serde_yaml::from_str(ARTICLE_YAML).unwrap();
    let mut fixture = SyncFixture::new();

    for (handle, definition) in &document.fields {
        fixture.import(handle, definition, false).unwrap();
    }

    let exported = fixture.export("article").unwrap();
    assert_eq!(&exported, &document.fields["article"]);
}

#[test]
fn reimport_converges_after_a_caller_retry() {
    let document: SchemaDocument = serde_yaml::from_str(ARTICLE_YAML).unwrap();
    let definition = &document.fields["article"];
    let mut fixture = SyncFixture::new();

    let id = fixture.import("article", definition, false).unwrap();
    let first = fixture.store.field("article").unwrap().clone();

    // a caller retrying the whole pipeline re-runs the same import
    let id_again = fixture.import("article", definition, false).unwrap();
    assert_eq!(id, id_again);
    assert_eq!(fixture.store.field("article").unwrap(), &first);
}

#[test]
fn nested_composite_keeps_its_own_collections() {
    let nested = FieldDefinition::new("blocks", "Sidebar")
        .with_block_type("note", flat_block_type("Note", 1))
        .with_block_type("tip", flat_block_type("Tip", 2));
    let definition = FieldDefinition::new("grouped_blocks", "Page")
        .with_group("Layout", group("Layout", 1))
        .with_block_type(
            "section",
            grouped_block_type("Section", 1)
                .in_group("Layout")
                .with_layout(single_tab("Content", vec![("sidebar", nested)])),
        );

    let mut fixture = SyncFixture::new();
    fixture.import("page", &definition, false).unwrap();

    let exported = fixture.export("page").unwrap();
    assert_eq!(exported, definition);

    let page = fixture.store.field("page").unwrap();
    let sidebar = page.composite_settings().unwrap().block_types[0]
        .layout
        .field_by_handle("sidebar")
        .unwrap();
    assert_eq!(sidebar.composite_settings().unwrap().block_types.len(), 2);
}

#[test]
fn force_narrows_both_collections() {
    let wide = FieldDefinition::new("grouped_blocks", "Page")
        .with_group("Layout", group("Layout", 1))
        .with_group("Media", group("Media", 2))
        .with_block_type("a", grouped_block_type("A", 1))
        .with_block_type("b", grouped_block_type("B", 2));
    let narrow = FieldDefinition::new("grouped_blocks", "Page")
        .with_group("Layout", group("Layout", 1))
        .with_block_type("a", grouped_block_type("A", 1));

    let mut fixture = SyncFixture::new();
    let id = fixture.import("page", &wide, false).unwrap();
    fixture.import("page", &narrow, true).unwrap();

    let group_names: Vec<String> = fixture
        .store
        .groups_by_field_id(id)
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(group_names, ["Layout"]);
    let settings = fixture
        .store
        .field("page")
        .unwrap()
        .composite_settings()
        .unwrap();
    assert_eq!(settings.block_types.len(), 1);
    assert_eq!(settings.block_types[0].handle, "a");
}

#[test]
fn unknown_nested_type_fails_the_field_and_preserves_live_state() {
    let good = FieldDefinition::new("blocks", "Page")
        .with_block_type("a", flat_block_type("A", 1));
    let mut fixture = SyncFixture::new();
    fixture.import("page", &good, false).unwrap();
    let before = fixture.store.field("page").unwrap().clone();

    let bad = FieldDefinition::new("blocks", "Page").with_block_type(
        "a",
        flat_block_type("A", 1).with_layout(single_tab(
            "Content",
            vec![("mystery", FieldDefinition::new("hologram", "Mystery"))],
        )),
    );
    let err = fixture.import("page", &bad, false).unwrap_err();
    assert!(matches!(err, SyncError::UnknownType { .. }));
    assert_eq!(fixture.store.field("page").unwrap(), &before);
}
