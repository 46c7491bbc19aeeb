//! Generic create/update/delete-by-handle reconciliation.
//!
//! One algorithm backs every handle-keyed collection the engine touches
//! (block types and groups alike); entity-specific behavior is injected
//! through the `apply` callback.

use indexmap::IndexMap;

use crate::error::Result;

/// Reconciles an existing collection against a declared one.
///
/// Every declared handle is resolved through `apply`, receiving the
/// matching existing entity when one is present and `None` otherwise.
/// When `force` is set, existing entities absent from the declaration are
/// dropped; otherwise they are retained after the declared entries, in
/// their existing order. An `apply` error aborts the whole call.
///
/// `key` extracts the identity handle from an existing entity. Handles
/// are unique within the collection.
pub fn reconcile<E, D>(
    existing: Vec<E>,
    declared: &IndexMap<String, D>,
    force: bool,
    key: impl Fn(&E) -> &str,
    mut apply: impl FnMut(Option<E>, &str, &D) -> Result<E>,
) -> Result<Vec<E>> {
    let mut remaining: IndexMap<String, E> = IndexMap::with_capacity(existing.len());
    for entity in existing {
        let handle = key(&entity).to_string();
        remaining.insert(handle, entity);
    }

    let mut result = Vec::with_capacity(declared.len());
    for (handle, declaration) in declared {
        let prior = remaining.shift_remove(handle.as_str());
        result.push(apply(prior, handle, declaration)?);
    }

    if force {
        if !remaining.is_empty() {
            tracing::debug!(
                dropped = remaining.len(),
                "discarding entities absent from the declaration"
            );
        }
    } else {
        result.extend(remaining.into_values());
    }

    Ok(result)
}
