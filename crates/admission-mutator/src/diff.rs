//! JSON patch (RFC 6902) computation between two object snapshots.

use json_patch::Patch;
use serde_json::Value;

use crate::errors::DiffError;

/// Compute the patch turning `original` into `mutated`.
///
/// Both inputs are serialized JSON documents. The operations are emitted in a
/// stable order, so equal inputs always produce the same patch. Array moves
/// are not detected, they show up as add/remove/replace operations.
pub fn diff(original: &[u8], mutated: &[u8]) -> Result<Patch, DiffError> {
    let original = parse_snapshot(original, "original")?;
    let mutated = parse_snapshot(mutated, "mutated")?;

    Ok(json_patch::diff(&original, &mutated))
}

/// Apply `patch` to the `original` snapshot and return the resulting document.
pub fn apply(original: &[u8], patch: &Patch) -> Result<Value, DiffError> {
    let mut doc = parse_snapshot(original, "original")?;
    json_patch::patch(&mut doc, patch).map_err(|e| DiffError::PatchApplication(e.to_string()))?;

    Ok(doc)
}

fn parse_snapshot(bytes: &[u8], side: &'static str) -> Result<Value, DiffError> {
    serde_json::from_slice(bytes).map_err(|source| DiffError::DiffComputationFailed { side, source })
}
