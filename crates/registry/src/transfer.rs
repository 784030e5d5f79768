use std::collections::HashSet;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::Claim,
    error::{AppError, ErrorCode},
    snapshot::Snapshot,
};

const REQUIRED_FIELDS: [&str; 4] = ["id", "title", "location", "date"];

pub fn export_document(snapshot: &Snapshot) -> Result<String, AppError> {
    serde_json::to_string_pretty(snapshot)
        .map_err(|e| AppError::new(ErrorCode::Internal, format!("export failed: {e}")))
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("temu-balik-export-{}.json", date.format("%Y-%m-%d"))
}

/// Parses and validates an import document without touching any state.
///
/// `items` and `queue` must be arrays whose entries carry non-empty `id`,
/// `title`, `location` and `date` strings with ids unique per collection.
/// `claims` falls back to empty when missing or not an array; claim ids must
/// be unique too.
pub fn parse_import(raw: &str) -> Result<Snapshot, AppError> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::malformed_import(format!("not a JSON document: {e}")))?;
    let Value::Object(root) = document else {
        return Err(AppError::malformed_import("top level must be an object"));
    };

    let items = required_array(&root, "items")?;
    let queue = required_array(&root, "queue")?;
    check_entries("items", items)?;
    check_entries("queue", queue)?;

    let claims: Vec<Claim> = match root.get("claims") {
        Some(Value::Array(claims)) => decode("claims", claims)?,
        _ => Vec::new(),
    };
    let mut claim_ids = HashSet::with_capacity(claims.len());
    if let Some((index, claim)) = claims
        .iter()
        .enumerate()
        .find(|&(_, claim)| !claim_ids.insert(&claim.id))
    {
        return Err(AppError::malformed_import(format!(
            "claims[{index}] repeats id {}",
            claim.id
        )));
    }

    Ok(Snapshot {
        items: decode("items", items)?,
        queue: decode("queue", queue)?,
        claims,
    })
}

fn required_array<'a>(
    root: &'a serde_json::Map<String, Value>,
    field: &str,
) -> Result<&'a Vec<Value>, AppError> {
    match root.get(field) {
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(AppError::malformed_import(format!(
            "`{field}` must be an array"
        ))),
        None => Err(AppError::malformed_import(format!("`{field}` is missing"))),
    }
}

fn check_entries(collection: &str, entries: &[Value]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        for field in REQUIRED_FIELDS {
            let present = entry
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|v| !v.trim().is_empty());
            if !present {
                return Err(AppError::malformed_import(format!(
                    "{collection}[{index}] has no `{field}`"
                )));
            }
        }
        let id = entry.get("id").and_then(Value::as_str).unwrap_or_default();
        if !seen.insert(id) {
            return Err(AppError::malformed_import(format!(
                "{collection}[{index}] repeats id {id}"
            )));
        }
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(collection: &str, entries: &[Value]) -> Result<Vec<T>, AppError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry.clone()).map_err(|e| {
                AppError::malformed_import(format!("{collection}[{index}] is invalid: {e}"))
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/transfer_tests.rs"]
mod tests;
