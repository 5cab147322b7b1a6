//! Dataset export — JSON and CSV text renditions of a record batch.
//!
//! The column list is passed in explicitly (it is stored with the dataset)
//! so exports keep the generation-time order even for hand-edited rows.

use anyhow::Result;
use serde_json::Value;

use crate::generate::Record;

/// Pretty-printed JSON array. Parsing it back yields records deep-equal to
/// the originals.
pub fn to_json(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// CSV text: header row from the ordered column list, one line per record.
/// The writer quotes any cell containing commas, quotes, or newlines.
pub fn to_csv(fields: &[String], records: &[Record]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields)?;
    for record in records {
        let row: Vec<String> = fields.iter().map(|f| cell_text(record.get(f))).collect();
        writer.write_record(&row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("csv flush failed: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

/// Scalar cell rendering: strings bare, numbers/booleans via JSON syntax,
/// missing values empty.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
