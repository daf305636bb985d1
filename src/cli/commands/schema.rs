//! Schema command: JSON Schemas of the documents `rpub` reads and writes.

use crate::cli::{SchemaArgs, SchemaDocument};
use crate::error::Result;
use crate::model::{ReportIndexData, ResultsSummary};
use schemars::schema_for;
use serde_json::{Value, json};

/// Build the schema document for `which`.
///
/// # Errors
///
/// Returns an error if a schema cannot be serialized.
pub fn build(which: SchemaDocument) -> Result<Value> {
    let summary = serde_json::to_value(schema_for!(ResultsSummary))?;
    let index = serde_json::to_value(schema_for!(ReportIndexData))?;
    Ok(match which {
        SchemaDocument::Summary => summary,
        SchemaDocument::Index => index,
        SchemaDocument::All => json!({ "summary": summary, "index": index }),
    })
}

/// Execute the schema command. Output is always JSON.
///
/// # Errors
///
/// Returns an error if a schema cannot be serialized.
pub fn execute(args: &SchemaArgs) -> Result<()> {
    super::print_json(&build(args.document)?)
}
