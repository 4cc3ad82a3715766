//! Delimited text export
//!
//! UTF-8 with byte-order mark so spreadsheet imports detect the encoding.
//! Column order and localized headers match the dashboard download.

use std::path::Path;

use crate::error::ExportError;
use crate::scoring::pipeline::ScoreRecord;

const BOM: &str = "\u{feff}";
const HEADER_LINE: &str =
    "Identificación,Nombre,Departamento,Max Alcohol (ppm),Mediciones Positivas,Score AHP (%),Nivel de Riesgo";

/// Render records as CSV text. Empty input is an explicit error.
pub fn to_csv(records: &[ScoreRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::EmptyResult);
    }

    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(BOM);
    out.push_str(HEADER_LINE);
    out.push('\n');

    for record in records {
        let row = [
            escape(&record.external_id),
            escape(&record.display_name),
            escape(&record.category),
            format!("{:.2}", record.severity_metric),
            record.frequency_metric.to_string(),
            format!("{:.2}", record.score),
            record.tier.localized_label().to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    Ok(out)
}

/// Render and write to disk.
pub fn write_csv<P: AsRef<Path>>(records: &[ScoreRecord], path: P) -> Result<(), ExportError> {
    let text = to_csv(records)?;
    std::fs::write(path.as_ref(), text)?;
    log::info!(
        "exported {} score records to {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(())
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
