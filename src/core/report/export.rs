//! Export functionality for exposure records.
//!
//! Supports JSON lines and CSV for feeding spreadsheets and dashboards.

use super::ExposureRecord;
use std::io::Write;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    JsonLines,
    Csv,
}

/// Write `records` in the chosen format
pub fn write_records<W: Write>(
    format: ExportFormat,
    records: &[ExposureRecord],
    writer: W,
) -> std::io::Result<()> {
    match format {
        ExportFormat::JsonLines => export_json_lines(records, writer),
        ExportFormat::Csv => export_csv(records, writer),
    }
}

/// Export records as one JSON object per line
pub fn export_json_lines<W: Write>(records: &[ExposureRecord], mut writer: W) -> std::io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Export records to CSV format
///
/// CSV columns: Report ID, Keyword, Timestamp, Section, Rank, Evidence,
/// Detail, URL, Content Type, Snippet
pub fn export_csv<W: Write>(records: &[ExposureRecord], mut writer: W) -> std::io::Result<()> {
    writeln!(
        writer,
        "Report ID,Keyword,Timestamp,Section,Rank,Evidence,Detail,URL,Content Type,Snippet"
    )?;

    for record in records {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{}",
            record.report_id,
            escape_field(&record.keyword),
            record.timestamp,
            escape_field(&record.section),
            record.rank,
            record.evidence_kind,
            escape_field(&record.evidence_detail),
            escape_field(record.url.as_deref().unwrap_or("")),
            escape_field(record.content_type.as_deref().unwrap_or("")),
            escape_field(&record.snippet),
        )?;
    }

    Ok(())
}

/// Quote a CSV field when it holds a delimiter, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
