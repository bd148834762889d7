//! Output rendering for metadata entries.
//!
//! Terminals get an aligned, coloured listing. Anything else gets two
//! tab-separated rows (keys, then values) that scripts can split on.

use color_print::cformat;
use csv::WriterBuilder;
use serde_json::Value;
use std::collections::BTreeMap;

/// Error types that can occur during formatting operations
#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    /// Error specific to CSV operations
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    /// Error when converting bytes to UTF-8 string
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    /// Error specific to CSV writer operations
    #[error("CSV writer into inner error: {0}")]
    CsvIntoInnerError(#[from] csv::IntoInnerError<csv::Writer<Vec<u8>>>),
}

/// Strings are shown without their JSON quotes.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn render_keys(entries: &BTreeMap<String, Value>) -> String {
    entries.keys().cloned().collect::<Vec<_>>().join("\n")
}

pub fn render_entries(entries: &BTreeMap<String, Value>, tty: bool) -> Result<String, FormattingError> {
    if tty {
        Ok(render_aligned(entries))
    } else {
        render_tab_separated(entries)
    }
}

fn render_aligned(entries: &BTreeMap<String, Value>) -> String {
    let width = entries.keys().map(|k| k.chars().count()).max().unwrap_or(0);

    entries
        .iter()
        .map(|(key, value)| {
            let key = format!("{:>width$}", key, width = width);
            cformat!("<#2794D8>{}:</#2794D8> <g>{}</g>", key, render_value(value))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_tab_separated(entries: &BTreeMap<String, Value>) -> Result<String, FormattingError> {
    let mut wtr = WriterBuilder::new().delimiter(b'\t').from_writer(vec![]);
    wtr.write_record(entries.keys())?;
    wtr.write_record(entries.values().map(render_value))?;

    let output = String::from_utf8(wtr.into_inner()?)?;
    Ok(output.trim_end().to_string())
}
