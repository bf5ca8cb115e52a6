//! Append-only CSV of feature rows
//!
//! Rows are `url,domain,<feature columns>`. The header is written once, when
//! the file is new or empty, so repeated runs keep extending one training set.

use crate::features::FeatureVector;
use crate::output::OutputResult;
use crate::url::extract_domain;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use url::Url;

/// Appends feature vectors to a CSV file
pub struct FeatureWriter {
    writer: BufWriter<File>,
    rows_written: usize,
}

impl FeatureWriter {
    /// Opens `path` for appending, writing the header if the file is empty
    pub fn open(path: &Path) -> OutputResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_empty = file.metadata()?.len() == 0;

        let mut writer = BufWriter::new(file);
        if is_empty {
            writeln!(writer, "{}", header())?;
        }

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Appends one row and flushes it to disk
    pub fn append(&mut self, url: &Url, features: &FeatureVector) -> OutputResult<()> {
        let domain = extract_domain(url).unwrap_or_default();
        let values = features
            .to_row()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");

        writeln!(
            self.writer,
            "{},{},{}",
            escape_field(url.as_str()),
            escape_field(&domain),
            values
        )?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    /// Number of rows appended through this writer
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

fn header() -> String {
    let mut columns = vec!["url", "domain"];
    columns.extend_from_slice(&FeatureVector::COLUMNS);
    columns.join(",")
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
