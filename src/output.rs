//! Output formatting and persistence for country aggregates.
//!
//! Supports pretty-printing, a JSON report, and the flat CSV table. Files
//! are written to a temporary sibling and renamed into place, so a failed
//! write never leaves a partial table behind.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::analysis::types::{CountryAggregate, SurveyReport};

/// Column names of the CSV table, in order.
pub const TABLE_HEADER: [&str; 7] = [
    "country",
    "rel",
    "nonrel",
    "a_adp_rel",
    "a_adp_nonrel",
    "a_div_rel",
    "a_div_nonrel",
];

/// Logs aggregates using Rust's debug pretty-print format.
pub fn print_pretty(aggregates: &[CountryAggregate]) {
    debug!("{:#?}", aggregates);
}

/// Writes the table to `path`: a header row, then one row per country.
///
/// Missing means are written as empty fields.
pub fn write_table(path: &str, aggregates: &[CountryAggregate]) -> Result<()> {
    debug!(path, rows = aggregates.len(), "Writing CSV table");
    write_atomically(path, |file| write_table_to(file, aggregates))
}

/// Serializes the table into any writer.
pub fn write_table_to<W: Write>(writer: W, aggregates: &[CountryAggregate]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    // Header inference needs at least one row.
    if aggregates.is_empty() {
        writer.write_record(TABLE_HEADER)?;
    }
    for aggregate in aggregates {
        writer.serialize(aggregate)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the report to `path` as pretty-printed JSON.
pub fn write_report(path: &str, report: &SurveyReport<'_>) -> Result<()> {
    debug!(path, "Writing JSON report");
    write_atomically(path, |file| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    })
}

fn write_atomically<F>(path: &str, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let tmp_path = format!("{path}.tmp");
    let mut file = File::create(&tmp_path).with_context(|| format!("creating {tmp_path}"))?;

    if let Err(e) = write(&mut file).and_then(|()| Ok(file.sync_all()?)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.context(format!("writing {path}")));
    }

    if let Err(e) = fs::rename(&tmp_path, Path::new(path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(anyhow::Error::new(e).context(format!("moving output into {path}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::Diagnostics;
    use std::env;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn spain() -> CountryAggregate {
        CountryAggregate {
            country: "ES".to_string(),
            rel: 1,
            nonrel: 1,
            a_adp_rel: Some(0.5),
            a_adp_nonrel: None,
            a_div_rel: Some(-1.0),
            a_div_nonrel: Some(0.25),
            diagnostics: Diagnostics::default(),
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&[spain()]);
    }

    #[test]
    fn test_table_header_and_empty_mean() {
        let mut buf = Vec::new();
        write_table_to(&mut buf, &[spain()]).unwrap();

        let content = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "country,rel,nonrel,a_adp_rel,a_adp_nonrel,a_div_rel,a_div_nonrel"
        );
        assert_eq!(lines[1], "ES,1,1,0.5,,-1.0,0.25");
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let mut buf = Vec::new();
        write_table_to(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), format!("{}\n", TABLE_HEADER.join(",")));
    }

    #[test]
    fn test_write_table_overwrites() {
        let path = temp_path("evs_attitudes_test_overwrite.csv");
        let _ = fs::remove_file(&path);

        write_table(&path, &[spain(), spain()]).unwrap();
        write_table(&path, &[spain()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!Path::new(&format!("{path}.tmp")).exists());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_report_json() {
        let path = temp_path("evs_attitudes_test_report.json");
        let _ = fs::remove_file(&path);

        let rows = [spain()];
        write_report(&path, &SurveyReport::new("EVS2017.csv", &rows)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["source"], "EVS2017.csv");
        assert_eq!(value["countries"][0]["country"], "ES");
        assert!(value["countries"][0]["a_adp_nonrel"].is_null());
        assert_eq!(value["countries"][0]["diagnostics"]["excluded"], 0);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        assert!(write_table("/nonexistent/dir/out.csv", &[spain()]).is_err());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let path = temp_path("evs_attitudes_test_output_is_dir");
        fs::create_dir_all(&path).unwrap();

        assert!(write_table(&path, &[spain()]).is_err());
        assert!(!Path::new(&format!("{path}.tmp")).exists());
        assert!(Path::new(&path).is_dir());

        fs::remove_dir(&path).unwrap();
    }
}
