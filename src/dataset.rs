//! Loading of the survey dataset and grouping of respondents by country.
//!
//! The dataset is a delimited table with a header row, where categorical
//! answers appear as their value labels. Files ending in `.gz` are gunzipped
//! on the fly.

use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use tracing::{debug, info};

use crate::config::ColumnMap;

/// One survey participant. Unanswered questions hold an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Respondent {
    pub country: String,
    pub case_id: i64,
    pub religiosity: String,
    pub adoption: String,
    pub divorce: String,
}

/// Order in which countries are enumerated for output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountryOrder {
    /// Order of first appearance in the dataset.
    #[default]
    FirstSeen,
    /// Lexicographic order of country codes.
    Sorted,
}

/// The respondents of one country, in dataset order.
#[derive(Debug)]
pub struct CountryGroup<'a> {
    pub country: &'a str,
    pub respondents: Vec<&'a Respondent>,
}

/// Loads every respondent from the file at `path`.
///
/// # Errors
///
/// Fails if the file cannot be read, a required column is absent, a row has
/// an empty country code or an unparseable case id, or a case id repeats
/// within a country.
#[tracing::instrument(skip(columns))]
pub fn load_respondents(path: &str, columns: &ColumnMap) -> Result<Vec<Respondent>> {
    let file = File::open(path).with_context(|| format!("opening dataset {path}"))?;
    let reader: Box<dyn Read> = if path.ends_with(".gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let respondents =
        read_respondents(reader, columns).with_context(|| format!("reading dataset {path}"))?;
    info!(rows = respondents.len(), "Dataset loaded");
    Ok(respondents)
}

/// Reads respondents from any CSV source with a header row.
pub fn read_respondents<R: Read>(reader: R, columns: &ColumnMap) -> Result<Vec<Respondent>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(false).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let index = |name: &str| -> Result<usize> {
        match headers.iter().position(|h| h.trim() == name) {
            Some(i) => Ok(i),
            None => bail!("required column `{name}` not found in header"),
        }
    };
    let country_col = index(&columns.country)?;
    let case_col = index(&columns.case_id)?;
    let religiosity_col = index(&columns.religiosity)?;
    let adoption_col = index(&columns.adoption)?;
    let divorce_col = index(&columns.divorce)?;
    debug!(columns = ?columns, "Resolved dataset columns");

    let mut respondents = Vec::new();
    let mut seen: HashSet<(String, i64)> = HashSet::new();

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let country = field(country_col);
        if country.is_empty() {
            bail!("line {line}: empty country code in `{}`", columns.country);
        }

        let raw_case = field(case_col);
        let case_id = parse_case_id(raw_case).with_context(|| {
            format!("line {line}: invalid case id {raw_case:?} in `{}`", columns.case_id)
        })?;

        if !seen.insert((country.to_string(), case_id)) {
            bail!("line {line}: duplicate case id {case_id} for country {country}");
        }

        respondents.push(Respondent {
            country: country.to_string(),
            case_id,
            religiosity: field(religiosity_col).to_string(),
            adoption: field(adoption_col).to_string(),
            divorce: field(divorce_col).to_string(),
        });
    }

    Ok(respondents)
}

/// Case ids are integers; labeled-data exports sometimes write them as `12.0`.
fn parse_case_id(raw: &str) -> Result<i64> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    let f: f64 = raw.parse()?;
    if !f.is_finite() || f.fract() != 0.0 {
        bail!("not an integer");
    }
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        bail!("case id out of range");
    }
    Ok(f as i64)
}

/// Groups respondents by country in a single pass.
pub fn partition_by_country(respondents: &[Respondent], order: CountryOrder) -> Vec<CountryGroup<'_>> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<CountryGroup<'_>> = Vec::new();

    for r in respondents {
        let slot = *slots.entry(r.country.as_str()).or_insert_with(|| {
            groups.push(CountryGroup {
                country: r.country.as_str(),
                respondents: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].respondents.push(r);
    }

    if order == CountryOrder::Sorted {
        groups.sort_by(|a, b| a.country.cmp(b.country));
    }

    groups
}
