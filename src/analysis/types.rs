//! Data types used by the aggregation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Importance of religion in a respondent's life, collapsed to three states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Religiosity {
    Religious,
    NonReligious,
    Undetermined,
}

impl Religiosity {
    /// Returns the aggregation group, or `None` for undetermined respondents.
    pub fn group(self) -> Option<Group> {
        match self {
            Religiosity::Religious => Some(Group::Religious),
            Religiosity::NonReligious => Some(Group::NonReligious),
            Religiosity::Undetermined => None,
        }
    }
}

/// One of the two religiosity groups a classified respondent falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Religious,
    NonReligious,
}

/// A respondent that survived classification, with both attitude scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub group: Group,
    pub adoption: Option<f64>,
    pub divorce: Option<f64>,
}

/// Per-country bookkeeping that never reaches the CSV table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub total: usize,
    pub excluded: usize,
    pub n_adp_rel: usize,
    pub n_adp_nonrel: usize,
    pub n_div_rel: usize,
    pub n_div_nonrel: usize,
}

/// One output row: group sizes and the four group-mean attitude scores.
///
/// A mean is `None` when its group has no respondent with that score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryAggregate {
    pub country: String,
    pub rel: usize,
    pub nonrel: usize,
    pub a_adp_rel: Option<f64>,
    pub a_adp_nonrel: Option<f64>,
    pub a_div_rel: Option<f64>,
    pub a_div_nonrel: Option<f64>,
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

/// A country row together with its diagnostics, as written to the JSON report.
#[derive(Serialize)]
pub struct CountryReport<'a> {
    #[serde(flatten)]
    pub(crate) aggregate: &'a CountryAggregate,
    pub(crate) diagnostics: &'a Diagnostics,
}

/// Top-level JSON report for a run.
#[derive(Serialize)]
pub struct SurveyReport<'a> {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) source: &'a str,
    pub(crate) countries: Vec<CountryReport<'a>>,
}

impl<'a> SurveyReport<'a> {
    pub fn new(source: &'a str, aggregates: &'a [CountryAggregate]) -> Self {
        Self {
            generated_at: Utc::now(),
            source,
            countries: aggregates
                .iter()
                .map(|aggregate| CountryReport {
                    aggregate,
                    diagnostics: &aggregate.diagnostics,
                })
                .collect(),
        }
    }
}
