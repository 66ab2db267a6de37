use crate::analysis::aggregate::aggregate_respondents;
use crate::analysis::types::{CountryAggregate, SurveyReport};
use crate::config::ColumnMap;
use crate::dataset::{CountryOrder, Respondent, load_respondents, partition_by_country};
use crate::output::{write_report, write_table};
use anyhow::Result;
use tracing::{info, warn};

/// Options shared by every run of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub order: CountryOrder,
    /// Restrict output to these country codes. Empty means all countries.
    pub countries: Vec<String>,
}

/// Output encoding for [`run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Aggregates every country in the dataset, in the requested order.
pub fn analyze(respondents: &[Respondent], options: &AnalyzeOptions) -> Vec<CountryAggregate> {
    let groups = partition_by_country(respondents, options.order);

    for wanted in &options.countries {
        if !groups.iter().any(|g| g.country == wanted) {
            warn!(country = %wanted, "Requested country not present in dataset");
        }
    }

    groups
        .into_iter()
        .filter(|g| options.countries.is_empty() || options.countries.iter().any(|c| c == g.country))
        .map(|g| aggregate_respondents(g.country, g.respondents))
        .collect()
}

/// Loads the dataset, aggregates it, and writes the result to `output`.
///
/// Nothing is written unless loading succeeds.
#[tracing::instrument(skip(columns, options))]
pub fn run(
    input: &str,
    output: &str,
    format: OutputFormat,
    columns: &ColumnMap,
    options: &AnalyzeOptions,
) -> Result<Vec<CountryAggregate>> {
    let respondents = load_respondents(input, columns)?;
    let aggregates = analyze(&respondents, options);

    match format {
        OutputFormat::Csv => write_table(output, &aggregates)?,
        OutputFormat::Json => write_report(output, &SurveyReport::new(input, &aggregates))?,
    }

    info!(countries = aggregates.len(), output, "Results written");
    Ok(aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respondent(country: &str, case_id: i64) -> Respondent {
        Respondent {
            country: country.to_string(),
            case_id,
            religiosity: "very important".to_string(),
            adoption: "agree".to_string(),
            divorce: "never".to_string(),
        }
    }

    fn rows() -> Vec<Respondent> {
        vec![respondent("ES", 1), respondent("AT", 1), respondent("ES", 2)]
    }

    #[test]
    fn test_analyze_first_seen() {
        let result = analyze(&rows(), &AnalyzeOptions::default());

        let countries: Vec<_> = result.iter().map(|a| a.country.as_str()).collect();
        assert_eq!(countries, vec!["ES", "AT"]);
        assert_eq!(result[0].rel, 2);
    }

    #[test]
    fn test_analyze_sorted() {
        let options = AnalyzeOptions {
            order: CountryOrder::Sorted,
            ..Default::default()
        };
        let result = analyze(&rows(), &options);

        assert_eq!(result[0].country, "AT");
        assert_eq!(result[1].country, "ES");
    }

    #[test]
    fn test_analyze_country_filter() {
        let options = AnalyzeOptions {
            countries: vec!["AT".to_string(), "FR".to_string()],
            ..Default::default()
        };
        let result = analyze(&rows(), &options);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].country, "AT");
    }

    #[test]
    fn test_analyze_empty_dataset() {
        assert!(analyze(&[], &AnalyzeOptions::default()).is_empty());
    }

    #[test]
    fn test_run_missing_input_writes_nothing() {
        let output = format!("{}/evs_attitudes_missing_input.csv", std::env::temp_dir().display());
        let _ = std::fs::remove_file(&output);

        let result = run(
            "/nonexistent/EVS2017.csv",
            &output,
            OutputFormat::Csv,
            &ColumnMap::default(),
            &AnalyzeOptions::default(),
        );

        assert!(result.is_err());
        assert!(!std::path::Path::new(&output).exists());
    }
}
