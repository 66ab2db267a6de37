use anyhow::{Context, Result};
use serde::Deserialize;

/// Names of the survey columns the pipeline reads.
///
/// Defaults follow the EVS 2017 variable names. A JSON file can override any
/// subset of them; omitted keys keep their default:
/// ```json
/// {
///   "country": "cntry_AN",
///   "divorce": "v155_recoded"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMap {
    pub country: String,
    pub case_id: String,
    pub religiosity: String,
    pub adoption: String,
    pub divorce: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            country: "c_abrv".to_string(),
            case_id: "caseno".to_string(),
            religiosity: "v6".to_string(),
            adoption: "v82".to_string(),
            divorce: "v155".to_string(),
        }
    }
}

impl ColumnMap {
    /// Loads a column mapping from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading column config {path}"))?;
        Self::from_json(&content).with_context(|| format!("parsing column config {path}"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_evs_variables() {
        let columns = ColumnMap::default();
        assert_eq!(columns.country, "c_abrv");
        assert_eq!(columns.case_id, "caseno");
        assert_eq!(columns.religiosity, "v6");
        assert_eq!(columns.adoption, "v82");
        assert_eq!(columns.divorce, "v155");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let columns = ColumnMap::from_json(r#"{"country": "cntry"}"#).unwrap();
        assert_eq!(columns.country, "cntry");
        assert_eq!(columns.divorce, "v155");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(ColumnMap::from_json(r#"{"weight": "gweight"}"#).is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(ColumnMap::load("/nonexistent/columns.json").is_err());
    }
}
