//! Mapping of raw survey answers onto attitude scores in [-1, 1].
//!
//! Answers are compared after trimming and ASCII case folding. Anything a
//! mapper does not recognize yields `None`, which is distinct from a neutral 0.

/// Converts an answer to "homosexual couples should be allowed to adopt"
/// (EVS `v82`) into an adoption-attitude score.
///
/// | Answer                     | Rank | Score |
/// |----------------------------|------|-------|
/// | agree strongly             | 1    | 1.0   |
/// | agree                      | 2    | 0.5   |
/// | neither agree nor disagree | 3    | 0.0   |
/// | disagree                   | 4    | -0.5  |
/// | disagree strongly          | 5    | -1.0  |
pub fn adoption_score(answer: &str) -> Option<f64> {
    let rank = match normalize(answer).as_str() {
        "agree strongly" => 1,
        "agree" => 2,
        "neither agree nor disagree" => 3,
        "disagree" => 4,
        "disagree strongly" => 5,
        _ => return None,
    };
    Some(-(rank as f64 - 3.0) / 2.0)
}

/// Converts an answer to "divorce can be justified" (EVS `v155`) into a
/// divorce-attitude score.
///
/// The 1-10 scale has labeled endpoints `never` (1) and `always` (10); the
/// points in between arrive as numbers. 1 maps to -1 and 10 maps to 1.
pub fn divorce_score(answer: &str) -> Option<f64> {
    let value = match normalize(answer).as_str() {
        "never" => 1,
        "always" => 10,
        other => parse_scale_point(other)?,
    };
    Some((value as f64 - 5.5) / 4.5)
}

/// Parses an integer in [1, 10]. Integral decimals such as `7.0` are accepted.
fn parse_scale_point(raw: &str) -> Option<i64> {
    let digits = match raw.split_once('.') {
        Some((whole, frac)) if !frac.is_empty() && frac.bytes().all(|b| b == b'0') => whole,
        Some(_) => return None,
        None => raw,
    };
    let value = digits.parse::<i64>().ok()?;
    (1..=10).contains(&value).then_some(value)
}

pub(crate) fn normalize(answer: &str) -> String {
    answer.trim().to_ascii_lowercase()
}
