use crate::analysis::mappers::{adoption_score, divorce_score, normalize};
use crate::analysis::types::{Classification, Religiosity};
use crate::dataset::Respondent;

/// Collapses the "how important is religion in your life" answer (EVS `v6`).
pub fn religiosity(answer: &str) -> Religiosity {
    match normalize(answer).as_str() {
        "not at all important" | "not important" => Religiosity::NonReligious,
        "quite important" | "very important" => Religiosity::Religious,
        _ => Religiosity::Undetermined,
    }
}

/// Classifies a respondent and scores both attitudes.
///
/// Returns `None` when religiosity is undetermined; such respondents take no
/// part in aggregation.
pub fn classify(respondent: &Respondent) -> Option<Classification> {
    let adoption = adoption_score(&respondent.adoption);
    let divorce = divorce_score(&respondent.divorce);

    let group = religiosity(&respondent.religiosity).group()?;
    Some(Classification {
        group,
        adoption,
        divorce,
    })
}
