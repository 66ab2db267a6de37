use crate::analysis::classifier::classify;
use crate::analysis::types::{CountryAggregate, Diagnostics, Group};
use crate::analysis::utility::MeanAccumulator;
use crate::dataset::Respondent;
use tracing::{debug, warn};

/// Counters for one religiosity group within a country.
#[derive(Debug, Default)]
struct GroupTally {
    respondents: usize,
    adoption: MeanAccumulator,
    divorce: MeanAccumulator,
}

/// Aggregates the respondents of `country` out of the whole collection.
pub fn aggregate_country(respondents: &[Respondent], country: &str) -> CountryAggregate {
    aggregate_respondents(country, respondents.iter().filter(|r| r.country == country))
}

/// Aggregates respondents already known to belong to `country`.
///
/// Counts every classified respondent in its group, and averages each score
/// over the group members that have it. Undetermined respondents are skipped.
pub fn aggregate_respondents<'a, I>(country: &str, respondents: I) -> CountryAggregate
where
    I: IntoIterator<Item = &'a Respondent>,
{
    let mut religious = GroupTally::default();
    let mut nonreligious = GroupTally::default();
    let mut total = 0;
    let mut excluded = 0;

    for r in respondents {
        total += 1;

        let Some(c) = classify(r) else {
            excluded += 1;
            continue;
        };

        let tally = match c.group {
            Group::Religious => &mut religious,
            Group::NonReligious => &mut nonreligious,
        };
        tally.respondents += 1;
        tally.adoption.push(c.adoption);
        tally.divorce.push(c.divorce);
    }

    let aggregate = CountryAggregate {
        country: country.to_string(),
        rel: religious.respondents,
        nonrel: nonreligious.respondents,
        a_adp_rel: religious.adoption.mean(),
        a_adp_nonrel: nonreligious.adoption.mean(),
        a_div_rel: religious.divorce.mean(),
        a_div_nonrel: nonreligious.divorce.mean(),
        diagnostics: Diagnostics {
            total,
            excluded,
            n_adp_rel: religious.adoption.count(),
            n_adp_nonrel: nonreligious.adoption.count(),
            n_div_rel: religious.divorce.count(),
            n_div_nonrel: nonreligious.divorce.count(),
        },
    };

    for (name, mean) in [
        ("a_adp_rel", aggregate.a_adp_rel),
        ("a_adp_nonrel", aggregate.a_adp_nonrel),
        ("a_div_rel", aggregate.a_div_rel),
        ("a_div_nonrel", aggregate.a_div_nonrel),
    ] {
        if mean.is_none() {
            warn!(country, mean = name, "No respondents with this score, mean left empty");
        }
    }

    debug!(
        country,
        total,
        excluded,
        rel = aggregate.rel,
        nonrel = aggregate.nonrel,
        "Country aggregated"
    );

    aggregate
}
