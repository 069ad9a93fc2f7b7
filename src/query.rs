//! The query pipeline.
//!
//! A [`Query`] holds the caller's raw, optional parameters. [`Query::plan`]
//! validates all of them up front and yields a [`Plan`]; [`Plan::apply`] then
//! runs the stages over a fetched list in a fixed order:
//!
//! ```text
//! name filter → population filter → sort → take
//! ```
//!
//! Each stage is skipped when its parameter is unset. The order is part of
//! the contract: taking before filtering or sorting selects different records.

use std::cmp::Reverse;
use std::str::FromStr;

use tracing::warn;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::country::CountryRecord;
use crate::error::ValidationError;

const PEOPLE_PER_MILLION: u64 = 1_000_000;

/// Raw query parameters, exactly as the caller supplied them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Query {
    /// Case-insensitive substring of the common name.
    pub country_name: Option<String>,
    /// Exclusive population ceiling, in millions.
    pub max_population: Option<i64>,
    /// `"ascend"` or `"descend"`, any case.
    pub sort: Option<String>,
    /// Maximum number of records to return.
    pub take: Option<i64>,
}

/// Direction of the common-name sort.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortDirection {
    Ascend,
    Descend,
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ascend") {
            Ok(Self::Ascend)
        } else if s.eq_ignore_ascii_case("descend") {
            Ok(Self::Descend)
        } else {
            Err(ValidationError::InvalidSort(s.to_owned()))
        }
    }
}

/// A validated query, ready to run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Plan {
    name: Option<String>,
    population_limit: Option<u64>,
    sort: Option<SortDirection>,
    take: Option<usize>,
}

impl Query {
    /// Validates every parameter. Nothing runs unless all of them are valid.
    pub fn plan(&self) -> Result<Plan, ValidationError> {
        let name = self.country_name.as_deref()
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase);

        let population_limit = self.max_population
            .map(|millions| {
                u64::try_from(millions)
                    .map(|m| m.saturating_mul(PEOPLE_PER_MILLION))
                    .map_err(|_| {
                        warn!(max_population = millions, "negative maxPopulation rejected");
                        ValidationError::NegativePopulation(millions)
                    })
            })
            .transpose()?;

        let sort = self.sort.as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<SortDirection>()
                    .inspect_err(|_| warn!(sort = s, "invalid sort parameter rejected"))
            })
            .transpose()?;

        let take = self.take
            .map(|n| {
                usize::try_from(n).map_err(|_| {
                    warn!(take = n, "negative take rejected");
                    ValidationError::NegativeTake(n)
                })
            })
            .transpose()?;

        Ok(Plan { name, population_limit, sort, take })
    }
}

impl Plan {
    /// Runs the stages over `records`, in pipeline order.
    pub fn apply(&self, records: Vec<CountryRecord>) -> Vec<CountryRecord> {
        let records = self.filter_by_name(records);
        let records = self.filter_by_population(records);
        let records = self.sort(records);
        self.limit(records)
    }

    fn filter_by_name(&self, records: Vec<CountryRecord>) -> Vec<CountryRecord> {
        let Some(needle) = &self.name else { return records };
        records.into_iter()
            .filter(|r| r.common_name().is_some_and(|c| c.to_lowercase().contains(needle.as_str())))
            .collect()
    }

    fn filter_by_population(&self, records: Vec<CountryRecord>) -> Vec<CountryRecord> {
        let Some(limit) = self.population_limit else { return records };
        records.into_iter()
            .filter(|r| r.population.is_some_and(|p| p < limit))
            .collect()
    }

    // `sort_by_cached_key` is stable, so equal names keep their fetch order.
    // `None` orders before `Some`: unnamed records lead an ascending sort and
    // trail a descending one.
    fn sort(&self, mut records: Vec<CountryRecord>) -> Vec<CountryRecord> {
        match self.sort {
            Some(SortDirection::Ascend) => {
                records.sort_by_cached_key(|r| r.common_name().map(collation_key));
            }
            Some(SortDirection::Descend) => {
                records.sort_by_cached_key(|r| Reverse(r.common_name().map(collation_key)));
            }
            None => {}
        }
        records
    }

    fn limit(&self, mut records: Vec<CountryRecord>) -> Vec<CountryRecord> {
        if let Some(n) = self.take {
            records.truncate(n);
        }
        records
    }
}

/// Sort key for a common name. Letters compare without accents or case, so
/// "Åland Islands" sits among the A's and "Réunion" before "Romania". The
/// lowercased name then orders spellings that differ only by accent.
fn collation_key(name: &str) -> (String, String) {
    let base = name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    (base, name.to_lowercase())
}

/// Validates `query` and runs it over `records`.
pub fn query(records: Vec<CountryRecord>, query: &Query) -> Result<Vec<CountryRecord>, ValidationError> {
    Ok(query.plan()?.apply(records))
}
