//! The country record as served by the upstream dataset and by this API.

use serde::{Deserialize, Serialize};

/// One country, as fetched from upstream.
///
/// Every field is optional: the upstream dataset is not validated beyond
/// best-effort decoding, so a record may carry no names or no population.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CountryRecord {
    #[serde(default)]
    pub name: Option<CountryName>,
    #[serde(default)]
    pub population: Option<u64>,
}

/// Name variants of a country.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CountryName {
    /// Everyday short name, e.g. `"Canada"`.
    #[serde(default)]
    pub common: Option<String>,
    #[serde(default)]
    pub official: Option<String>,
}

impl CountryRecord {
    /// Shorthand for a record with a common name and a known population.
    pub fn new(common: impl Into<String>, population: u64) -> Self {
        Self {
            name: Some(CountryName { common: Some(common.into()), official: None }),
            population: Some(population),
        }
    }

    pub fn common_name(&self) -> Option<&str> {
        self.name.as_ref()?.common.as_deref()
    }

    pub fn official_name(&self) -> Option<&str> {
        self.name.as_ref()?.official.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_see_through_missing_name() {
        let record = CountryRecord { name: None, population: Some(5) };
        assert_eq!(record.common_name(), None);
        assert_eq!(record.official_name(), None);

        let record = CountryRecord::new("Canada", 40_000_000);
        assert_eq!(record.common_name(), Some("Canada"));
    }

    #[test]
    fn serializes_absent_values_as_null() {
        let record = CountryRecord {
            name: Some(CountryName { common: Some("Chad".into()), official: None }),
            population: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": { "common": "Chad", "official": null },
                "population": null
            })
        );
    }
}
