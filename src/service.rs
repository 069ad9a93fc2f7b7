//! The country query entry point: fetch, decode, run the pipeline.

use tracing::{debug, warn};

use crate::country::CountryRecord;
use crate::decode;
use crate::error::CountryError;
use crate::query::Query;
use crate::source::CountrySource;

/// Answers country queries against a [`CountrySource`].
///
/// Stateless between calls: every query re-fetches the full upstream list.
pub struct CountryService<S> {
    source: S,
}

impl<S: CountrySource> CountryService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs one query.
    ///
    /// Parameters are validated before the upstream is contacted, so an
    /// invalid query costs no network round trip and returns no partial
    /// result. Failures are logged where they are detected.
    pub async fn list(&self, query: &Query) -> Result<Vec<CountryRecord>, CountryError> {
        let plan = query.plan()?;
        let payload = self.source.fetch().await?;
        let records = decode::parse(&payload).inspect_err(|e| {
            warn!(error = %e, "upstream payload could not be decoded");
        })?;

        let fetched = records.len();
        let countries = plan.apply(records);
        debug!(fetched, returned = countries.len(), "country query complete");
        Ok(countries)
    }
}
