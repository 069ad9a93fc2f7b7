//! `countries-api` binary.
//!
//! Configure through the environment (see `config` and `logging`), then:
//!
//! ```text
//! curl 'http://127.0.0.1:3000/api/countries?countryName=land&sort=ascend&take=5'
//! ```

use countries_api::config::Config;
use countries_api::logging::init_logging;
use countries_api::{CountryService, HttpSource, Server, api};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_logging(&config.log)?;

    let source = HttpSource::from_config(&config.upstream)?;
    info!(upstream = %source.url(), timeout_secs = ?config.upstream.timeout_secs, "upstream configured");

    let app = api::routes(CountryService::new(source));
    Server::bind(config.server.addr()).await?.serve(app).await?;
    Ok(())
}
