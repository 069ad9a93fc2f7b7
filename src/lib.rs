//! # countries-api
//!
//! A small HTTP API in front of the public REST Countries dataset. Every
//! request fetches the full country list afresh, decodes it, and runs it
//! through a fixed pipeline before answering:
//!
//! ```text
//! GET /api/countries?countryName=..&maxPopulation=..&sort=..&take=..
//!        ↓ api::list_countries     query string → Query
//! CountryService::list             validate, then fetch
//!        ↓ CountrySource::fetch    one upstream GET
//! decode::parse                    case-insensitive JSON → Vec<CountryRecord>
//!        ↓ Plan::apply             name filter → population filter → sort → take
//! 200 [..] | 400 {"error":{..}}
//! ```
//!
//! The HTTP substrate is hyper: radix-tree routing via [`matchit`], one tokio
//! task per connection, graceful shutdown on SIGTERM / Ctrl-C.
//!
//! ## Wiring
//!
//! ```rust,no_run
//! use countries_api::{CountryService, HttpSource, Server, api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let source = HttpSource::from_config(&config.upstream)?;
//!     let app = api::routes(CountryService::new(source));
//!     Server::bind(config.server.addr()).await?.serve(app).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod api;
pub mod config;
pub mod country;
pub mod decode;
pub mod logging;
pub mod query;
pub mod service;
pub mod source;

pub use country::{CountryName, CountryRecord};
pub use error::{CountryError, Error, FetchError, ParseError, ValidationError};
pub use query::{Plan, Query, SortDirection, query};
pub use request::Request;
pub use response::{IntoResponse, Json, Response};
pub use router::Router;
pub use server::Server;
pub use service::CountryService;
pub use source::{CountrySource, HttpSource};
