//! HTTP surface: routes, parameter extraction, outcome mapping.
//!
//! | route | handler |
//! |---|---|
//! | `GET /api/countries` | [`list_countries`] |
//! | `GET /healthz` | [`liveness`] |
//!
//! Every outcome of a country query maps to a response here. Upstream and
//! decode failures were already logged where they happened; the client only
//! gets a generic message for them.

use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use tracing::warn;

use crate::error::{CountryError, ValidationError};
use crate::query::Query;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::service::CountryService;
use crate::source::CountrySource;

const UPSTREAM_FAILURE: &str = "An error occurred while fetching country data.";

/// Builds the application router around `service`.
pub fn routes<S: CountrySource>(service: CountryService<S>) -> Router {
    let service = Arc::new(service);
    Router::new()
        .get("/api/countries", move |req: Request| {
            let service = Arc::clone(&service);
            async move { list_countries(&service, &req).await }
        })
        .get("/healthz", liveness)
}

/// `GET /api/countries`.
///
/// An empty result is `200 []`, never `404`.
pub async fn list_countries<S: CountrySource>(service: &CountryService<S>, req: &Request) -> Response {
    let query = match query_from_request(req) {
        Ok(query) => query,
        Err(e) => {
            warn!(error = %e, "malformed query parameter");
            return ApiError::from(e).into_response();
        }
    };

    match service.list(&query).await {
        Ok(countries) => Json(countries).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Liveness probe: if the process answers HTTP, it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Extracts the typed query from the query string.
pub fn query_from_request(req: &Request) -> Result<Query, ValidationError> {
    Ok(Query {
        country_name: req.query("countryName").map(str::to_owned),
        max_population: integer_param(req, "maxPopulation")?,
        sort: req.query("sort").map(str::to_owned),
        take: integer_param(req, "take")?,
    })
}

fn integer_param(req: &Request, param: &'static str) -> Result<Option<i64>, ValidationError> {
    req.query(param)
        .map(|value| {
            value.trim().parse::<i64>().map_err(|_| ValidationError::NotAnInteger {
                param,
                value: value.to_owned(),
            })
        })
        .transpose()
}

/// Error body: `{"error":{"code":"…","message":"…"}}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self { status: StatusCode::BAD_REQUEST, code: "INVALID_PARAMETER", message: e.to_string() }
    }
}

impl From<CountryError> for ApiError {
    fn from(e: CountryError) -> Self {
        match e {
            CountryError::Validation(e) => e.into(),
            CountryError::Fetch(_) | CountryError::Parse(_) => Self {
                status: StatusCode::BAD_REQUEST,
                code: "UPSTREAM_FAILURE",
                message: UPSTREAM_FAILURE.to_owned(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: ErrorDetail { code: self.code, message: self.message } };
        (self.status, Json(body)).into_response()
    }
}
