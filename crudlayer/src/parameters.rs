use axum::extract::{FromRequestParts, RawPathParams};
use axum::http::request::Parts;
use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;

use crate::core::CrudError;

/// Path variables and query parameters of the current request.
///
/// Passed untouched from the router through the service into the repository,
/// so applications can scope queries (tenants, parent resources, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    path: HashMap<String, String>,
    query: HashMap<String, Vec<String>>,
}

impl Parameters {
    #[must_use]
    pub fn new(path: HashMap<String, String>, query: HashMap<String, Vec<String>>) -> Self {
        Self { path, query }
    }

    /// Parses a raw query string such as `page=1&tag=a&tag=b`.
    #[must_use]
    pub fn parse_query(raw: &str) -> HashMap<String, Vec<String>> {
        let mut query: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            query.entry(name.into_owned()).or_default().push(value.into_owned());
        }
        query
    }

    #[must_use]
    pub fn with_path_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_query_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(name.into()).or_default().push(value.into());
        self
    }

    #[must_use]
    pub fn path_variable(&self, name: &str) -> Option<&str> {
        self.path.get(name).map(String::as_str)
    }

    /// # Errors
    ///
    /// Returns [`CrudError::InvalidInput`] when the variable is present but
    /// does not parse as `A`.
    pub fn path_variable_as<A: FromStr>(&self, name: &str) -> Result<Option<A>, CrudError> {
        self.path_variable(name)
            .map(|raw| convert(raw, name, "path variable"))
            .transpose()
    }

    #[must_use]
    pub fn query_parameters(&self, name: &str) -> &[String] {
        self.query.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn query_parameter(&self, name: &str) -> Option<&str> {
        self.query_parameters(name).first().map(String::as_str)
    }

    /// # Errors
    ///
    /// Returns [`CrudError::InvalidInput`] when the first value does not parse as `A`.
    pub fn query_parameter_as<A: FromStr>(&self, name: &str) -> Result<Option<A>, CrudError> {
        self.query_parameter(name)
            .map(|raw| convert(raw, name, "query parameter"))
            .transpose()
    }
}

fn convert<A: FromStr>(raw: &str, name: &str, kind: &str) -> Result<A, CrudError> {
    raw.parse()
        .map_err(|_| CrudError::invalid_input(format!("Cannot get '{name}' {kind}, conversion failed")))
}

impl<S> FromRequestParts<S> for Parameters
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // routes without captures have no path params to read
        let path = match RawPathParams::from_request_parts(parts, state).await {
            Ok(params) => params
                .iter()
                .map(|(name, value)| (name.to_owned(), value.to_owned()))
                .collect(),
            Err(_) => HashMap::new(),
        };
        let query = parts.uri.query().map(Self::parse_query).unwrap_or_default();
        Ok(Self { path, query })
    }
}
