use std::fmt;

use url::Url;

use crate::error::{RelayError, Result};

/// The (base URL, route path) pair naming one remote generation service.
/// Normalised once at construction and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EndpointIdentity {
    base_url: String,
    route_path: String,
}

impl EndpointIdentity {
    pub fn new(base_url: &str, route_path: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(base_url)
            .map_err(|e| RelayError::InvalidEndpoint(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RelayError::InvalidEndpoint(format!(
                "{}: unsupported scheme `{}`",
                base_url,
                parsed.scheme()
            )));
        }
        // The route is appended textually, so the base must end at its path
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(RelayError::InvalidEndpoint(format!(
                "{}: query or fragment not allowed in a base URL",
                base_url
            )));
        }

        let route = route_path.trim().trim_matches('/');
        let route_path = if route.is_empty() {
            String::new()
        } else {
            format!("/{}", route)
        };

        Ok(Self {
            base_url: base_url.to_string(),
            route_path,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn route_path(&self) -> &str {
        &self.route_path
    }

    // `{base}{route}/invoke`
    pub fn invoke_url(&self) -> String {
        format!("{}{}/invoke", self.base_url, self.route_path)
    }
}

impl fmt::Display for EndpointIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base_url, self.route_path)
    }
}
