//! Endpoint resolution
//!
//! Resolving where a service lives (regions, partitions, discovery) is the
//! caller's business. The dispatcher only asks an [`EndpointResolver`] for the
//! pieces it copies into each request.

use jsonwire_core::{Error, Result};
use url::Url;

/// Where requests are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub protocol: String,
    pub hostname: String,
    pub port: Option<u16>,
    /// Base path; requests go to `<path>/`
    pub path: String,
}

impl Endpoint {
    /// Parse an absolute `http` or `https` URL
    ///
    /// Credentials are dropped. Query strings and fragments are rejected since
    /// every request goes to the bare base path.
    pub fn parse(url: &str) -> Result<Self> {
        let parsed =
            Url::parse(url).map_err(|e| Error::Endpoint(format!("invalid url `{}`: {}", url, e)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::Endpoint(format!(
                    "unsupported scheme `{}` in `{}`",
                    other, url
                )))
            }
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(Error::Endpoint(format!(
                "query or fragment not allowed in `{}`",
                url
            )));
        }
        let hostname = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| Error::Endpoint(format!("missing host in `{}`", url)))?;

        Ok(Self {
            protocol: parsed.scheme().to_owned(),
            hostname: hostname.to_owned(),
            port: parsed.port(),
            path: parsed.path().to_owned(),
        })
    }

    /// `<base path>/` without doubling the separator
    pub fn request_path(&self) -> String {
        format!("{}/", self.path.trim_end_matches('/'))
    }
}

/// Supplies the endpoint for each serialized request
pub trait EndpointResolver: Send + Sync {
    fn resolve(&self) -> Result<Endpoint>;
}

/// Always resolves to the same endpoint
#[derive(Debug, Clone)]
pub struct StaticEndpoint(Endpoint);

impl StaticEndpoint {
    pub fn new(endpoint: Endpoint) -> Self {
        Self(endpoint)
    }

    pub fn from_url(url: &str) -> Result<Self> {
        Endpoint::parse(url).map(Self)
    }
}

impl EndpointResolver for StaticEndpoint {
    fn resolve(&self) -> Result<Endpoint> {
        Ok(self.0.clone())
    }
}
