//! HTTP client shared by the TRS and WES implementations.

use std::time::{Duration, Instant};
use std::{env, fmt};

use reqwest::{Client, Method, RequestBuilder, header};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;
use wfinterop_types::ServiceEntry;

use crate::ApiError;
use crate::response::{decode, handle_response};

/// Scheme used when a service entry leaves `proto` empty.
const DEFAULT_PROTO: &str = "https";

/// How requests to a service authenticate, derived from `auth_type`.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthScheme {
    None,
    /// `Authorization: Bearer <auth>` (`auth_type` `token` or `bearer`).
    Bearer(String),
    /// HTTP basic auth from `auth` written as `user:password`.
    Basic { username: String, password: Option<String> },
    /// `Authorization: <auth>` verbatim (`auth_type` `api_key`).
    Raw(String),
}

impl AuthScheme {
    pub fn from_entry(entry: &ServiceEntry) -> Result<Self, ApiError> {
        let auth = entry.auth().trim();
        let auth_type = entry.auth_type().trim().to_ascii_lowercase();
        if !matches!(auth_type.as_str(), "" | "none") && auth.is_empty() {
            return Err(ApiError::invalid_service(format!("auth_type '{auth_type}' requires a non-empty auth value")));
        }

        match auth_type.as_str() {
            "" | "none" => Ok(Self::None),
            "token" | "bearer" => Ok(Self::Bearer(auth.to_string())),
            "basic" => {
                let (username, password) = match auth.split_once(':') {
                    Some((username, password)) => (username.to_string(), Some(password.to_string())),
                    None => (auth.to_string(), None),
                };
                Ok(Self::Basic { username, password })
            }
            "api_key" | "apikey" => Ok(Self::Raw(auth.to_string())),
            other => Err(ApiError::invalid_service(format!(
                "unsupported auth_type '{other}'; expected one of token, bearer, basic, api_key"
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bearer(_) => "bearer",
            Self::Basic { .. } => "basic",
            Self::Raw(_) => "api_key",
        }
    }

    fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => builder,
            Self::Bearer(token) => builder.bearer_auth(token),
            Self::Basic { username, password } => builder.basic_auth(username, password.as_ref()),
            Self::Raw(value) => builder.header(header::AUTHORIZATION, value),
        }
    }
}

impl fmt::Debug for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthScheme({})", self.kind())
    }
}

/// Build `<proto>://<host><base_path>` for a service entry.
///
/// `proto` defaults to https; a `host` that already carries a scheme is used
/// as-is. The result must be an http(s) URL with a host.
pub fn build_base_url(entry: &ServiceEntry, base_path: &str) -> Result<String, ApiError> {
    let host = entry.host().trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(ApiError::invalid_service("service entry has no host"));
    }

    let origin = if host.contains("://") {
        host.to_string()
    } else {
        let proto = entry.proto().trim();
        let proto = if proto.is_empty() { DEFAULT_PROTO } else { proto };
        format!("{proto}://{host}")
    };
    let base_url = format!("{origin}{base_path}");

    let parsed = Url::parse(&base_url).map_err(|error| ApiError::invalid_service(format!("invalid base URL '{base_url}': {error}")))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ApiError::invalid_service(format!(
            "unsupported URL scheme '{}' (expected http/https)",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none() {
        return Err(ApiError::invalid_service(format!("base URL '{base_url}' has no host")));
    }

    Ok(base_url)
}

/// Thin wrapper around a configured `reqwest::Client` for one GA4GH service.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
    auth: AuthScheme,
}

impl ServiceClient {
    /// Construct a client for the service described by `entry`, rooted at
    /// `base_path` (for example `/api/ga4gh/v2`).
    pub fn from_entry(entry: &ServiceEntry, base_path: &str) -> Result<Self, ApiError> {
        let base_url = build_base_url(entry, base_path)?;
        let auth = AuthScheme::from_entry(entry)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|error| ApiError::invalid_service(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("wfinterop/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
            auth,
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and service-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, auth = self.auth.kind(), "building request");

        let builder = self.http.request(method, url).header(header::USER_AGENT, &self.user_agent);
        self.auth.apply(builder)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, |builder| builder).await
    }

    /// Send a request, letting `prepare` attach a query, body or form, and
    /// decode the JSON response into `T`.
    pub async fn send<T, F>(&self, method: Method, path: &str, prepare: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = format!("{}{}", self.base_url, path);
        let started = Instant::now();
        let builder = prepare(self.request(method.clone(), path));

        let response = builder.send().await.map_err(|source| {
            warn!(%method, %url, error = %source, duration_ms = started.elapsed().as_millis(), "http request failed to send");
            ApiError::Transport { url: url.clone(), source }
        })?;
        let value = handle_response(&method, &url, response, started).await?;
        decode(&url, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_defaults_to_https() {
        let entry = ServiceEntry::new("dockstore.org", "");
        assert_eq!(build_base_url(&entry, "/api/ga4gh/v2").unwrap(), "https://dockstore.org/api/ga4gh/v2");
    }

    #[test]
    fn base_url_keeps_port_and_proto() {
        let entry = ServiceEntry::new("localhost:8080/", "http");
        assert_eq!(build_base_url(&entry, "/ga4gh/wes/v1").unwrap(), "http://localhost:8080/ga4gh/wes/v1");
    }

    #[test]
    fn base_url_accepts_host_with_scheme() {
        let entry = ServiceEntry::new("http://127.0.0.1:9000", "https");
        assert_eq!(build_base_url(&entry, "/ga4gh/wes/v1").unwrap(), "http://127.0.0.1:9000/ga4gh/wes/v1");
    }

    #[test]
    fn base_url_rejects_missing_host_and_bad_scheme() {
        assert!(build_base_url(&ServiceEntry::default(), "/x").is_err());
        assert!(build_base_url(&ServiceEntry::new("example.com", "ftp"), "/x").is_err());
    }

    #[test]
    fn auth_scheme_follows_auth_type() {
        let entry = ServiceEntry::new("h", "https").with_auth("abc", "Token");
        assert_eq!(AuthScheme::from_entry(&entry).unwrap(), AuthScheme::Bearer("abc".into()));

        let entry = ServiceEntry::new("h", "https").with_auth("user:pw", "basic");
        assert_eq!(
            AuthScheme::from_entry(&entry).unwrap(),
            AuthScheme::Basic {
                username: "user".into(),
                password: Some("pw".into())
            }
        );

        let entry = ServiceEntry::new("h", "https").with_auth("ignored", "");
        assert_eq!(AuthScheme::from_entry(&entry).unwrap(), AuthScheme::None);
    }

    #[test]
    fn auth_scheme_rejects_unknown_or_empty() {
        let entry = ServiceEntry::new("h", "https").with_auth("abc", "oauth3");
        assert!(AuthScheme::from_entry(&entry).is_err());

        let entry = ServiceEntry::new("h", "https").with_auth("", "bearer");
        assert!(AuthScheme::from_entry(&entry).is_err());
    }

    #[test]
    fn debug_output_hides_credentials() {
        let scheme = AuthScheme::Bearer("super-secret".into());
        assert_eq!(format!("{scheme:?}"), "AuthScheme(bearer)");
    }
}
