// REST HTTP client
//
// Wraps `reqwest::Client` with versioned URL construction, status mapping
// and CSRF token handling. Endpoint methods live in sibling modules so this
// file stays focused on transport mechanics.

use std::sync::{PoisonError, RwLock};

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

pub const DEFAULT_API_VERSION: &str = "v10.08";

/// Cookie-session HTTP client for one switch.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
    /// Captured at login and sent on every mutating request.
    csrf_token: RwLock<Option<String>>,
}

impl RestClient {
    /// Create a client for the switch at `base_url` (e.g. `https://10.0.0.2`).
    ///
    /// The client keeps its own cookie store for the login session.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            api_version: DEFAULT_API_VERSION.to_owned(),
            csrf_token: RwLock::new(None),
        })
    }

    /// Override the API version path segment.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── CSRF token management ─────────────────────────────────────────

    pub(crate) fn set_csrf_token(&self, token: Option<String>) {
        *self
            .csrf_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn apply_csrf(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self
            .csrf_token
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match guard.as_deref() {
            Some(token) => builder.header("X-Csrf-Token", token),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/rest/{version}/{path}`
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/rest/{}/{path}", self.api_version);
        Ok(Url::parse(&full)?)
    }

    /// Resource URI as the API uses it in references, e.g. `/rest/v10.08/system/vlans/10`.
    pub(crate) fn resource_ref(&self, path: &str) -> String {
        format!("/rest/{}/{path}", self.api_version)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        Self::parse_json(resp).await
    }

    pub(crate) async fn post(&self, url: Url, body: &(impl Serialize + Sync)) -> Result<(), Error> {
        debug!("POST {}", url);
        let resp = self.apply_csrf(self.http.post(url).json(body)).send().await?;
        Self::expect_success(resp).await.map(|_| ())
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self.apply_csrf(self.http.post(url).json(body)).send().await?;
        Self::parse_json(resp).await
    }

    pub(crate) async fn patch(&self, url: Url, body: &(impl Serialize + Sync)) -> Result<(), Error> {
        debug!("PATCH {}", url);
        let resp = self.apply_csrf(self.http.patch(url).json(body)).send().await?;
        Self::expect_success(resp).await.map(|_| ())
    }

    pub(crate) async fn put_empty(&self, url: Url) -> Result<(), Error> {
        debug!("PUT {}", url);
        let resp = self.apply_csrf(self.http.put(url)).send().await?;
        Self::expect_success(resp).await.map(|_| ())
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);
        let resp = self.apply_csrf(self.http.delete(url)).send().await?;
        Self::expect_success(resp).await.map(|_| ())
    }

    /// Map non-2xx statuses into errors and return the body text.
    async fn expect_success(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }
        trace!(bytes = body.len(), "response body received");
        Ok(body)
    }

    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let body = Self::expect_success(resp).await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Interface names contain `/`, which must be escaped in resource paths.
pub(crate) fn encode_name(name: &str) -> String {
    url::form_urlencoded::byte_serialize(name.as_bytes()).collect()
}
