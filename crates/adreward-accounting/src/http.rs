//! HTTP implementation of [`Accounting`] using `reqwest`.

use std::time::Duration;

use adreward_credentials::Credentials;
use adreward_protocol::{
    Account, Ad, AdId, BalanceUpdate, Codec, Credits, JsonCodec, UserId,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};

use crate::{Accounting, AccountingError};

/// Settings for [`HttpAccounting`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the API, e.g. `https://api.example.com/v1/`.
    pub base_url: String,
    /// Per-request timeout. Default: 10 seconds.
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Talks to the remote accounting API over HTTP.
///
/// Every request carries `Authorization: Bearer <token>` taken from the
/// credential it was built with. Cheap to clone (`reqwest::Client` is an
/// `Arc` internally).
#[derive(Clone)]
pub struct HttpAccounting<C: Codec = JsonCodec> {
    client: reqwest::Client,
    base: Url,
    bearer: String,
    codec: C,
}

impl HttpAccounting<JsonCodec> {
    /// Builds a JSON client for `config.base_url`.
    ///
    /// # Errors
    /// - [`AccountingError::InvalidBaseUrl`] if the URL doesn't parse or
    ///   can't take path segments (e.g. `mailto:`).
    /// - [`AccountingError::Request`] if the HTTP client can't be built.
    pub fn new(
        config: &HttpConfig,
        credentials: &Credentials,
    ) -> Result<Self, AccountingError> {
        Self::with_codec(config, credentials, JsonCodec)
    }
}

impl<C: Codec> HttpAccounting<C> {
    /// Builds a client that encodes bodies with `codec`.
    pub fn with_codec(
        config: &HttpConfig,
        credentials: &Credentials,
        codec: C,
    ) -> Result<Self, AccountingError> {
        let mut base = Url::parse(&config.base_url)
            .map_err(|e| AccountingError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(AccountingError::InvalidBaseUrl(config.base_url.clone()));
        }
        // Normalize so endpoint segments append instead of replacing the
        // last path component.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        tracing::debug!(base = %base, "accounting client created");

        Ok(Self {
            client,
            base,
            bearer: credentials.bearer(),
            codec,
        })
    }

    /// The normalized base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Builds `base/seg1/seg2/...`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AccountingError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| AccountingError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends one request and returns the raw response body.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, AccountingError> {
        let url = self.endpoint(segments)?;
        let endpoint = format!("{method} {}", url.path());

        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, &self.bearer)
            .header(ACCEPT, self.codec.content_type());
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, self.codec.content_type())
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%endpoint, status = status.as_u16(), "accounting call");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AccountingError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            return Err(AccountingError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl<C: Codec> Accounting for HttpAccounting<C> {
    async fn begin_view(&self, ad_id: &AdId) -> Result<(), AccountingError> {
        self.send(Method::POST, &["ads", ad_id.as_str(), "view"], None)
            .await
            .map(drop)
    }

    async fn confirm_view(&self, ad_id: &AdId) -> Result<(), AccountingError> {
        self.send(Method::POST, &["ads", ad_id.as_str(), "confirm"], None)
            .await
            .map(drop)
    }

    async fn cancel_view(&self, ad_id: &AdId) -> Result<(), AccountingError> {
        self.send(Method::POST, &["ads", ad_id.as_str(), "cancel"], None)
            .await
            .map(drop)
    }

    async fn update_balance(
        &self,
        user_id: &UserId,
        new_balance: Credits,
    ) -> Result<(), AccountingError> {
        let body = self.codec.encode(&BalanceUpdate {
            balance: new_balance,
        })?;
        self.send(
            Method::PUT,
            &["users", user_id.as_str(), "balance"],
            Some(body),
        )
        .await
        .map(drop)
    }

    async fn list_ads(&self) -> Result<Vec<Ad>, AccountingError> {
        let bytes = self.send(Method::GET, &["ads"], None).await?;
        Ok(self.codec.decode(&bytes)?)
    }

    async fn fetch_account(&self) -> Result<Account, AccountingError> {
        let bytes = self.send(Method::GET, &["users", "me"], None).await?;
        Ok(self.codec.decode(&bytes)?)
    }
}
