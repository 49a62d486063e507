//! Session store: the cookie-bearing client and session lifecycle.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;

use crate::captcha::{CaptchaChallenge, CaptchaSolution};
use crate::config::PortalConfig;
use crate::headers::{request_headers, Endpoint};
use crate::types::{PortalError, PortalResult};

/// Holds the evolving session state for one workflow invocation.
///
/// Cookies live in a shared jar attached to the client so every request
/// sends what the portal set on earlier responses. Each `initialize` starts
/// a new epoch; captcha solutions from an earlier epoch are refused.
pub struct PortalSession {
    config: PortalConfig,
    client: Client,
    jar: Arc<Jar>,
    epoch: u64,
    next_challenge_id: u64,
    pub(crate) challenge: Option<CaptchaChallenge>,
}

impl PortalSession {
    /// Build a session with an empty cookie jar. No request is made yet.
    pub fn new(config: PortalConfig) -> PortalResult<Self> {
        let jar = Arc::new(Jar::default());
        let mut builder = Client::builder().cookie_provider(Arc::clone(&jar));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            config,
            client,
            jar,
            epoch: 0,
            next_challenge_id: 1,
            challenge: None,
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Number of times the session has been initialized.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Visit the search page so the portal issues its session cookies.
    ///
    /// Any held challenge is dropped before the request goes out, so a
    /// failed re-initialization cannot leave an answerable challenge behind.
    pub async fn initialize(&mut self) -> PortalResult<()> {
        self.challenge = None;
        let url = self.config.url(Endpoint::EntryPage.path())?;
        let headers = request_headers(&self.config, Endpoint::EntryPage)?;

        let resp = self.client.get(url).headers(headers).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PortalError::SessionInit {
                status: status.as_u16(),
            });
        }

        self.epoch += 1;
        tracing::info!("Portal session initialized (epoch {})", self.epoch);
        Ok(())
    }

    /// Value of a cookie the jar would send with the next portal request.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let url = self.config.url(Endpoint::EntryPage.path()).ok()?;
        let header = self.jar.cookies(&url)?;
        let header = header.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }

    pub(crate) fn allocate_challenge_id(&mut self) -> u64 {
        let id = self.next_challenge_id;
        self.next_challenge_id += 1;
        id
    }

    /// Pair `text` with the challenge currently held by this session.
    pub fn bind_solution(&self, text: impl Into<String>) -> PortalResult<CaptchaSolution> {
        let challenge = self
            .challenge
            .as_ref()
            .ok_or(PortalError::CaptchaUnavailable)?;
        Ok(CaptchaSolution::new(text.into(), challenge.epoch(), challenge.id()))
    }

    /// Consume the current challenge for a gated submission.
    ///
    /// Fails when the solution came from another epoch or challenge. A
    /// matching challenge is spent and cannot be redeemed twice.
    pub(crate) fn redeem(&mut self, solution: &CaptchaSolution) -> PortalResult<()> {
        let current = self.challenge.as_ref().is_some_and(|challenge| {
            challenge.epoch() == self.epoch
                && solution.epoch() == self.epoch
                && solution.challenge_id() == challenge.id()
        });
        if !current {
            return Err(PortalError::StaleCaptcha);
        }
        self.challenge = None;
        Ok(())
    }

    pub(crate) async fn get(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
    ) -> PortalResult<Response> {
        let url = self.config.url(endpoint.path())?;
        let headers = request_headers(&self.config, endpoint)?;
        tracing::debug!("GET {url} {query:?}");
        Ok(self.client.get(url).headers(headers).query(query).send().await?)
    }

    pub(crate) async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        payload: &T,
    ) -> PortalResult<Response> {
        let url = self.config.url(endpoint.path())?;
        let headers = request_headers(&self.config, endpoint)?;
        tracing::debug!("POST {url}");
        Ok(self
            .client
            .post(url)
            .headers(headers)
            .json(payload)
            .send()
            .await?)
    }
}

/// Check the status and decode a JSON body, mapping failure with `on_status`.
pub(crate) async fn json_or<F>(resp: Response, on_status: F) -> PortalResult<Value>
where
    F: FnOnce(u16) -> PortalError,
{
    let status = resp.status();
    if !status.is_success() {
        return Err(on_status(status.as_u16()));
    }
    Ok(resp.json::<Value>().await?)
}

impl std::fmt::Debug for PortalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalSession")
            .field("base_url", &self.config.base_url.as_str())
            .field("epoch", &self.epoch)
            .field("has_challenge", &self.challenge.is_some())
            .finish()
    }
}
