//! Portal configuration: endpoints, browser identity, and solver selection.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::types::PortalResult;

/// Production portal root.
pub const DEFAULT_BASE_URL: &str = "https://services.gst.gov.in";

/// Browser identity presented to the portal.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:138.0) Gecko/20100101 Firefox/138.0";

/// Where the console solver writes the challenge image.
pub const DEFAULT_CAPTCHA_PATH: &str = "captcha.png";

/// Name of the cookie carrying the session-bound captcha token.
pub const CAPTCHA_COOKIE: &str = "CaptchaCookie";

pub const ENV_BASE_URL: &str = "GST_PORTAL_URL";
pub const ENV_TIMEOUT_SECS: &str = "GST_PORTAL_TIMEOUT_SECS";
pub const ENV_CAPTCHA_PATH: &str = "GST_PORTAL_CAPTCHA_PATH";

/// Portal paths relative to the base URL.
pub mod paths {
    pub const SEARCH_BY_PAN_PAGE: &str = "/services/searchtpbypan";
    pub const SEARCH_TAXPAYER_PAGE: &str = "/services/searchtp";
    pub const CAPTCHA: &str = "/services/captcha";
    pub const PAN_SEARCH: &str = "/services/api/get/gstndtls";
    pub const TAXPAYER_DETAILS: &str = "/services/api/search/taxpayerDetails";
    pub const GOODS_SERVICES: &str = "/services/api/search/goodservice";
    pub const FINANCIAL_YEARS: &str = "/services/api/dropdownfinyear";
    pub const RETURN_DETAILS: &str = "/services/api/search/taxpayerReturnDetails";
}

/// Connection settings for one portal client.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub base_url: Url,
    pub user_agent: String,
    /// `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    pub captcha_path: PathBuf,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            captcha_path: PathBuf::from(DEFAULT_CAPTCHA_PATH),
        }
    }
}

impl PortalConfig {
    /// Config pointed at an arbitrary portal root (mirrors, test servers).
    pub fn with_base_url(base_url: &str) -> PortalResult<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            ..Self::default()
        })
    }

    /// Defaults overlaid with `GST_PORTAL_*` environment variables.
    pub fn from_env() -> PortalResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config.base_url = Url::parse(&url)?;
        }

        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            match secs.parse::<u64>() {
                Ok(secs) => config.timeout = Some(Duration::from_secs(secs)),
                Err(_) => tracing::warn!("Ignoring non-numeric {ENV_TIMEOUT_SECS}={secs}"),
            }
        }

        if let Ok(path) = std::env::var(ENV_CAPTCHA_PATH) {
            config.captcha_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Absolute URL for a portal path.
    pub fn url(&self, path: &str) -> PortalResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Portal root without a trailing slash, as browsers send in `Origin`.
    pub fn origin(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }
}

/// How captcha challenges get solved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SolverConfig {
    /// Save the image and prompt on the terminal.
    #[default]
    Console,
    /// Use a preconfigured answer.
    Fixed(String),
}
