//! Per-request header sets.
//!
//! Every call builds its headers from scratch: the browser base set plus
//! the overrides of the endpoint being called. Only cookies carry over
//! between requests.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION,
    CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT,
};

use crate::config::{paths, PortalConfig};
use crate::types::PortalResult;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const ACCEPT_IMAGE: &str =
    "image/avif,image/jxl,image/webp,image/png,image/svg+xml,image/*;q=0.8,*/*;q=0.5";
const ACCEPT_JSON: &str = "application/json, text/plain, */*";
const CONTENT_TYPE_JSON: &str = "application/json;charset=utf-8";

/// The portal endpoints this client calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    EntryPage,
    Captcha,
    PanSearch,
    TaxpayerDetails,
    GoodsServices,
    FinancialYears,
    ReturnDetails,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::EntryPage => paths::SEARCH_BY_PAN_PAGE,
            Endpoint::Captcha => paths::CAPTCHA,
            Endpoint::PanSearch => paths::PAN_SEARCH,
            Endpoint::TaxpayerDetails => paths::TAXPAYER_DETAILS,
            Endpoint::GoodsServices => paths::GOODS_SERVICES,
            Endpoint::FinancialYears => paths::FINANCIAL_YEARS,
            Endpoint::ReturnDetails => paths::RETURN_DETAILS,
        }
    }

    /// Whether the endpoint takes a JSON body.
    pub fn is_json_post(self) -> bool {
        matches!(
            self,
            Endpoint::PanSearch | Endpoint::TaxpayerDetails | Endpoint::ReturnDetails
        )
    }

    fn accept(self) -> &'static str {
        match self {
            Endpoint::EntryPage => ACCEPT_HTML,
            Endpoint::Captcha => ACCEPT_IMAGE,
            _ => ACCEPT_JSON,
        }
    }

    fn referer(self, config: &PortalConfig) -> PortalResult<String> {
        let referer = match self {
            Endpoint::EntryPage => format!("{}/", config.origin()),
            Endpoint::Captcha | Endpoint::PanSearch => {
                config.url(paths::SEARCH_BY_PAN_PAGE)?.to_string()
            }
            Endpoint::TaxpayerDetails
            | Endpoint::GoodsServices
            | Endpoint::FinancialYears
            | Endpoint::ReturnDetails => config.url(paths::SEARCH_TAXPAYER_PAGE)?.to_string(),
        };
        Ok(referer)
    }
}

/// Headers every request carries regardless of endpoint.
fn browser_headers(config: &PortalConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(ua) = HeaderValue::from_str(&config.user_agent) {
        headers.insert(USER_AGENT, ua);
    }
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(
        ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate, br, zstd"),
    );
    headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

/// Build the full header set for one call to `endpoint`.
pub fn request_headers(config: &PortalConfig, endpoint: Endpoint) -> PortalResult<HeaderMap> {
    let mut headers = browser_headers(config);
    headers.insert(ACCEPT, HeaderValue::from_static(endpoint.accept()));

    let referer = endpoint.referer(config)?;
    if let Ok(value) = HeaderValue::from_str(&referer) {
        headers.insert(REFERER, value);
    }

    if endpoint.is_json_post() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        if let Ok(origin) = HeaderValue::from_str(&config.origin()) {
            headers.insert(ORIGIN, origin);
        }
    }

    Ok(headers)
}
