//! Core data types for portal responses, aggregate records, and errors.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One candidate registration returned for a PAN search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstinCandidate {
    pub gstin: String,
    #[serde(rename = "authStatus", default)]
    pub auth_status: Option<String>,
    #[serde(rename = "stateCd", default)]
    pub state_code: Option<String>,
}

/// Result of resolving a PAN: the raw portal response plus its candidates.
///
/// An empty candidate list is a valid negative answer, not an error.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub raw: Value,
    pub candidates: Vec<GstinCandidate>,
}

impl Resolution {
    /// Build from the raw PAN search response.
    pub fn from_raw(raw: Value) -> PortalResult<Self> {
        let candidates = match raw.get("gstinResList") {
            Some(Value::Array(items)) => items
                .iter()
                .cloned()
                .map(serde_json::from_value)
                .collect::<Result<Vec<GstinCandidate>, _>>()?,
            _ => Vec::new(),
        };
        Ok(Self { raw, candidates })
    }

    /// The candidate the workflow follows up on: always the first one.
    pub fn primary(&self) -> Option<&GstinCandidate> {
        self.candidates.first()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// A reporting period offered by the portal for a GSTIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialYear {
    /// Display label, e.g. "2023-2024".
    pub label: Option<String>,
    /// Opaque lookup value passed verbatim to the return-details call.
    pub value: Value,
}

impl FinancialYear {
    /// Key under which this year's return details are stored.
    pub fn key(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Typed view over the financial-year dropdown response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancialYearList {
    pub status: Option<i64>,
    pub years: Vec<FinancialYear>,
}

impl FinancialYearList {
    /// Status value the portal uses to signal that `data` is populated.
    pub const STATUS_DATA_PRESENT: i64 = 1;

    pub fn from_raw(raw: &Value) -> Self {
        let status = raw.get("status").and_then(Value::as_i64);
        let mut years = Vec::new();

        if let Some(Value::Array(items)) = raw.get("data") {
            for item in items {
                match item.get("value") {
                    Some(value) if !value.is_null() => years.push(FinancialYear {
                        label: item.get("text").and_then(Value::as_str).map(str::to_string),
                        value: value.clone(),
                    }),
                    _ => tracing::warn!("Skipping financial year without a lookup value: {item}"),
                }
            }
        }

        Self { status, years }
    }

    /// Only a status of 1 means the year list may be iterated.
    pub fn has_data(&self) -> bool {
        self.status == Some(Self::STATUS_DATA_PRESENT)
    }
}

/// Everything fetched for one GSTIN in the full-fetch flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstRecord {
    pub taxpayer_details: Value,
    pub goods_services: Value,
    pub financial_years: Value,
    pub return_details: BTreeMap<String, Value>,
}

impl GstRecord {
    /// File name used when persisting the record for a GSTIN.
    pub fn file_name(gstin: &str) -> String {
        format!("{gstin}_complete_data.json")
    }

    /// Write the record as pretty JSON into `dir`, returning the path written.
    pub fn save(&self, dir: &Path, gstin: &str) -> PortalResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(Self::file_name(gstin));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

/// Which non-captcha record lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOperation {
    TaxpayerDetails,
    GoodsServices,
    FinancialYears,
    ReturnDetails,
}

impl fmt::Display for DetailOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetailOperation::TaxpayerDetails => "taxpayer details",
            DetailOperation::GoodsServices => "goods and services",
            DetailOperation::FinancialYears => "financial years",
            DetailOperation::ReturnDetails => "return details",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while talking to the portal.
#[derive(thiserror::Error, Debug)]
pub enum PortalError {
    #[error("Failed to initialize session. Status code: {status}")]
    SessionInit { status: u16 },

    #[error("Failed to get captcha. Status code: {status}")]
    CaptchaFetch { status: u16 },

    #[error("Failed to get GST details. Status code: {status}")]
    Resolve { status: u16 },

    #[error("Failed to get {operation}. Status code: {status}")]
    DetailFetch {
        operation: DetailOperation,
        status: u16,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Captcha image error: {0}")]
    CaptchaImage(#[from] image::ImageError),

    #[error("No captcha challenge has been fetched for this session")]
    CaptchaUnavailable,

    #[error("Captcha solution does not belong to the current challenge")]
    StaleCaptcha,

    #[error("Invalid PAN: {0}")]
    InvalidPan(String),

    #[error("Invalid GSTIN: {0}")]
    InvalidGstin(String),

    #[error("Captcha solver failed: {0}")]
    Solver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl PortalError {
    /// HTTP status carried by the portal status errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            PortalError::SessionInit { status }
            | PortalError::CaptchaFetch { status }
            | PortalError::Resolve { status }
            | PortalError::DetailFetch { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience result type.
pub type PortalResult<T> = Result<T, PortalError>;
