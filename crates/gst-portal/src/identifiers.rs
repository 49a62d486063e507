//! PAN and GSTIN identifier types with format validation.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::PortalError;

fn pan_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("valid PAN regex"))
}

fn gstin_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("valid GSTIN regex")
    })
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

/// Permanent account number of a taxpayer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pan(String);

impl Pan {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pan {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = normalize(s);
        if pan_pattern().is_match(&value) {
            Ok(Self(value))
        } else {
            Err(PortalError::InvalidPan(s.to_string()))
        }
    }
}

impl TryFrom<String> for Pan {
    type Error = PortalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pan> for String {
    fn from(pan: Pan) -> Self {
        pan.0
    }
}

impl fmt::Display for Pan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// GST registration identifier: state code + PAN + entity, check characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gstin(String);

impl Gstin {
    /// Wrap an identifier the portal itself returned, without format checks.
    pub(crate) fn from_portal(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-digit code of the issuing state.
    pub fn state_code(&self) -> &str {
        self.0.get(..2).unwrap_or("")
    }

    /// The PAN embedded in characters 3..=12, when it is well formed.
    pub fn pan(&self) -> Option<Pan> {
        self.0.get(2..12).and_then(|s| s.parse().ok())
    }
}

impl FromStr for Gstin {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = normalize(s);
        if gstin_pattern().is_match(&value) {
            Ok(Self(value))
        } else {
            Err(PortalError::InvalidGstin(s.to_string()))
        }
    }
}

impl TryFrom<String> for Gstin {
    type Error = PortalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Gstin> for String {
    fn from(gstin: Gstin) -> Self {
        gstin.0
    }
}

impl fmt::Display for Gstin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pan() {
        let pan: Pan = "AABFS0153K".parse().unwrap();
        assert_eq!(pan.as_str(), "AABFS0153K");
    }

    #[test]
    fn test_pan_is_normalized() {
        let pan: Pan = "  aabfs0153k ".parse().unwrap();
        assert_eq!(pan.to_string(), "AABFS0153K");
    }

    #[test]
    fn test_invalid_pan() {
        assert!(matches!("AABF0153K".parse::<Pan>(), Err(PortalError::InvalidPan(_))));
        assert!("AABFS01534".parse::<Pan>().is_err());
        assert!("".parse::<Pan>().is_err());
    }

    #[test]
    fn test_valid_gstin() {
        let gstin: Gstin = "27AAAAA0000A1Z5".parse().unwrap();
        assert_eq!(gstin.state_code(), "27");
        assert_eq!(gstin.pan().unwrap().as_str(), "AAAAA0000A");
    }

    #[test]
    fn test_portal_gstin_is_taken_verbatim() {
        let gstin = Gstin::from_portal(" 27AAAAA0000A1X5 ");
        assert_eq!(gstin.as_str(), "27AAAAA0000A1X5");
        assert_eq!(gstin.state_code(), "27");

        let short = Gstin::from_portal("2");
        assert_eq!(short.state_code(), "");
        assert!(short.pan().is_none());
    }

    #[test]
    fn test_invalid_gstin() {
        // Entity code cannot be zero.
        assert!("27AAAAA0000A0Z5".parse::<Gstin>().is_err());
        // 14th character is always Z.
        assert!("27AAAAA0000A1X5".parse::<Gstin>().is_err());
        assert!(matches!("AABFS0153K".parse::<Gstin>(), Err(PortalError::InvalidGstin(_))));
    }

    #[test]
    fn test_serde_validates() {
        let ok: Gstin = serde_json::from_str("\"27AAAAA0000A1Z5\"").unwrap();
        assert_eq!(ok.as_str(), "27AAAAA0000A1Z5");
        assert!(serde_json::from_str::<Pan>("\"nope\"").is_err());
    }
}
