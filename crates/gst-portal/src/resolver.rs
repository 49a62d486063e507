//! PAN to GSTIN resolution.

use serde_json::json;

use crate::captcha::CaptchaSolution;
use crate::headers::Endpoint;
use crate::identifiers::Pan;
use crate::session::{json_or, PortalSession};
use crate::types::{PortalError, PortalResult, Resolution};

impl PortalSession {
    /// Submit a PAN with the solved captcha and return every registration
    /// the portal lists for it.
    ///
    /// An empty list comes back as an empty [`Resolution`], not an error.
    pub async fn resolve(&mut self, pan: &Pan, solution: CaptchaSolution) -> PortalResult<Resolution> {
        self.redeem(&solution)?;

        let payload = json!({ "panNO": pan.as_str(), "captcha": solution.text() });
        let resp = self.post_json(Endpoint::PanSearch, &payload).await?;
        let raw = json_or(resp, |status| PortalError::Resolve { status }).await?;

        let resolution = Resolution::from_raw(raw)?;
        tracing::info!("PAN {pan} resolved to {} GSTIN(s)", resolution.candidates.len());
        Ok(resolution)
    }
}
