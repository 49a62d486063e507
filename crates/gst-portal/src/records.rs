//! Registration record lookups for a resolved GSTIN.
//!
//! Only the taxpayer-details call is captcha-gated. The others ride on the
//! session cookies alone.

use serde_json::{json, Value};

use crate::captcha::CaptchaSolution;
use crate::headers::Endpoint;
use crate::identifiers::Gstin;
use crate::session::{json_or, PortalSession};
use crate::types::{DetailOperation, PortalError, PortalResult};

fn detail_error(operation: DetailOperation) -> impl FnOnce(u16) -> PortalError {
    move |status| PortalError::DetailFetch { operation, status }
}

impl PortalSession {
    /// Full taxpayer profile. A wrong captcha surfaces as a status error
    /// like any other failure.
    pub async fn fetch_taxpayer_details(
        &mut self,
        gstin: &Gstin,
        solution: CaptchaSolution,
    ) -> PortalResult<Value> {
        self.redeem(&solution)?;

        let payload = json!({ "gstin": gstin.as_str(), "captcha": solution.text() });
        let resp = self.post_json(Endpoint::TaxpayerDetails, &payload).await?;
        json_or(resp, detail_error(DetailOperation::TaxpayerDetails)).await
    }

    /// Goods and services the taxpayer deals in.
    pub async fn fetch_goods_services(&self, gstin: &Gstin) -> PortalResult<Value> {
        let resp = self
            .get(Endpoint::GoodsServices, &[("gstin", gstin.as_str())])
            .await?;
        json_or(resp, detail_error(DetailOperation::GoodsServices)).await
    }

    /// Financial years the portal has return data for.
    pub async fn fetch_financial_years(&self, gstin: &Gstin) -> PortalResult<Value> {
        let resp = self
            .get(Endpoint::FinancialYears, &[("gstin", gstin.as_str())])
            .await?;
        json_or(resp, detail_error(DetailOperation::FinancialYears)).await
    }

    /// Return filings for one financial year. `fy` must be a lookup value
    /// taken from [`fetch_financial_years`](Self::fetch_financial_years); it
    /// is sent exactly as the portal returned it.
    pub async fn fetch_return_details(&self, gstin: &Gstin, fy: &Value) -> PortalResult<Value> {
        let payload = json!({ "gstin": gstin.as_str(), "fy": fy });
        let resp = self.post_json(Endpoint::ReturnDetails, &payload).await?;
        json_or(resp, detail_error(DetailOperation::ReturnDetails)).await
    }
}
