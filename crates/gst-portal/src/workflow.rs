//! End-to-end flows: resolve a PAN, fetch everything for a GSTIN.
//!
//! Each flow runs its calls strictly in order and stops at the first
//! failure. Errors reach the caller unchanged.

use std::collections::BTreeMap;

use crate::captcha::CaptchaSolution;
use crate::config::PortalConfig;
use crate::identifiers::{Gstin, Pan};
use crate::session::PortalSession;
use crate::solver::CaptchaSolver;
use crate::types::{FinancialYearList, GstRecord, GstinCandidate, PortalResult, Resolution};

/// Outcome of resolving a PAN and following up on its first registration.
#[derive(Debug, Clone)]
pub enum PanLookup {
    /// The portal knows no GSTIN for this PAN.
    NotRegistered(Resolution),
    Found {
        candidate: GstinCandidate,
        record: GstRecord,
    },
}

/// Drives a [`PortalSession`] through the supported flows.
pub struct Workflow {
    session: PortalSession,
    solver: Box<dyn CaptchaSolver>,
}

impl Workflow {
    pub fn new(config: PortalConfig, solver: Box<dyn CaptchaSolver>) -> PortalResult<Self> {
        Ok(Self::with_session(PortalSession::new(config)?, solver))
    }

    pub fn with_session(session: PortalSession, solver: Box<dyn CaptchaSolver>) -> Self {
        Self { session, solver }
    }

    pub fn session(&self) -> &PortalSession {
        &self.session
    }

    /// Initialize, fetch a challenge, and get it solved.
    async fn open_gate(&mut self) -> PortalResult<CaptchaSolution> {
        self.session.initialize().await?;
        let challenge = self.session.fetch_challenge().await?;
        let text = self.solver.solve(challenge).await?;
        self.session.bind_solution(text)
    }

    /// Resolve-only flow.
    pub async fn resolve_pan(&mut self, pan: &Pan) -> PortalResult<Resolution> {
        tracing::info!("Looking up GSTIN for PAN: {pan}");
        let solution = self.open_gate().await?;
        self.session.resolve(pan, solution).await
    }

    /// Full-fetch flow for one GSTIN.
    pub async fn fetch_complete(&mut self, gstin: &Gstin) -> PortalResult<GstRecord> {
        tracing::info!("Fetching complete GST data for GSTIN: {gstin}");
        let solution = self.open_gate().await?;

        let taxpayer_details = self.session.fetch_taxpayer_details(gstin, solution).await?;
        let goods_services = self.session.fetch_goods_services(gstin).await?;
        let financial_years = self.session.fetch_financial_years(gstin).await?;

        let mut return_details = BTreeMap::new();
        let years = FinancialYearList::from_raw(&financial_years);
        if years.has_data() {
            for year in &years.years {
                let details = self.session.fetch_return_details(gstin, &year.value).await?;
                return_details.insert(year.key(), details);
            }
        } else {
            tracing::info!("No financial year data for {gstin}; skipping return details");
        }

        Ok(GstRecord {
            taxpayer_details,
            goods_services,
            financial_years,
            return_details,
        })
    }

    /// Resolve a PAN, then fetch everything for its first GSTIN.
    pub async fn lookup(&mut self, pan: &Pan) -> PortalResult<PanLookup> {
        let resolution = self.resolve_pan(pan).await?;
        let Some(candidate) = resolution.primary().cloned() else {
            tracing::info!("No GSTIN details found for PAN {pan}");
            return Ok(PanLookup::NotRegistered(resolution));
        };

        // Taken as the portal reported it; local format rules only gate user input.
        let gstin = Gstin::from_portal(&candidate.gstin);
        let record = self.fetch_complete(&gstin).await?;
        Ok(PanLookup::Found { candidate, record })
    }
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
