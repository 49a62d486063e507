//! Client for the GST taxpayer search portal — resolve a PAN to its GSTINs and
//! fetch the registration and return-filing records behind a captcha-gated session.

pub mod captcha;
pub mod config;
pub mod headers;
pub mod identifiers;
pub mod records;
pub mod resolver;
pub mod session;
pub mod solver;
pub mod summary;
pub mod types;
pub mod workflow;

pub use captcha::{CaptchaChallenge, CaptchaSolution};
pub use config::{PortalConfig, SolverConfig};
pub use identifiers::{Gstin, Pan};
pub use session::PortalSession;
pub use solver::{build_solver, CaptchaSolver, ConsoleSolver, FixedSolver, FnSolver};
pub use summary::{GoodsLine, ReturnFiling, TaxpayerSummary};
pub use workflow::{PanLookup, Workflow};
pub use types::*;
