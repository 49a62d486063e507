//! Typed views of the fields people usually want out of a [`GstRecord`].

use serde::Deserialize;
use serde_json::Value;

use crate::types::GstRecord;

/// Headline registration facts from the taxpayer-details response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaxpayerSummary {
    #[serde(rename = "lgnm")]
    pub legal_name: Option<String>,
    #[serde(rename = "tradeNam")]
    pub trade_name: Option<String>,
    #[serde(rename = "sts")]
    pub status: Option<String>,
    #[serde(rename = "ctb")]
    pub constitution: Option<String>,
    #[serde(rename = "rgdt")]
    pub registration_date: Option<String>,
    #[serde(skip)]
    pub address: Option<String>,
}

impl TaxpayerSummary {
    pub fn from_details(details: &Value) -> Self {
        let mut summary: Self = serde_json::from_value(details.clone()).unwrap_or_default();
        summary.address = details
            .pointer("/pradr/adr")
            .and_then(Value::as_str)
            .map(str::to_string);
        summary
    }
}

/// One HSN line from the goods-and-services response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoodsLine {
    #[serde(rename = "hsncd")]
    pub hsn_code: Option<String>,
    #[serde(rename = "gdes")]
    pub description: Option<String>,
}

/// One filed (or pending) return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReturnFiling {
    #[serde(rename = "taxp")]
    pub period: Option<String>,
    pub fy: Option<String>,
    #[serde(rename = "rtntype")]
    pub return_type: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "dof")]
    pub filed_on: Option<String>,
}

fn parse_list<T: for<'de> Deserialize<'de>>(items: Option<&Value>) -> Vec<T> {
    match items {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

pub fn goods_lines(goods_services: &Value) -> Vec<GoodsLine> {
    parse_list(goods_services.get("bzgddtls"))
}

/// Filings listed in the first `filingStatus` group of a year's details.
pub fn return_filings(return_details: &Value) -> Vec<ReturnFiling> {
    parse_list(return_details.pointer("/filingStatus/0"))
}

impl GstRecord {
    pub fn summary(&self) -> TaxpayerSummary {
        TaxpayerSummary::from_details(&self.taxpayer_details)
    }

    pub fn goods_lines(&self) -> Vec<GoodsLine> {
        goods_lines(&self.goods_services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_taxpayer_summary() {
        let details = json!({
            "lgnm": "ACME TRADERS",
            "tradeNam": "ACME",
            "sts": "Active",
            "ctb": "Partnership",
            "rgdt": "01/07/2017",
            "pradr": { "adr": "12 Market Road, Pune" },
            "nba": ["Retail Business"]
        });
        let summary = TaxpayerSummary::from_details(&details);
        assert_eq!(summary.legal_name.as_deref(), Some("ACME TRADERS"));
        assert_eq!(summary.constitution.as_deref(), Some("Partnership"));
        assert_eq!(summary.address.as_deref(), Some("12 Market Road, Pune"));
    }

    #[test]
    fn test_summary_tolerates_odd_shapes() {
        let summary = TaxpayerSummary::from_details(&json!({ "lgnm": 42 }));
        assert_eq!(summary, TaxpayerSummary::default());
        let summary = TaxpayerSummary::from_details(&json!(null));
        assert!(summary.address.is_none());
    }

    #[test]
    fn test_goods_lines() {
        let goods = json!({
            "bzgddtls": [
                { "hsncd": "8471", "gdes": "Computers" },
                { "hsncd": "8528" }
            ]
        });
        let lines = goods_lines(&goods);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].description.as_deref(), Some("Computers"));
        assert!(lines[1].description.is_none());
        assert!(goods_lines(&json!({})).is_empty());
    }

    #[test]
    fn test_return_filings_first_group_only() {
        let details = json!({
            "filingStatus": [
                [
                    { "taxp": "April", "fy": "2023-2024", "rtntype": "GSTR3B", "status": "Filed", "dof": "20/05/2023" }
                ],
                [
                    { "taxp": "May", "fy": "2023-2024", "rtntype": "GSTR1", "status": "Filed", "dof": "11/06/2023" }
                ]
            ]
        });
        let filings = return_filings(&details);
        assert_eq!(filings.len(), 1);
        assert_eq!(filings[0].return_type.as_deref(), Some("GSTR3B"));
        assert!(return_filings(&json!({ "filingStatus": [[]] })).is_empty());
        assert!(return_filings(&json!({})).is_empty());
    }
}
