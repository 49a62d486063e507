//! Console rendering and file output for fetched records.

use std::path::Path;

use gst_portal::summary::return_filings;
use gst_portal::{GstRecord, GstinCandidate, Resolution};

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

pub fn print_candidate(candidate: &GstinCandidate) {
    println!(
        "GSTIN found: {}, Auth Status: {}, State Code: {}",
        candidate.gstin,
        or_na(&candidate.auth_status),
        or_na(&candidate.state_code)
    );
}

pub fn print_candidates(resolution: &Resolution) {
    if resolution.is_empty() {
        println!("No GSTIN details found.");
        return;
    }
    for candidate in &resolution.candidates {
        print_candidate(candidate);
    }
}

pub fn print_record(record: &GstRecord) {
    let summary = record.summary();
    println!("\n=== Taxpayer Details ===");
    println!("Legal Name: {}", or_na(&summary.legal_name));
    println!("Trade Name: {}", or_na(&summary.trade_name));
    println!("Status: {}", or_na(&summary.status));
    println!("Constitution of Business: {}", or_na(&summary.constitution));
    println!("Registration Date: {}", or_na(&summary.registration_date));
    println!("Address: {}", or_na(&summary.address));

    println!("\n=== Goods and Services ===");
    for line in record.goods_lines() {
        println!(
            "HSN Code: {} - {}",
            or_na(&line.hsn_code),
            or_na(&line.description)
        );
    }

    println!("\n=== Return Filing Details ===");
    for (year, details) in &record.return_details {
        println!("\nFinancial Year: {year}");
        let filings = return_filings(details);
        if filings.is_empty() {
            println!("No return filing data available");
            continue;
        }
        for filing in filings {
            println!(
                "Period: {} {}, Type: {}, Status: {}, Filed on: {}",
                or_na(&filing.period),
                or_na(&filing.fy),
                or_na(&filing.return_type),
                or_na(&filing.status),
                or_na(&filing.filed_on)
            );
        }
    }
}

/// Print the record (summary or JSON) and save it under `dir`.
pub fn emit_record(gstin: &str, record: &GstRecord, dir: &Path, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        print_record(record);
    }

    let path = record.save(dir, gstin)?;
    tracing::info!("Complete data saved to {}", path.display());
    if !json {
        println!("\nComplete data saved to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_emit_record_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let record = GstRecord {
            taxpayer_details: json!({ "lgnm": "SAMPLE" }),
            goods_services: json!({ "bzgddtls": [] }),
            financial_years: json!({ "status": 1, "data": [] }),
            return_details: BTreeMap::from([("2023-24".to_string(), json!({ "filingStatus": [[]] }))]),
        };
        emit_record("27AAAAA0000A1Z5", &record, dir.path(), false).unwrap();
        let written = dir.path().join("27AAAAA0000A1Z5_complete_data.json");
        assert!(written.exists());
    }

    #[test]
    fn test_or_na() {
        assert_eq!(or_na(&None), "N/A");
        assert_eq!(or_na(&Some("Active".to_string())), "Active");
    }
}
