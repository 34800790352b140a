use std::fs;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};

use crate::command;
use crate::interface;
use crate::parser;

/// One advertised network from an `iwlist` scan. Fields a scan block never
/// mentioned stay absent, in memory and in the JSON dump alike.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption: Option<String>,
}

impl ScanRecord {
    pub fn is_empty(&self) -> bool {
        self.ssid.is_none()
            && self.channel.is_none()
            && self.signal.is_none()
            && self.encryption.is_none()
    }
}

/// Run one wireless scan and parse the advertised networks out of it.
pub fn scan_networks(iface: &str) -> Result<Vec<ScanRecord>> {
    interface::ensure_exists(iface)?;
    let text = command::output("iwlist", &[iface, "scan"])?;
    let records = parser::scan_cells(&text);
    info!("scan on {} found {} networks", iface, records.len());
    Ok(records)
}

/// Dump scan results to a JSON file and return the path written. With no
/// filename given, a timestamped default is used.
pub fn save_results(records: &[ScanRecord], filename: Option<String>) -> Result<String> {
    if records.is_empty() {
        bail!("no scan results to save");
    }

    let filename = match filename {
        Some(name) if !name.is_empty() => name,
        _ => dump_filename(chrono::Local::now().naive_local()),
    };

    let json = serde_json::to_string_pretty(records)?;
    fs::write(&filename, json).with_context(|| format!("failed to write {}", filename))?;
    info!("saved {} scan records to {}", records.len(), filename);
    Ok(filename)
}

fn dump_filename(now: NaiveDateTime) -> String {
    format!("wifi_scan_{}.json", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(ssid: &str) -> ScanRecord {
        ScanRecord {
            ssid: Some(ssid.to_string()),
            channel: Some("6".to_string()),
            signal: Some("70/70".to_string()),
            encryption: Some("Yes".to_string()),
        }
    }

    #[test]
    fn default_filename_is_timestamped() {
        let stamp = NaiveDate::from_ymd_opt(2026, 8, 8)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap();
        assert_eq!(dump_filename(stamp), "wifi_scan_20260808_143005.json");
    }

    #[test]
    fn saving_nothing_is_an_error() {
        assert!(save_results(&[], None).is_err());
    }

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let record = ScanRecord {
            ssid: Some("Home".to_string()),
            ..ScanRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({ "ssid": "Home" }));
    }

    #[test]
    fn saved_file_holds_the_exact_record_list() {
        let records = vec![record("Home"), record("Guest")];
        let path = std::env::temp_dir().join("wifimgr_save_test.json");
        let written = save_results(&records, Some(path.to_string_lossy().into_owned())).unwrap();

        let body = std::fs::read_to_string(&written).unwrap();
        let reloaded: Vec<ScanRecord> = serde_json::from_str(&body).unwrap();
        assert_eq!(reloaded, records);

        let _ = std::fs::remove_file(written);
    }
}
