//! Security settings and connection health, read from the same tool
//! output the info command uses.

use anyhow::Result;

use crate::interface;
use crate::parser;

/// Signal levels below this (dBm) count as weak.
const WEAK_SIGNAL_DBM: i32 = -70;

/// Link quality numerators below this count as poor.
const POOR_QUALITY: i32 = 50;

#[derive(Debug, Clone)]
pub struct SecurityReport {
    pub encryption: Option<String>,
    pub authentication: Option<String>,
    pub power_management: Option<String>,
    pub issues: Vec<&'static str>,
}

/// Read the interface's security-related settings and flag the obvious
/// problems.
pub fn analyze_security(iface: &str) -> Result<SecurityReport> {
    interface::ensure_exists(iface)?;

    let text = interface::wireless_text(iface);
    let encryption = parser::encryption_key(&text);
    let power_management = parser::power_management(&text);

    Ok(SecurityReport {
        issues: security_issues(encryption.as_deref(), power_management.as_deref()),
        encryption,
        authentication: parser::auth_suites(&text),
        power_management,
    })
}

fn security_issues(encryption: Option<&str>, power_management: Option<&str>) -> Vec<&'static str> {
    let mut issues = Vec::new();
    if encryption == Some("off") {
        issues.push("No encryption enabled");
    }
    if power_management == Some("on") {
        issues.push("Power management is enabled (may affect performance)");
    }
    issues
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issue {
    InterfaceDown,
    WeakSignal,
    PoorLinkQuality,
}

impl Issue {
    pub fn description(&self) -> &'static str {
        match self {
            Issue::InterfaceDown => "Interface is not up",
            Issue::WeakSignal => "Signal strength is weak",
            Issue::PoorLinkQuality => "Link quality is poor",
        }
    }

    pub fn recommendations(&self, iface: &str) -> Vec<String> {
        match self {
            Issue::InterfaceDown => {
                vec![format!(
                    "Try bringing the interface up: sudo ip link set {} up",
                    iface
                )]
            }
            Issue::WeakSignal => vec![
                "Try moving closer to the access point".to_string(),
                "Check for physical obstacles".to_string(),
            ],
            Issue::PoorLinkQuality => vec![
                "Try changing the channel".to_string(),
                "Check for interference from other devices".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub status: Option<String>,
    pub signal: Option<String>,
    pub quality: Option<String>,
    pub issues: Vec<Issue>,
}

/// Check link state, signal strength and link quality, and classify what
/// looks wrong.
pub fn diagnose(iface: &str) -> Result<Diagnosis> {
    interface::ensure_exists(iface)?;

    let link = interface::link_text(iface);
    let wireless = interface::wireless_text(iface);

    let status = parser::link_state(&link);
    let signal = parser::signal_level(&wireless);
    let quality = parser::link_quality(&wireless);

    Ok(Diagnosis {
        issues: classify(status.as_deref(), signal.as_deref(), quality.as_deref()),
        status,
        signal,
        quality,
    })
}

fn classify(status: Option<&str>, signal: Option<&str>, quality: Option<&str>) -> Vec<Issue> {
    let mut issues = Vec::new();

    if status != Some("UP") {
        issues.push(Issue::InterfaceDown);
    }

    // "-45 dBm" -> -45
    let dbm = signal
        .and_then(|s| s.split_whitespace().next())
        .and_then(|n| n.parse::<i32>().ok());
    if matches!(dbm, Some(level) if level < WEAK_SIGNAL_DBM) {
        issues.push(Issue::WeakSignal);
    }

    // "30/70" -> 30
    let numerator = quality
        .and_then(|q| q.split('/').next())
        .and_then(|n| n.parse::<i32>().ok());
    if matches!(numerator, Some(value) if value < POOR_QUALITY) {
        issues.push(Issue::PoorLinkQuality);
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_interface_has_no_issues() {
        assert!(classify(Some("UP"), Some("-45 dBm"), Some("70/70")).is_empty());
    }

    #[test]
    fn down_interface_is_flagged() {
        let issues = classify(Some("DOWN"), Some("-45 dBm"), Some("70/70"));
        assert_eq!(issues, vec![Issue::InterfaceDown]);
    }

    #[test]
    fn missing_status_counts_as_down() {
        let issues = classify(None, None, None);
        assert_eq!(issues, vec![Issue::InterfaceDown]);
    }

    #[test]
    fn weak_signal_and_poor_quality_are_flagged() {
        let issues = classify(Some("UP"), Some("-82 dBm"), Some("30/70"));
        assert_eq!(issues, vec![Issue::WeakSignal, Issue::PoorLinkQuality]);
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert!(classify(Some("UP"), Some("-70 dBm"), Some("50/70")).is_empty());
    }

    #[test]
    fn open_network_and_power_save_are_reported() {
        let issues = security_issues(Some("off"), Some("on"));
        assert_eq!(
            issues,
            vec![
                "No encryption enabled",
                "Power management is enabled (may affect performance)",
            ]
        );
        assert!(security_issues(Some("on"), Some("off")).is_empty());
        assert!(security_issues(None, None).is_empty());
    }
}
