//! Text parsers for the system tools this program shells out to.
//!
//! Each parser takes one captured stdout blob and extracts fields by
//! locating marker substrings and slicing around fixed delimiters
//! (quotes, colons, equals signs, whitespace). A missing marker yields a
//! missing field, never an error. The formats are whatever `ip`, `iwconfig`,
//! `iwlist` and `arp` print on the host, so this is inherently tied to
//! their output conventions.

use std::collections::{HashMap, HashSet};

use crate::scan::ScanRecord;

/// `state UP` / `state DOWN` from `ip link show`.
pub fn link_state(text: &str) -> Option<String> {
    token_after(text, "state ")
}

/// MAC address from the `link/ether` line of `ip link show`.
pub fn link_mac(text: &str) -> Option<String> {
    token_after(text, "link/ether ")
}

/// Interface index lines (`3: wlan0: <BROADCAST,...>`) from `ip link show`.
pub fn link_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| {
            let head = line.split(':').next().unwrap_or("");
            !head.is_empty() && head.len() < line.len() && head.bytes().all(|b| b.is_ascii_digit())
        })
        .map(str::to_string)
        .collect()
}

/// Operating mode from the `Mode:` field of `iwconfig`.
pub fn wireless_mode(text: &str) -> Option<String> {
    token_after(text, "Mode:")
}

/// Channel number following `Channel ` in `iwconfig` output.
pub fn wireless_channel(text: &str) -> Option<String> {
    digits_after(text, "Channel ")
}

/// `Frequency=2.437 GHz` -> `2.437 GHz`.
pub fn wireless_frequency(text: &str) -> Option<String> {
    let rest = &text[text.find("Frequency=")? + "Frequency=".len()..];
    let num: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if num.is_empty() || !rest[num.len()..].starts_with(" GHz") {
        return None;
    }
    Some(format!("{} GHz", num))
}

/// `Signal level=-45 dBm` -> `-45 dBm`.
pub fn signal_level(text: &str) -> Option<String> {
    let rest = &text[text.find("Signal level=")? + "Signal level=".len()..];
    let num: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    if num.is_empty() || !rest[num.len()..].starts_with(" dBm") {
        return None;
    }
    Some(format!("{} dBm", num))
}

/// `Link Quality=70/70` -> `70/70`.
pub fn link_quality(text: &str) -> Option<String> {
    let rest = &text[text.find("Link Quality=")? + "Link Quality=".len()..];
    let value: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '/')
        .collect();
    if value.contains('/') {
        Some(value)
    } else {
        None
    }
}

/// `Encryption key:off` -> `off`.
pub fn encryption_key(text: &str) -> Option<String> {
    lowercase_after(text, "Encryption key:")
}

/// `Power Management:on` -> `on`.
pub fn power_management(text: &str) -> Option<String> {
    lowercase_after(text, "Power Management:")
}

/// `Authentication Suites : PSK` -> `PSK` (only some drivers print this).
pub fn auth_suites(text: &str) -> Option<String> {
    let rest = &text[text.find("Authentication Suites :")? + "Authentication Suites :".len()..];
    let value: String = rest
        .trim_start_matches(' ')
        .chars()
        .take_while(|c| c.is_ascii_uppercase())
        .collect();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Split `iwlist <iface> scan` output into per-network records.
///
/// Blocks are delimited by lines containing the literal `Cell`; within a
/// block each marker line fills one field, and a later matching line
/// overwrites an earlier one. Record order follows input order.
pub fn scan_cells(text: &str) -> Vec<ScanRecord> {
    let mut records = Vec::new();
    let mut current = ScanRecord::default();

    for line in text.lines() {
        if line.contains("Cell") {
            if !current.is_empty() {
                records.push(current);
            }
            current = ScanRecord::default();
        } else if line.contains("ESSID") {
            if let Some(ssid) = line.split('"').nth(1) {
                current.ssid = Some(ssid.to_string());
            }
        } else if line.contains("Channel") {
            if let Some(channel) = line.split(':').nth(1) {
                current.channel = Some(channel.trim().to_string());
            }
        } else if line.contains("Quality") {
            if let Some(signal) = line
                .split('=')
                .nth(1)
                .and_then(|rest| rest.split_whitespace().next())
            {
                current.signal = Some(signal.to_string());
            }
        } else if line.contains("Encryption key") {
            let encryption = if line.contains("on") { "Yes" } else { "No" };
            current.encryption = Some(encryption.to_string());
        }
    }

    if !current.is_empty() {
        records.push(current);
    }

    records
}

/// Every quoted ESSID in a scan dump. Used by the polling monitor, which
/// only cares about which networks are visible.
pub fn scan_ssids(text: &str) -> HashSet<String> {
    text.lines()
        .filter(|line| line.contains("ESSID"))
        .filter_map(|line| line.split('"').nth(1))
        .map(str::to_string)
        .collect()
}

/// `arp -n` table: IP address -> MAC addresses seen for it.
pub fn arp_clients(text: &str) -> HashMap<String, Vec<String>> {
    let mut clients: HashMap<String, Vec<String>> = HashMap::new();
    for line in text.lines().filter(|line| line.contains("ether")) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 3 {
            clients
                .entry(parts[0].to_string())
                .or_default()
                .push(parts[2].to_string());
        }
    }
    clients
}

fn token_after(text: &str, marker: &str) -> Option<String> {
    let rest = &text[text.find(marker)? + marker.len()..];
    let token = rest.split_whitespace().next()?;
    Some(token.to_string())
}

fn digits_after(text: &str, marker: &str) -> Option<String> {
    let rest = &text[text.find(marker)? + marker.len()..];
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

fn lowercase_after(text: &str, marker: &str) -> Option<String> {
    let rest = &text[text.find(marker)? + marker.len()..];
    let value: String = rest
        .chars()
        .take_while(|c| c.is_ascii_lowercase())
        .collect();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
