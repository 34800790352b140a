use std::fmt;

use anyhow::{bail, Result};
use log::{info, warn};

use crate::command::{self, Cmd};
use crate::parser;

/// Name an interface gets while in monitor mode.
pub const MONITOR_NAME: &str = "wim0mon";

/// Token stripped from the name when restoring managed mode.
pub const MONITOR_TOKEN: &str = "mon";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Managed,
    Monitor,
    Unknown,
}

impl Mode {
    pub fn parse(raw: &str) -> Mode {
        match raw.trim().to_ascii_lowercase().as_str() {
            "managed" => Mode::Managed,
            "monitor" => Mode::Monitor,
            _ => Mode::Unknown,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Managed => write!(f, "Managed"),
            Mode::Monitor => write!(f, "Monitor"),
            Mode::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Everything we can read about an interface, re-read fresh on each query.
#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    pub name: String,
    pub status: Option<String>,
    pub mac: Option<String>,
    pub mode: Mode,
    pub channel: Option<String>,
    pub frequency: Option<String>,
    pub signal: Option<String>,
}

/// True if the name currently resolves to a live device.
pub fn exists(iface: &str) -> bool {
    command::probe("ip", &["link", "show", iface])
}

/// Existence probe that turns a dead name into an error, used as the
/// guard in front of every destructive or inspecting operation.
pub fn ensure_exists(iface: &str) -> Result<()> {
    if !exists(iface) {
        bail!("interface {} not found", iface);
    }
    Ok(())
}

/// The exact command sequence for a managed -> monitor transition.
pub fn monitor_plan(iface: &str) -> Vec<Cmd> {
    vec![
        Cmd::new("ip", &["link", "set", iface, "down"]),
        Cmd::new("iw", &[iface, "set", "type", "monitor"]),
        Cmd::new("ip", &["link", "set", iface, "name", MONITOR_NAME]),
        Cmd::new("ip", &["link", "set", MONITOR_NAME, "up"]),
    ]
}

/// The exact command sequence for a monitor -> managed transition.
pub fn managed_plan(iface: &str) -> Vec<Cmd> {
    let restored = managed_name(iface);
    vec![
        Cmd::new("ip", &["link", "set", iface, "down"]),
        Cmd::new("iw", &[iface, "set", "type", "managed"]),
        Cmd::new("ip", &["link", "set", iface, "name", restored.as_str()]),
        Cmd::new("ip", &["link", "set", restored.as_str(), "up"]),
    ]
}

pub fn rename_plan(iface: &str, new_name: &str) -> Vec<Cmd> {
    vec![
        Cmd::new("ip", &["link", "set", iface, "down"]),
        Cmd::new("ip", &["link", "set", iface, "name", new_name]),
        Cmd::new("ip", &["link", "set", new_name, "up"]),
    ]
}

/// Name an interface goes back to when it leaves monitor mode: exactly one
/// occurrence of the monitor token is stripped.
pub fn managed_name(iface: &str) -> String {
    iface.replacen(MONITOR_TOKEN, "", 1)
}

/// Put the interface into monitor mode. Returns the name it now has.
///
/// The plan runs step by step; the first failing command aborts the rest
/// and leaves the device in whatever state the failed step produced.
/// There is no rollback.
pub fn set_monitor_mode(iface: &str) -> Result<String> {
    ensure_exists(iface)?;
    apply(&monitor_plan(iface))?;
    info!("{} is now {} in monitor mode", iface, MONITOR_NAME);
    Ok(MONITOR_NAME.to_string())
}

/// Put the interface back into managed mode. Returns the restored name.
pub fn set_managed_mode(iface: &str) -> Result<String> {
    ensure_exists(iface)?;
    let restored = managed_name(iface);
    apply(&managed_plan(iface))?;
    info!("{} is now {} in managed mode", iface, restored);
    Ok(restored)
}

/// Rename an interface to a caller-supplied name. Returns the new name.
pub fn rename(iface: &str, new_name: &str) -> Result<String> {
    ensure_exists(iface)?;
    apply(&rename_plan(iface, new_name))?;
    info!("{} renamed to {}", iface, new_name);
    Ok(new_name.to_string())
}

fn apply(plan: &[Cmd]) -> Result<()> {
    for cmd in plan {
        cmd.execute()?;
    }
    Ok(())
}

/// Read the interface's link and wireless details.
pub fn info(iface: &str) -> Result<InterfaceInfo> {
    ensure_exists(iface)?;

    let link = link_text(iface);
    let wireless = wireless_text(iface);

    Ok(InterfaceInfo {
        name: iface.to_string(),
        status: parser::link_state(&link),
        mac: parser::link_mac(&link),
        mode: parser::wireless_mode(&wireless)
            .map(|raw| Mode::parse(&raw))
            .unwrap_or(Mode::Unknown),
        channel: parser::wireless_channel(&wireless),
        frequency: parser::wireless_frequency(&wireless),
        signal: parser::signal_level(&wireless),
    })
}

/// All interface index lines from `ip link show`.
pub fn list() -> Result<Vec<String>> {
    let text = command::output("ip", &["link", "show"])?;
    Ok(parser::link_lines(&text))
}

/// `iwconfig` output for the interface, or empty when the tool rejects it
/// (wired interfaces have no wireless extensions).
pub(crate) fn wireless_text(iface: &str) -> String {
    match command::output("iwconfig", &[iface]) {
        Ok(text) => text,
        Err(err) => {
            warn!("iwconfig {}: {}", iface, err);
            String::new()
        }
    }
}

/// `ip link show` output for the interface, empty on failure.
pub(crate) fn link_text(iface: &str) -> String {
    match command::output("ip", &["link", "show", iface]) {
        Ok(text) => text,
        Err(err) => {
            warn!("ip link show {}: {}", iface, err);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_transition_is_four_ordered_commands() {
        let plan = monitor_plan("wlan0");
        let rendered: Vec<String> = plan.iter().map(|cmd| cmd.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "ip link set wlan0 down",
                "iw wlan0 set type monitor",
                "ip link set wlan0 name wim0mon",
                "ip link set wim0mon up",
            ]
        );
    }

    #[test]
    fn managed_transition_is_four_ordered_commands() {
        let plan = managed_plan("wim0mon");
        let rendered: Vec<String> = plan.iter().map(|cmd| cmd.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "ip link set wim0mon down",
                "iw wim0mon set type managed",
                "ip link set wim0mon name wim0",
                "ip link set wim0 up",
            ]
        );
    }

    #[test]
    fn rename_is_three_ordered_commands() {
        let plan = rename_plan("wlan0", "lab0");
        let rendered: Vec<String> = plan.iter().map(|cmd| cmd.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "ip link set wlan0 down",
                "ip link set wlan0 name lab0",
                "ip link set lab0 up",
            ]
        );
    }

    #[test]
    fn managed_name_strips_one_token_occurrence() {
        assert_eq!(managed_name("wim0mon"), "wim0");
        assert_eq!(managed_name("monmon0"), "mon0");
        assert_eq!(managed_name("wlan0"), "wlan0");
    }

    #[test]
    fn mode_parsing() {
        assert_eq!(Mode::parse("Managed"), Mode::Managed);
        assert_eq!(Mode::parse("monitor"), Mode::Monitor);
        assert_eq!(Mode::parse("Master"), Mode::Unknown);
        assert_eq!(Mode::parse(""), Mode::Unknown);
    }
}
