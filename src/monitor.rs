use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, error};

use crate::command;
use crate::display;
use crate::parser;

const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Everything the monitor remembers between ticks. Both collections are
/// replaced wholesale by each tick's snapshot, so deltas are always
/// relative to the previous tick only.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub known_networks: HashSet<String>,
    pub connected_clients: HashMap<String, Vec<String>>,
}

/// What one tick observed that the previous tick had not.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub new_networks: Vec<String>,
    pub new_clients: Vec<(String, Vec<String>)>,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        self.new_networks.is_empty() && self.new_clients.is_empty()
    }
}

/// Fold one tick's snapshots into the state and report what changed.
///
/// A `None` snapshot means that phase failed this tick; the previous
/// snapshot is kept so the failure cannot masquerade as "everything is
/// new" on the next successful tick. Deltas are sorted for stable output.
pub fn advance(
    state: MonitorState,
    networks: Option<HashSet<String>>,
    clients: Option<HashMap<String, Vec<String>>>,
) -> (MonitorState, TickReport) {
    let mut next = state;
    let mut report = TickReport::default();

    if let Some(current) = networks {
        let mut fresh: Vec<String> = current
            .difference(&next.known_networks)
            .cloned()
            .collect();
        fresh.sort();
        report.new_networks = fresh;
        next.known_networks = current;
    }

    if let Some(current) = clients {
        let mut fresh: Vec<(String, Vec<String>)> = current
            .iter()
            .filter(|(ip, _)| !next.connected_clients.contains_key(*ip))
            .map(|(ip, macs)| (ip.clone(), macs.clone()))
            .collect();
        fresh.sort();
        report.new_clients = fresh;
        next.connected_clients = current;
    }

    (next, report)
}

/// Poll for newly visible networks and ARP clients until the shutdown
/// token flips. A failing phase is logged and skipped; the loop keeps
/// going. The token is checked once per tick, so a SIGINT lets at most
/// one in-flight tick finish before the loop exits.
pub async fn run(iface: &str, shutdown: Arc<AtomicBool>) -> Result<()> {
    let mut state = MonitorState::default();

    while !shutdown.load(Ordering::SeqCst) {
        let networks = match command::output("iwlist", &[iface, "scan"]) {
            Ok(text) => Some(parser::scan_ssids(&text)),
            Err(err) => {
                error!("error scanning networks: {}", err);
                None
            }
        };

        let clients = match command::output("arp", &["-n"]) {
            Ok(text) => Some(parser::arp_clients(&text)),
            Err(err) => {
                error!("error getting client information: {}", err);
                None
            }
        };

        let (next, report) = advance(state, networks, clients);
        state = next;

        if report.is_quiet() {
            debug!(
                "tick: {} networks, {} clients, nothing new",
                state.known_networks.len(),
                state.connected_clients.len()
            );
        } else {
            display::print_tick_report(&report);
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn networks(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn clients(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(ip, macs)| {
                (
                    ip.to_string(),
                    macs.iter().map(|m| m.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn first_tick_reports_everything_as_new() {
        let (state, report) = advance(
            MonitorState::default(),
            Some(networks(&["Home", "Guest"])),
            Some(clients(&[("192.168.1.10", &["aa:bb:cc:dd:ee:ff"])])),
        );

        assert_eq!(report.new_networks, vec!["Guest", "Home"]);
        assert_eq!(
            report.new_clients,
            vec![(
                "192.168.1.10".to_string(),
                vec!["aa:bb:cc:dd:ee:ff".to_string()]
            )]
        );
        assert_eq!(state.known_networks.len(), 2);
    }

    #[test]
    fn unchanged_snapshots_report_nothing() {
        let snapshot = networks(&["Home"]);
        let table = clients(&[("192.168.1.10", &["aa:bb:cc:dd:ee:ff"])]);

        let (state, _) = advance(
            MonitorState::default(),
            Some(snapshot.clone()),
            Some(table.clone()),
        );
        let (_, report) = advance(state, Some(snapshot), Some(table));

        assert!(report.is_quiet());
    }

    #[test]
    fn new_clients_are_exactly_the_ips_absent_from_the_first_snapshot() {
        let first = clients(&[("192.168.1.10", &["aa:aa:aa:aa:aa:aa"])]);
        let second = clients(&[
            ("192.168.1.10", &["aa:aa:aa:aa:aa:aa"]),
            ("192.168.1.20", &["bb:bb:bb:bb:bb:bb", "cc:cc:cc:cc:cc:cc"]),
        ]);

        let (state, _) = advance(MonitorState::default(), None, Some(first));
        let (_, report) = advance(state, None, Some(second));

        assert_eq!(
            report.new_clients,
            vec![(
                "192.168.1.20".to_string(),
                vec![
                    "bb:bb:bb:bb:bb:bb".to_string(),
                    "cc:cc:cc:cc:cc:cc".to_string()
                ]
            )]
        );
    }

    #[test]
    fn state_is_replaced_wholesale_each_tick() {
        let (state, _) = advance(
            MonitorState::default(),
            Some(networks(&["Home", "Guest"])),
            None,
        );
        let (state, _) = advance(state, Some(networks(&["Home"])), None);

        // "Guest" dropped out of the snapshot, so it is no longer known
        // and would be reported again if it came back.
        let (_, report) = advance(state, Some(networks(&["Home", "Guest"])), None);
        assert_eq!(report.new_networks, vec!["Guest"]);
    }

    #[test]
    fn failed_phase_keeps_previous_snapshot() {
        let (state, _) = advance(
            MonitorState::default(),
            Some(networks(&["Home"])),
            Some(clients(&[("192.168.1.10", &["aa:aa:aa:aa:aa:aa"])])),
        );

        // Both phases fail: nothing reported, nothing forgotten.
        let (state, report) = advance(state, None, None);
        assert!(report.is_quiet());
        assert!(state.known_networks.contains("Home"));

        // Recovery tick with identical snapshots stays quiet.
        let (_, report) = advance(
            state,
            Some(networks(&["Home"])),
            Some(clients(&[("192.168.1.10", &["aa:aa:aa:aa:aa:aa"])])),
        );
        assert!(report.is_quiet());
    }
}
