use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use log::warn;

use wifimgr::{diagnostics, display, interface, monitor, scan};

#[derive(Parser, Debug)]
#[command(
    name = "wifimgr",
    version,
    about = "Wireless network interface management tool"
)]
struct Cli {
    /// Rename an interface
    #[arg(short = 'r', long, num_args = 2, value_names = ["INTERFACE", "NEW_NAME"])]
    rename: Option<Vec<String>>,

    /// Set interface to monitor mode
    #[arg(long, visible_alias = "mon", value_name = "INTERFACE")]
    monitor: Option<String>,

    /// Set interface to managed mode
    #[arg(long, visible_alias = "man", value_name = "INTERFACE")]
    managed: Option<String>,

    /// List available interfaces
    #[arg(short = 'l', long)]
    list: bool,

    /// Show detailed interface information
    #[arg(short = 'i', long, value_name = "INTERFACE")]
    info: Option<String>,

    /// Scan available networks
    #[arg(short = 's', long, value_name = "INTERFACE")]
    scan: Option<String>,

    /// Save scan results to a JSON file (timestamped name when omitted)
    #[arg(
        long = "save-scan",
        visible_alias = "save",
        value_name = "FILENAME",
        num_args = 0..=1
    )]
    save_scan: Option<Option<String>>,

    /// Start real-time network monitoring
    #[arg(long, visible_alias = "rt", value_name = "INTERFACE")]
    realtime: Option<String>,

    /// Analyze network security settings
    #[arg(long, visible_alias = "sec", value_name = "INTERFACE")]
    security: Option<String>,

    /// Diagnose connection issues
    #[arg(short = 'd', long, value_name = "INTERFACE")]
    diagnose: Option<String>,
}

/// Interface transition applied during this invocation, kept so an
/// interrupt or failure can fall back to managed mode.
#[derive(Debug, Default)]
struct Session {
    original_interface: Option<String>,
    current_interface: Option<String>,
}

impl Session {
    /// Best-effort compensating action: only fires when a monitor-mode
    /// transition completed, and never escalates its own failure.
    fn restore_original(&self) {
        let (Some(_), Some(current)) = (&self.original_interface, &self.current_interface) else {
            return;
        };
        match interface::set_managed_mode(current) {
            Ok(restored) => println!(
                "{}",
                format!("Interface {} restored to managed mode", restored).green()
            ),
            Err(err) => warn!("could not restore {}: {:#}", current, err),
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if std::env::args().len() == 1 {
        display::banner();
        let _ = Cli::command().print_help();
        println!();
        return;
    }

    if !is_root() {
        warn!("not running as root; interface changes will likely be refused");
    }

    let session = Arc::new(Mutex::new(Session::default()));
    let shutdown = Arc::new(AtomicBool::new(false));

    let handler_session = session.clone();
    let handler_shutdown = shutdown.clone();
    let realtime_active = cli.realtime.is_some();
    if let Err(err) = ctrlc::set_handler(move || {
        handler_shutdown.store(true, Ordering::SeqCst);
        if realtime_active {
            println!("\n{}", "Monitoring stopped".yellow());
        } else {
            println!("\n{}", "Operation interrupted by user".yellow());
            if let Ok(session) = handler_session.lock() {
                session.restore_original();
            }
            process::exit(0);
        }
    }) {
        warn!("could not install SIGINT handler: {}", err);
    }

    if let Err(err) = dispatch(&cli, &session, shutdown).await {
        eprintln!("{}", format!("Error: {:#}", err).red());
        if let Ok(session) = session.lock() {
            session.restore_original();
        }
        process::exit(1);
    }
}

async fn dispatch(cli: &Cli, session: &Mutex<Session>, shutdown: Arc<AtomicBool>) -> Result<()> {
    if let Some([iface, new_name]) = cli.rename.as_deref() {
        let renamed = interface::rename(iface, new_name)?;
        if let Ok(mut session) = session.lock() {
            session.current_interface = Some(renamed.clone());
        }
        display::banner();
        println!(
            "{}{}{}{}",
            "Interface ".green(),
            iface.bright_cyan(),
            " has been renamed to ".green(),
            renamed.bright_cyan()
        );
    } else if let Some(iface) = cli.monitor.as_deref() {
        if let Ok(mut session) = session.lock() {
            session.original_interface = Some(iface.to_string());
        }
        let monitor_name = interface::set_monitor_mode(iface)?;
        if let Ok(mut session) = session.lock() {
            session.current_interface = Some(monitor_name.clone());
        }
        display::banner();
        println!(
            "{}{}{}",
            "Interface ".green(),
            monitor_name.bright_cyan(),
            " is now in monitor mode".green()
        );
    } else if let Some(iface) = cli.managed.as_deref() {
        let restored = interface::set_managed_mode(iface)?;
        if let Ok(mut session) = session.lock() {
            session.current_interface = Some(restored.clone());
        }
        display::banner();
        println!(
            "{}{}{}",
            "Interface ".green(),
            restored.bright_cyan(),
            " is now in managed mode".green()
        );
    } else if cli.list {
        let lines = interface::list()?;
        display::banner();
        display::print_interface_list(&lines);
    } else if let Some(iface) = cli.info.as_deref() {
        let info = interface::info(iface)?;
        display::banner();
        display::print_interface_info(&info);
    } else if let Some(iface) = cli.scan.as_deref() {
        println!(
            "{}",
            "Scanning for networks... This may take a few seconds.".yellow()
        );
        let records = scan::scan_networks(iface)?;
        display::banner();
        display::print_scan_results(&records);
        if let Some(filename) = &cli.save_scan {
            let path = scan::save_results(&records, filename.clone())?;
            println!("{}{}", "Scan results saved to ".green(), path.bright_cyan());
        }
    } else if let Some(iface) = cli.realtime.as_deref() {
        interface::ensure_exists(iface)?;
        display::banner();
        println!(
            "{}{}{}",
            "Starting real-time monitoring on ".yellow(),
            iface.bright_cyan(),
            "...".yellow()
        );
        println!("{}", "Press Ctrl+C to stop monitoring".yellow());
        monitor::run(iface, shutdown).await?;
    } else if let Some(iface) = cli.security.as_deref() {
        let report = diagnostics::analyze_security(iface)?;
        display::banner();
        display::print_security_report(iface, &report);
    } else if let Some(iface) = cli.diagnose.as_deref() {
        let diagnosis = diagnostics::diagnose(iface)?;
        display::banner();
        display::print_diagnosis(iface, &diagnosis);
    } else {
        display::banner();
        Cli::command().print_help()?;
        println!();
    }

    Ok(())
}

#[cfg(unix)]
fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rename_takes_interface_and_new_name() {
        let cli = Cli::parse_from(["wifimgr", "--rename", "wlan0", "lab0"]);
        assert_eq!(
            cli.rename.as_deref(),
            Some(&["wlan0".to_string(), "lab0".to_string()][..])
        );
    }

    #[test]
    fn action_aliases_parse() {
        let cli = Cli::parse_from(["wifimgr", "--mon", "wlan0"]);
        assert_eq!(cli.monitor.as_deref(), Some("wlan0"));
        let cli = Cli::parse_from(["wifimgr", "--rt", "wlan0"]);
        assert_eq!(cli.realtime.as_deref(), Some("wlan0"));
        let cli = Cli::parse_from(["wifimgr", "--sec", "wlan0"]);
        assert_eq!(cli.security.as_deref(), Some("wlan0"));
    }

    #[test]
    fn save_scan_value_is_optional() {
        let cli = Cli::parse_from(["wifimgr", "-s", "wlan0", "--save-scan"]);
        assert_eq!(cli.save_scan, Some(None));
        let cli = Cli::parse_from(["wifimgr", "-s", "wlan0", "--save-scan", "out.json"]);
        assert_eq!(cli.save_scan, Some(Some("out.json".to_string())));
    }
}
