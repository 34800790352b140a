use colored::Colorize;

use crate::diagnostics::{Diagnosis, SecurityReport};
use crate::interface::InterfaceInfo;
use crate::monitor::TickReport;
use crate::scan::ScanRecord;

pub fn banner() {
    println!();
    println!("   {}", "((( o )))".bright_green());
    println!("       {}", "|".bright_green());
    println!(
        "       {}     {}",
        "|".bright_green(),
        "wifimgr".bright_yellow().bold()
    );
    println!(
        "      {}    {}",
        "/|\\".bright_green(),
        "wireless interface manager".yellow()
    );
    println!("     {}", "/ | \\".green());
    println!("    {}", "`--^--'".green());
    println!();
}

fn value(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("N/A")
}

pub fn print_interface_info(info: &InterfaceInfo) {
    println!(
        "{}{}{}",
        "Interface Information for ".yellow(),
        info.name.bright_cyan(),
        ":".yellow()
    );
    println!("{} {}", "Status:".green(), value(&info.status).white());
    println!("{} {}", "MAC Address:".green(), value(&info.mac).white());
    println!("{} {}", "Mode:".green(), info.mode.to_string().white());
    println!("{} {}", "Channel:".green(), value(&info.channel).white());
    println!("{} {}", "Frequency:".green(), value(&info.frequency).white());
    println!("{} {}", "Signal Level:".green(), value(&info.signal).white());
}

pub fn print_interface_list(lines: &[String]) {
    println!("{}", "Available network interfaces:".yellow());
    for line in lines {
        println!("{}", line);
    }
}

pub fn print_scan_results(records: &[ScanRecord]) {
    println!(
        "{}{}{}",
        "Found ".yellow(),
        records.len().to_string().bright_cyan(),
        " networks:".yellow()
    );
    for record in records {
        println!();
        println!("{} {}", "SSID:".green(), value(&record.ssid).white());
        println!("{} {}", "Channel:".green(), value(&record.channel).white());
        println!("{} {}", "Signal:".green(), value(&record.signal).white());
        println!(
            "{} {}",
            "Encryption:".green(),
            value(&record.encryption).white()
        );
    }
}

pub fn print_security_report(iface: &str, report: &SecurityReport) {
    println!(
        "{}{}{}",
        "Security settings for ".yellow(),
        iface.bright_cyan(),
        ":".yellow()
    );
    println!(
        "{} {}",
        "Encryption:".white(),
        value(&report.encryption).bright_cyan()
    );
    println!(
        "{} {}",
        "Authentication:".white(),
        value(&report.authentication).bright_cyan()
    );
    println!(
        "{} {}",
        "Power Management:".white(),
        value(&report.power_management).bright_cyan()
    );

    if report.issues.is_empty() {
        println!("\n{}", "No major security issues detected".green());
    } else {
        println!("\n{}", "Potential Security Issues:".red());
        for issue in &report.issues {
            println!("{}", format!("* {}", issue).red());
        }
    }
}

pub fn print_diagnosis(iface: &str, diagnosis: &Diagnosis) {
    println!(
        "{}{}{}",
        "Connection diagnosis for ".yellow(),
        iface.bright_cyan(),
        ":".yellow()
    );
    println!(
        "{} {}",
        "Interface Status:".green(),
        value(&diagnosis.status).bright_cyan()
    );
    println!(
        "{} {}",
        "Signal Strength:".green(),
        value(&diagnosis.signal).bright_cyan()
    );
    println!(
        "{} {}",
        "Link Quality:".green(),
        value(&diagnosis.quality).bright_cyan()
    );

    if diagnosis.issues.is_empty() {
        println!("\n{}", "No connection issues detected".green());
        return;
    }

    println!("\n{}", "Detected Issues:".red());
    for issue in &diagnosis.issues {
        println!("{}", format!("* {}", issue.description()).red());
    }

    println!("\n{}", "Recommended Actions:".yellow());
    for issue in &diagnosis.issues {
        for action in issue.recommendations(iface) {
            println!("{}", format!("* {}", action).white());
        }
    }
}

pub fn print_tick_report(report: &TickReport) {
    if !report.new_networks.is_empty() {
        println!("\n{}", "New networks detected:".green());
        for ssid in &report.new_networks {
            println!("{}", format!("* {}", ssid).bright_cyan());
        }
    }
    for (ip, macs) in &report.new_clients {
        println!("\n{}", "New client connected:".green());
        println!("{}", format!("IP: {}", ip).bright_cyan());
        println!("{}", format!("MAC: {}", macs.join(", ")).bright_cyan());
    }
}
