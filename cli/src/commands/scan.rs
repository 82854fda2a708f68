use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::*;
use rigscan_common::config::Config;
use rigscan_common::error::{ScanAbortedError, ScanError};
use rigscan_common::lookup::HostLookup;
use rigscan_common::network::host::HostScanResult;
use rigscan_common::scan::ScanState;
use rigscan_common::{success, warn};
use rigscan_core::lookup::{NullLookup, ReverseDnsLookup};
use rigscan_core::network::tcp::TcpConnectProber;
use rigscan_core::probe;
use rigscan_core::repository::MemoryRepository;
use rigscan_core::scanner::Scanner;
use rigscan_core::service::{EnrichedHost, ScanService, ServiceReport};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info_span};

use crate::commands::ScanArgs;
use crate::mprint;
use crate::terminal::input::InputHandle;
use crate::terminal::{colors, format, print, spinner};

pub async fn scan(args: ScanArgs, cfg: &Config) -> anyhow::Result<()> {
    let config = args.to_configuration()?;
    let show_tip = !cfg.disable_input;

    let span = info_span!("scan", indicatif.pb_show = true);
    spinner::attach(&span, show_tip);

    let lookup: Box<dyn HostLookup> = if args.no_dns {
        Box::new(NullLookup)
    } else {
        Box::new(ReverseDnsLookup::new())
    };
    let scanner = Scanner::new(probe::default_prober(), Arc::new(TcpConnectProber))
        .with_progress(spinner::reporter(span.clone(), show_tip));
    let service = ScanService::new(scanner, lookup, Box::new(MemoryRepository::new()));

    let cancel = CancellationToken::new();
    let input = if cfg.disable_input {
        None
    } else {
        InputHandle::start(cancel.clone())
    };
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let result = service.run(&config, &cancel).instrument(span).await;

    ctrl_c.abort();
    drop(input);

    match result {
        Ok(report) if cfg.json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Ok(report) => {
            let stored: Vec<HostScanResult> = match service.repository().load().await {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Could not read back scan results: {e:#}");
                    report.hosts.iter().map(|h| h.host.clone()).collect()
                }
            };
            scan_ends(&report, &stored, cfg);
            Ok(())
        }
        Err(ScanError::Aborted(aborted)) => {
            if cfg.json {
                println!("{}", serde_json::to_string_pretty(&aborted_to_json(&aborted))?);
            } else if !aborted.partial.is_empty() {
                print::header("partial results", cfg.quiet);
                print_plain_hosts(&aborted.partial, cfg);
            }
            Err(aborted).context("scan stopped before it could finish")
        }
        Err(e) => Err(e).context(format!("cannot scan '{}'", config.range)),
    }
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Finishing early, waiting for probes in flight");
        cancel.cancel();
    }
}

/// The report of a failed run: what was found before the failure and why it stopped.
fn aborted_to_json(aborted: &ScanAbortedError) -> serde_json::Value {
    json!({
        "state": ScanState::Failed,
        "phase": aborted.phase,
        "error": aborted.to_string(),
        "hosts": aborted.partial,
    })
}

fn scan_ends(report: &ServiceReport, stored: &[HostScanResult], cfg: &Config) {
    if report.is_cancelled() {
        warn!("Scan cancelled, results are incomplete");
    }

    if report.hosts.is_empty() {
        no_hosts_found(cfg);
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("Rig Scan", cfg.quiet);
    print_hosts(&report.hosts, cfg);
    print_summary(report, stored, cfg);
}

fn no_hosts_found(cfg: &Config) {
    print::header("ZERO HOSTS RESPONDED", cfg.quiet);
    if cfg.quiet == 0 {
        print::no_results();
    }
}

fn print_hosts(hosts: &[EnrichedHost], cfg: &Config) {
    for (idx, host) in hosts.iter().enumerate() {
        match cfg.quiet {
            2 => print::host_line(&host.host.ip_addr.to_string(), &host.host.open_ports()),
            _ => print_host_tree(host, idx),
        }
        if idx + 1 != hosts.len() && cfg.quiet < 2 {
            mprint!();
        }
    }
}

fn print_plain_hosts(hosts: &[HostScanResult], cfg: &Config) {
    let enriched: Vec<EnrichedHost> = hosts
        .iter()
        .cloned()
        .map(|host| EnrichedHost {
            host,
            metadata: None,
        })
        .collect();
    print_hosts(&enriched, cfg);
}

fn print_host_tree(host: &EnrichedHost, idx: usize) {
    let name: String = host.host.ip_addr.to_string();
    let name: String = if format::is_suspect(host) {
        format!("{} {}", name, "⛏".color(colors::MINING))
    } else {
        name
    };
    print::host_tree(idx, &name, &format::host_to_details(host));
}

fn print_summary(report: &ServiceReport, stored: &[HostScanResult], cfg: &Config) {
    let output: String = summary_line(report, stored);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
            print::end_of_program();
        }
        1 => {
            mprint!();
            success!("{}", output)
        }
        _ => {}
    }
}

/// Host counts come from the stored results, the rig count from the enriched report.
fn summary_line(report: &ServiceReport, stored: &[HostScanResult]) -> String {
    let responsive: usize = stored.iter().filter(|host| host.has_open_ports()).count();
    let suspects: usize = report.hosts.iter().filter(|host| format::is_suspect(host)).count();

    let live: ColoredString = format!("{} live hosts", stored.len()).bold().green();
    let open: ColoredString = format!("{responsive} with open ports").bold();
    let rigs: ColoredString = format!("{suspects} suspected rigs")
        .bold()
        .color(colors::MINING);
    let total_time: ColoredString = format_elapsed(report.elapsed).bold().yellow();
    format!(
        "{}",
        format!("Scan Complete: {live}, {open}, {rigs} in {total_time}")
            .color(colors::TEXT_DEFAULT)
    )
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
