//! The scan **orchestrator**.
//!
//! A run moves through `Expanding → Discovering → PortScanning → Completed`.
//! Each probing phase has its own semaphore: the discovery cap bounds reachability
//! probes, the port-scan cap bounds TCP connects across *all* hosts at once.
//! Port scanning only starts after discovery has fully drained.
//!
//! Cancellation is cooperative. The token is checked before every dispatch and at
//! the barrier between the phases; probes already in flight are allowed to finish.

use std::net::Ipv4Addr;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rigscan_common::config::ScanConfiguration;
use rigscan_common::error::{ProbeError, ScanAbortedError, ScanError};
use rigscan_common::network::host::HostScanResult;
use rigscan_common::network::target::expand_range;
use rigscan_common::scan::{ScanPhase, ScanProgress, ScanReport, ScanState};
use rigscan_common::{info, success};
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::probe::{PortProber, ReachabilityProber};

mod discovery;
mod pool;
mod port_scan;

use pool::PhaseEnd;

pub type ProgressCallback = Arc<dyn Fn(ScanProgress) + Send + Sync>;

pub struct Scanner {
    reachability: Arc<dyn ReachabilityProber>,
    ports: Arc<dyn PortProber>,
    on_progress: Option<ProgressCallback>,
    state: watch::Sender<ScanState>,
    /// One run at a time; a second caller waits for the first to finish.
    running: Mutex<()>,
}

impl Scanner {
    pub fn new(reachability: Arc<dyn ReachabilityProber>, ports: Arc<dyn PortProber>) -> Self {
        let (state, _) = watch::channel(ScanState::Idle);
        Self {
            reachability,
            ports,
            on_progress: None,
            state,
            running: Mutex::new(()),
        }
    }

    /// Called after every finished probe, from the task driving the scan.
    pub fn with_progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(ScanProgress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(on_progress));
        self
    }

    pub fn state(&self) -> ScanState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    /// Runs one scan.
    ///
    /// Cancellation is not an error: the report comes back with
    /// [`ScanState::Cancelled`] and every host discovered so far.
    pub async fn scan(
        &self,
        config: &ScanConfiguration,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let _running = self.running.lock().await;
        let started = Instant::now();

        self.transition(ScanState::Expanding);
        let targets = match prepare_targets(config) {
            Ok(targets) => targets,
            Err(e) => {
                self.transition(ScanState::Failed);
                return Err(e);
            }
        };
        let target_count = targets.len();
        let ports = config.normalized_ports();

        self.transition(ScanState::Discovering);
        info!(
            "Probing {} addresses, at most {} at a time",
            target_count, config.discovery_concurrency
        );
        let outcome = discovery::discover(
            Arc::clone(&self.reachability),
            targets,
            config.timeout,
            config.discovery_concurrency,
            cancel,
            |completed| self.report(ScanPhase::Discovery, completed, target_count),
        )
        .await;

        let mut hosts = outcome.collected;
        hosts.sort_unstable_by_key(|host| host.ip_addr);

        match outcome.end {
            PhaseEnd::Aborted(source) => {
                return Err(self.abort(ScanPhase::Discovery, source, hosts));
            }
            PhaseEnd::Cancelled => {
                return Ok(self.finish(ScanState::Cancelled, hosts, target_count, started));
            }
            PhaseEnd::Finished => {}
        }
        success!("{} of {} hosts responded", hosts.len(), target_count);

        if cancel.is_cancelled() {
            return Ok(self.finish(ScanState::Cancelled, hosts, target_count, started));
        }

        self.transition(ScanState::PortScanning);
        let mut jobs: Vec<(Ipv4Addr, u16)> = hosts
            .iter()
            .flat_map(|host| ports.iter().map(move |port| (host.ip_addr, *port)))
            .collect();
        if config.randomize_order {
            jobs.shuffle(&mut rand::rng());
        }
        let job_count = jobs.len();
        info!(
            "Probing {} ports on {} hosts, at most {} at a time",
            ports.len(),
            hosts.len(),
            config.port_concurrency
        );

        let outcome = port_scan::scan_ports(
            Arc::clone(&self.ports),
            jobs,
            config.port_timeout,
            config.port_concurrency,
            cancel,
            |completed| self.report(ScanPhase::PortScan, completed, job_count),
        )
        .await;

        for (addr, result) in outcome.collected {
            if let Ok(idx) = hosts.binary_search_by_key(&addr, |host| host.ip_addr) {
                hosts[idx].record(result);
            }
        }

        match outcome.end {
            PhaseEnd::Aborted(source) => Err(self.abort(ScanPhase::PortScan, source, hosts)),
            PhaseEnd::Cancelled => Ok(self.finish(ScanState::Cancelled, hosts, target_count, started)),
            PhaseEnd::Finished => Ok(self.finish(ScanState::Completed, hosts, target_count, started)),
        }
    }

    fn transition(&self, next: ScanState) {
        let previous = self.state.send_replace(next);
        debug_assert!(
            previous.can_transition_to(next),
            "illegal scan state change {previous:?} -> {next:?}"
        );
        debug!(from = ?previous, to = ?next, "Scan state changed");
    }

    fn report(&self, phase: ScanPhase, completed: usize, total: usize) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(ScanProgress {
                phase,
                completed,
                total,
            });
        }
    }

    fn finish(
        &self,
        state: ScanState,
        hosts: Vec<HostScanResult>,
        targets: usize,
        started: Instant,
    ) -> ScanReport {
        self.transition(state);
        if state == ScanState::Cancelled {
            info!("Scan cancelled, keeping {} discovered hosts", hosts.len());
        }
        ScanReport {
            state,
            hosts,
            targets,
            elapsed: started.elapsed(),
        }
    }

    fn abort(&self, phase: ScanPhase, source: ProbeError, partial: Vec<HostScanResult>) -> ScanError {
        self.transition(ScanState::Failed);
        rigscan_common::error!("Scan aborted during {phase}: {source}");
        ScanAbortedError {
            phase,
            source,
            partial,
        }
        .into()
    }
}

fn prepare_targets(config: &ScanConfiguration) -> Result<Vec<Ipv4Addr>, ScanError> {
    config.validate()?;
    let mut targets = expand_range(&config.range)?;
    if config.randomize_order {
        targets.shuffle(&mut rand::rng());
    }
    Ok(targets)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
