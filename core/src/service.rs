//! # Scan Service
//!
//! Implements the "find the rigs" use case on top of the [`Scanner`].
//!
//! The service runs a scan, asks a [`HostLookup`] about every host that answered
//! and hands the raw results to a [`ResultRepository`]. Lookups and persistence
//! are best effort: their failures are logged and never fail the run.

use std::time::Duration;

use rigscan_common::config::ScanConfiguration;
use rigscan_common::error::ScanError;
use rigscan_common::lookup::{HostLookup, HostMetadata};
use rigscan_common::network::host::HostScanResult;
use rigscan_common::repository::ResultRepository;
use rigscan_common::scan::{ScanReport, ScanState};
use rigscan_common::warn;
use serde::Serialize;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::scanner::Scanner;

pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// A scan result with whatever the lookup knew about the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedHost {
    #[serde(flatten)]
    pub host: HostScanResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HostMetadata>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceReport {
    pub state: ScanState,
    pub hosts: Vec<EnrichedHost>,
    pub targets: usize,
    #[serde(with = "rigscan_common::scan::duration_ms")]
    pub elapsed: Duration,
}

impl ServiceReport {
    pub fn is_cancelled(&self) -> bool {
        self.state == ScanState::Cancelled
    }
}

/// Application Service for rig discovery.
pub struct ScanService {
    scanner: Scanner,
    lookup: Box<dyn HostLookup>,
    repository: Box<dyn ResultRepository>,
    lookup_timeout: Duration,
}

impl ScanService {
    pub fn new(
        scanner: Scanner,
        lookup: Box<dyn HostLookup>,
        repository: Box<dyn ResultRepository>,
    ) -> Self {
        Self {
            scanner,
            lookup,
            repository,
            lookup_timeout: LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    pub fn repository(&self) -> &dyn ResultRepository {
        self.repository.as_ref()
    }

    /// Executes a scan and enriches its results.
    ///
    /// 1. **Scanning**: delegated to the [`Scanner`]; its errors are returned as is.
    /// 2. **Enrichment**: one lookup per host, each under its own timeout.
    /// 3. **Persistence**: the raw results go to the repository.
    pub async fn run(
        &self,
        config: &ScanConfiguration,
        cancel: &CancellationToken,
    ) -> Result<ServiceReport, ScanError> {
        let report: ScanReport = self.scanner.scan(config, cancel).await?;

        let mut metadata = Vec::with_capacity(report.hosts.len());
        for host in &report.hosts {
            metadata.push(self.describe(host).await);
        }

        if let Err(e) = self.repository.store(&report.hosts).await {
            warn!("Could not store scan results: {e:#}");
        }

        let hosts = report
            .hosts
            .into_iter()
            .zip(metadata)
            .map(|(host, metadata)| EnrichedHost { host, metadata })
            .collect();

        Ok(ServiceReport {
            state: report.state,
            hosts,
            targets: report.targets,
            elapsed: report.elapsed,
        })
    }

    async fn describe(&self, host: &HostScanResult) -> Option<HostMetadata> {
        match timeout(self.lookup_timeout, self.lookup.lookup(host.ip_addr)).await {
            Ok(Ok(metadata)) => metadata,
            Ok(Err(e)) => {
                warn!("Lookup for {} failed: {e:#}", host.ip_addr);
                None
            }
            Err(_elapsed) => {
                warn!("Lookup for {} timed out", host.ip_addr);
                None
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
