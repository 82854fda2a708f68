use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use rigscan_common::network::host::HostScanResult;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::pool::{self, PhaseOutcome};
use crate::probe::{Reachability, ReachabilityProber};

/// Probes every target once. Only responders are collected.
pub(super) async fn discover(
    prober: Arc<dyn ReachabilityProber>,
    targets: Vec<Ipv4Addr>,
    probe_timeout: Duration,
    limit: usize,
    cancel: &CancellationToken,
    on_progress: impl FnMut(usize),
) -> PhaseOutcome<HostScanResult> {
    let outcome = pool::run_bounded(targets, limit, cancel, on_progress, move |addr| {
        let prober = Arc::clone(&prober);
        async move {
            // a prober that ignores its timeout still gets cut off here
            match timeout(probe_timeout, prober.probe(addr, probe_timeout)).await {
                Ok(Ok(Reachability::Alive { rtt })) => {
                    Ok(Some(HostScanResult::new(addr).with_rtt(rtt.min(probe_timeout))))
                }
                Ok(Ok(Reachability::NoResponse)) | Err(_) => Ok(None),
                Ok(Err(e)) if e.is_fatal() => Err(e),
                Ok(Err(e)) => {
                    debug!(%addr, error = %e, "Discovery probe failed");
                    Ok(None)
                }
            }
        }
    })
    .await;

    PhaseOutcome {
        collected: outcome.collected.into_iter().flatten().collect(),
        end: outcome.end,
    }
}
