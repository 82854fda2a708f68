use crate::network::host::HostScanResult;

/// Defines the contract for persisting the results of a scan run.
#[async_trait::async_trait]
pub trait ResultRepository: Send + Sync {
    /// Stores the hosts of one finished run, replacing nothing.
    async fn store(&self, hosts: &[HostScanResult]) -> anyhow::Result<()>;

    /// Everything stored so far, in insertion order.
    async fn load(&self) -> anyhow::Result<Vec<HostScanResult>>;
}
