use std::sync::Mutex;

use anyhow::anyhow;
use rigscan_common::network::host::HostScanResult;
use rigscan_common::repository::ResultRepository;

/// Drops everything it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRepository;

#[async_trait::async_trait]
impl ResultRepository for NullRepository {
    async fn store(&self, _hosts: &[HostScanResult]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn load(&self) -> anyhow::Result<Vec<HostScanResult>> {
        Ok(Vec::new())
    }
}

/// Keeps results in process memory for the lifetime of the repository.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    hosts: Mutex<Vec<HostScanResult>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ResultRepository for MemoryRepository {
    async fn store(&self, hosts: &[HostScanResult]) -> anyhow::Result<()> {
        self.hosts
            .lock()
            .map_err(|_| anyhow!("result store is poisoned"))?
            .extend_from_slice(hosts);
        Ok(())
    }

    async fn load(&self) -> anyhow::Result<Vec<HostScanResult>> {
        let hosts = self
            .hosts
            .lock()
            .map_err(|_| anyhow!("result store is poisoned"))?;
        Ok(hosts.clone())
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
