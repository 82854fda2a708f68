pub mod expand;
pub mod ports;
pub mod scan;

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use rigscan_common::config::{
    DEFAULT_DISCOVERY_CONCURRENCY, DEFAULT_PORT_CONCURRENCY, ScanConfiguration,
};
use rigscan_common::info;
use rigscan_common::network::interface;
use rigscan_common::network::ports::parse_port_list;

#[derive(Parser)]
#[command(name = "rigscan")]
#[command(about = "Finds cryptocurrency mining rigs on a network.", version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,

    /// Less output: -q drops decorations, -qq prints results only
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// More log output: -v for debug, -vv for trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Do not listen for 'q' to finish early
    #[arg(long = "no-input", global = true)]
    pub disable_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover hosts in a range and probe their ports
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// Print the addresses a target expression expands to
    #[command(alias = "e")]
    Expand { target: String },
    /// List the mining-related port catalog
    #[command(alias = "p")]
    Ports,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// 192.168.1.1-254, 10.0.0.0/24, 10.0.0.1-1.20, a single address or a comma list
    /// [default: the networks of the local interfaces]
    pub target: Option<String>,

    /// Ports to probe, e.g. 22,80,4028-4036 [default: the port catalog]
    #[arg(short, long)]
    pub ports: Option<PortList>,

    /// Discovery timeout per host, in milliseconds
    #[arg(long, default_value_t = 2_000)]
    pub timeout: u64,

    /// Connect timeout per port, in milliseconds
    #[arg(long, default_value_t = 3_000)]
    pub port_timeout: u64,

    /// Hosts probed at the same time during discovery
    #[arg(long, default_value_t = DEFAULT_DISCOVERY_CONCURRENCY)]
    pub discovery_concurrency: usize,

    /// Ports probed at the same time, across all hosts
    #[arg(long, default_value_t = DEFAULT_PORT_CONCURRENCY)]
    pub port_concurrency: usize,

    /// Probe targets and ports in random order
    #[arg(long)]
    pub randomize: bool,

    /// Do not look up host names of live hosts
    #[arg(long)]
    pub no_dns: bool,
}

impl ScanArgs {
    pub fn to_configuration(&self) -> anyhow::Result<ScanConfiguration> {
        let target = match &self.target {
            Some(target) => target.clone(),
            None => local_target()?,
        };
        let mut config = ScanConfiguration::new(target)
            .with_timeout(Duration::from_millis(self.timeout))
            .with_port_timeout(Duration::from_millis(self.port_timeout))
            .with_concurrency(self.discovery_concurrency, self.port_concurrency)
            .with_randomized_order(self.randomize);
        if let Some(PortList(ports)) = &self.ports {
            config = config.with_ports(ports.iter().copied());
        }
        Ok(config)
    }
}

fn local_target() -> anyhow::Result<String> {
    let target = interface::local_target()
        .context("no target given and no local IPv4 network found")?;
    info!("No target given, scanning local networks {target}");
    Ok(target)
}

/// A parsed `--ports` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortList(pub Vec<u16>);

impl FromStr for PortList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_port_list(s).map(PortList)
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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
