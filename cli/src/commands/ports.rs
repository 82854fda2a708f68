use colored::*;
use rigscan_common::config::Config;
use rigscan_common::network::ports::{self, MINER_PORTS};

use crate::terminal::{colors, print};

pub fn ports(cfg: &Config) -> anyhow::Result<()> {
    if cfg.json {
        println!("{}", serde_json::to_string_pretty(MINER_PORTS)?);
        return Ok(());
    }

    print::header("port catalog", cfg.quiet);
    for entry in MINER_PORTS {
        let value: ColoredString = if ports::is_mining_port(entry.port) {
            format!("{} [{}]", entry.service, entry.category).color(colors::MINING)
        } else {
            format!("{} [{}]", entry.service, entry.category).normal()
        };
        print::aligned_line(&entry.port.to_string(), value);
    }
    Ok(())
}
