use anyhow::Context;
use colored::*;
use rigscan_common::config::Config;
use rigscan_common::network::target;
use rigscan_common::success;

use crate::terminal::{colors, print};

pub fn expand(spec: &str, cfg: &Config) -> anyhow::Result<()> {
    let addrs = target::expand_range(spec).with_context(|| format!("cannot expand '{spec}'"))?;

    if cfg.json {
        println!("{}", serde_json::to_string_pretty(&addrs)?);
        return Ok(());
    }

    print::header("expanded targets", cfg.quiet);
    for addr in &addrs {
        print::print(&addr.to_string().color(colors::IPV4_ADDR).to_string());
    }
    if cfg.quiet < 2 {
        success!("{} addresses in '{}'", addrs.len(), spec.trim());
    }
    Ok(())
}
