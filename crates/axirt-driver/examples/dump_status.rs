//! Dump the live state of one AXI-RT instance
//!
//! Usage: `dump_status <base-phys-addr-hex>` (requires root for /dev/mem)

use anyhow::{Context, Result};
use axirt_driver::{AxiRt, Channel, MmioBus};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("axirt_driver=info")
        .init();

    let base = std::env::args()
        .nth(1)
        .context("usage: dump_status <base-phys-addr-hex>")?;
    let base = u64::from_str_radix(base.trim_start_matches("0x"), 16)
        .context("base address must be hex")?;

    let rt = AxiRt::with_default_config(MmioBus::map(base)?)?;

    println!("AXI-RT v{}", rt.version()?);
    let params = rt.hw_params()?;
    println!("{params:#?}");

    for mgr in 0..rt.config().num_managers {
        println!(
            "manager {mgr}: bypassed={} isolated={}",
            rt.is_bypassed(mgr)?,
            rt.is_isolated(mgr)?
        );
    }

    for region in 0..rt.config().num_regions {
        let (start, end) = rt.region(region, 0)?;
        println!(
            "region {region}: {start:#012x}..{end:#012x}  wr left {}/{}  rd left {}/{}",
            rt.budget_left(region, 0, Channel::Write)?,
            rt.period_left(region, 0, Channel::Write)?,
            rt.budget_left(region, 0, Channel::Read)?,
            rt.period_left(region, 0, Channel::Read)?,
        );
    }

    Ok(())
}
