//! Bring-up sequence for one AXI-RT instance
//!
//! Maps the register file, gates the managers, programs a region with a
//! write-channel token bucket, and enables regulation.
//!
//! Usage: `setup_rt <base-phys-addr-hex>` (requires root for /dev/mem)

use anyhow::{Context, Result};
use axirt_driver::{AxiRt, Channel, MmioBus};
use std::time::Duration;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("axirt_driver=debug")
        .init();

    let base = std::env::args()
        .nth(1)
        .context("usage: setup_rt <base-phys-addr-hex>")?;
    let base = u64::from_str_radix(base.trim_start_matches("0x"), 16)
        .context("base address must be hex")?;

    let bus = MmioBus::map(base)?;
    let mut rt = AxiRt::with_default_config(bus)?;

    println!("AXI-RT v{}", rt.version()?);
    let params = rt.hw_params()?;
    println!(
        "{} managers, {} regions, addr width {}",
        params.num_managers, params.num_addr_regions, params.addr_width
    );

    // Gate traffic before touching live regulation state
    rt.claim_blocking(true, true, Duration::from_millis(100))?;

    for mgr in 0..2 {
        rt.set_len_limit(16, mgr)?;
        rt.set_region(0x8000_0000, 0x8fff_ffff, 0, mgr)?;
        rt.set_budget(1024, 0, mgr, Channel::Write)?;
        rt.set_period(4096, 0, mgr, Channel::Write)?;
        rt.set_budget(1024, 0, mgr, Channel::Read)?;
        rt.set_period(4096, 0, mgr, Channel::Read)?;
    }

    rt.release()?;
    rt.enable(0b11)?;

    println!("regulation enabled on managers 0 and 1");
    Ok(())
}
