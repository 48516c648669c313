//! `axirt` — command-line interface for AXI-RT bring-up.
//!
//! ```text
//! USAGE:
//!   axirt --base <hex> info                      Version, parameters, status
//!   axirt --base <hex> enable --mask 0x3         Enable regulation per manager
//!   axirt --base <hex> disable                   Disable regulation
//!   axirt --base <hex> claim [--wait-ms N]       Request guard-unit isolation
//!   axirt --base <hex> release                   Withdraw isolation request
//!   axirt --base <hex> len-limit ...             Program burst fragmentation
//!   axirt --base <hex> region ...                Program a region address range
//!   axirt --base <hex> budget ...                Program a region budget
//!   axirt --base <hex> period ...                Program a region period
//! ```
//!
//! All commands map the register file from `/dev/mem` (requires root).

use anyhow::Result;
use axirt_driver::{AxiRt, Channel, MmioBus};
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "axirt", about = "AXI-RT traffic regulation CLI", version)]
struct Cli {
    /// Physical base address of the register file (hex).
    #[arg(long, value_parser = parse_hex)]
    base: u64,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print version, synthesis parameters, and per-manager status.
    Info,
    /// Enable regulation for the managers in the bitmask.
    Enable {
        /// Per-manager enable bitmask (hex or decimal).
        #[arg(long, value_parser = parse_hex32)]
        mask: u32,
    },
    /// Disable regulation for all managers.
    Disable,
    /// Request exclusive access through the guard unit. With neither
    /// `--read` nor `--write`, both channels are claimed.
    Claim {
        /// Request read-channel exclusivity only.
        #[arg(long)]
        read: bool,
        /// Request write-channel exclusivity only.
        #[arg(long)]
        write: bool,
        /// Wait for the acknowledgment up to this many milliseconds.
        #[arg(long)]
        wait_ms: Option<u64>,
    },
    /// Withdraw all isolation requests.
    Release,
    /// Program the burst fragmentation limit of one manager.
    LenLimit {
        /// Limit in beats.
        #[arg(long)]
        limit: u8,
        /// Manager index.
        #[arg(long)]
        mgr: u8,
    },
    /// Program the address range of one region.
    Region {
        /// Region index.
        #[arg(long)]
        region: u8,
        /// Manager index.
        #[arg(long)]
        mgr: u8,
        /// Start address (hex).
        #[arg(long, value_parser = parse_hex)]
        start: u64,
        /// End address (hex).
        #[arg(long, value_parser = parse_hex)]
        end: u64,
    },
    /// Program the budget of one region and channel.
    Budget {
        /// Region index.
        #[arg(long)]
        region: u8,
        /// Manager index.
        #[arg(long)]
        mgr: u8,
        /// Regulated channel.
        #[arg(long, value_enum)]
        channel: Chan,
        /// Budget value.
        #[arg(long)]
        value: u32,
    },
    /// Program the period of one region and channel.
    Period {
        /// Region index.
        #[arg(long)]
        region: u8,
        /// Manager index.
        #[arg(long)]
        mgr: u8,
        /// Regulated channel.
        #[arg(long, value_enum)]
        channel: Chan,
        /// Period value in cycles.
        #[arg(long)]
        value: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Chan {
    Write,
    Read,
}

impl From<Chan> for Channel {
    fn from(c: Chan) -> Self {
        match c {
            Chan::Write => Self::Write,
            Chan::Read => Self::Read,
        }
    }
}

fn parse_hex(s: &str) -> Result<u64, String> {
    let trimmed = s.trim_start_matches("0x");
    u64::from_str_radix(trimmed, 16).map_err(|e| format!("invalid hex value {s:?}: {e}"))
}

fn parse_hex32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x") {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex value {s:?}: {e}"))
    } else {
        s.parse().map_err(|e| format!("invalid value {s:?}: {e}"))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let mut rt = AxiRt::with_default_config(MmioBus::map(cli.base)?)?;

    match cli.command {
        Cmd::Info => cmd_info(&rt)?,
        Cmd::Enable { mask } => {
            rt.enable(mask)?;
            println!("regulation enabled, mask {mask:#x}");
        }
        Cmd::Disable => {
            rt.disable()?;
            println!("regulation disabled");
        }
        Cmd::Claim {
            read,
            write,
            wait_ms,
        } => {
            let (read, write) = if read || write {
                (read, write)
            } else {
                (true, true)
            };
            match wait_ms {
                Some(ms) => {
                    rt.claim_blocking(read, write, Duration::from_millis(ms))?;
                    println!("guard unit isolated");
                }
                None => {
                    rt.claim(read, write)?;
                    println!("isolation requested (poll with `axirt info`)");
                }
            }
        }
        Cmd::Release => {
            rt.release()?;
            println!("isolation request withdrawn");
        }
        Cmd::LenLimit { limit, mgr } => {
            rt.set_len_limit(limit, mgr)?;
            println!("len limit of manager {mgr} set to {limit} beats");
        }
        Cmd::Region {
            region,
            mgr,
            start,
            end,
        } => {
            rt.set_region(start, end, region, mgr)?;
            println!("region {region}: {start:#x}..{end:#x}");
        }
        Cmd::Budget {
            region,
            mgr,
            channel,
            value,
        } => {
            rt.set_budget(value, region, mgr, channel.into())?;
            println!("budget set");
        }
        Cmd::Period {
            region,
            mgr,
            channel,
            value,
        } => {
            rt.set_period(value, region, mgr, channel.into())?;
            println!("period set");
        }
    }

    Ok(())
}

fn cmd_info(rt: &AxiRt<MmioBus>) -> Result<()> {
    println!("AXI-RT v{}", rt.version()?);

    let p = rt.hw_params()?;
    println!(
        "managers {}   regions {}   pending {}   w-buffer {}",
        p.num_managers, p.num_addr_regions, p.num_pending, p.w_buffer_depth
    );
    println!(
        "addr {}b   data {}b   id {}b   user {}b   period {}b   budget {}b",
        p.addr_width, p.data_width, p.id_width, p.user_width, p.period_width, p.budget_width
    );

    for mgr in 0..rt.config().num_managers {
        println!(
            "manager {mgr}: bypassed={} isolated={}",
            rt.is_bypassed(mgr)?,
            rt.is_isolated(mgr)?
        );
    }

    Ok(())
}
