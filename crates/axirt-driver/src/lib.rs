//! Userspace driver for the AXI-RT traffic regulation unit.
//!
//! AXI-RT sits in front of a set of AXI managers and rate-limits their
//! traffic: per-region token buckets (a budget replenished every period),
//! per-manager burst fragmentation, and a guard unit that isolates a
//! manager's traffic while software reprograms it. This crate programs
//! the block's register file; the regulation itself happens in hardware.
//!
//! # Bus hierarchy
//!
//! ```text
//! Hardware:
//!   MmioBus  — /dev/mem mapping of the register file (or a pre-mapped
//!              pointer via from_raw)
//!
//! Development / CI:
//!   SimBus   — in-memory register file with access-rule and guard
//!              handshake modeling, no hardware required
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use axirt_driver::{AxiRt, Channel, MmioBus};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bus = MmioBus::map(0x0100_0000)?;
//! let mut rt = AxiRt::with_default_config(bus)?;
//!
//! println!("AXI-RT v{}, {} managers", rt.version()?, rt.hw_params()?.num_managers);
//!
//! // Gate the managers, reprogram region 0, re-enable.
//! rt.claim_blocking(true, true, Duration::from_millis(10))?;
//! rt.set_region(0x8000_0000, 0x8fff_ffff, 0, 0)?;
//! rt.set_budget(1024, 0, 0, Channel::Write)?;
//! rt.set_period(4096, 0, 0, Channel::Write)?;
//! rt.release()?;
//! rt.enable(0b11)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod bus;
pub mod buses;
mod driver;
mod error;
mod params;

/// Register map of the block (re-exported from axirt-regs).
pub mod regmap {
    pub use axirt_regs::multireg::Multireg;
    pub use axirt_regs::regs::*;
}

pub use bus::RegisterBus;
pub use buses::{MmioBus, SimBus};
pub use driver::{AxiRt, Channel, RtConfig};
pub use error::{AxiRtError, Result};
pub use params::{HwParams, Version};

/// Commonly used types.
pub mod prelude {
    pub use crate::{AxiRt, AxiRtError, Channel, MmioBus, RegisterBus, Result, RtConfig, SimBus};
}
