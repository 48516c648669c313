//! Register bus implementations
//!
//! Two buses are available:
//! - **Mmio**: maps the register file from `/dev/mem` at its physical base
//!   address (or wraps an already-mapped pointer)
//! - **Sim**: in-memory register file with hardware access-rule modeling,
//!   for tests and CI without the IP block

pub mod mmio;
pub mod sim;

pub use mmio::MmioBus;
pub use sim::SimBus;
