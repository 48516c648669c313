//! Version and synthesis-parameter readback
//!
//! The tail of the register file mirrors the configuration the block was
//! synthesized with. Reading it back lets software confirm it is talking
//! to the block it expects instead of assuming counts and widths.

use crate::bus::RegisterBus;
use crate::error::Result;
use axirt_regs::regs;

/// Block version as reported by the version registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl Version {
    pub(crate) fn read(bus: &impl RegisterBus) -> Result<Self> {
        Ok(Self {
            major: bus.read_reg(regs::MAJOR_VERSION)?,
            minor: bus.read_reg(regs::MINOR_VERSION)?,
            patch: bus.read_reg(regs::PATCH_VERSION)?,
        })
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Synthesis parameters read back from the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwParams {
    /// Configured number of managers.
    pub num_managers: u32,
    /// AXI address width in bits.
    pub addr_width: u32,
    /// AXI data width in bits.
    pub data_width: u32,
    /// AXI ID width in bits.
    pub id_width: u32,
    /// AXI user signal width in bits.
    pub user_width: u32,
    /// Maximum outstanding transactions.
    pub num_pending: u32,
    /// Write buffer depth in beats.
    pub w_buffer_depth: u32,
    /// Configured number of address regions.
    pub num_addr_regions: u32,
    /// Period counter width in bits.
    pub period_width: u32,
    /// Budget counter width in bits.
    pub budget_width: u32,
    /// Upper bound on managers supported by this register layout.
    pub max_num_managers: u32,
}

impl HwParams {
    pub(crate) fn read(bus: &impl RegisterBus) -> Result<Self> {
        Ok(Self {
            num_managers: bus.read_reg(regs::NUM_MANAGERS)?,
            addr_width: bus.read_reg(regs::ADDR_WIDTH)?,
            data_width: bus.read_reg(regs::DATA_WIDTH)?,
            id_width: bus.read_reg(regs::ID_WIDTH)?,
            user_width: bus.read_reg(regs::USER_WIDTH)?,
            num_pending: bus.read_reg(regs::NUM_PENDING)?,
            w_buffer_depth: bus.read_reg(regs::W_BUFFER_DEPTH)?,
            num_addr_regions: bus.read_reg(regs::NUM_ADDR_REGIONS)?,
            period_width: bus.read_reg(regs::PERIOD_WIDTH)?,
            budget_width: bus.read_reg(regs::BUDGET_WIDTH)?,
            max_num_managers: bus.read_reg(regs::MAX_NUM_MANAGERS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_displays_dotted() {
        let v = Version {
            major: 1,
            minor: 2,
            patch: 3,
        };
        assert_eq!(v.to_string(), "1.2.3");
    }
}
