//! The AXI-RT driver
//!
//! Translates configuration intents (limits, regions, budgets, periods,
//! the guard-unit gate) into correctly addressed, correctly masked
//! register accesses on a [`RegisterBus`]. The driver itself is
//! stateless beyond the bus handle and its configured counts; every
//! operation is a direct, synchronous access.
//!
//! Indices are validated against the configured counts *before* any
//! access: an out-of-range manager or region never reaches the bus.

use crate::bus::RegisterBus;
use crate::error::{AxiRtError, Result};
use crate::params::{HwParams, Version};
use axirt_regs::regs;
use std::time::{Duration, Instant};
use tracing::debug;

/// Interval between isolation status polls in [`AxiRt::claim_blocking`].
const ISOLATION_POLL_INTERVAL: Duration = Duration::from_micros(10);

/// Counts of the regulated unit a driver instance talks to.
///
/// Passed in explicitly so the same driver code serves differently
/// parameterized instances; defaults match this block's synthesis
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtConfig {
    /// Managers regulated by the block.
    pub num_managers: u8,
    /// Address regions per manager.
    pub num_regions: u8,
}

impl Default for RtConfig {
    fn default() -> Self {
        // Truncation fine: both synthesis constants are far below 256
        #[allow(clippy::cast_possible_truncation)]
        let (num_managers, num_regions) = (regs::NUM_MRG as u8, regs::NUM_SUB as u8);
        Self {
            num_managers,
            num_regions,
        }
    }
}

/// Regulated traffic direction; the budget/period registers are split
/// into a write-channel and a read-channel block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// AW/W traffic.
    Write,
    /// AR/R traffic.
    Read,
}

/// Driver for one AXI-RT register file.
///
/// Generic over the bus so the same code programs real hardware
/// ([`crate::MmioBus`]) and the simulated register file used in tests
/// ([`crate::SimBus`]).
#[derive(Debug)]
pub struct AxiRt<B> {
    bus: B,
    cfg: RtConfig,
}

impl<B: RegisterBus> AxiRt<B> {
    /// Create a driver over `bus` for a block with the given counts.
    ///
    /// # Errors
    ///
    /// Returns [`AxiRtError::Unmapped`] if the bus does not cover the
    /// whole register file, or [`AxiRtError::InvalidConfig`] if the
    /// counts exceed what the register layout can address.
    pub fn new(bus: B, cfg: RtConfig) -> Result<Self> {
        if bus.len() < regs::REG_FILE_SIZE {
            return Err(AxiRtError::Unmapped {
                len: bus.len(),
                need: regs::REG_FILE_SIZE,
            });
        }
        if cfg.num_managers as usize > regs::RT_ENABLE.capacity() {
            return Err(AxiRtError::invalid_config(format!(
                "{} managers exceed the {} flag slots of one multireg",
                cfg.num_managers,
                regs::RT_ENABLE.capacity()
            )));
        }
        if cfg.num_managers as usize > regs::LEN_LIMIT.capacity() {
            return Err(AxiRtError::invalid_config(format!(
                "{} managers exceed the {} length-limit slots",
                cfg.num_managers,
                regs::LEN_LIMIT.capacity()
            )));
        }
        if cfg.num_regions as usize > regs::WRITE_BUDGET.count {
            return Err(AxiRtError::invalid_config(format!(
                "{} regions exceed the {} region register slots",
                cfg.num_regions,
                regs::WRITE_BUDGET.count
            )));
        }
        Ok(Self { bus, cfg })
    }

    /// Create a driver with this block's default synthesis counts.
    ///
    /// # Errors
    ///
    /// Same conditions as [`AxiRt::new`].
    pub fn with_default_config(bus: B) -> Result<Self> {
        Self::new(bus, RtConfig::default())
    }

    /// The configured counts.
    pub fn config(&self) -> RtConfig {
        self.cfg
    }

    /// Borrow the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Consume the driver, returning the bus.
    pub fn into_bus(self) -> B {
        self.bus
    }

    fn check_mgr(&self, mgr_id: u8) -> Result<()> {
        if mgr_id >= self.cfg.num_managers {
            return Err(AxiRtError::ManagerOutOfRange {
                mgr_id,
                count: self.cfg.num_managers,
            });
        }
        Ok(())
    }

    fn check_region(&self, region_id: u8) -> Result<()> {
        if region_id >= self.cfg.num_regions {
            return Err(AxiRtError::RegionOutOfRange {
                region_id,
                count: self.cfg.num_regions,
            });
        }
        Ok(())
    }

    /// Mask down to the low `num_managers` bits of a per-manager bitmask.
    fn mgr_mask(&self, mask: u32) -> u32 {
        if self.cfg.num_managers >= 32 {
            mask
        } else {
            mask & ((1 << self.cfg.num_managers) - 1)
        }
    }

    // ── Guard unit ───────────────────────────────────────────────────────

    /// Request exclusive read and/or write access through the guard unit.
    ///
    /// Sets the corresponding isolate-request bits, leaving the other
    /// request bit untouched. Fire-and-forget: the hardware reports the
    /// grant in the isolated status register, which callers poll via
    /// [`AxiRt::is_isolated`] or [`AxiRt::claim_blocking`].
    ///
    /// # Errors
    ///
    /// Propagates bus access errors.
    pub fn claim(&mut self, read_excl: bool, write_excl: bool) -> Result<()> {
        let mut bits = 0;
        if read_excl {
            bits |= regs::ISOLATE_READ_BIT;
        }
        if write_excl {
            bits |= regs::ISOLATE_WRITE_BIT;
        }
        self.bus
            .modify_reg(regs::ISOLATE.offset, &mut |v| v | bits)?;
        debug!("claimed guard unit: read={read_excl} write={write_excl}");
        Ok(())
    }

    /// [`AxiRt::claim`], then poll the isolated status until the
    /// requested bits acknowledge or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`AxiRtError::IsolationTimeout`] if the hardware does not
    /// acknowledge in time; the request stays pending and can be
    /// withdrawn with [`AxiRt::release`].
    pub fn claim_blocking(
        &mut self,
        read_excl: bool,
        write_excl: bool,
        timeout: Duration,
    ) -> Result<()> {
        self.claim(read_excl, write_excl)?;

        let mut wanted = 0;
        if read_excl {
            wanted |= regs::ISOLATE_READ_BIT;
        }
        if write_excl {
            wanted |= regs::ISOLATE_WRITE_BIT;
        }
        if wanted == 0 {
            return Ok(());
        }

        let start = Instant::now();
        loop {
            let status = self.bus.read_reg(regs::ISOLATED.offset)?;
            if status & wanted == wanted {
                debug!("guard unit isolated after {:?}", start.elapsed());
                return Ok(());
            }
            if start.elapsed() >= timeout {
                // Truncation fine: u64 milliseconds cover half a billion years
                #[allow(clippy::cast_possible_truncation)]
                return Err(AxiRtError::IsolationTimeout {
                    waited_ms: timeout.as_millis() as u64,
                });
            }
            std::thread::sleep(ISOLATION_POLL_INTERVAL);
        }
    }

    /// Withdraw all isolation requests.
    ///
    /// # Errors
    ///
    /// Propagates bus access errors.
    pub fn release(&mut self) -> Result<()> {
        self.bus.write_reg(regs::ISOLATE.offset, 0)?;
        debug!("released guard unit");
        Ok(())
    }

    /// Whether the hardware reports manager `mgr_id` isolated.
    ///
    /// # Errors
    ///
    /// Returns [`AxiRtError::ManagerOutOfRange`] for an invalid index.
    pub fn is_isolated(&self, mgr_id: u8) -> Result<bool> {
        self.check_mgr(mgr_id)?;
        let status = self.bus.read_reg(regs::ISOLATED.offset)?;
        Ok(regs::ISOLATED.extract(status, mgr_id as usize) != 0)
    }

    // ── Global control ───────────────────────────────────────────────────

    /// Enable traffic regulation per manager via bitmask. Bits above the
    /// configured manager count are dropped.
    ///
    /// # Errors
    ///
    /// Propagates bus access errors.
    pub fn enable(&mut self, mask: u32) -> Result<()> {
        let mask = self.mgr_mask(mask);
        self.bus.write_reg(regs::RT_ENABLE.offset, mask)?;
        debug!("rt_enable = {mask:#x}");
        Ok(())
    }

    /// Disable traffic regulation for all managers.
    ///
    /// # Errors
    ///
    /// Propagates bus access errors.
    pub fn disable(&mut self) -> Result<()> {
        self.bus.write_reg(regs::RT_ENABLE.offset, 0)?;
        debug!("rt_enable cleared");
        Ok(())
    }

    /// Whether regulation for manager `mgr_id` is currently bypassed.
    ///
    /// # Errors
    ///
    /// Returns [`AxiRtError::ManagerOutOfRange`] for an invalid index.
    pub fn is_bypassed(&self, mgr_id: u8) -> Result<bool> {
        self.check_mgr(mgr_id)?;
        let status = self.bus.read_reg(regs::RT_BYPASSED.offset)?;
        Ok(regs::RT_BYPASSED.extract(status, mgr_id as usize) != 0)
    }

    /// Enable the internal MTU per manager via bitmask.
    ///
    /// # Errors
    ///
    /// Propagates bus access errors.
    pub fn imtu_enable(&mut self, mask: u32) -> Result<()> {
        let mask = self.mgr_mask(mask);
        self.bus.write_reg(regs::IMTU_ENABLE.offset, mask)
    }

    /// Reset period and budget counters for the managers in `mask`.
    ///
    /// # Errors
    ///
    /// Propagates bus access errors.
    pub fn imtu_abort(&mut self, mask: u32) -> Result<()> {
        let mask = self.mgr_mask(mask);
        self.bus.write_reg(regs::IMTU_ABORT.offset, mask)
    }

    // ── Per-manager setters ──────────────────────────────────────────────

    /// Program the burst fragmentation limit (in beats) for one manager.
    ///
    /// Read-modify-write on the packed length-limit register: the other
    /// managers' limits are preserved bit-for-bit.
    ///
    /// # Errors
    ///
    /// Returns [`AxiRtError::ManagerOutOfRange`] for an invalid index.
    pub fn set_len_limit(&mut self, limit: u8, mgr_id: u8) -> Result<()> {
        self.check_mgr(mgr_id)?;
        let idx = mgr_id as usize;
        self.bus
            .modify_reg(regs::LEN_LIMIT.reg_offset(idx), &mut |v| {
                regs::LEN_LIMIT.insert(v, idx, u32::from(limit))
            })?;
        debug!("len_limit[{mgr_id}] = {limit}");
        Ok(())
    }

    /// Program one whole length-limit register group: the limit is
    /// replicated into every manager lane of register `group_id` with a
    /// single full-register write.
    ///
    /// # Errors
    ///
    /// Returns [`AxiRtError::GroupOutOfRange`] for an invalid index.
    pub fn set_len_limit_group(&mut self, limit: u8, group_id: u8) -> Result<()> {
        if group_id as usize >= regs::LEN_LIMIT.count {
            // Truncation fine: multireg counts are single-digit
            #[allow(clippy::cast_possible_truncation)]
            return Err(AxiRtError::GroupOutOfRange {
                group_id,
                count: regs::LEN_LIMIT.count as u8,
            });
        }
        let offset = regs::LEN_LIMIT.offset + group_id as usize * 4;
        self.bus
            .write_reg(offset, regs::LEN_LIMIT.splat(u32::from(limit)))?;
        debug!("len_limit group {group_id} = {limit}");
        Ok(())
    }

    // ── Region configuration ─────────────────────────────────────────────

    /// Program the address range of one region: four 32-bit writes
    /// (start low/high, end low/high).
    ///
    /// The four writes are not atomic; a concurrent hardware read may
    /// observe a transiently inconsistent region. Isolate the manager
    /// via [`AxiRt::claim`] before reprogramming a live region.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error for invalid indices; no register is
    /// written in that case.
    pub fn set_region(
        &mut self,
        start_addr: u64,
        end_addr: u64,
        region_id: u8,
        mgr_id: u8,
    ) -> Result<()> {
        self.check_mgr(mgr_id)?;
        self.check_region(region_id)?;
        let r = region_id as usize;

        // Truncations intentional: the low halves of the 64-bit addresses
        #[allow(clippy::cast_possible_truncation)]
        {
            self.bus
                .write_reg(regs::START_ADDR_SUB_LOW.reg_offset(r), start_addr as u32)?;
            self.bus.write_reg(
                regs::START_ADDR_SUB_HIGH.reg_offset(r),
                (start_addr >> 32) as u32,
            )?;
            self.bus
                .write_reg(regs::END_ADDR_SUB_LOW.reg_offset(r), end_addr as u32)?;
            self.bus.write_reg(
                regs::END_ADDR_SUB_HIGH.reg_offset(r),
                (end_addr >> 32) as u32,
            )?;
        }
        debug!("region {region_id} mgr {mgr_id}: {start_addr:#x}..{end_addr:#x}");
        Ok(())
    }

    /// Read back the programmed `(start, end)` addresses of one region.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error for invalid indices.
    pub fn region(&self, region_id: u8, mgr_id: u8) -> Result<(u64, u64)> {
        self.check_mgr(mgr_id)?;
        self.check_region(region_id)?;
        let r = region_id as usize;

        let start = u64::from(self.bus.read_reg(regs::START_ADDR_SUB_LOW.reg_offset(r))?)
            | u64::from(self.bus.read_reg(regs::START_ADDR_SUB_HIGH.reg_offset(r))?) << 32;
        let end = u64::from(self.bus.read_reg(regs::END_ADDR_SUB_LOW.reg_offset(r))?)
            | u64::from(self.bus.read_reg(regs::END_ADDR_SUB_HIGH.reg_offset(r))?) << 32;
        Ok((start, end))
    }

    /// Program the budget (bytes per period) of one region and channel.
    /// Single full-register write.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error for invalid indices.
    pub fn set_budget(
        &mut self,
        budget: u32,
        region_id: u8,
        mgr_id: u8,
        channel: Channel,
    ) -> Result<()> {
        self.check_mgr(mgr_id)?;
        self.check_region(region_id)?;
        let multireg = match channel {
            Channel::Write => regs::WRITE_BUDGET,
            Channel::Read => regs::READ_BUDGET,
        };
        self.bus
            .write_reg(multireg.reg_offset(region_id as usize), budget)?;
        debug!("{channel:?} budget region {region_id} = {budget}");
        Ok(())
    }

    /// Program the replenishment period (in cycles) of one region and
    /// channel. Single full-register write.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error for invalid indices.
    pub fn set_period(
        &mut self,
        period: u32,
        region_id: u8,
        mgr_id: u8,
        channel: Channel,
    ) -> Result<()> {
        self.check_mgr(mgr_id)?;
        self.check_region(region_id)?;
        let multireg = match channel {
            Channel::Write => regs::WRITE_PERIOD,
            Channel::Read => regs::READ_PERIOD,
        };
        self.bus
            .write_reg(multireg.reg_offset(region_id as usize), period)?;
        debug!("{channel:?} period region {region_id} = {period}");
        Ok(())
    }

    /// Remaining budget of one region and channel.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error for invalid indices.
    pub fn budget_left(&self, region_id: u8, mgr_id: u8, channel: Channel) -> Result<u32> {
        self.check_mgr(mgr_id)?;
        self.check_region(region_id)?;
        let multireg = match channel {
            Channel::Write => regs::WRITE_BUDGET_LEFT,
            Channel::Read => regs::READ_BUDGET_LEFT,
        };
        self.bus.read_reg(multireg.reg_offset(region_id as usize))
    }

    /// Remaining period of one region and channel.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error for invalid indices.
    pub fn period_left(&self, region_id: u8, mgr_id: u8, channel: Channel) -> Result<u32> {
        self.check_mgr(mgr_id)?;
        self.check_region(region_id)?;
        let multireg = match channel {
            Channel::Write => regs::WRITE_PERIOD_LEFT,
            Channel::Read => regs::READ_PERIOD_LEFT,
        };
        self.bus.read_reg(multireg.reg_offset(region_id as usize))
    }

    // ── Readback ─────────────────────────────────────────────────────────

    /// Block version.
    ///
    /// # Errors
    ///
    /// Propagates bus access errors.
    pub fn version(&self) -> Result<Version> {
        Version::read(&self.bus)
    }

    /// Synthesis parameters the block reports about itself.
    ///
    /// # Errors
    ///
    /// Propagates bus access errors.
    pub fn hw_params(&self) -> Result<HwParams> {
        HwParams::read(&self.bus)
    }
}
