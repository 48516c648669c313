//! Simulated register file
//!
//! A `Vec<u32>`-backed stand-in for the hardware register file, faithful
//! enough to run the whole driver test suite without the IP block:
//!
//! 1. **Access rules**: registers the hardware exposes read-only
//!    (version, bypassed/isolated status, remaining counters, parameter
//!    readback) ignore driver-path writes, as the real block does.
//! 2. **Guard handshake**: writes to the isolate request register are
//!    reflected in the isolated status register after a configurable
//!    number of status polls, so both the fire-and-forget and the
//!    blocking claim paths can be exercised, including timeouts.
//! 3. **Parameter readback**: version and parameter registers are seeded
//!    with this block's synthesis configuration.
//!
//! Test hooks (`poke`, `snapshot`) bypass the access rules to fake
//! hardware-driven state and to assert that rejected operations touched
//! nothing.

use crate::bus::{check_access, RegisterBus};
use crate::error::Result;
use axirt_regs::regs;
use std::cell::Cell;

/// Simulated AXI-RT register file.
#[derive(Debug)]
pub struct SimBus {
    regs: Vec<u32>,
    /// Status polls a new isolation request stays unacknowledged for.
    ack_delay: u32,
    /// Polls remaining until the pending request is acknowledged.
    ack_countdown: Cell<u32>,
    /// Last isolate request written.
    pending_isolated: Cell<u32>,
    /// Current isolated status.
    isolated: Cell<u32>,
}

impl SimBus {
    /// Create a register file for a block with the given manager and
    /// region counts, seeded with this block's synthesis parameters.
    /// Isolation requests acknowledge immediately.
    #[must_use]
    pub fn new(num_managers: u8, num_regions: u8) -> Self {
        let mut regs_mem = vec![0u32; regs::REG_FILE_SIZE / 4];

        regs_mem[regs::MAJOR_VERSION / 4] = 0;
        regs_mem[regs::MINOR_VERSION / 4] = 4;
        regs_mem[regs::PATCH_VERSION / 4] = 1;

        regs_mem[regs::NUM_MANAGERS / 4] = u32::from(num_managers);
        regs_mem[regs::ADDR_WIDTH / 4] = 48;
        regs_mem[regs::DATA_WIDTH / 4] = 64;
        regs_mem[regs::ID_WIDTH / 4] = 4;
        regs_mem[regs::USER_WIDTH / 4] = 4;
        regs_mem[regs::NUM_PENDING / 4] = 32;
        regs_mem[regs::W_BUFFER_DEPTH / 4] = 32;
        regs_mem[regs::NUM_ADDR_REGIONS / 4] = u32::from(num_regions);
        regs_mem[regs::PERIOD_WIDTH / 4] = 32;
        regs_mem[regs::BUDGET_WIDTH / 4] = 32;
        regs_mem[regs::MAX_NUM_MANAGERS / 4] = 32;

        Self {
            regs: regs_mem,
            ack_delay: 0,
            ack_countdown: Cell::new(0),
            pending_isolated: Cell::new(0),
            isolated: Cell::new(0),
        }
    }

    /// Delay isolation acknowledgment by `polls` reads of the isolated
    /// status register. `u32::MAX` never acknowledges.
    #[must_use]
    pub fn with_ack_delay(mut self, polls: u32) -> Self {
        self.ack_delay = polls;
        self
    }

    /// Set a register directly, bypassing access rules. Used by tests to
    /// fake hardware-driven state (status bits, remaining counters).
    ///
    /// # Panics
    ///
    /// Panics if `offset` is misaligned or outside the register file.
    pub fn poke(&mut self, offset: usize, value: u32) {
        assert!(offset % 4 == 0 && offset + 4 <= regs::REG_FILE_SIZE);
        if offset == regs::ISOLATED.offset {
            self.isolated.set(value);
        }
        self.regs[offset / 4] = value;
    }

    /// Copy of the whole register file, isolated status folded in.
    /// Snapshot comparison is how tests assert "no other register moved".
    #[must_use]
    pub fn snapshot(&self) -> Vec<u32> {
        let mut copy = self.regs.clone();
        copy[regs::ISOLATED.offset / 4] = self.isolated.get();
        copy
    }

    /// Whether the hardware exposes the register at `offset` read-only.
    fn is_read_only(offset: usize) -> bool {
        matches!(
            offset,
            regs::MAJOR_VERSION..=regs::PATCH_VERSION
        ) || offset == regs::RT_BYPASSED.offset
            || (regs::WRITE_BUDGET_LEFT.offset..regs::ISOLATE.offset).contains(&offset)
            || offset == regs::ISOLATED.offset
            || (regs::NUM_MANAGERS..regs::REG_FILE_SIZE).contains(&offset)
    }
}

impl RegisterBus for SimBus {
    fn read_reg(&self, offset: usize) -> Result<u32> {
        check_access(offset, regs::REG_FILE_SIZE)?;

        if offset == regs::ISOLATED.offset {
            let remaining = self.ack_countdown.get();
            if remaining == 0 {
                self.isolated.set(self.pending_isolated.get());
            } else if remaining != u32::MAX {
                self.ack_countdown.set(remaining - 1);
            }
            return Ok(self.isolated.get());
        }

        Ok(self.regs[offset / 4])
    }

    fn write_reg(&mut self, offset: usize, value: u32) -> Result<()> {
        check_access(offset, regs::REG_FILE_SIZE)?;

        if Self::is_read_only(offset) {
            tracing::debug!("sim: ignoring write to read-only register {offset:#05x}");
            return Ok(());
        }

        if offset == regs::ISOLATE.offset {
            self.pending_isolated.set(value);
            self.ack_countdown.set(self.ack_delay);
            if self.ack_delay == 0 {
                self.isolated.set(value);
            }
        }

        self.regs[offset / 4] = value;
        Ok(())
    }

    fn len(&self) -> usize {
        regs::REG_FILE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_parameter_readback() {
        let bus = SimBus::new(2, 4);
        assert_eq!(bus.read_reg(regs::NUM_MANAGERS).unwrap(), 2);
        assert_eq!(bus.read_reg(regs::NUM_ADDR_REGIONS).unwrap(), 4);
        assert_eq!(bus.read_reg(regs::ADDR_WIDTH).unwrap(), 48);
        assert_eq!(bus.read_reg(regs::MINOR_VERSION).unwrap(), 4);
    }

    #[test]
    fn read_only_registers_ignore_writes() {
        let mut bus = SimBus::new(2, 4);
        bus.write_reg(regs::MAJOR_VERSION, 99).unwrap();
        bus.write_reg(regs::WRITE_BUDGET_LEFT.offset, 99).unwrap();
        bus.write_reg(regs::NUM_MANAGERS, 99).unwrap();
        assert_eq!(bus.read_reg(regs::MAJOR_VERSION).unwrap(), 0);
        assert_eq!(bus.read_reg(regs::WRITE_BUDGET_LEFT.offset).unwrap(), 0);
        assert_eq!(bus.read_reg(regs::NUM_MANAGERS).unwrap(), 2);
    }

    #[test]
    fn writable_registers_hold_values() {
        let mut bus = SimBus::new(2, 4);
        bus.write_reg(regs::WRITE_BUDGET.offset, 1000).unwrap();
        assert_eq!(bus.read_reg(regs::WRITE_BUDGET.offset).unwrap(), 1000);
    }

    #[test]
    fn immediate_isolation_ack() {
        let mut bus = SimBus::new(2, 4);
        bus.write_reg(regs::ISOLATE.offset, 0b01).unwrap();
        assert_eq!(bus.read_reg(regs::ISOLATED.offset).unwrap(), 0b01);
    }

    #[test]
    fn delayed_isolation_ack() {
        let mut bus = SimBus::new(2, 4).with_ack_delay(2);
        bus.write_reg(regs::ISOLATE.offset, 0b11).unwrap();
        assert_eq!(bus.read_reg(regs::ISOLATED.offset).unwrap(), 0);
        assert_eq!(bus.read_reg(regs::ISOLATED.offset).unwrap(), 0);
        assert_eq!(bus.read_reg(regs::ISOLATED.offset).unwrap(), 0b11);
    }

    #[test]
    fn never_acks_when_delay_is_max() {
        let mut bus = SimBus::new(2, 4).with_ack_delay(u32::MAX);
        bus.write_reg(regs::ISOLATE.offset, 0b01).unwrap();
        for _ in 0..32 {
            assert_eq!(bus.read_reg(regs::ISOLATED.offset).unwrap(), 0);
        }
    }

    #[test]
    fn poke_sets_status_registers() {
        let mut bus = SimBus::new(2, 4);
        bus.poke(regs::RT_BYPASSED.offset, 0b10);
        assert_eq!(bus.read_reg(regs::RT_BYPASSED.offset).unwrap(), 0b10);
    }
}
